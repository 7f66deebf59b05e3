//! Tabular values: typed columns, named series and data frames.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Element type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Float64,
    Int64,
    Bool,
    Utf8,
}

/// A homogeneous column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float64(Vec<f64>),
    Int64(Vec<i64>),
    Boolean(Vec<bool>),
    Utf8(Vec<String>),
}

impl Column {
    pub fn empty(dtype: Dtype) -> Self {
        match dtype {
            Dtype::Float64 => Column::Float64(Vec::new()),
            Dtype::Int64 => Column::Int64(Vec::new()),
            Dtype::Bool => Column::Boolean(Vec::new()),
            Dtype::Utf8 => Column::Utf8(Vec::new()),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Column::Float64(_) => Dtype::Float64,
            Column::Int64(_) => Dtype::Int64,
            Column::Boolean(_) => Dtype::Bool,
            Column::Utf8(_) => Dtype::Utf8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Float64(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::Boolean(v) => v.len(),
            Column::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A column with an optional name.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: Option<String>,
    pub values: Column,
}

impl Series {
    pub fn new<N: Into<String>>(name: Option<N>, values: Column) -> Self {
        Self {
            name: name.map(Into::into),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Named columns of equal length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<(String, Column)>,
}

impl DataFrame {
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self, CodecError> {
        if let Some((_, first)) = columns.first() {
            let expected = first.len();
            if let Some((name, column)) = columns.iter().find(|(_, c)| c.len() != expected) {
                return Err(CodecError::ShapeMismatch {
                    column: name.clone(),
                    expected,
                    found: column.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn borrowed(&self) -> Vec<(&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c)).collect()
    }
}
