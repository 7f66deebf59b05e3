//! JSON rows, used when parquet is not compiled in.
//!
//! ```text
//! {"columns": [{"name": "a", "dtype": "int64"}], "rows": [[1], [2]]}
//! ```
//! Non-finite floats are written as the strings `"inf"`, `"-inf"` and
//! `"nan"`. A `null` float cell reads back as NaN.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::model::{Column, Dtype};
use crate::error::CodecError;

#[derive(Serialize, Deserialize)]
struct Table {
    columns: Vec<Header>,
    rows: Vec<Vec<Json>>,
}

#[derive(Serialize, Deserialize)]
struct Header {
    name: String,
    dtype: Dtype,
}

fn float_cell(x: f64) -> Json {
    if x.is_nan() {
        Json::from("nan")
    } else if x == f64::INFINITY {
        Json::from("inf")
    } else if x == f64::NEG_INFINITY {
        Json::from("-inf")
    } else {
        Json::from(x)
    }
}

fn parse_float(cell: &Json) -> Option<f64> {
    match cell {
        Json::Null => Some(f64::NAN),
        Json::String(s) => match s.as_str() {
            "nan" => Some(f64::NAN),
            "inf" => Some(f64::INFINITY),
            "-inf" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        other => other.as_f64(),
    }
}

fn cell(column: &Column, row: usize) -> Json {
    match column {
        Column::Float64(v) => float_cell(v[row]),
        Column::Int64(v) => Json::from(v[row]),
        Column::Boolean(v) => Json::Bool(v[row]),
        Column::Utf8(v) => Json::String(v[row].clone()),
    }
}

fn push(column: &mut Column, cell: Json) -> Result<(), CodecError> {
    let pushed = match column {
        Column::Float64(v) => parse_float(&cell).map(|x| v.push(x)),
        Column::Int64(v) => cell.as_i64().map(|x| v.push(x)),
        Column::Boolean(v) => cell.as_bool().map(|x| v.push(x)),
        Column::Utf8(v) => cell.as_str().map(|s| v.push(s.to_string())),
    };
    pushed.ok_or_else(|| {
        CodecError::malformed(
            "text table",
            format!("cell {cell} does not fit a {:?} column", column.dtype()),
        )
    })
}

pub(crate) fn write(columns: &[(&str, &Column)]) -> Result<Vec<u8>, CodecError> {
    let rows = columns.first().map_or(0, |(_, c)| c.len());
    let table = Table {
        columns: columns
            .iter()
            .map(|(name, column)| Header {
                name: name.to_string(),
                dtype: column.dtype(),
            })
            .collect(),
        rows: (0..rows)
            .map(|row| columns.iter().map(|(_, c)| cell(c, row)).collect())
            .collect(),
    };
    Ok(serde_json::to_vec(&table)?)
}

pub(crate) fn read(data: &[u8]) -> Result<Vec<(String, Column)>, CodecError> {
    let table: Table = serde_json::from_slice(data)?;
    let mut columns: Vec<(String, Column)> = table
        .columns
        .into_iter()
        .map(|h| (h.name, Column::empty(h.dtype)))
        .collect();
    for (i, row) in table.rows.into_iter().enumerate() {
        if row.len() != columns.len() {
            return Err(CodecError::malformed(
                "text table",
                format!("row {i} has {} cells, expected {}", row.len(), columns.len()),
            ));
        }
        for ((_, column), cell) in columns.iter_mut().zip(row) {
            push(column, cell)?;
        }
    }
    Ok(columns)
}
