use std::any::TypeId;

use super::model::{Column, Series};
use super::table;
use crate::builder::TabularFormat;
use crate::error::CodecError;
use crate::typed::{Encoded, Handler, expect_type};
use crate::value::{ExtObject, Value};

/// Column label used inside the table when the series has no name.
const UNNAMED: &str = "0";

/// Series as `[format flag][name length: u32 LE][name as JSON][table]`.
///
/// The name is JSON so that `None` (`null`) and `Some("")` stay distinct.
/// Also the fallback for a bare [`Column`], which is sent as an unnamed
/// series.
pub struct SeriesHandler {
    format: TabularFormat,
}

impl SeriesHandler {
    pub fn new(format: TabularFormat) -> Self {
        Self { format }
    }

    fn write(&self, name: Option<&str>, values: &Column) -> Result<Vec<u8>, CodecError> {
        let name_json = serde_json::to_vec(&name)?;
        let name_len = u32::try_from(name_json.len())
            .map_err(|_| CodecError::malformed("series", "name too long"))?;

        let mut out = vec![self.format.flag()];
        out.extend_from_slice(&name_len.to_le_bytes());
        out.extend_from_slice(&name_json);
        out.extend(table::write(
            self.format,
            &[(name.unwrap_or(UNNAMED), values)],
        )?);
        Ok(out)
    }
}

impl Handler for SeriesHandler {
    fn code(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "series"
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Series>()]
    }

    fn is_fallback(&self) -> bool {
        true
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        let bytes = if let Some(series) = expect_type::<Series>(value) {
            self.write(series.name.as_deref(), &series.values)?
        } else if let Some(column) = expect_type::<Column>(value) {
            self.write(None, column)?
        } else {
            return Ok(Encoded::Declined);
        };
        Ok(Encoded::Bytes(bytes))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        let (format, rest) = table::split_flag("series", data)?;
        if rest.len() < 4 {
            return Err(CodecError::malformed("series", "truncated name length"));
        }
        let (len, rest) = rest.split_at(4);
        let len = u32::from_le_bytes([len[0], len[1], len[2], len[3]]) as usize;
        if rest.len() < len {
            return Err(CodecError::malformed(
                "series",
                format!("name needs {len} bytes, {} left", rest.len()),
            ));
        }
        let (name, body) = rest.split_at(len);
        let name: Option<String> = serde_json::from_slice(name)?;

        let mut columns = table::read(format, body)?;
        if columns.len() != 1 {
            return Err(CodecError::malformed(
                "series",
                format!("expected one column, found {}", columns.len()),
            ));
        }
        let (_, values) = columns.remove(0);
        Ok(Value::object(Series { name, values }))
    }
}
