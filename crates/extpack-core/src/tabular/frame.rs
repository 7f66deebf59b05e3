use std::any::TypeId;

use super::model::DataFrame;
use super::table;
use crate::builder::TabularFormat;
use crate::error::CodecError;
use crate::typed::{Encoded, Handler, expect_type};
use crate::value::{ExtObject, Value};

/// Data frames as `[format flag][table]`.
pub struct FrameHandler {
    format: TabularFormat,
}

impl FrameHandler {
    pub fn new(format: TabularFormat) -> Self {
        Self { format }
    }
}

impl Handler for FrameHandler {
    fn code(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "frame"
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        vec![TypeId::of::<DataFrame>()]
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        let Some(frame) = expect_type::<DataFrame>(value) else {
            return Ok(Encoded::Declined);
        };
        let mut out = vec![self.format.flag()];
        out.extend(table::write(self.format, &frame.borrowed())?);
        Ok(Encoded::Bytes(out))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        let (format, body) = table::split_flag("frame", data)?;
        let frame = DataFrame::new(table::read(format, body)?)?;
        Ok(Value::object(frame))
    }
}
