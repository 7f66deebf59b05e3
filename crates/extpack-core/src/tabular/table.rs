//! Format dispatch shared by the frame and series handlers.

use super::model::Column;
use crate::builder::TabularFormat;
use crate::error::CodecError;

#[cfg(feature = "parquet")]
use super::columnar;

pub(crate) fn write(
    format: TabularFormat,
    columns: &[(&str, &Column)],
) -> Result<Vec<u8>, CodecError> {
    match format {
        #[cfg(feature = "parquet")]
        TabularFormat::Columnar => columnar::write(columns),
        #[cfg(not(feature = "parquet"))]
        TabularFormat::Columnar => Err(CodecError::Unsupported("parquet")),
        TabularFormat::Text => super::text::write(columns),
    }
}

pub(crate) fn read(format: TabularFormat, data: &[u8]) -> Result<Vec<(String, Column)>, CodecError> {
    match format {
        #[cfg(feature = "parquet")]
        TabularFormat::Columnar => columnar::read(data),
        #[cfg(not(feature = "parquet"))]
        TabularFormat::Columnar => Err(CodecError::Unsupported("parquet")),
        TabularFormat::Text => super::text::read(data),
    }
}

/// Splits the leading format flag off a payload.
pub(crate) fn split_flag<'a>(
    what: &'static str,
    data: &'a [u8],
) -> Result<(TabularFormat, &'a [u8]), CodecError> {
    let (&flag, rest) = data
        .split_first()
        .ok_or_else(|| CodecError::malformed(what, "missing format flag"))?;
    let format = TabularFormat::from_flag(flag)
        .ok_or_else(|| CodecError::malformed(what, format!("unknown format flag {flag}")))?;
    Ok((format, rest))
}
