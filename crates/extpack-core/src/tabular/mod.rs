//! Tabular family (code 2): data frames and named series.
//!
//! Every payload starts with a format flag (0 parquet, 1 JSON rows). The
//! encoder writes the format chosen in [`CodecOptions`]; the decoder reads
//! whatever the flag says, so a text-only build still reads JSON tables
//! written by a parquet build configured for text.

#[cfg(feature = "parquet")]
mod columnar;
mod frame;
mod model;
mod series;
mod table;
mod text;

use std::sync::Arc;

pub use self::frame::FrameHandler;
pub use self::model::{Column, DataFrame, Dtype, Series};
pub use self::series::SeriesHandler;

use crate::builder::{CodecOptions, TabularFormat};
use crate::error::RegistryError;
use crate::extension::Extension;
use crate::typed::{Family, TypeRegistry};

pub const TABULAR_FAMILY: u8 = 2;

pub fn family(format: TabularFormat) -> Family {
    Family::new(TABULAR_FAMILY, "tabular")
        .with(FrameHandler::new(format))
        .with(SeriesHandler::new(format))
}

pub struct TabularExtension;

impl Extension for TabularExtension {
    fn name(&self) -> &'static str {
        "tabular"
    }

    fn install(
        &self,
        registry: &mut TypeRegistry,
        options: &CodecOptions,
    ) -> Result<(), RegistryError> {
        registry.register(Arc::new(family(options.tabular_format)))
    }
}
