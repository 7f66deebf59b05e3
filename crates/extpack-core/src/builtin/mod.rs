//! Builtin family (code 0): complex numbers, timestamps and durations.

mod complex;
mod duration;
mod timestamp;

use std::sync::Arc;

pub use self::complex::ComplexHandler;
pub use self::duration::DurationHandler;
pub use self::timestamp::TimestampHandler;

use crate::builder::CodecOptions;
use crate::error::RegistryError;
use crate::extension::Extension;
use crate::typed::{Family, TypeRegistry};

pub const BUILTIN_FAMILY: u8 = 0;

pub fn family() -> Family {
    Family::new(BUILTIN_FAMILY, "builtin")
        .with(ComplexHandler)
        .with(TimestampHandler)
        .with(DurationHandler)
}

pub struct BuiltinExtension;

impl Extension for BuiltinExtension {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn install(
        &self,
        registry: &mut TypeRegistry,
        _options: &CodecOptions,
    ) -> Result<(), RegistryError> {
        registry.register(Arc::new(family()))
    }
}
