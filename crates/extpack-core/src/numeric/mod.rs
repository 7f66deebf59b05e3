//! Numeric family (code 1): dtype-tagged scalars and n-dimensional arrays.
//!
//! Payloads are NumPy `.npy` bytes written and read by `ndarray-npy`; the
//! dtype and shape live in the npy header and are not parsed here.

mod array;
mod scalar;

use std::sync::Arc;

pub use self::array::{ArrayHandler, NdArray};
pub use self::scalar::{Scalar, ScalarHandler};

use crate::builder::CodecOptions;
use crate::error::RegistryError;
use crate::extension::Extension;
use crate::typed::{Family, TypeRegistry};

pub const NUMERIC_FAMILY: u8 = 1;

pub fn family() -> Family {
    Family::new(NUMERIC_FAMILY, "numeric")
        .with(ScalarHandler)
        .with(ArrayHandler)
}

pub struct NumericExtension;

impl Extension for NumericExtension {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn install(
        &self,
        registry: &mut TypeRegistry,
        _options: &CodecOptions,
    ) -> Result<(), RegistryError> {
        registry.register(Arc::new(family()))
    }
}
