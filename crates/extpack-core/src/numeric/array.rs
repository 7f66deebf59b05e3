use std::any::TypeId;

use ndarray::{Array1, Array2, ArrayD};
use ndarray_npy::{ReadNpyError, ReadNpyExt, WriteNpyExt};

use crate::error::CodecError;
use crate::typed::{Encoded, Handler, expect_type};
use crate::value::{ExtObject, Value};

macro_rules! nd_array {
    ($($variant:ident($ty:ty) = $dtype:literal),+ $(,)?) => {
        /// A dynamically shaped array tagged with its element dtype.
        #[derive(Debug, Clone, PartialEq)]
        pub enum NdArray {
            $($variant(ArrayD<$ty>),)+
        }

        impl NdArray {
            /// NumPy name of the element type.
            pub fn dtype(&self) -> &'static str {
                match self {
                    $(NdArray::$variant(_) => $dtype,)+
                }
            }

            pub fn shape(&self) -> &[usize] {
                match self {
                    $(NdArray::$variant(a) => a.shape(),)+
                }
            }

            pub fn ndim(&self) -> usize {
                self.shape().len()
            }

            pub fn to_npy(&self) -> Result<Vec<u8>, CodecError> {
                let mut buf = Vec::new();
                match self {
                    $(NdArray::$variant(a) => a.write_npy(&mut buf)?,)+
                }
                Ok(buf)
            }

            /// Reads npy bytes, trying each supported dtype in turn.
            pub fn from_npy(data: &[u8]) -> Result<Self, CodecError> {
                $(
                    match ArrayD::<$ty>::read_npy(data) {
                        Ok(a) => return Ok(NdArray::$variant(a)),
                        Err(ReadNpyError::WrongDescriptor(_)) => {}
                        Err(err) => return Err(err.into()),
                    }
                )+
                Err(CodecError::malformed("array", "unsupported dtype"))
            }

            /// Plain `ndarray` arrays of a supported dtype, 1-d, 2-d or dynamic.
            pub(crate) fn is_array_like(value: &dyn ExtObject) -> bool {
                let any = value.as_any();
                $(
                    if any.is::<ArrayD<$ty>>() || any.is::<Array1<$ty>>() || any.is::<Array2<$ty>>() {
                        return true;
                    }
                )+
                false
            }

            pub(crate) fn from_array_like(value: &dyn ExtObject) -> Option<Self> {
                let any = value.as_any();
                $(
                    if let Some(a) = any.downcast_ref::<ArrayD<$ty>>() {
                        return Some(NdArray::$variant(a.clone()));
                    }
                    if let Some(a) = any.downcast_ref::<Array1<$ty>>() {
                        return Some(NdArray::$variant(a.clone().into_dyn()));
                    }
                    if let Some(a) = any.downcast_ref::<Array2<$ty>>() {
                        return Some(NdArray::$variant(a.clone().into_dyn()));
                    }
                )+
                None
            }
        }

        $(
            impl From<ArrayD<$ty>> for NdArray {
                fn from(a: ArrayD<$ty>) -> Self {
                    NdArray::$variant(a)
                }
            }
        )+
    };
}

nd_array! {
    Bool(bool) = "bool",
    I8(i8) = "int8",
    I16(i16) = "int16",
    I32(i32) = "int32",
    I64(i64) = "int64",
    U8(u8) = "uint8",
    U16(u16) = "uint16",
    U32(u32) = "uint32",
    U64(u64) = "uint64",
    F32(f32) = "float32",
    F64(f64) = "float64",
}

/// Arrays as npy bytes.
///
/// Claims [`NdArray`] exactly; its predicate also accepts plain `ndarray`
/// arrays, which decode as [`NdArray`].
pub struct ArrayHandler;

impl Handler for ArrayHandler {
    fn code(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "array"
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        vec![TypeId::of::<NdArray>()]
    }

    fn has_check(&self) -> bool {
        true
    }

    fn check(&self, value: &dyn ExtObject) -> bool {
        NdArray::is_array_like(value)
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        if let Some(array) = expect_type::<NdArray>(value) {
            return Ok(Encoded::Bytes(array.to_npy()?));
        }
        match NdArray::from_array_like(value) {
            Some(array) => Ok(Encoded::Bytes(array.to_npy()?)),
            None => Ok(Encoded::Declined),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        Ok(Value::object(NdArray::from_npy(data)?))
    }
}
