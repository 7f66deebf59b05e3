use std::any::TypeId;

use ndarray::{ArrayD, IxDyn};

use super::array::NdArray;
use crate::error::CodecError;
use crate::typed::{Encoded, Handler, expect_type};
use crate::value::{ExtObject, Value};

macro_rules! scalar {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// A single number that keeps its dtype, unlike the envelope's
        /// native integers and floats.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum Scalar {
            $($variant($ty),)+
        }

        impl Scalar {
            /// Zero-dimensional array holding this value.
            pub fn to_array(self) -> NdArray {
                match self {
                    $(Scalar::$variant(v) => NdArray::$variant(ArrayD::from_elem(IxDyn(&[]), v)),)+
                }
            }

            /// The only element of a zero-dimensional array.
            pub fn from_array(array: &NdArray) -> Option<Self> {
                if array.ndim() != 0 {
                    return None;
                }
                match array {
                    $(NdArray::$variant(a) => a.iter().next().copied().map(Scalar::$variant),)+
                }
            }

            /// Bare primitive numbers stored as objects.
            pub(crate) fn from_primitive(value: &dyn ExtObject) -> Option<Self> {
                let any = value.as_any();
                $(
                    if let Some(v) = any.downcast_ref::<$ty>() {
                        return Some(Scalar::$variant(*v));
                    }
                )+
                None
            }

            pub fn dtype(&self) -> &'static str {
                self.to_array().dtype()
            }
        }

        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v)
                }
            }
        )+
    };
}

scalar! {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

/// Scalars as zero-dimensional npy arrays.
pub struct ScalarHandler;

impl Handler for ScalarHandler {
    fn code(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "scalar"
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Scalar>()]
    }

    fn has_check(&self) -> bool {
        true
    }

    fn check(&self, value: &dyn ExtObject) -> bool {
        Scalar::from_primitive(value).is_some()
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        let scalar = match expect_type::<Scalar>(value) {
            Some(scalar) => *scalar,
            None => match Scalar::from_primitive(value) {
                Some(scalar) => scalar,
                None => return Ok(Encoded::Declined),
            },
        };
        Ok(Encoded::Bytes(scalar.to_array().to_npy()?))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        let array = NdArray::from_npy(data)?;
        let scalar = Scalar::from_array(&array).ok_or_else(|| {
            CodecError::malformed("scalar", format!("expected 0-d array, got shape {:?}", array.shape()))
        })?;
        Ok(Value::object(scalar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn round_trip(value: &dyn ExtObject) -> Scalar {
        let bytes = ScalarHandler.encode(value).unwrap().into_bytes().unwrap();
        *ScalarHandler
            .decode(&bytes)
            .unwrap()
            .downcast_ref::<Scalar>()
            .unwrap()
    }

    #[rstest]
    #[case::float(Scalar::F64(1.5), "float64")]
    #[case::byte(Scalar::U8(7), "uint8")]
    #[case::single(Scalar::F32(-0.25), "float32")]
    #[case::signed(Scalar::I16(-300), "int16")]
    #[case::flag(Scalar::Bool(true), "bool")]
    #[case::big(Scalar::U64(u64::MAX), "uint64")]
    fn dtype_is_preserved(#[case] scalar: Scalar, #[case] dtype: &str) {
        let back = round_trip(&scalar);
        assert_eq!(back, scalar);
        assert_eq!(back.dtype(), dtype);
    }

    #[test]
    fn bare_primitives_match_the_predicate() {
        assert!(ScalarHandler.check(&7_u8));
        assert!(ScalarHandler.check(&1.5_f32));
        assert!(!ScalarHandler.check(&"7".to_string()));
        assert_eq!(round_trip(&7_u8), Scalar::U8(7));
    }

    #[test]
    fn arrays_are_not_scalars() {
        let array = NdArray::from(ArrayD::from_elem(IxDyn(&[2]), 1.0_f64));
        let err = ScalarHandler.decode(&array.to_npy().unwrap()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { what: "scalar", .. }));
    }

    #[test]
    fn declines_non_numbers() {
        assert_eq!(
            ScalarHandler.encode(&vec![1_u8]).unwrap(),
            Encoded::Declined
        );
    }
}
