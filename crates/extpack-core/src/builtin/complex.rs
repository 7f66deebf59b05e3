use std::any::TypeId;

use num_complex::Complex64;

use crate::error::CodecError;
use crate::typed::{Encoded, Handler, expect_type};
use crate::value::{ExtObject, Value};

/// Complex numbers as two little-endian f64s, real then imaginary.
pub struct ComplexHandler;

const WIDTH: usize = 16;

impl Handler for ComplexHandler {
    fn code(&self) -> u8 {
        0
    }

    fn name(&self) -> &'static str {
        "complex"
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        vec![TypeId::of::<Complex64>()]
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        let Some(c) = expect_type::<Complex64>(value) else {
            return Ok(Encoded::Declined);
        };
        let mut out = Vec::with_capacity(WIDTH);
        out.extend_from_slice(&c.re.to_le_bytes());
        out.extend_from_slice(&c.im.to_le_bytes());
        Ok(Encoded::Bytes(out))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        if data.len() != WIDTH {
            return Err(CodecError::malformed(
                "complex",
                format!("expected {WIDTH} bytes, got {}", data.len()),
            ));
        }
        let mut re = [0; 8];
        let mut im = [0; 8];
        re.copy_from_slice(&data[..8]);
        im.copy_from_slice(&data[8..]);
        Ok(Value::object(Complex64::new(
            f64::from_le_bytes(re),
            f64::from_le_bytes(im),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn layout_is_real_then_imag() {
        let encoded = ComplexHandler.encode(&Complex64::new(1.0, -0.5)).unwrap();
        let mut expected = 1.0_f64.to_le_bytes().to_vec();
        expected.extend_from_slice(&(-0.5_f64).to_le_bytes());
        assert_eq!(encoded, Encoded::Bytes(expected));
    }

    #[test]
    fn random_values_round_trip_exactly() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let c = Complex64::new(rng.r#gen::<f64>() * 1e6 - 5e5, rng.r#gen::<f64>());
            let bytes = ComplexHandler.encode(&c).unwrap().into_bytes().unwrap();
            let decoded = ComplexHandler.decode(&bytes).unwrap();
            assert_eq!(decoded.downcast_ref::<Complex64>(), Some(&c));
        }
    }

    #[test]
    fn declines_other_types() {
        assert_eq!(ComplexHandler.encode(&1.0_f64).unwrap(), Encoded::Declined);
    }

    #[test]
    fn wrong_width_is_malformed() {
        let err = ComplexHandler.decode(&[0; 15]).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { what: "complex", .. }));
    }
}
