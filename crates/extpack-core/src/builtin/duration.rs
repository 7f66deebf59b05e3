use std::any::TypeId;

use chrono::TimeDelta;

use crate::error::CodecError;
use crate::typed::{Encoded, Handler, expect_type};
use crate::value::{ExtObject, Value};

/// Durations as the decimal text of their total seconds.
///
/// The seconds travel as an f64 and decoding rounds to whole microseconds,
/// so sub-microsecond parts (and precision beyond what an f64 holds for
/// very long spans) are lost.
pub struct DurationHandler;

impl Handler for DurationHandler {
    fn code(&self) -> u8 {
        2
    }

    fn name(&self) -> &'static str {
        "duration"
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        vec![TypeId::of::<TimeDelta>()]
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        let Some(delta) = expect_type::<TimeDelta>(value) else {
            return Ok(Encoded::Declined);
        };
        Ok(Encoded::Bytes(total_seconds(delta).to_string().into_bytes()))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| CodecError::malformed("duration", e.to_string()))?;
        let seconds: f64 = text
            .trim()
            .parse()
            .map_err(|e| CodecError::malformed("duration", format!("{text:?}: {e}")))?;
        let out_of_range =
            || CodecError::malformed("duration", format!("{text:?} is out of range"));
        let whole = seconds.trunc();
        if !whole.is_finite() || whole.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        // |fraction| < 1, so the rounded micros stay within one second
        let micros = ((seconds - whole) * 1e6).round() as i64;
        let delta = TimeDelta::try_seconds(whole as i64)
            .and_then(|d| d.checked_add(&TimeDelta::microseconds(micros)))
            .ok_or_else(out_of_range)?;
        Ok(Value::object(delta))
    }
}

fn total_seconds(delta: &TimeDelta) -> f64 {
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn round_trip(delta: TimeDelta) -> TimeDelta {
        let bytes = DurationHandler.encode(&delta).unwrap().into_bytes().unwrap();
        *DurationHandler
            .decode(&bytes)
            .unwrap()
            .downcast_ref::<TimeDelta>()
            .unwrap()
    }

    #[rstest]
    #[case::days_and_hours(TimeDelta::days(5) + TimeDelta::hours(3))]
    #[case::fractional(TimeDelta::milliseconds(1500))]
    #[case::negative(TimeDelta::milliseconds(-2250))]
    #[case::micros(TimeDelta::microseconds(1_000_001))]
    #[case::zero(TimeDelta::zero())]
    #[case::beyond_i64_micros(TimeDelta::days(200_000_000))]
    #[case::negative_beyond_i64_micros(-TimeDelta::days(200_000_000))]
    fn exact_to_the_microsecond(#[case] delta: TimeDelta) {
        assert_eq!(round_trip(delta), delta);
    }

    #[test]
    fn text_is_total_seconds() {
        let encoded = DurationHandler
            .encode(&(TimeDelta::days(5) + TimeDelta::hours(3)))
            .unwrap();
        assert_eq!(encoded, Encoded::Bytes(b"442800".to_vec()));

        let encoded = DurationHandler.encode(&TimeDelta::milliseconds(-2250)).unwrap();
        assert_eq!(encoded, Encoded::Bytes(b"-2.25".to_vec()));
    }

    #[test]
    fn sub_microsecond_parts_are_lost() {
        let delta = TimeDelta::seconds(3) + TimeDelta::nanoseconds(400);
        assert_eq!(round_trip(delta), TimeDelta::seconds(3));
    }

    #[test]
    fn accepts_python_style_text() {
        let decoded = DurationHandler.decode(b"442800.0").unwrap();
        assert_eq!(
            decoded.downcast_ref::<TimeDelta>(),
            Some(&(TimeDelta::days(5) + TimeDelta::hours(3)))
        );
    }

    #[rstest]
    #[case::not_a_number(b"soon".as_slice())]
    #[case::infinite(b"inf".as_slice())]
    #[case::too_large(b"1e300".as_slice())]
    fn rejects_bad_text(#[case] data: &[u8]) {
        assert!(matches!(
            DurationHandler.decode(data),
            Err(CodecError::Malformed { what: "duration", .. })
        ));
    }
}
