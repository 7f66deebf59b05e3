use std::any::TypeId;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use crate::error::CodecError;
use crate::typed::{Encoded, Handler, expect_type};
use crate::value::{ExtObject, Value};

/// Timestamps as ISO-8601 text.
///
/// The offset is written only when the source value carries one. On decode,
/// text with an offset becomes `DateTime<FixedOffset>` and text without one
/// becomes `NaiveDateTime`; `DateTime<Utc>` therefore comes back as a
/// `+00:00` fixed offset.
pub struct TimestampHandler;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl Handler for TimestampHandler {
    fn code(&self) -> u8 {
        1
    }

    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        vec![
            TypeId::of::<NaiveDateTime>(),
            TypeId::of::<DateTime<FixedOffset>>(),
            TypeId::of::<DateTime<Utc>>(),
        ]
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        let text = if let Some(dt) = expect_type::<NaiveDateTime>(value) {
            dt.format(NAIVE_FORMAT).to_string()
        } else if let Some(dt) = expect_type::<DateTime<FixedOffset>>(value) {
            dt.to_rfc3339()
        } else if let Some(dt) = expect_type::<DateTime<Utc>>(value) {
            dt.to_rfc3339()
        } else {
            return Ok(Encoded::Declined);
        };
        Ok(Encoded::Bytes(text.into_bytes()))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| CodecError::malformed("timestamp", e.to_string()))?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(Value::object(dt));
        }
        NaiveDateTime::parse_from_str(text, NAIVE_FORMAT)
            .map(Value::object)
            .map_err(|e| CodecError::malformed("timestamp", format!("{text:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use rstest::rstest;

    fn naive(h: u32, m: u32, s: u32, nano: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_nano_opt(h, m, s, nano)
            .unwrap()
    }

    fn encode_text(value: &dyn ExtObject) -> String {
        let bytes = TimestampHandler.encode(value).unwrap().into_bytes().unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[rstest]
    #[case::whole_seconds(naive(12, 0, 0, 0), "2024-01-01T12:00:00")]
    #[case::millis(naive(12, 0, 0, 500_000_000), "2024-01-01T12:00:00.500")]
    #[case::micros(naive(23, 59, 59, 123_456_000), "2024-01-01T23:59:59.123456")]
    #[case::nanos(naive(0, 0, 1, 7), "2024-01-01T00:00:01.000000007")]
    fn naive_round_trips_without_offset(#[case] dt: NaiveDateTime, #[case] expected: &str) {
        assert_eq!(encode_text(&dt), expected);
        let decoded = TimestampHandler.decode(expected.as_bytes()).unwrap();
        assert_eq!(decoded.downcast_ref::<NaiveDateTime>(), Some(&dt));
    }

    #[rstest]
    #[case::east(9 * 3600)]
    #[case::west(-5 * 3600 - 1800)]
    #[case::zero(0)]
    fn offset_is_preserved(#[case] offset_secs: i32) {
        let offset = FixedOffset::east_opt(offset_secs).unwrap();
        let dt = offset
            .from_local_datetime(&naive(8, 30, 0, 250_000))
            .single()
            .unwrap();

        let text = encode_text(&dt);
        let decoded = TimestampHandler.decode(text.as_bytes()).unwrap();
        let back = decoded.downcast_ref::<DateTime<FixedOffset>>().unwrap();
        assert_eq!(back, &dt);
        assert_eq!(back.offset(), &offset);
    }

    #[test]
    fn utc_decodes_as_zero_offset() {
        let dt = Utc.from_utc_datetime(&naive(12, 0, 0, 0));
        let text = encode_text(&dt);
        assert_eq!(text, "2024-01-01T12:00:00+00:00");

        let decoded = TimestampHandler.decode(text.as_bytes()).unwrap();
        let back = decoded.downcast_ref::<DateTime<FixedOffset>>().unwrap();
        assert_eq!(back.with_timezone(&Utc), dt);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = TimestampHandler.decode(b"yesterday").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { what: "timestamp", .. }));
    }
}
