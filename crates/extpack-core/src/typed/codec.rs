//! Codec - Value と MessagePack バイト列の相互変換
//!
//! # エンコードフロー
//! 1. ネイティブな値（nil, bool, 数値, 文字列, 配列, map）はそのまま envelope へ
//! 2. Object は TypeRegistry で family を選び、`Ext(family code, bytes)` に包む
//! 3. どの handler も受け付けなければ `EncodeError::NoEncoder`
//!
//! # デコードフロー
//! 1. envelope から `(code, blob)` を取り出す
//! 2. 未知の code は `Value::Unresolved` としてそのまま返す（エラーにしない）
//! 3. 既知の code は family の decode に委譲（未知の subcode はエラー）

use crate::error::{CodecError, DecodeError, EncodeError};
use crate::observability::RegistryView;
use crate::typed::registry::TypeRegistry;
use crate::value::{Object, Value};

/// Codec encodes and decodes [`Value`] trees through one [`TypeRegistry`].
///
/// A built codec is read-only; share it by reference or `Arc` across threads.
pub struct Codec {
    registry: TypeRegistry,
}

impl Codec {
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Serialises `value` into MessagePack bytes.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        let packed = self.encode_value(value)?;
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &packed)
            .map_err(|e| EncodeError::Envelope(e.to_string()))?;
        Ok(buf)
    }

    /// Parses one MessagePack value. Trailing bytes are an error.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
        let mut reader = bytes;
        let packed = rmpv::decode::read_value(&mut reader)
            .map_err(|e| DecodeError::Envelope(e.to_string()))?;
        if !reader.is_empty() {
            return Err(DecodeError::TrailingBytes(reader.len()));
        }
        self.decode_packed(packed)
    }

    /// Converts a value tree into the envelope's value model.
    pub fn encode_value(&self, value: &Value) -> Result<rmpv::Value, EncodeError> {
        Ok(match value {
            Value::Nil => rmpv::Value::Nil,
            Value::Boolean(b) => rmpv::Value::Boolean(*b),
            Value::Integer(i) => rmpv::Value::from(*i),
            Value::UInteger(u) => rmpv::Value::from(*u),
            Value::Float(f) => rmpv::Value::F64(*f),
            Value::String(s) => rmpv::Value::from(s.as_str()),
            Value::Binary(b) => rmpv::Value::Binary(b.clone()),
            Value::Array(items) => rmpv::Value::Array(
                items
                    .iter()
                    .map(|item| self.encode_value(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => rmpv::Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((self.encode_value(k)?, self.encode_value(v)?)))
                    .collect::<Result<_, EncodeError>>()?,
            ),
            Value::Object(object) => self.encode_object(object)?,
            Value::Unresolved { code, data } => rmpv::Value::Ext(*code, data.clone()),
        })
    }

    fn encode_object(&self, object: &Object) -> Result<rmpv::Value, EncodeError> {
        let Some(selected) = self.registry.select(object.get())? else {
            return Err(EncodeError::NoEncoder {
                type_name: object.type_name(),
            });
        };
        // TypeRegistry only accepts codes <= 127
        let tag = i8::try_from(selected.code()).map_err(|_| {
            EncodeError::Envelope(format!("family code {} out of range", selected.code()))
        })?;
        tracing::trace!(
            family = selected.handler.name(),
            code = tag,
            type_name = object.type_name(),
            "encoded extension object"
        );
        Ok(rmpv::Value::Ext(tag, selected.bytes))
    }

    /// Resolves one extension payload.
    ///
    /// Unknown and reserved (negative) codes come back as
    /// [`Value::Unresolved`]; errors from a known family propagate.
    pub fn decode_value(&self, code: i8, blob: &[u8]) -> Result<Value, CodecError> {
        let family = u8::try_from(code)
            .ok()
            .and_then(|code| self.registry.find_decoder(code).ok());
        match family {
            Some(handler) => handler.decode(blob),
            None => {
                tracing::debug!(code, len = blob.len(), "unknown extension code; kept opaque");
                Ok(Value::Unresolved {
                    code,
                    data: blob.to_vec(),
                })
            }
        }
    }

    fn decode_packed(&self, packed: rmpv::Value) -> Result<Value, DecodeError> {
        Ok(match packed {
            rmpv::Value::Nil => Value::Nil,
            rmpv::Value::Boolean(b) => Value::Boolean(b),
            rmpv::Value::Integer(i) => match i.as_i64() {
                Some(v) => Value::Integer(v),
                None => Value::UInteger(i.as_u64().unwrap_or_default()),
            },
            rmpv::Value::F32(f) => Value::Float(f64::from(f)),
            rmpv::Value::F64(f) => Value::Float(f),
            rmpv::Value::String(s) => {
                Value::String(s.into_str().ok_or(DecodeError::InvalidUtf8)?)
            }
            rmpv::Value::Binary(b) => Value::Binary(b),
            rmpv::Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.decode_packed(item))
                    .collect::<Result<_, _>>()?,
            ),
            rmpv::Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| Ok((self.decode_packed(k)?, self.decode_packed(v)?)))
                    .collect::<Result<_, DecodeError>>()?,
            ),
            rmpv::Value::Ext(code, data) => self.decode_value(code, &data)?,
        })
    }

    /// Snapshot of the registered families, for diagnostics.
    pub fn describe(&self) -> RegistryView {
        RegistryView::of(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CodecBuilder;
    use crate::extension::default_extensions;
    use crate::numeric::{NdArray, Scalar};
    use crate::tabular::{Column, Series};
    use chrono::{NaiveDate, TimeDelta};
    use ndarray::{ArrayD, IxDyn};
    use num_complex::Complex64;

    fn codec() -> Codec {
        CodecBuilder::new()
            .extensions(default_extensions())
            .build()
            .unwrap()
    }

    fn round_trip(codec: &Codec, value: &Value) -> Value {
        let bytes = codec.encode(value).unwrap();
        codec.decode(&bytes).unwrap()
    }

    fn ext_bytes(code: i8, data: Vec<u8>) -> Vec<u8> {
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, &rmpv::Value::Ext(code, data)).unwrap();
        buf
    }

    #[test]
    fn native_values_skip_the_registry() {
        let codec = codec();
        let value = Value::Map(vec![
            (Value::from("n"), Value::Nil),
            (Value::from("b"), Value::Boolean(true)),
            (Value::from("i"), Value::Integer(-3)),
            (Value::from("u"), Value::UInteger(u64::MAX)),
            (Value::from("f"), Value::Float(0.75)),
            (Value::from("bin"), Value::Binary(vec![0, 1, 2])),
            (Value::Integer(1), Value::Array(vec![Value::from("x")])),
        ]);

        let bytes = codec.encode(&value).unwrap();
        let mut reader = bytes.as_slice();
        let raw = rmpv::decode::read_value(&mut reader).unwrap();
        assert!(!format!("{raw:?}").contains("Ext"));

        assert_eq!(codec.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn mixed_container_round_trips() {
        let codec = codec();
        let value = Value::Array(vec![
            Value::Integer(0),
            Value::Float(0.75),
            Value::object(Complex64::new(1.0, 0.5)),
            Value::object(Complex64::new(1.0, -0.5)),
            Value::object(
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            ),
            Value::object(TimeDelta::days(5) + TimeDelta::hours(3)),
        ]);

        assert_eq!(round_trip(&codec, &value), value);
    }

    #[test]
    fn numeric_mapping_keeps_dtypes() {
        let codec = codec();
        let array = ArrayD::from_shape_vec(IxDyn(&[10]), (0..10_i64).collect()).unwrap();
        let value = Value::Map(vec![
            (Value::from("a"), Value::object(NdArray::from(array.clone()))),
            (Value::from("b"), Value::object(Scalar::F64(1.5))),
            (Value::from("c"), Value::object(Scalar::U8(7))),
        ]);

        let decoded = round_trip(&codec, &value);
        assert_eq!(
            decoded.get("a").and_then(|v| v.downcast_ref::<NdArray>()),
            Some(&NdArray::I64(array))
        );
        assert_eq!(
            decoded.get("b").and_then(|v| v.downcast_ref::<Scalar>()),
            Some(&Scalar::F64(1.5))
        );
        assert_eq!(
            decoded.get("c").and_then(|v| v.downcast_ref::<Scalar>()),
            Some(&Scalar::U8(7))
        );
    }

    #[test]
    fn series_name_survives_including_none() {
        let codec = codec();
        let named = Series::new(Some("price"), Column::Float64(vec![1.0, 2.5]));
        let unnamed = Series::new(None::<String>, Column::Int64(vec![3, 4]));
        let value = Value::Array(vec![Value::object(named), Value::object(unnamed)]);

        assert_eq!(round_trip(&codec, &value), value);
    }

    #[test]
    fn unknown_family_code_stays_opaque() {
        let codec = codec();
        let bytes = ext_bytes(42, vec![1, 2, 3]);

        let value = codec.decode(&bytes).unwrap();
        assert_eq!(
            value,
            Value::Unresolved {
                code: 42,
                data: vec![1, 2, 3]
            }
        );
        // and re-encodes byte for byte
        assert_eq!(codec.encode(&value).unwrap(), bytes);
    }

    #[test]
    fn reserved_negative_code_stays_opaque() {
        let codec = codec();
        let value = codec.decode(&ext_bytes(-1, vec![0; 4])).unwrap();
        assert!(matches!(value, Value::Unresolved { code: -1, .. }));
    }

    #[test]
    fn unknown_subcode_in_known_family_is_an_error() {
        let codec = codec();
        let err = codec.decode(&ext_bytes(0, vec![200, 1, 2])).unwrap_err();
        assert!(err.is_unknown_subcode());
        assert!(matches!(
            err,
            DecodeError::Codec(CodecError::UnknownSubcode {
                family: 0,
                subcode: 200
            })
        ));
    }

    #[test]
    fn unknown_subcode_inside_a_container_still_fails() {
        let codec = codec();
        let inner = rmpv::Value::Array(vec![
            rmpv::Value::from(1),
            rmpv::Value::Ext(1, vec![9]),
        ]);
        let mut bytes = Vec::new();
        rmpv::encode::write_value(&mut bytes, &inner).unwrap();

        assert!(codec.decode(&bytes).unwrap_err().is_unknown_subcode());
    }

    #[test]
    fn unregistered_object_has_no_encoder() {
        #[derive(Debug, Clone, PartialEq)]
        struct Opaque;

        let codec = codec();
        let err = codec.encode(&Value::object(Opaque)).unwrap_err();
        assert!(matches!(err, EncodeError::NoEncoder { type_name } if type_name.ends_with("Opaque")));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let codec = codec();
        let mut bytes = codec.encode(&Value::Integer(1)).unwrap();
        bytes.push(0xc0);
        assert!(matches!(
            codec.decode(&bytes),
            Err(DecodeError::TrailingBytes(1))
        ));
    }

    #[test]
    fn decode_value_routes_by_family() {
        let codec = codec();
        let mut blob = vec![0];
        blob.extend_from_slice(&1.0_f64.to_le_bytes());
        blob.extend_from_slice(&2.0_f64.to_le_bytes());

        let value = codec.decode_value(0, &blob).unwrap();
        assert_eq!(
            value.downcast_ref::<Complex64>(),
            Some(&Complex64::new(1.0, 2.0))
        );
    }
}
