//! Handler trait - 1 つの型（または型ファミリー）のエンコード/デコード定義
//!
//! # 学習ポイント
//! - Object-safe trait (`Arc<dyn Handler>` で Registry に格納)
//! - 「辞退」を例外ではなく 2 値の結果 (`Encoded`) で表現する
//! - デフォルトメソッドで optional な能力（predicate, fallback）を表す

use std::any::TypeId;

use crate::error::CodecError;
use crate::value::{ExtObject, Value};

/// Encoded はエンコード結果
///
/// `Declined` はエラーではなく「このインスタンスは扱わない」という意思表示です。
/// dispatch は次の候補（predicate → fallback）へ進みます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Bytes(Vec<u8>),
    Declined,
}

impl Encoded {
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Encoded::Bytes(bytes) => Some(bytes),
            Encoded::Declined => None,
        }
    }
}

/// Handler は Registry に登録されるエンコーダ/デコーダ
///
/// # 使用例
/// ```ignore
/// struct ComplexHandler;
///
/// impl Handler for ComplexHandler {
///     fn code(&self) -> u8 { 0 }
///     fn name(&self) -> &'static str { "complex" }
///     fn claimed_types(&self) -> Vec<TypeId> { vec![TypeId::of::<Complex64>()] }
///     fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> { ... }
///     fn decode(&self, data: &[u8]) -> Result<Value, CodecError> { ... }
/// }
/// ```
///
/// # 選択順序
/// 1. `claimed_types` の完全一致
/// 2. `check` が true を返す predicate handler（登録順）
/// 3. `is_fallback` な handler（登録順、`Declined` を返さない最初のもの）
pub trait Handler: Send + Sync {
    /// On-wire discriminator, unique within one registry level.
    fn code(&self) -> u8;

    fn name(&self) -> &'static str;

    fn claimed_types(&self) -> Vec<TypeId>;

    /// Whether this handler takes part in predicate matching.
    fn has_check(&self) -> bool {
        false
    }

    /// Structural test used when no exact type matched.
    fn check(&self, _value: &dyn ExtObject) -> bool {
        false
    }

    fn is_fallback(&self) -> bool {
        false
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError>;

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError>;

    /// Nested handlers, for families that run their own registry.
    fn children(&self) -> Vec<&dyn Handler> {
        Vec::new()
    }
}

/// Downcasts `value` to `T` or declines.
///
/// Most leaf handlers start with this: anything that is not exactly `T` is
/// left for the next candidate.
pub fn expect_type<T: 'static>(value: &dyn ExtObject) -> Option<&T> {
    value.as_any().downcast_ref::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoHandler;

    impl Handler for EchoHandler {
        fn code(&self) -> u8 {
            9
        }

        fn name(&self) -> &'static str {
            "echo"
        }

        fn claimed_types(&self) -> Vec<TypeId> {
            vec![TypeId::of::<String>()]
        }

        fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
            Ok(match expect_type::<String>(value) {
                Some(s) => Encoded::Bytes(s.as_bytes().to_vec()),
                None => Encoded::Declined,
            })
        }

        fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
            Ok(Value::object(String::from_utf8_lossy(data).into_owned()))
        }
    }

    #[test]
    fn default_capabilities_are_off() {
        let handler = EchoHandler;
        assert!(!handler.has_check());
        assert!(!handler.is_fallback());
        assert!(!handler.check(&5_i32));
        assert!(handler.children().is_empty());
    }

    #[test]
    fn encode_declines_other_types() {
        let handler = EchoHandler;
        assert_eq!(handler.encode(&5_i32).unwrap(), Encoded::Declined);
        assert_eq!(
            handler.encode(&"hi".to_string()).unwrap(),
            Encoded::Bytes(b"hi".to_vec())
        );
    }

    #[test]
    fn into_bytes_drops_declined() {
        assert_eq!(Encoded::Declined.into_bytes(), None);
        assert_eq!(Encoded::Bytes(vec![1]).into_bytes(), Some(vec![1]));
    }
}
