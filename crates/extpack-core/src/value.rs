//! Value - エンコード/デコード対象の動的な値
//!
//! # 学習ポイント
//! - `Any` + blanket impl による型消去（ExtObject）
//! - `TypeId` を実行時の型識別子として使う
//! - trait object の Clone / PartialEq を手で実装する

use std::any::{Any, TypeId};
use std::fmt;

/// ExtObject は Registry 経由でエンコードされる任意の値
///
/// `Any + Debug + Clone + PartialEq + Send + Sync` を満たす型には自動で実装されます。
///
/// # 使用例
/// ```ignore
/// let value = Value::object(Complex64::new(1.0, 0.5));
/// ```
pub trait ExtObject: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// 具象型の TypeId（Registry の完全一致検索キー）
    fn object_type(&self) -> TypeId;

    fn type_name(&self) -> &'static str;

    fn eq_object(&self, other: &dyn ExtObject) -> bool;

    fn clone_object(&self) -> Box<dyn ExtObject>;
}

impl<T> ExtObject for T
where
    T: Any + fmt::Debug + Clone + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn object_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn eq_object(&self, other: &dyn ExtObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn clone_object(&self) -> Box<dyn ExtObject> {
        Box::new(self.clone())
    }
}

/// Object は ExtObject を所有するラッパー
///
/// `Box<dyn ExtObject>` を直接渡すと Box 自体の TypeId を拾ってしまうので、
/// 必ず `get()` で中身の `&dyn ExtObject` を取り出して使います。
pub struct Object(Box<dyn ExtObject>);

impl Object {
    pub fn new<T: ExtObject>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn get(&self) -> &dyn ExtObject {
        self.0.as_ref()
    }

    pub fn object_type(&self) -> TypeId {
        self.get().object_type()
    }

    pub fn type_name(&self) -> &'static str {
        self.get().type_name()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.get().as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.get().as_any().downcast_ref::<T>()
    }
}

impl Clone for Object {
    fn clone(&self) -> Self {
        Self(self.get().clone_object())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.get().eq_object(other.get())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.get(), f)
    }
}

/// A dynamically typed value: either something MessagePack carries natively,
/// or an object that has to go through the extension registry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    /// Only used for unsigned values above `i64::MAX`.
    UInteger(u64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Object(Object),
    /// An extension payload whose family code this codec does not know.
    /// Re-encoding writes it back byte for byte.
    Unresolved { code: i8, data: Vec<u8> },
}

impl Value {
    pub fn object<T: ExtObject>(value: T) -> Self {
        Value::Object(Object::new(value))
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Downcasts an object value to `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(Object::downcast_ref::<T>)
    }

    /// Looks up a string key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, Value::String(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::UInteger(value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}
