//! extpack-core
//!
//! MessagePack extension types with a two-level, pluggable registry.
//!
//! # モジュール構成
//! - **value**: `Value` ツリーと、登録済み型を包む `Object`
//! - **typed**: `Handler` trait, `Registry` / `TypeRegistry`, `Family`, `Codec`
//! - **extension**: 拡張パッケージ（`Extension` trait）とローダー
//! - **builder**: `CodecBuilder`, `CodecOptions`, `TabularFormat`
//! - **builtin** / **numeric** / **tabular**: 同梱の family（code 0 / 1 / 2）
//! - **observability**: レジストリの serde ビュー
//! - **error**: エラー型
//!
//! # 使用例
//! ```ignore
//! use extpack_core::{Value, decode, encode};
//! use num_complex::Complex64;
//!
//! let bytes = encode(&Value::object(Complex64::new(1.0, 2.0)))?;
//! let back = decode(&bytes)?;
//! assert_eq!(back.downcast_ref::<Complex64>(), Some(&Complex64::new(1.0, 2.0)));
//! ```

pub mod builder;
pub mod builtin;
pub mod error;
pub mod extension;
pub mod numeric;
pub mod observability;
pub mod tabular;
pub mod typed;
pub mod value;

pub use crate::builder::{CodecBuilder, CodecOptions, TabularFormat};
pub use crate::error::{
    BuildError, CodecError, DecodeError, EncodeError, ExtensionError, RegistryError,
};
pub use crate::extension::{
    Extension, LoadReport, default_codec, default_extensions, load_extensions,
};
pub use crate::observability::{HandlerView, RegistryView};
pub use crate::typed::{Codec, Encoded, Family, Handler, TypeRegistry};
pub use crate::value::{ExtObject, Object, Value};

/// Encodes with the process-wide [`default_codec`].
///
/// Fails with [`EncodeError::DefaultCodec`] when that codec could not be built.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    default_codec()
        .map_err(EncodeError::DefaultCodec)?
        .encode(value)
}

/// Decodes with the process-wide [`default_codec`].
///
/// Fails with [`DecodeError::DefaultCodec`] when that codec could not be built.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    default_codec()
        .map_err(DecodeError::DefaultCodec)?
        .decode(bytes)
}
