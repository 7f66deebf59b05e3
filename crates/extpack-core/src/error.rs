use thiserror::Error;

/// Errors raised by a single handler while encoding or decoding one payload.
///
/// Declining a value is not an error; see [`crate::typed::Encoded::Declined`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown subcode {subcode} in family {family}")]
    UnknownSubcode { family: u8, subcode: u8 },

    #[error("empty payload for family {0}: missing subcode byte")]
    MissingSubcode(u8),

    #[error("malformed {what} payload: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("column '{column}' has {found} rows, expected {expected}")]
    ShapeMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("{0} is not available in this build")]
    Unsupported(&'static str),

    #[error("npy read: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("npy write: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "parquet")]
    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[cfg(feature = "parquet")]
    #[error("arrow: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

impl CodecError {
    pub fn malformed(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            what,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    /// No handler at any level accepted the object, and the envelope cannot
    /// represent it natively.
    #[error("no encoder registered for type {type_name}")]
    NoEncoder { type_name: &'static str },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("envelope write failed: {0}")]
    Envelope(String),

    #[error("default codec unavailable: {0}")]
    DefaultCodec(#[source] &'static BuildError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("envelope read failed: {0}")]
    Envelope(String),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("{0} trailing bytes after the encoded value")]
    TrailingBytes(usize),

    #[error("default codec unavailable: {0}")]
    DefaultCodec(#[source] &'static BuildError),
}

impl DecodeError {
    /// True when a known family rejected the subcode byte of a payload.
    pub fn is_unknown_subcode(&self) -> bool {
        matches!(self, DecodeError::Codec(CodecError::UnknownSubcode { .. }))
    }
}

/// RegistryError は Registry への登録時のエラー
#[derive(Debug, Error)]
pub enum RegistryError {
    /// MessagePack の application ext type は 0..=127 のみ
    #[error("family code {0} is outside the extension tag range 0..=127")]
    CodeOutOfRange(u8),

    #[error("no handler registered for code {0}")]
    UnknownCode(u8),
}

#[derive(Debug, Error)]
#[error("extension '{name}' failed to install: {source}")]
pub struct ExtensionError {
    pub name: &'static str,
    #[source]
    pub source: RegistryError,
}

/// BuildError は Codec 構築時のエラー
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Missing families: {0:?}. These family codes were expected but not registered.")]
    MissingFamilies(Vec<u8>),

    #[error("columnar tabular output requested, but the `parquet` feature is disabled")]
    ColumnarUnavailable,

    #[error(transparent)]
    Extension(#[from] ExtensionError),
}
