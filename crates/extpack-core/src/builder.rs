//! CodecBuilder - Codec の構築と設定
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 能力（capability）を起動時に一度だけ決める

use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::extension::{Extension, load_extensions};
use crate::typed::{Codec, TypeRegistry};

/// How frames and series are serialised.
///
/// Decided once at startup. `Columnar` needs the `parquet` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    /// Parquet bytes.
    Columnar,
    /// JSON rows.
    Text,
}

impl TabularFormat {
    /// Columnar when this build can write parquet, text otherwise.
    pub fn detect() -> Self {
        if Self::Columnar.is_available() {
            Self::Columnar
        } else {
            Self::Text
        }
    }

    pub fn is_available(self) -> bool {
        match self {
            Self::Columnar => cfg!(feature = "parquet"),
            Self::Text => true,
        }
    }

    /// The flag byte written in front of tabular payloads.
    pub fn flag(self) -> u8 {
        match self {
            Self::Columnar => 0,
            Self::Text => 1,
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::Columnar),
            1 => Some(Self::Text),
            _ => None,
        }
    }
}

impl Default for TabularFormat {
    fn default() -> Self {
        Self::detect()
    }
}

/// Codec options.
///
/// Every field has a default, so a partial JSON document is enough:
/// ```ignore
/// let options: CodecOptions = serde_json::from_str(r#"{"tabular_format": "text"}"#)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    pub tabular_format: TabularFormat,

    /// Abort the whole load when one extension fails to install, instead
    /// of logging it and carrying on with the rest.
    pub strict_extensions: bool,
}

/// CodecBuilder は Codec を構築
///
/// # 使用例
/// ```ignore
/// let codec = CodecBuilder::new()
///     .extensions(default_extensions())
///     .expect_families(&[0, 1, 2])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_families() で期待される family code を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
pub struct CodecBuilder {
    options: CodecOptions,
    extensions: Vec<Box<dyn Extension>>,
    expected_families: Option<Vec<u8>>,
}

impl CodecBuilder {
    pub fn new() -> Self {
        Self {
            options: CodecOptions::default(),
            extensions: Vec::new(),
            expected_families: None,
        }
    }

    pub fn options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tabular_format(mut self, format: TabularFormat) -> Self {
        self.options.tabular_format = format;
        self
    }

    pub fn strict_extensions(mut self, strict: bool) -> Self {
        self.options.strict_extensions = strict;
        self
    }

    /// Extension を 1 つ追加（登録は build() 時、追加順）
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn extensions(mut self, extensions: Vec<Box<dyn Extension>>) -> Self {
        self.extensions.extend(extensions);
        self
    }

    /// 期待される family code のリストを設定
    pub fn expect_families(mut self, codes: &[u8]) -> Self {
        self.expected_families = Some(codes.to_vec());
        self
    }

    /// CodecBuilder を構築して Codec を生成
    ///
    /// # 検証
    /// - columnar 形式が要求されたのに parquet が使えない場合は ColumnarUnavailable
    /// - expect_families() の family code が全て登録されているかチェック
    pub fn build(self) -> Result<Codec, BuildError> {
        if !self.options.tabular_format.is_available() {
            return Err(BuildError::ColumnarUnavailable);
        }

        let mut registry = TypeRegistry::new();
        let report = load_extensions(&mut registry, &self.extensions, &self.options)?;
        tracing::debug!(
            loaded = ?report.loaded,
            failed = report.failed.len(),
            families = ?registry.codes(),
            "codec registry ready"
        );

        if let Some(expected) = &self.expected_families {
            let registered = registry.codes();
            let missing: Vec<u8> = expected
                .iter()
                .filter(|code| !registered.contains(code))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingFamilies(missing));
            }
        }

        Ok(Codec::new(registry))
    }
}

impl Default for CodecBuilder {
    fn default() -> Self {
        Self::new()
    }
}
