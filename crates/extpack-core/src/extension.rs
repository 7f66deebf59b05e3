//! Extension packages and the one-time loader.
//!
//! An extension installs one family into a [`TypeRegistry`]. The set of
//! active extensions is an explicit list handed to the loader at startup.

use std::sync::OnceLock;

use crate::builder::{CodecBuilder, CodecOptions};
use crate::builtin::BuiltinExtension;
use crate::error::{BuildError, ExtensionError, RegistryError};
use crate::numeric::NumericExtension;
use crate::tabular::TabularExtension;
use crate::typed::{Codec, TypeRegistry};

pub trait Extension: Send + Sync {
    fn name(&self) -> &'static str;

    fn install(
        &self,
        registry: &mut TypeRegistry,
        options: &CodecOptions,
    ) -> Result<(), RegistryError>;
}

/// Outcome of [`load_extensions`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<&'static str>,
    pub failed: Vec<ExtensionError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Installs each extension in order.
///
/// A failing extension is logged and recorded while the rest keep loading,
/// unless `options.strict_extensions` is set, in which case the first
/// failure is returned. Loading the same extension twice re-registers its
/// codes, which the registry treats as a warning.
pub fn load_extensions(
    registry: &mut TypeRegistry,
    extensions: &[Box<dyn Extension>],
    options: &CodecOptions,
) -> Result<LoadReport, ExtensionError> {
    let mut report = LoadReport::default();
    for extension in extensions {
        let name = extension.name();
        match extension.install(registry, options) {
            Ok(()) => {
                tracing::debug!(extension = name, "extension installed");
                report.loaded.push(name);
            }
            Err(source) => {
                let err = ExtensionError { name, source };
                if options.strict_extensions {
                    tracing::error!(%err, "extension failed; aborting load");
                    return Err(err);
                }
                tracing::warn!(%err, "extension failed; continuing without it");
                report.failed.push(err);
            }
        }
    }
    Ok(report)
}

/// Every extension shipped with this crate.
pub fn default_extensions() -> Vec<Box<dyn Extension>> {
    vec![
        Box::new(BuiltinExtension),
        Box::new(NumericExtension),
        Box::new(TabularExtension),
    ]
}

static DEFAULT_CODEC: OnceLock<Result<Codec, BuildError>> = OnceLock::new();

/// The process-wide codec with [`default_extensions`], built on first use.
///
/// A failed build is kept and returned on every call.
pub fn default_codec() -> Result<&'static Codec, &'static BuildError> {
    DEFAULT_CODEC
        .get_or_init(|| build_default(CodecBuilder::new().extensions(default_extensions())))
        .as_ref()
}

fn build_default(builder: CodecBuilder) -> Result<Codec, BuildError> {
    builder.build().inspect_err(|err| {
        tracing::error!(%err, "default codec failed to build");
    })
}
