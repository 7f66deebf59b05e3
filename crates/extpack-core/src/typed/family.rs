//! Family - subcode による二段目の dispatch
//!
//! family は自前の [`Registry`] を持ち、トップレベルには 1 つの [`Handler`]
//! として登録されます。トップレベルは family の内部構造を知りません。
//!
//! # ワイヤ形式
//! ```text
//! [1 byte: subcode][subcode ごとの payload]
//! ```

use std::any::TypeId;
use std::sync::Arc;

use super::handler::{Encoded, Handler};
use super::registry::Registry;
use crate::error::CodecError;
use crate::value::{ExtObject, Value};

/// A family of sub-handlers sharing one top-level code.
///
/// Build it completely before registering it: the claimed types, predicate
/// and fallback flags it reports to the top level are derived from the
/// nested registry.
pub struct Family {
    code: u8,
    name: &'static str,
    registry: Registry,
}

impl Family {
    pub fn new(code: u8, name: &'static str) -> Self {
        Self {
            code,
            name,
            registry: Registry::new(name),
        }
    }

    /// Adds a sub-handler. Its `code()` is used as the subcode byte.
    pub fn with(mut self, handler: impl Handler + 'static) -> Self {
        self.registry.register(Arc::new(handler));
        self
    }

    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        self.registry.register(handler);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Handler for Family {
    fn code(&self) -> u8 {
        self.code
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn claimed_types(&self) -> Vec<TypeId> {
        self.registry.claimed_types()
    }

    fn has_check(&self) -> bool {
        self.registry.has_checks()
    }

    fn check(&self, value: &dyn ExtObject) -> bool {
        self.registry.check(value)
    }

    fn is_fallback(&self) -> bool {
        self.registry.has_fallbacks()
    }

    fn encode(&self, value: &dyn ExtObject) -> Result<Encoded, CodecError> {
        let Some(selected) = self.registry.select(value)? else {
            return Ok(Encoded::Declined);
        };
        let mut out = Vec::with_capacity(selected.bytes.len() + 1);
        out.push(selected.code());
        out.extend_from_slice(&selected.bytes);
        tracing::trace!(
            family = self.name,
            subcode = selected.code(),
            len = out.len(),
            "encoded family payload"
        );
        Ok(Encoded::Bytes(out))
    }

    fn decode(&self, data: &[u8]) -> Result<Value, CodecError> {
        let (&subcode, rest) = data
            .split_first()
            .ok_or(CodecError::MissingSubcode(self.code))?;
        let handler = self
            .registry
            .find_decoder(subcode)
            .map_err(|_| CodecError::UnknownSubcode {
                family: self.code,
                subcode,
            })?;
        handler.decode(rest)
    }

    fn children(&self) -> Vec<&dyn Handler> {
        self.registry
            .handlers()
            .into_iter()
            .map(|h| &**h)
            .collect()
    }
}
