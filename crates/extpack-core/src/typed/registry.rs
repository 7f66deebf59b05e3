//! Registry - Handler の登録と選択
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - `TypeId` による完全一致 → predicate → fallback の段階的な検索
//! - Arc による共有所有権
//!
//! 同じアルゴリズムをトップレベル（family code）と各 family 内（subcode）の
//! 両方で使います。

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{Encoded, Handler};
use crate::error::{CodecError, RegistryError};
use crate::value::ExtObject;

/// The handler picked for a value, with the bytes it already produced.
pub struct Selected {
    pub handler: Arc<dyn Handler>,
    pub bytes: Vec<u8>,
}

impl Selected {
    pub fn code(&self) -> u8 {
        self.handler.code()
    }
}

/// Registry は 1 レベル分の handler テーブル
///
/// # 使用例
/// ```ignore
/// let mut registry = Registry::new("builtin");
/// registry.register(Arc::new(ComplexHandler));
///
/// let selected = registry.select(value)?;
/// let handler = registry.find_decoder(0)?;
/// ```
///
/// # 重複登録
/// 同じ code の再登録は warn ログを出し、新しい方が勝ちます（エラーにはしない）。
/// 古い handler は type / predicate / fallback の各テーブルからも外します。
pub struct Registry {
    level: &'static str,
    by_code: HashMap<u8, Arc<dyn Handler>>,
    by_type: HashMap<TypeId, Arc<dyn Handler>>,
    checks: Vec<Arc<dyn Handler>>,
    fallbacks: Vec<Arc<dyn Handler>>,
}

impl Registry {
    pub fn new(level: &'static str) -> Self {
        Self {
            level,
            by_code: HashMap::new(),
            by_type: HashMap::new(),
            checks: Vec::new(),
            fallbacks: Vec::new(),
        }
    }

    pub fn level(&self) -> &'static str {
        self.level
    }

    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        let code = handler.code();
        if let Some(previous) = self.by_code.insert(code, handler.clone()) {
            tracing::warn!(
                registry = self.level,
                code,
                previous = previous.name(),
                replacement = handler.name(),
                "duplicate handler code; newest registration wins"
            );
            self.forget(&previous);
        }

        for type_id in handler.claimed_types() {
            if let Some(previous) = self.by_type.insert(type_id, handler.clone()) {
                tracing::warn!(
                    registry = self.level,
                    previous = previous.name(),
                    replacement = handler.name(),
                    "type already claimed; newest registration wins"
                );
            }
        }
        if handler.has_check() {
            self.checks.push(handler.clone());
        }
        if handler.is_fallback() {
            self.fallbacks.push(handler.clone());
        }

        tracing::debug!(
            registry = self.level,
            code,
            handler = handler.name(),
            "registered handler"
        );
    }

    fn forget(&mut self, stale: &Arc<dyn Handler>) {
        self.by_type.retain(|_, h| !Arc::ptr_eq(h, stale));
        self.checks.retain(|h| !Arc::ptr_eq(h, stale));
        self.fallbacks.retain(|h| !Arc::ptr_eq(h, stale));
    }

    /// Picks a handler for `value` and encodes it.
    ///
    /// Exact type first, then predicates in registration order, then
    /// fallbacks. A handler that declines hands the value on to the next
    /// candidate. Each handler is tried at most once.
    pub fn select(&self, value: &dyn ExtObject) -> Result<Option<Selected>, CodecError> {
        let exact = self.by_type.get(&value.object_type());
        let predicates = self.checks.iter().filter(|h| h.check(value));
        let candidates = exact.into_iter().chain(predicates).chain(&self.fallbacks);

        let mut tried: Vec<&Arc<dyn Handler>> = Vec::new();
        for handler in candidates {
            if tried.iter().any(|t| Arc::ptr_eq(t, handler)) {
                continue;
            }
            tried.push(handler);
            if let Some(selected) = Self::attempt(handler, value)? {
                return Ok(Some(selected));
            }
        }
        Ok(None)
    }

    fn attempt(
        handler: &Arc<dyn Handler>,
        value: &dyn ExtObject,
    ) -> Result<Option<Selected>, CodecError> {
        Ok(handler.encode(value)?.into_bytes().map(|bytes| Selected {
            handler: handler.clone(),
            bytes,
        }))
    }

    /// The handler that would encode `value`, if any.
    pub fn find_encoder(
        &self,
        value: &dyn ExtObject,
    ) -> Result<Option<Arc<dyn Handler>>, CodecError> {
        Ok(self.select(value)?.map(|selected| selected.handler))
    }

    pub fn find_decoder(&self, code: u8) -> Result<&Arc<dyn Handler>, RegistryError> {
        self.by_code.get(&code).ok_or(RegistryError::UnknownCode(code))
    }

    pub fn claimed_types(&self) -> Vec<TypeId> {
        self.by_type.keys().copied().collect()
    }

    pub fn has_checks(&self) -> bool {
        !self.checks.is_empty()
    }

    pub fn has_fallbacks(&self) -> bool {
        !self.fallbacks.is_empty()
    }

    /// Any predicate handler accepts `value`.
    pub fn check(&self, value: &dyn ExtObject) -> bool {
        self.checks.iter().any(|h| h.check(value))
    }

    /// Handlers ordered by code.
    pub fn handlers(&self) -> Vec<&Arc<dyn Handler>> {
        let mut handlers: Vec<_> = self.by_code.values().collect();
        handlers.sort_by_key(|h| h.code());
        handlers
    }

    pub fn codes(&self) -> Vec<u8> {
        self.handlers().iter().map(|h| h.code()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// The highest code usable as a MessagePack application extension tag.
pub const MAX_FAMILY_CODE: u8 = 127;

/// TypeRegistry はトップレベル（family code）の Registry
///
/// family code は MessagePack の ext type タグになるので 0..=127 に制限します。
pub struct TypeRegistry {
    inner: Registry,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            inner: Registry::new("top"),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn Handler>) -> Result<(), RegistryError> {
        let code = handler.code();
        if code > MAX_FAMILY_CODE {
            return Err(RegistryError::CodeOutOfRange(code));
        }
        self.inner.register(handler);
        Ok(())
    }

    pub fn select(&self, value: &dyn ExtObject) -> Result<Option<Selected>, CodecError> {
        self.inner.select(value)
    }

    pub fn find_encoder(
        &self,
        value: &dyn ExtObject,
    ) -> Result<Option<Arc<dyn Handler>>, CodecError> {
        self.inner.find_encoder(value)
    }

    pub fn find_decoder(&self, code: u8) -> Result<&Arc<dyn Handler>, RegistryError> {
        self.inner.find_decoder(code)
    }

    pub fn families(&self) -> Vec<&Arc<dyn Handler>> {
        self.inner.handlers()
    }

    pub fn codes(&self) -> Vec<u8> {
        self.inner.codes()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
