//! Hook executor. Folds a document through one phase's interceptors.
//!
//! - Interceptors run strictly left to right, each receiving the output of
//!   its predecessor.
//! - An empty chain returns the input untouched without entering the fold.
//! - The first failing interceptor aborts the fold; its error is returned
//!   as-is and no later interceptor runs.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use hookstore_core::result::AppResult;
use hookstore_core::types::document::Document;

use super::definitions::{HookKey, Interceptor, OperationKind, Phase};
use super::registry::HookRegistry;

/// An immutable snapshot of one (kind, phase) chain.
#[derive(Clone)]
pub struct HookChain {
    key: HookKey,
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl HookChain {
    /// Creates a snapshot from the given interceptors.
    pub fn new(key: HookKey, interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            key,
            interceptors: interceptors.into(),
        }
    }

    /// Creates an empty chain.
    pub fn empty(key: HookKey) -> Self {
        Self::new(key, Vec::new())
    }

    /// The key this chain was captured from.
    pub fn key(&self) -> HookKey {
        self.key
    }

    /// Number of interceptors in the chain.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the chain has no interceptors.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Folds `value` through the chain.
    pub fn run(&self, value: Document) -> AppResult<Document> {
        if self.interceptors.is_empty() {
            return Ok(value);
        }

        let mut current = value;
        for (index, interceptor) in self.interceptors.iter().enumerate() {
            current = interceptor.intercept(current).inspect_err(|e| {
                debug!(
                    kind = %self.key.kind,
                    phase = %self.key.phase,
                    index = index,
                    error = %e,
                    "Interceptor failed, aborting phase"
                );
            })?;
        }

        Ok(current)
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("key", &self.key)
            .field("len", &self.interceptors.len())
            .finish()
    }
}

/// Runs phases directly against a registry's current state.
#[derive(Debug, Clone)]
pub struct HookExecutor {
    registry: Arc<HookRegistry>,
}

impl HookExecutor {
    /// Creates an executor reading from `registry`.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Folds `value` through the chain registered for `kind`/`phase`.
    pub fn run_phase(
        &self,
        kind: OperationKind,
        phase: Phase,
        value: Document,
    ) -> AppResult<Document> {
        self.registry.lookup(kind, phase).run(value)
    }
}
