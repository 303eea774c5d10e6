//! Hook registry. Ordered interceptor chains keyed by (operation kind, phase).

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use hookstore_core::result::AppResult;
use hookstore_core::types::document::Document;

use super::definitions::{HookKey, Interceptor, OperationKind, Phase};
use super::executor::HookChain;

/// Registry of interceptors organized by hook key.
///
/// Every key is initialised to an empty chain on construction, so lookups
/// never report a missing chain. Mutations are synchronous and visible to
/// the next lookup; lookups hand out copies, so chains already captured by
/// a composed pipeline never change underneath it.
pub struct HookRegistry {
    /// Hook key → interceptors in registration order.
    chains: DashMap<HookKey, Vec<Arc<dyn Interceptor>>>,
}

impl HookRegistry {
    /// Creates a registry with an empty chain for every key.
    pub fn new() -> Self {
        let chains = DashMap::new();
        for key in HookKey::all() {
            chains.insert(key, Vec::new());
        }
        Self { chains }
    }

    /// Appends an interceptor to the chain for `key`.
    pub fn register<F>(&self, key: HookKey, interceptor: F) -> &Self
    where
        F: Fn(Document) -> AppResult<Document> + Send + Sync + 'static,
    {
        self.register_shared(key, Arc::new(interceptor))
    }

    /// Appends a trait-object interceptor to the chain for `key`.
    pub fn register_shared(&self, key: HookKey, interceptor: Arc<dyn Interceptor>) -> &Self {
        let position = {
            let mut chain = self.chains.entry(key).or_default();
            chain.push(interceptor);
            chain.len()
        };

        info!(
            kind = %key.kind,
            phase = %key.phase,
            position = position,
            "Hook registered"
        );
        self
    }

    /// Appends a before-phase interceptor for `kind`.
    pub fn register_before<F>(&self, kind: OperationKind, interceptor: F) -> &Self
    where
        F: Fn(Document) -> AppResult<Document> + Send + Sync + 'static,
    {
        self.register(HookKey::before(kind), interceptor)
    }

    /// Appends an after-phase interceptor for `kind`.
    pub fn register_after<F>(&self, kind: OperationKind, interceptor: F) -> &Self
    where
        F: Fn(Document) -> AppResult<Document> + Send + Sync + 'static,
    {
        self.register(HookKey::after(kind), interceptor)
    }

    /// Appends an interceptor by hook name, e.g. `"before_insert"`.
    ///
    /// Fails with `UnknownOperationKind` when the name does not resolve to a
    /// known (phase, kind) pair.
    pub fn register_named<F>(&self, name: &str, interceptor: F) -> AppResult<&Self>
    where
        F: Fn(Document) -> AppResult<Document> + Send + Sync + 'static,
    {
        let key: HookKey = name.parse()?;
        Ok(self.register(key, interceptor))
    }

    /// Empties both phases for `kind`. Other kinds are untouched.
    pub fn clear_hooks(&self, kind: OperationKind) {
        for phase in Phase::ALL {
            if let Some(mut chain) = self.chains.get_mut(&HookKey::new(kind, phase)) {
                chain.clear();
            }
        }

        info!(kind = %kind, "Hooks cleared");
    }

    /// Empties every chain.
    pub fn clear_all(&self) {
        for mut chain in self.chains.iter_mut() {
            chain.value_mut().clear();
        }

        info!("All hooks cleared");
    }

    /// Returns a snapshot of the chain for `kind`/`phase`.
    pub fn lookup(&self, kind: OperationKind, phase: Phase) -> HookChain {
        self.lookup_key(HookKey::new(kind, phase))
    }

    /// Returns a snapshot of the chain for `key`.
    pub fn lookup_key(&self, key: HookKey) -> HookChain {
        self.chains
            .get(&key)
            .map(|chain| HookChain::new(key, chain.value().clone()))
            .unwrap_or_else(|| HookChain::empty(key))
    }

    /// Returns the number of interceptors registered for `kind`/`phase`.
    pub fn handler_count(&self, kind: OperationKind, phase: Phase) -> usize {
        self.chains
            .get(&HookKey::new(kind, phase))
            .map(|chain| chain.len())
            .unwrap_or(0)
    }

    /// Returns whether any interceptor is registered for `kind`/`phase`.
    pub fn has_hooks(&self, kind: OperationKind, phase: Phase) -> bool {
        self.handler_count(kind, phase) > 0
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in HookKey::all() {
            map.entry(&key.to_string(), &self.handler_count(key.kind, key.phase));
        }
        map.finish()
    }
}
