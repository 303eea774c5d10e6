//! Adapter. Owns the backend connection and the hook registry.

use std::sync::Arc;

use tracing::info;

use hookstore_core::config::store::StoreConfig;
use hookstore_core::error::AppError;
use hookstore_core::result::AppResult;
use hookstore_core::traits::backend::DocumentBackend;
use hookstore_hooks::HookRegistry;
use hookstore_store::BackendManager;
use hookstore_store::connection::mask_password;

use crate::query::Query;

/// Composition root: one backend connection, one hook registry, and a
/// [`Query`] per collection on request.
///
/// The registry lives as long as the adapter. Two adapters never share
/// hooks unless the caller passes the same registry to both.
#[derive(Debug)]
pub struct Adapter {
    /// Connection settings.
    config: StoreConfig,
    /// Hooks applied to every query built from this adapter.
    hooks: Arc<HookRegistry>,
    /// Open backend, if connected.
    backend: Option<BackendManager>,
}

impl Adapter {
    /// Creates an unconnected adapter with an empty hook registry.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            hooks: Arc::new(HookRegistry::new()),
            backend: None,
        }
    }

    /// Creates an adapter around an already open backend.
    pub fn with_backend(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            config: StoreConfig::default(),
            hooks: Arc::new(HookRegistry::new()),
            backend: Some(BackendManager::from_backend(backend)),
        }
    }

    /// Replaces the hook registry, e.g. to share one between adapters.
    pub fn with_hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Opens the configured backend. Reconnecting replaces the old handle.
    pub async fn connect(&mut self) -> AppResult<&mut Self> {
        info!(
            provider = %self.config.provider,
            url = %mask_password(&self.config.connection_url()),
            "Connecting adapter"
        );

        self.backend = Some(BackendManager::connect(&self.config).await?);
        Ok(self)
    }

    /// Closes the backend. Later `query` calls fail until reconnected.
    pub async fn close(&mut self) -> AppResult<()> {
        if let Some(backend) = self.backend.take() {
            backend.close().await?;
            info!("Adapter closed");
        }
        Ok(())
    }

    /// Whether a backend is currently open.
    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// The open backend handle.
    pub fn database(&self) -> AppResult<BackendManager> {
        self.backend
            .clone()
            .ok_or_else(|| AppError::service_unavailable("Adapter is not connected"))
    }

    /// Builds the query facade for `collection`.
    pub fn query(&self, collection: impl Into<String>) -> AppResult<Query> {
        Ok(Query::new(
            Arc::new(self.database()?),
            self.hooks.clone(),
            collection,
        ))
    }

    /// The hook registry consulted by every query of this adapter.
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// The connection settings.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}
