//! Backend manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use hookstore_core::config::store::StoreConfig;
use hookstore_core::error::AppError;
use hookstore_core::result::AppResult;
use hookstore_core::traits::backend::DocumentBackend;
use hookstore_core::types::document::Document;
use hookstore_core::types::options::{FindOptions, UpdateOptions};
use hookstore_core::types::results::{
    DeleteResult, InsertManyResult, InsertOneResult, UpdateResult,
};

use crate::connection::mask_password;

/// Wraps the backend selected by configuration.
#[derive(Debug, Clone)]
pub struct BackendManager {
    /// The inner backend.
    inner: Arc<dyn DocumentBackend>,
}

impl BackendManager {
    /// Open a backend for the configured provider.
    pub async fn connect(config: &StoreConfig) -> AppResult<Self> {
        let url = config.connection_url();
        let inner: Arc<dyn DocumentBackend> = match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!(url = %mask_password(&url), "Initializing in-memory document backend");
                Arc::new(crate::memory::MemoryBackend::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a manager around an already open backend.
    pub fn from_backend(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { inner: backend }
    }
}

#[async_trait]
impl DocumentBackend for BackendManager {
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> AppResult<InsertOneResult> {
        self.inner.insert_one(collection, document).await
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> AppResult<InsertManyResult> {
        self.inner.insert_many(collection, documents).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Vec<Document>> {
        self.inner.find(collection, filter, options).await
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Option<Document>> {
        self.inner.find_one(collection, filter, options).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult> {
        self.inner.update_one(collection, filter, update, options).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult> {
        self.inner.update_many(collection, filter, update, options).await
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<DeleteResult> {
        self.inner.delete_one(collection, filter).await
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> AppResult<DeleteResult> {
        self.inner.delete_many(collection, filter).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn close(&self) -> AppResult<()> {
        self.inner.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookstore_core::error::ErrorKind;
    use serde_json::json;

    use crate::memory::MemoryBackend;

    #[tokio::test]
    async fn test_connect_memory() {
        let manager = BackendManager::connect(&StoreConfig::default()).await.unwrap();
        assert!(manager.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_connect_unknown_provider() {
        let config = StoreConfig {
            provider: "cassandra".to_string(),
            ..StoreConfig::default()
        };
        let err = BackendManager::connect(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_from_backend_delegates_to_inner() {
        let memory = MemoryBackend::new();
        let manager = BackendManager::from_backend(Arc::new(memory.clone()));

        manager.insert_one("items", json!({ "k": 1 })).await.unwrap();
        assert_eq!(memory.count("items"), 1);

        manager.close().await.unwrap();
        assert!(!memory.health_check().await.unwrap());
    }
}
