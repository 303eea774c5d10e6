//! Document-store backend trait.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::document::Document;
use crate::types::options::{FindOptions, UpdateOptions};
use crate::types::results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult};

/// Raw CRUD primitives of a document store.
///
/// The query facade wraps each of these in a hook pipeline; implementations
/// only see the documents produced by the before-phase and never run hooks
/// themselves. Every method is scoped to a named collection.
#[async_trait]
pub trait DocumentBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a single document.
    async fn insert_one(&self, collection: &str, document: Document)
    -> AppResult<InsertOneResult>;

    /// Insert a batch of documents.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> AppResult<InsertManyResult>;

    /// Return every document matching `filter`.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Vec<Document>>;

    /// Return the first document matching `filter`, if any.
    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Option<Document>>;

    /// Update the first document matching `filter`.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult>;

    /// Update every document matching `filter`.
    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult>;

    /// Delete the first document matching `filter`.
    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<DeleteResult>;

    /// Delete every document matching `filter`.
    async fn delete_many(&self, collection: &str, filter: Document) -> AppResult<DeleteResult>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Release the connection. Later calls fail with `ServiceUnavailable`.
    async fn close(&self) -> AppResult<()>;
}
