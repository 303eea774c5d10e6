//! In-memory document store using dashmap.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use hookstore_core::error::AppError;
use hookstore_core::result::AppResult;
use hookstore_core::traits::backend::DocumentBackend;
use hookstore_core::types::document::Document;
use hookstore_core::types::options::{FindOptions, SortOrder, UpdateOptions};
use hookstore_core::types::results::{
    DeleteResult, InsertManyResult, InsertOneResult, UpdateResult,
};

use super::matcher::{Filter, Update, compare, field};

/// In-memory document backend.
///
/// Collections are created on first insert. Documents keep insertion order,
/// which is also the natural order of unsorted finds.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    /// Collection name → documents.
    collections: Arc<DashMap<String, Vec<Document>>>,
    /// Set once `close` has been called.
    closed: Arc<AtomicBool>,
}

impl MemoryBackend {
    /// Create an empty, open backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::service_unavailable("Backend connection is closed"));
        }
        Ok(())
    }

    /// Validates a document and assigns an `_id` when it has none.
    fn prepare(mut document: Document) -> AppResult<(Document, Document)> {
        let Value::Object(map) = &mut document else {
            return Err(AppError::validation("Only objects can be inserted"));
        };

        let id = map
            .entry("_id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()))
            .clone();

        Ok((document, id))
    }

    /// Fails when `id` is already taken in `docs`.
    fn ensure_unique(docs: &[Document], id: &Value) -> AppResult<()> {
        if docs.iter().any(|d| d.get("_id") == Some(id)) {
            return Err(AppError::backend(format!("Duplicate _id {id}")));
        }
        Ok(())
    }

    fn select(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Vec<Document> {
        let mut matched: Vec<Document> = self
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default();

        if let Some((sort_field, order)) = &options.sort {
            matched.sort_by(|a, b| {
                let ordering = compare(field(a, sort_field), field(b, sort_field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        matched
            .into_iter()
            .skip(options.skip.unwrap_or(0))
            .take(options.limit.filter(|&n| n > 0).unwrap_or(usize::MAX))
            .collect()
    }

    fn update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
        multi: bool,
    ) -> AppResult<UpdateResult> {
        self.ensure_open()?;
        let filter = Filter::parse(&filter)?;
        let update = Update::parse(&update)?;

        let mut docs = self.collections.entry(collection.to_string()).or_default();
        let mut matched_count = 0;
        let mut modified_count = 0;

        for doc in docs.iter_mut().filter(|d| filter.matches(d)) {
            matched_count += 1;
            if update.apply(doc) {
                modified_count += 1;
            }
            if !multi {
                break;
            }
        }

        let mut upserted_id = None;
        if matched_count == 0 && options.upsert {
            let mut seed = Value::Object(filter.to_seed());
            update.apply(&mut seed);
            let (document, id) = Self::prepare(seed)?;
            Self::ensure_unique(&docs, &id)?;
            docs.push(document);
            upserted_id = Some(id);
        }

        debug!(
            collection = %collection,
            matched = matched_count,
            modified = modified_count,
            upserted = upserted_id.is_some(),
            "Documents updated"
        );

        Ok(UpdateResult {
            matched_count,
            modified_count,
            upserted_id,
        })
    }

    fn delete(&self, collection: &str, filter: Document, multi: bool) -> AppResult<DeleteResult> {
        self.ensure_open()?;
        let filter = Filter::parse(&filter)?;

        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(DeleteResult { deleted_count: 0 });
        };

        let before = docs.len();
        if multi {
            docs.retain(|d| !filter.matches(d));
        } else if let Some(index) = docs.iter().position(|d| filter.matches(d)) {
            docs.remove(index);
        }
        let deleted_count = (before - docs.len()) as u64;

        debug!(collection = %collection, deleted = deleted_count, "Documents deleted");
        Ok(DeleteResult { deleted_count })
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> AppResult<InsertOneResult> {
        self.ensure_open()?;
        let (document, inserted_id) = Self::prepare(document)?;

        let mut docs = self.collections.entry(collection.to_string()).or_default();
        Self::ensure_unique(&docs, &inserted_id)?;
        docs.push(document);

        debug!(collection = %collection, id = %inserted_id, "Document inserted");
        Ok(InsertOneResult { inserted_id })
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> AppResult<InsertManyResult> {
        self.ensure_open()?;

        // Validate the whole batch before storing anything.
        let prepared = documents
            .into_iter()
            .map(Self::prepare)
            .collect::<AppResult<Vec<_>>>()?;
        let (batch, inserted_ids): (Vec<_>, Vec<_>) = prepared.into_iter().unzip();

        let mut docs = self.collections.entry(collection.to_string()).or_default();
        for (index, id) in inserted_ids.iter().enumerate() {
            Self::ensure_unique(&batch[..index], id)?;
            Self::ensure_unique(&docs, id)?;
        }
        docs.extend(batch);

        debug!(collection = %collection, count = inserted_ids.len(), "Documents inserted");
        Ok(InsertManyResult { inserted_ids })
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Vec<Document>> {
        self.ensure_open()?;
        let filter = Filter::parse(&filter)?;
        Ok(self.select(collection, &filter, options))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: Document,
        options: &FindOptions,
    ) -> AppResult<Option<Document>> {
        self.ensure_open()?;
        let filter = Filter::parse(&filter)?;
        let options = FindOptions {
            limit: Some(1),
            ..options.clone()
        };
        Ok(self.select(collection, &filter, &options).into_iter().next())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult> {
        self.update(collection, filter, update, options, false)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: &UpdateOptions,
    ) -> AppResult<UpdateResult> {
        self.update(collection, filter, update, options, true)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<DeleteResult> {
        self.delete(collection, filter, false)
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> AppResult<DeleteResult> {
        self.delete(collection, filter, true)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.closed.load(Ordering::SeqCst))
    }

    async fn close(&self) -> AppResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        debug!("In-memory backend closed");
        Ok(())
    }
}
