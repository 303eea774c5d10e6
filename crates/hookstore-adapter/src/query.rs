//! Query facade. One deferred, hook-wrapped handle per backend primitive.
//!
//! Every method composes the hooks of its operation kind around a call to
//! the matching backend primitive and returns a [`Deferred`] holding the
//! method's input. Nothing touches the backend until the handle is run.
//!
//! The value each handle captures, and therefore what before-hooks see:
//!
//! | Method | Captured value |
//! |---|---|
//! | `insert_one` | the document |
//! | `insert_many` | an array of documents |
//! | `find`, `find_one`, `delete_one`, `delete_many` | the filter |
//! | `update_one`, `update_many` | `{"filter": .., "update": ..}` |
//!
//! After-hooks see the backend result converted to a document: the found
//! document(s) for finds (`null` when `find_one` matches nothing) and the
//! serialized result record for writes.

use std::sync::Arc;

use serde_json::{Value, json};

use hookstore_core::error::AppError;
use hookstore_core::result::AppResult;
use hookstore_core::traits::backend::DocumentBackend;
use hookstore_core::types::document::{Document, InsertInput};
use hookstore_core::types::options::{FindOptions, UpdateOptions};
use hookstore_hooks::{Deferred, HookRegistry, OperationKind, PipelineComposer};

/// Operations on one collection.
#[derive(Debug, Clone)]
pub struct Query {
    backend: Arc<dyn DocumentBackend>,
    composer: PipelineComposer,
    collection: Arc<str>,
}

impl Query {
    /// Binds `collection` on `backend`, composing hooks from `registry`.
    pub fn new(
        backend: Arc<dyn DocumentBackend>,
        registry: Arc<HookRegistry>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            composer: PipelineComposer::new(registry),
            collection: Arc::from(collection.into()),
        }
    }

    /// The bound collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Inserts one document or a batch, depending on the input variant.
    pub fn insert(&self, input: impl Into<InsertInput>) -> Deferred {
        match input.into() {
            InsertInput::One(document) => self.insert_one(document),
            InsertInput::Many(documents) => self.insert_many(documents),
        }
    }

    /// Inserts a single document.
    pub fn insert_one(&self, document: Document) -> Deferred {
        let (backend, collection) = self.bind();
        let pipeline = self.composer.compose(OperationKind::Insert, move |document| {
            insert_one(backend.clone(), collection.clone(), document)
        });
        Deferred::new(pipeline, document)
    }

    /// Inserts a batch of documents.
    pub fn insert_many(&self, documents: Vec<Document>) -> Deferred {
        let (backend, collection) = self.bind();
        let pipeline = self.composer.compose(OperationKind::Insert, move |documents| {
            insert_many(backend.clone(), collection.clone(), documents)
        });
        Deferred::new(pipeline, Value::Array(documents))
    }

    /// Finds every document matching `filter`.
    pub fn find(&self, filter: Document, options: FindOptions) -> Deferred {
        let (backend, collection) = self.bind();
        let pipeline = self.composer.compose(OperationKind::Find, move |filter| {
            find(backend.clone(), collection.clone(), filter, options.clone())
        });
        Deferred::new(pipeline, filter)
    }

    /// Finds the first document matching `filter`.
    pub fn find_one(&self, filter: Document, options: FindOptions) -> Deferred {
        let (backend, collection) = self.bind();
        let pipeline = self.composer.compose(OperationKind::Find, move |filter| {
            find_one(backend.clone(), collection.clone(), filter, options.clone())
        });
        Deferred::new(pipeline, filter)
    }

    /// Updates the first document matching `filter`.
    pub fn update_one(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Deferred {
        self.update(filter, update, options, false)
    }

    /// Updates every document matching `filter`.
    pub fn update_many(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Deferred {
        self.update(filter, update, options, true)
    }

    /// Deletes the first document matching `filter`.
    pub fn delete_one(&self, filter: Document) -> Deferred {
        self.delete(filter, false)
    }

    /// Deletes every document matching `filter`.
    pub fn delete_many(&self, filter: Document) -> Deferred {
        self.delete(filter, true)
    }

    fn update(
        &self,
        filter: Document,
        update: Document,
        options: UpdateOptions,
        multi: bool,
    ) -> Deferred {
        let (backend, collection) = self.bind();
        let pipeline = self.composer.compose(OperationKind::Update, move |envelope| {
            apply_update(backend.clone(), collection.clone(), envelope, options, multi)
        });
        Deferred::new(pipeline, json!({ "filter": filter, "update": update }))
    }

    fn delete(&self, filter: Document, multi: bool) -> Deferred {
        let (backend, collection) = self.bind();
        let pipeline = self.composer.compose(OperationKind::Delete, move |filter| {
            delete(backend.clone(), collection.clone(), filter, multi)
        });
        Deferred::new(pipeline, filter)
    }

    fn bind(&self) -> (Arc<dyn DocumentBackend>, Arc<str>) {
        (self.backend.clone(), self.collection.clone())
    }
}

async fn insert_one(
    backend: Arc<dyn DocumentBackend>,
    collection: Arc<str>,
    document: Document,
) -> AppResult<Document> {
    let result = backend.insert_one(&collection, document).await?;
    Ok(serde_json::to_value(result)?)
}

async fn insert_many(
    backend: Arc<dyn DocumentBackend>,
    collection: Arc<str>,
    documents: Document,
) -> AppResult<Document> {
    let Value::Array(documents) = documents else {
        return Err(AppError::validation(
            "insert_many expects an array of documents after before-hooks",
        ));
    };
    let result = backend.insert_many(&collection, documents).await?;
    Ok(serde_json::to_value(result)?)
}

async fn find(
    backend: Arc<dyn DocumentBackend>,
    collection: Arc<str>,
    filter: Document,
    options: FindOptions,
) -> AppResult<Document> {
    let documents = backend.find(&collection, filter, &options).await?;
    Ok(Value::Array(documents))
}

async fn find_one(
    backend: Arc<dyn DocumentBackend>,
    collection: Arc<str>,
    filter: Document,
    options: FindOptions,
) -> AppResult<Document> {
    let document = backend.find_one(&collection, filter, &options).await?;
    Ok(document.unwrap_or(Value::Null))
}

async fn apply_update(
    backend: Arc<dyn DocumentBackend>,
    collection: Arc<str>,
    envelope: Document,
    options: UpdateOptions,
    multi: bool,
) -> AppResult<Document> {
    let (filter, update) = split_update(envelope)?;
    let result = if multi {
        backend.update_many(&collection, filter, update, &options).await?
    } else {
        backend.update_one(&collection, filter, update, &options).await?
    };
    Ok(serde_json::to_value(result)?)
}

async fn delete(
    backend: Arc<dyn DocumentBackend>,
    collection: Arc<str>,
    filter: Document,
    multi: bool,
) -> AppResult<Document> {
    let result = if multi {
        backend.delete_many(&collection, filter).await?
    } else {
        backend.delete_one(&collection, filter).await?
    };
    Ok(serde_json::to_value(result)?)
}

/// Splits an update envelope back into its filter and update parts.
fn split_update(value: Document) -> AppResult<(Document, Document)> {
    let Value::Object(mut envelope) = value else {
        return Err(AppError::validation(
            "Update input must be an object with 'filter' and 'update' fields",
        ));
    };

    let filter = envelope.remove("filter").unwrap_or(Value::Null);
    let update = envelope
        .remove("update")
        .ok_or_else(|| AppError::validation("Update input is missing the 'update' field"))?;

    Ok((filter, update))
}
