//! Result records returned by write operations.

use serde::{Deserialize, Serialize};

use super::document::Document;

/// Result of inserting one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertOneResult {
    /// `_id` of the inserted document.
    pub inserted_id: Document,
}

/// Result of inserting a batch of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertManyResult {
    /// `_id`s of the inserted documents, in input order.
    pub inserted_ids: Vec<Document>,
}

/// Result of an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Number of documents matching the filter.
    pub matched_count: u64,
    /// Number of documents actually changed.
    pub modified_count: u64,
    /// `_id` of the upserted document, if one was inserted.
    pub upserted_id: Option<Document>,
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Number of documents removed.
    pub deleted_count: u64,
}
