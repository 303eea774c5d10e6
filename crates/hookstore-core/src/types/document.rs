//! Document representation.

/// A schemaless document, query filter, or operation result.
///
/// Every value that flows through a hook pipeline is a `Document`.
pub type Document = serde_json::Value;

/// Input to a routed insert: one document or a batch.
///
/// The variant decides which backend primitive an insert uses; the routing
/// happens before any hook runs.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertInput {
    /// A batch of documents, inserted with `insert_many`.
    Many(Vec<Document>),
    /// A single document, inserted with `insert_one`.
    One(Document),
}

impl From<Document> for InsertInput {
    fn from(value: Document) -> Self {
        match value {
            serde_json::Value::Array(docs) => Self::Many(docs),
            other => Self::One(other),
        }
    }
}

impl From<Vec<Document>> for InsertInput {
    fn from(docs: Vec<Document>) -> Self {
        Self::Many(docs)
    }
}
