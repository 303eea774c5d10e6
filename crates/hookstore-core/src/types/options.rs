//! Backend options passed through the query facade.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

/// Options for `find` / `find_one`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    /// Maximum number of documents to return. `0` means no limit.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Number of matching documents to skip.
    #[serde(default)]
    pub skip: Option<usize>,
    /// Field and direction to order by.
    #[serde(default)]
    pub sort: Option<(String, SortOrder)>,
}

impl FindOptions {
    /// Sets the limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the skip count.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the sort field and order.
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }
}

/// Options for `update_one` / `update_many`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Insert a new document when nothing matches the filter.
    #[serde(default)]
    pub upsert: bool,
}

impl UpdateOptions {
    /// Options with upsert enabled.
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}
