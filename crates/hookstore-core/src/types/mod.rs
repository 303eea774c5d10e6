//! Shared document, option, and result types.

pub mod document;
pub mod options;
pub mod results;

pub use document::{Document, InsertInput};
pub use options::{FindOptions, SortOrder, UpdateOptions};
pub use results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult};
