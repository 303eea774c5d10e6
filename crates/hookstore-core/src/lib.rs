//! # hookstore-core
//!
//! Core crate for hookstore. Contains the document-store backend trait,
//! configuration schemas, shared document types, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other hookstore crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use types::document::Document;
