//! Core traits defined in `hookstore-core` and implemented by other crates.

pub mod backend;

pub use backend::DocumentBackend;
