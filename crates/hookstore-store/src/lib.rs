//! # hookstore-store
//!
//! Document-store backends for hookstore. Supports:
//!
//! - **memory**: In-process collections backed by [dashmap](https://crates.io/crates/dashmap)
//!
//! The backend is selected at runtime based on configuration.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::BackendManager;
