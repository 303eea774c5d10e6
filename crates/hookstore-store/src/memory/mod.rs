//! In-process document backend.

pub mod matcher;
pub mod store;

pub use store::MemoryBackend;
