//! # hookstore-adapter
//!
//! Composition root for hookstore. An [`Adapter`] owns the backend
//! connection and a [`HookRegistry`](hookstore_hooks::HookRegistry); its
//! [`Query`] facade hands out lazy, hook-wrapped handles for every CRUD
//! operation on a collection.

pub mod adapter;
pub mod query;

pub use adapter::Adapter;
pub use query::Query;
