//! # hookstore-hooks
//!
//! Hook pipeline for hookstore. Provides:
//!
//! - A registry of ordered interceptor chains keyed by (operation kind, phase)
//! - A phase executor that folds a document through one chain
//! - A composer that wraps a raw operation in before/after folds
//! - Deferred handles that run a composed pipeline only on request

pub mod deferred;
pub mod definitions;
pub mod executor;
pub mod pipeline;
pub mod registry;

pub use deferred::Deferred;
pub use definitions::{HookKey, Interceptor, OperationKind, Phase};
pub use executor::{HookChain, HookExecutor};
pub use pipeline::{Pipeline, PipelineComposer, RawOperation};
pub use registry::HookRegistry;
