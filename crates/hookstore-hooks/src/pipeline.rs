//! Pipeline composer. Sandwiches a raw operation between two hook phases.
//!
//! A composed pipeline behaves like `after(operation(before(value)).await)`:
//!
//! - A failing before-phase skips the operation entirely.
//! - A failing operation skips the after-phase.
//! - The after-phase only starts once the operation's future resolves.
//!
//! Both chains are captured when the pipeline is composed, so hooks
//! registered afterwards do not apply to it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use hookstore_core::result::AppResult;
use hookstore_core::types::document::Document;

use super::definitions::{OperationKind, Phase};
use super::executor::HookChain;
use super::registry::HookRegistry;

/// Type-erased asynchronous backend call.
pub type RawOperation =
    Arc<dyn Fn(Document) -> BoxFuture<'static, AppResult<Document>> + Send + Sync>;

/// A raw operation wrapped in before/after hook chains.
#[derive(Clone)]
pub struct Pipeline {
    kind: OperationKind,
    before: HookChain,
    after: HookChain,
    operation: RawOperation,
}

impl Pipeline {
    /// The operation kind whose hooks were captured.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// The captured before-phase chain.
    pub fn before(&self) -> &HookChain {
        &self.before
    }

    /// The captured after-phase chain.
    pub fn after(&self) -> &HookChain {
        &self.after
    }

    /// Runs before-hooks, the operation, then after-hooks.
    pub async fn execute(&self, value: Document) -> AppResult<Document> {
        let input = self.before.run(value)?;

        debug!(
            kind = %self.kind,
            before_hooks = self.before.len(),
            after_hooks = self.after.len(),
            "Invoking raw operation"
        );
        let output = (self.operation)(input).await?;

        self.after.run(output)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("kind", &self.kind)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("operation", &"<fn>")
            .finish()
    }
}

/// Builds pipelines from the current state of a hook registry.
#[derive(Debug, Clone)]
pub struct PipelineComposer {
    registry: Arc<HookRegistry>,
}

impl PipelineComposer {
    /// Creates a composer reading from `registry`.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Wraps `operation` in the hooks currently registered for `kind`.
    ///
    /// Never mutates the registry; every call returns an independent pipeline.
    pub fn compose<F, Fut>(&self, kind: OperationKind, operation: F) -> Pipeline
    where
        F: Fn(Document) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Document>> + Send + 'static,
    {
        let operation: RawOperation = Arc::new(move |value| operation(value).boxed());

        Pipeline {
            kind,
            before: self.registry.lookup(kind, Phase::Before),
            after: self.registry.lookup(kind, Phase::After),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use hookstore_core::error::{AppError, ErrorKind};
    use serde_json::json;

    type Trace = Arc<Mutex<Vec<String>>>;

    async fn echo(value: Document) -> AppResult<Document> {
        Ok(value)
    }

    async fn reset(_: Document) -> AppResult<Document> {
        Err(AppError::backend("connection reset"))
    }

    fn traced(
        trace: &Trace,
        label: &'static str,
    ) -> impl Fn(Document) -> AppResult<Document> + Send + Sync + 'static {
        let trace = trace.clone();
        move |v| {
            trace.lock().unwrap().push(format!("{label}({v})"));
            Ok(json!(format!("{label}({})", v.as_str().unwrap_or_default())))
        }
    }

    #[tokio::test]
    async fn test_sandwich_order() {
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(HookRegistry::new());
        registry
            .register_before(OperationKind::Find, traced(&trace, "b"))
            .register_after(OperationKind::Find, traced(&trace, "a"));

        let op_trace = trace.clone();
        let pipeline = PipelineComposer::new(registry).compose(OperationKind::Find, move |v| {
            op_trace.lock().unwrap().push(format!("op({v})"));
            echo(json!(format!("op({})", v.as_str().unwrap_or_default())))
        });

        let out = pipeline.execute(json!("v")).await.unwrap();
        assert_eq!(out, json!("a(op(b(v)))"));
        assert_eq!(
            *trace.lock().unwrap(),
            vec![
                "b(\"v\")".to_string(),
                "op(\"b(v)\")".to_string(),
                "a(\"op(b(v))\")".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_operation_failure_skips_after_phase() {
        let trace: Trace = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(HookRegistry::new());
        registry.register_after(OperationKind::Delete, traced(&trace, "a"));

        let pipeline = PipelineComposer::new(registry).compose(OperationKind::Delete, reset);

        let err = pipeline.execute(json!({})).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Backend);
        assert!(trace.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_compose_captures_hooks_at_composition_time() {
        let registry = Arc::new(HookRegistry::new());
        let composer = PipelineComposer::new(registry.clone());

        let pipeline = composer.compose(OperationKind::Insert, echo);
        registry.register_before(OperationKind::Insert, |_| Ok(json!("replaced")));

        assert!(pipeline.before().is_empty());
        assert_eq!(pipeline.execute(json!("original")).await.unwrap(), json!("original"));

        let fresh = composer.compose(OperationKind::Insert, echo);
        assert_eq!(fresh.execute(json!("original")).await.unwrap(), json!("replaced"));
    }
}
