//! Deferred executor. A lazy handle over a composed pipeline and its input.

use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::debug;

use hookstore_core::result::AppResult;
use hookstore_core::types::document::Document;

use super::definitions::OperationKind;
use super::pipeline::Pipeline;

/// A composed pipeline bound to the value it will run on.
///
/// Building a handle never touches the pipeline. Each call to [`run`] or
/// [`spawn`] executes the whole pipeline again from the before-phase,
/// including the backend's side effects; results are not memoized.
///
/// [`run`]: Deferred::run
/// [`spawn`]: Deferred::spawn
#[derive(Clone)]
pub struct Deferred {
    pipeline: Arc<Pipeline>,
    input: Document,
}

impl Deferred {
    /// Binds `pipeline` to `input` without running anything.
    pub fn new(pipeline: Pipeline, input: Document) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            input,
        }
    }

    /// The operation kind the pipeline was composed for.
    pub fn kind(&self) -> OperationKind {
        self.pipeline.kind()
    }

    /// The captured input value.
    pub fn input(&self) -> &Document {
        &self.input
    }

    /// Returns a future that executes the pipeline on the captured input.
    ///
    /// The future owns everything it needs, so it may be awaited in place,
    /// handed to an executor, or dropped to abandon the run before the
    /// backend call completes.
    pub fn run(&self) -> BoxFuture<'static, AppResult<Document>> {
        let pipeline = self.pipeline.clone();
        let input = self.input.clone();

        async move {
            debug!(kind = %pipeline.kind(), "Running deferred pipeline");
            pipeline.execute(input).await
        }
        .boxed()
    }

    /// Starts executing the pipeline on the tokio runtime immediately.
    ///
    /// The returned handle can be awaited for the result or aborted.
    pub fn spawn(&self) -> JoinHandle<AppResult<Document>> {
        tokio::spawn(self.run())
    }

    /// Runs the pipeline and deserializes the final document into `T`.
    pub async fn run_as<T: DeserializeOwned>(&self) -> AppResult<T> {
        let document = self.run().await?;
        Ok(serde_json::from_value(document)?)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("pipeline", &self.pipeline)
            .field("input", &self.input)
            .finish()
    }
}
