//! Composable asynchronous pipeline stages.
//!
//! An [`Operator`] is a node in a directed pipeline graph. Materializing a
//! stage with [`Operator::to_stream`] is lazy: nothing runs until the
//! returned stream is polled by a terminal consumer (pull triggers push).
//! Within a single upstream-to-consumer edge, item order is preserved.
//!
//! Tasks backing a stage live in an [`OperatorScope`]; dropping the scope
//! aborts them, so a pipeline's lifetime is the lifetime of the scope tree
//! it was driven under.

pub mod broadcast;

use std::future::Future;
use std::sync::Arc;

use futures::stream::BoxStream;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::Result;

pub use broadcast::BroadcastOperator;

/// The stream type produced by an operator stage.
pub type OperatorStream<T> = BoxStream<'static, Result<T>>;

/// A node in the pipeline graph, producing an asynchronous stream of `T`.
pub trait Operator<T>: Send + Sync {
    /// The name of this stage, for diagnostics.
    fn name(&self) -> &str;

    /// Materialize this stage as a stream driven under the given scope.
    fn to_stream(&self, scope: &OperatorScope) -> OperatorStream<T>;
}

/// An operator with exactly one upstream, exposed for composition.
pub trait UnaryOperator<I, O>: Operator<O> {
    /// The single upstream this stage consumes.
    fn input(&self) -> &Arc<dyn Operator<I>>;
}

/// Owns the tasks spawned for one pipeline (or sub-pipeline).
///
/// Tasks spawned on a scope are aborted when the scope is dropped. A child
/// scope derived with [`OperatorScope::child`] has its own task set and an
/// independent lifetime, which is how a shared stage outlives the consumer
/// scope that first created it.
#[derive(Debug)]
pub struct OperatorScope {
    handle: Handle,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl OperatorScope {
    /// Create a scope on the current tokio runtime.
    ///
    /// Panics outside a runtime, like `Handle::current` does.
    pub fn new() -> Self {
        OperatorScope {
            handle: Handle::current(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Derive a child scope with its own task set and lifetime.
    pub fn child(&self) -> OperatorScope {
        OperatorScope {
            handle: self.handle.clone(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn a task owned by this scope.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.handle.spawn(future);
        self.tasks.lock().push(handle);
    }
}

impl Default for OperatorScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OperatorScope {
    fn drop(&mut self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}
