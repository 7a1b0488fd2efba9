//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (cancelable, spawns a fresh future per call)
//! and the shared handle type [`TaskRef`], an `Arc<dyn Task>` suitable for sharing
//! across the runtime and the wrappers in [`crate::core`].
//!
//! A task receives a [`CancellationToken`] and must return promptly once it is cancelled.
//! A task that ignores cancellation stalls shutdown.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Cancelable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and a [`spawn`](Task::spawn) method that
/// creates the future for one execution.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use lifeline::{BoxTaskFuture, Task, TaskError};
///
/// struct Idle;
///
/// impl Task for Idle {
///     fn name(&self) -> &str { "idle" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async move {
///             ctx.cancelled().await;
///             Err(TaskError::Canceled)
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates the future that executes the task until completion or cancellation.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}
