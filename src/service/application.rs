//! # Units of business logic driven by the harness.
//!
//! - [`Application`]: the long-lived unit run by a [`Service`](crate::Service); it also
//!   receives the crash reporter for its own use.
//! - [`Runnable`]: a reporter-less unit, used by command-line tools via
//!   [`main_cmd`](crate::main_cmd).
//!
//! Both receive the process lifetime handle and must return once it is cancelled.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{error::TaskError, service::reporter::ReporterRef};

/// Long-lived business logic with access to the crash reporter.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use lifeline::{Application, ReporterRef, TaskError, TaskFn, TaskRef};
///
/// struct App;
///
/// #[async_trait]
/// impl Application for App {
///     async fn run(&self, ctx: CancellationToken, _reporter: ReporterRef) -> Result<(), TaskError> {
///         let worker: TaskRef = TaskFn::arc("worker", |ctx: CancellationToken| async move {
///             ctx.cancelled().await;
///             Err(TaskError::Canceled)
///         });
///         lifeline::run(&ctx, vec![worker]).await
///     }
/// }
/// ```
#[async_trait]
pub trait Application: Send + Sync + 'static {
    /// Runs until completion or until `ctx` is cancelled.
    async fn run(&self, ctx: CancellationToken, reporter: ReporterRef) -> Result<(), TaskError>;
}

/// Business logic without a crash reporter.
#[async_trait]
pub trait Runnable: Send + Sync + 'static {
    /// Runs until completion or until `ctx` is cancelled.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
