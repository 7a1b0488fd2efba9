//! # Run a task group.
//!
//! [`run`] is the entry point ordinary task groups should use. Every task is wrapped,
//! innermost to outermost, as:
//!
//! ```text
//! LogErrors( FilterErrors( CatchPanic(task), [Canceled] ) )
//! ```
//!
//! and the wrapped group is handed to the cancel-on-first-finish runner. This gives:
//! - no panic escapes a task;
//! - "cancelled because a sibling finished" is not reported as a failure;
//! - every real failure is logged exactly once, by the task that produced it.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        filter::filter_errors,
        guard::catch_panic,
        logging::log_errors,
        runner::{cancel_on_first_finish, cancel_on_first_finish_wait},
    },
    error::TaskError,
    tasks::TaskRef,
};

/// Runs `tasks` until the first one finishes and returns its (filtered) result.
///
/// The other tasks are cancelled but not awaited; see [`run_with_grace`] for a
/// variant that drains them.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use lifeline::{TaskError, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let worker: TaskRef = TaskFn::arc("worker", |ctx: CancellationToken| async move {
///     ctx.cancelled().await;
///     Err(TaskError::Canceled)
/// });
/// let job: TaskRef = TaskFn::arc("job", |_ctx: CancellationToken| async { Ok(()) });
///
/// let res = lifeline::run(&CancellationToken::new(), vec![worker, job]).await;
/// assert!(res.is_ok());
/// # }
/// ```
pub async fn run(ctx: &CancellationToken, tasks: Vec<TaskRef>) -> Result<(), TaskError> {
    cancel_on_first_finish(ctx, guard_all(tasks)).await
}

/// Like [`run`], then waits up to `grace` for the cancelled tasks to return.
pub async fn run_with_grace(
    ctx: &CancellationToken,
    grace: Duration,
    tasks: Vec<TaskRef>,
) -> Result<(), TaskError> {
    cancel_on_first_finish_wait(ctx, grace, guard_all(tasks)).await
}

fn guard_all(tasks: Vec<TaskRef>) -> Vec<TaskRef> {
    tasks
        .into_iter()
        .map(|task| log_errors(filter_errors(catch_panic(task), [TaskError::Canceled])))
        .collect()
}
