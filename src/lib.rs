//! # lifeline
//!
//! **lifeline** is a process-lifecycle harness for long-running services.
//!
//! It starts a fixed group of independent tasks, stops the whole group as soon as any
//! one of them finishes (success, error or panic), and funnels the resulting error
//! through an exclusion policy before reporting it to a crash reporter.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │(user task #1)│   │(user task #2)│   │(user task #3)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//!     ┌───────────────────────────────────────────────────┐
//!     │  run(ctx, tasks)                                  │
//!     │    LogErrors(FilterErrors(CatchPanic(task),       │
//!     │                           [Canceled]))            │
//!     └──────────────────────────┬────────────────────────┘
//!                                ▼
//!     ┌───────────────────────────────────────────────────┐
//!     │  cancel_on_first_finish                           │
//!     │    child token shared by all tasks                │
//!     │    first return ─► child.cancel() ─► its result   │
//!     └──────────────────────────┬────────────────────────┘
//!                                ▼
//!     ┌───────────────────────────────────────────────────┐
//!     │  Service::run (wraps the Application)             │
//!     │    Ok / excluded error  ─► Ok(())                 │
//!     │    other error          ─► CrashReporter (once)   │
//!     │                         ─► Err("application       │
//!     │                                failed: ...")      │
//!     └──────────────────────────┬────────────────────────┘
//!                                ▼
//!                  main(): ExitStatus 0 / 1 / 2 / 3 / 4
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / functions                  |
//! |-------------------|--------------------------------------------------------------|----------------------------------------|
//! | **Tasks**         | Cancelable units of work, closures or custom types.          | [`Task`], [`TaskFn`], [`TaskRef`]      |
//! | **Run**           | Stop the group on first finish; contain panics.              | [`run`], [`run_with_grace`]            |
//! | **Wrappers**      | Panic guard, error filter, failure logging.                  | [`CatchPanic`], [`FilterErrors`], [`LogErrors`] |
//! | **Service**       | Report non-excluded application failures once.               | [`Service`], [`Application`]           |
//! | **Policy**        | Which errors are not worth reporting.                        | [`Options`], [`ExcludeErrors`]         |
//! | **Reporting**     | Crash reporter trait and a `tracing`-backed implementation.  | [`CrashReporter`], [`LogReporter`]     |
//! | **Errors**        | One error type with explicit "is-a" matching.                | [`TaskError`], [`ErrorKind`]           |
//! | **Process**       | Bootstrap, argument parsing, signals, exit codes.            | [`main`], [`main_cmd`], [`Bootstrap`], [`ExitStatus`] |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use lifeline::{TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let server: TaskRef = TaskFn::arc("server", |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!         Err(TaskError::Canceled)
//!     });
//!     let job: TaskRef = TaskFn::arc("job", |_ctx: CancellationToken| async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         Err(TaskError::fail("job failed"))
//!     });
//!
//!     // `job` finishes first: `server` is cancelled and the job's error is returned.
//!     let res = lifeline::run(&CancellationToken::new(), vec![server, job]).await;
//!     assert_eq!(res, Err(TaskError::fail("job failed")));
//! }
//! ```
mod config;
mod core;
mod error;
mod process;
mod service;
mod tasks;

// ---- Public re-exports ----

pub use config::{Bootstrap, LogFormat};
pub use crate::core::{
    CatchPanic, FilterErrors, LogErrors, cancel_on_first_finish, cancel_on_first_finish_wait,
    catch_panic, filter_errors, log_errors, run, run_with_grace, token_with_signal,
    wait_for_shutdown_signal,
};
pub use error::{ErrorKind, ReporterError, TaskError};
pub use process::{ExitStatus, main, main_cmd, main_with_reporter};
pub use service::{
    APPLICATION_FAILED, Application, CrashReporter, Dsn, EventHint, ExcludeError, ExcludeErrors,
    LogReporter, Options, OptionsBuilder, OptionsFn, ReportId, ReporterConfig, ReporterRef,
    Runnable, Service, is_error, is_kind,
};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};
