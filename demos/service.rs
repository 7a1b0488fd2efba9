//! # Example: service
//!
//! A complete service binary: arguments from flags or environment, a crash reporter,
//! two long-running tasks and shutdown on SIGINT/SIGTERM.
//!
//! ## Run
//! ```bash
//! SENTRY_DSN=https://key@reports.example.com/1 cargo run --example service -- --interval-ms 200
//! ```
//! Press Ctrl-C to stop: the run is cancelled, nothing is reported and the exit code is 0.
//! Pass `--fail-after-ms 500` to see a reported failure and exit code 1.

use std::process::ExitCode;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use lifeline::{
    Application, Bootstrap, Options, ReporterConfig, ReporterRef, TaskError, TaskFn, TaskRef,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "service", about = "lifeline demo service")]
struct App {
    /// Crash reporter endpoint.
    #[arg(long, env = "SENTRY_DSN")]
    sentry_dsn: Option<String>,

    /// Optional proxy in front of the crash reporter.
    #[arg(long, env = "SENTRY_PROXY")]
    sentry_proxy: Option<String>,

    /// Heartbeat interval.
    #[arg(long, env = "INTERVAL_MS", default_value_t = 1000)]
    interval_ms: u64,

    /// Fail the worker after this many milliseconds.
    #[arg(long, env = "FAIL_AFTER_MS")]
    fail_after_ms: Option<u64>,
}

impl App {
    fn heartbeat(&self) -> TaskRef {
        let every = Duration::from_millis(self.interval_ms);
        TaskFn::arc("heartbeat", move |ctx: CancellationToken| async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(every) => tracing::info!("alive"),
                    _ = ctx.cancelled() => return Err(TaskError::Canceled),
                }
            }
        })
    }

    fn worker(&self) -> TaskRef {
        let fail_after = self.fail_after_ms.map(Duration::from_millis);
        TaskFn::arc("worker", move |ctx: CancellationToken| async move {
            match fail_after {
                Some(after) => {
                    tokio::select! {
                        _ = tokio::time::sleep(after) => Err(TaskError::fail("worker gave up")),
                        _ = ctx.cancelled() => Err(TaskError::Canceled),
                    }
                }
                None => {
                    ctx.cancelled().await;
                    Err(TaskError::Canceled)
                }
            }
        })
    }
}

#[async_trait]
impl Application for App {
    async fn run(&self, ctx: CancellationToken, _reporter: ReporterRef) -> Result<(), TaskError> {
        let res = lifeline::run(&ctx, vec![self.heartbeat(), self.worker()]).await;
        // Parent cancellation (Ctrl-C) is filtered to Ok by `run`; surface it so the
        // exclusion policy sees it.
        match res {
            Ok(()) if ctx.is_cancelled() => Err(TaskError::Canceled),
            other => other,
        }
    }
}

fn main() -> ExitCode {
    lifeline::main::<App, _, _>(
        &Bootstrap::default(),
        std::env::args_os(),
        |app| ReporterConfig {
            dsn: app.sentry_dsn.clone(),
            proxy: app.sentry_proxy.clone(),
        },
        Options::default(),
    )
    .into()
}
