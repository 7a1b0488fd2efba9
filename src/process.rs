//! # Main driver: from process start to exit code.
//!
//! [`main`] composes everything for a long-running service:
//!
//! ```text
//! Bootstrap::init_logging()
//!   └─► A::try_parse_from(args)          ── fails ──► ExitStatus::ArgumentParse (4)
//!   └─► Bootstrap::build_runtime()       ── fails ──► ExitStatus::RuntimeError (1)
//!   └─► build reporter(&app, &options)
//!          ├─ MissingDsn                 ──► ExitStatus::MissingReporterConfig (3)
//!          └─ other error                ──► ExitStatus::ReporterSetup (2)
//!   └─► Service::run(token_with_signal)
//!          ├─ Err                        ──► ExitStatus::RuntimeError (1)
//!          └─ Ok                         ──► ExitStatus::Success (0)
//!   └─► reporter.flush() + close()       (every path after the reporter was built)
//! ```
//!
//! [`main_cmd`] is the reporter-less variant for command-line tools (codes 0, 1, 4).
//!
//! ## Example
//! ```no_run
//! use async_trait::async_trait;
//! use clap::Parser;
//! use tokio_util::sync::CancellationToken;
//! use lifeline::{Application, Bootstrap, Options, ReporterConfig, ReporterRef, TaskError};
//!
//! #[derive(Parser)]
//! struct App {
//!     #[arg(long, env = "SENTRY_DSN")]
//!     sentry_dsn: Option<String>,
//! }
//!
//! #[async_trait]
//! impl Application for App {
//!     async fn run(&self, ctx: CancellationToken, _r: ReporterRef) -> Result<(), TaskError> {
//!         ctx.cancelled().await;
//!         Err(TaskError::Canceled)
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     lifeline::main::<App, _, _>(
//!         &Bootstrap::default(),
//!         std::env::args_os(),
//!         |app| ReporterConfig { dsn: app.sentry_dsn.clone(), proxy: None },
//!         Options::default(),
//!     )
//!     .into()
//! }
//! ```

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::Bootstrap,
    core::token_with_signal,
    error::ReporterError,
    service::{
        Application, LogReporter, Options, ReporterConfig, ReporterRef, Runnable, Service,
    },
};

/// Process exit status; the numeric values are a stable contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// The application finished (or was cancelled) cleanly.
    Success = 0,
    /// The application returned a reportable error.
    RuntimeError = 1,
    /// The crash reporter could not be set up.
    ReporterSetup = 2,
    /// The crash reporter configuration is missing.
    MissingReporterConfig = 3,
    /// Arguments could not be parsed.
    ArgumentParse = 4,
}

impl ExitStatus {
    /// Numeric exit code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            ExitStatus::Success => "success",
            ExitStatus::RuntimeError => "runtime_error",
            ExitStatus::ReporterSetup => "reporter_setup",
            ExitStatus::MissingReporterConfig => "missing_reporter_config",
            ExitStatus::ArgumentParse => "argument_parse",
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status as u8)
    }
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        status.code()
    }
}

/// Runs application `A` as a service reporting to a [`LogReporter`].
///
/// `reporter_config` extracts the reporter settings from the parsed arguments.
pub fn main<A, I, T>(
    bootstrap: &Bootstrap,
    args: I,
    reporter_config: impl FnOnce(&A) -> ReporterConfig,
    options: Options,
) -> ExitStatus
where
    A: Application + Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    main_with_reporter(bootstrap, args, options, |app: &A, opts: &Options| {
        let cfg = reporter_config(app);
        let reporter = LogReporter::new(&cfg, opts.exclude_errors.clone())?;
        Ok(Arc::new(reporter) as ReporterRef)
    })
}

/// Like [`main`], with a caller-provided reporter factory.
pub fn main_with_reporter<A, I, T, F>(
    bootstrap: &Bootstrap,
    args: I,
    options: Options,
    build_reporter: F,
) -> ExitStatus
where
    A: Application + Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(&A, &Options) -> Result<ReporterRef, ReporterError>,
{
    bootstrap.init_logging();

    let app = match parse_args::<A, _, _>(args) {
        Ok(app) => app,
        Err(status) => return status,
    };
    let runtime = match bootstrap.build_runtime() {
        Ok(rt) => rt,
        Err(err) => {
            error!(error = %err, "building runtime failed");
            return ExitStatus::RuntimeError;
        }
    };

    let reporter = match build_reporter(&app, &options) {
        Ok(reporter) => reporter,
        Err(ReporterError::MissingDsn) => {
            error!("reporter dsn missing");
            return ExitStatus::MissingReporterConfig;
        }
        Err(err) => {
            error!(error = %err, label = err.as_label(), "setting up reporter failed");
            return ExitStatus::ReporterSetup;
        }
    };

    let service = Service::new(Arc::clone(&reporter), Arc::new(app), options);
    let res = runtime.block_on(async {
        let ctx = token_with_signal(&CancellationToken::new());
        lifecycle(bootstrap.verbose_lifecycle, "application started");
        let res = service.run(&ctx).await;
        ctx.cancel();
        res
    });

    if !bootstrap.flush_timeout.is_zero() && !reporter.flush(bootstrap.flush_timeout) {
        warn!(timeout = ?bootstrap.flush_timeout, "reporter flush incomplete");
    }
    if let Err(err) = reporter.close() {
        warn!(error = %err, "closing reporter failed");
    }

    match res {
        Ok(()) => {
            lifecycle(bootstrap.verbose_lifecycle, "application finished");
            ExitStatus::Success
        }
        Err(err) => {
            error!(label = err.as_label(), error = %err, "application exited with error");
            ExitStatus::RuntimeError
        }
    }
}

/// Runs command-line tool `A` without a crash reporter.
///
/// Exit codes: `0` success, `1` runtime error, `4` argument parsing failure.
/// Cancellation-class errors (e.g. Ctrl-C) count as success. Lifecycle messages
/// are always logged at `debug`, whatever `verbose_lifecycle` says.
pub fn main_cmd<A, I, T>(bootstrap: &Bootstrap, args: I) -> ExitStatus
where
    A: Runnable + Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    bootstrap.init_logging();

    let app = match parse_args::<A, _, _>(args) {
        Ok(app) => app,
        Err(status) => return status,
    };
    let runtime = match bootstrap.build_runtime() {
        Ok(rt) => rt,
        Err(err) => {
            error!(error = %err, "building runtime failed");
            return ExitStatus::RuntimeError;
        }
    };

    let res = runtime.block_on(async {
        let ctx = token_with_signal(&CancellationToken::new());
        lifecycle(false, "application started");
        let res = app.run(ctx.clone()).await;
        ctx.cancel();
        res
    });

    match res {
        Err(err) if !err.is_cancellation() => {
            error!(label = err.as_label(), error = %err, "application exited with error");
            ExitStatus::RuntimeError
        }
        _ => {
            lifecycle(false, "application finished");
            ExitStatus::Success
        }
    }
}

/// Parses arguments; help and version requests print and map to success.
fn parse_args<A, I, T>(args: I) -> Result<A, ExitStatus>
where
    A: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match A::try_parse_from(args) {
        Ok(app) => {
            debug!("arguments parsed");
            Ok(app)
        }
        Err(err) if matches!(err.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            let _ = err.print();
            Err(ExitStatus::Success)
        }
        Err(err) => {
            error!(error = %err.kind(), "parse app failed");
            let _ = err.print();
            Err(ExitStatus::ArgumentParse)
        }
    }
}

fn lifecycle(verbose: bool, msg: &'static str) {
    if verbose {
        info!("{msg}");
    } else {
        debug!("{msg}");
    }
}
