//! Exit-status contract of the main drivers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::Parser;
use lifeline::{
    Application, Bootstrap, CrashReporter, EventHint, ExitStatus, Options, ReportId,
    ReporterConfig, ReporterError, ReporterRef, Runnable, TaskError, TaskFn, TaskRef,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "daemon", version = "1.0.0")]
struct Daemon {
    /// Required so that missing arguments fail parsing.
    #[arg(long)]
    listen: String,

    #[arg(long)]
    dsn: Option<String>,

    /// What the application returns: ok, fail, cancel, panic.
    #[arg(long, default_value = "ok")]
    outcome: String,
}

impl Daemon {
    fn task(&self) -> TaskRef {
        let outcome = self.outcome.clone();
        TaskFn::arc("daemon", move |_ctx: CancellationToken| {
            let outcome = outcome.clone();
            async move {
                match outcome.as_str() {
                    "fail" => Err(TaskError::fail("boom")),
                    "cancel" => Err(TaskError::DeadlineExceeded),
                    "panic" => explode(),
                    _ => Ok(()),
                }
            }
        })
    }
}

fn explode() -> Result<(), TaskError> {
    panic!("daemon panic")
}

#[async_trait]
impl Application for Daemon {
    async fn run(&self, ctx: CancellationToken, _reporter: ReporterRef) -> Result<(), TaskError> {
        let idle: TaskRef = TaskFn::arc("idle", |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            Err(TaskError::Canceled)
        });
        lifeline::run(&ctx, vec![self.task(), idle]).await
    }
}

#[async_trait]
impl Runnable for Daemon {
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
        lifeline::run(&ctx, vec![self.task()]).await
    }
}

#[derive(Default)]
struct Recorder {
    reports: Mutex<Vec<String>>,
    closed: Mutex<bool>,
}

impl CrashReporter for Recorder {
    fn capture_exception(&self, err: &TaskError, _hint: &EventHint) -> Option<ReportId> {
        self.reports.lock().unwrap().push(err.to_string());
        Some(ReportId::new())
    }

    fn close(&self) -> Result<(), ReporterError> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

fn bootstrap() -> Bootstrap {
    Bootstrap {
        worker_threads: 2,
        ..Bootstrap::default()
    }
}

fn reporter_config(app: &Daemon) -> ReporterConfig {
    ReporterConfig {
        dsn: app.dsn.clone(),
        proxy: None,
    }
}

fn with_recorder(args: &[&str]) -> (ExitStatus, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let r = Arc::clone(&recorder);
    let status = lifeline::main_with_reporter::<Daemon, _, _, _>(
        &bootstrap(),
        args.iter().copied(),
        Options::default(),
        move |_app, _opts| Ok(r as ReporterRef),
    );
    (status, recorder)
}

#[test]
fn test_success() {
    let (status, recorder) = with_recorder(&["daemon", "--listen", ":8080"]);
    assert_eq!(status, ExitStatus::Success);
    assert!(recorder.reports.lock().unwrap().is_empty());
    assert!(*recorder.closed.lock().unwrap());
}

#[test]
fn test_failure_reported_once() {
    let (status, recorder) = with_recorder(&["daemon", "--listen", ":8080", "--outcome", "fail"]);
    assert_eq!(status, ExitStatus::RuntimeError);
    let reports = recorder.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("boom"));
    assert!(*recorder.closed.lock().unwrap());
}

#[test]
fn test_panic_is_a_runtime_error() {
    let (status, recorder) = with_recorder(&["daemon", "--listen", ":8080", "--outcome", "panic"]);
    assert_eq!(status, ExitStatus::RuntimeError);
    assert!(recorder.reports.lock().unwrap()[0].contains("daemon panic"));
}

#[test]
fn test_deadline_is_excluded() {
    let (status, recorder) =
        with_recorder(&["daemon", "--listen", ":8080", "--outcome", "cancel"]);
    assert_eq!(status, ExitStatus::Success);
    assert!(recorder.reports.lock().unwrap().is_empty());
}

#[test]
fn test_argument_parse_failure() {
    let (status, recorder) = with_recorder(&["daemon"]);
    assert_eq!(status, ExitStatus::ArgumentParse);
    assert!(!*recorder.closed.lock().unwrap());
}

#[test]
fn test_help_exits_cleanly() {
    let (status, _) = with_recorder(&["daemon", "--help"]);
    assert_eq!(status, ExitStatus::Success);
}

#[test]
fn test_missing_dsn() {
    let status = lifeline::main::<Daemon, _, _>(
        &bootstrap(),
        ["daemon", "--listen", ":8080"],
        reporter_config,
        Options::default(),
    );
    assert_eq!(status, ExitStatus::MissingReporterConfig);
}

#[test]
fn test_invalid_dsn() {
    let status = lifeline::main::<Daemon, _, _>(
        &bootstrap(),
        ["daemon", "--listen", ":8080", "--dsn", "not-a-dsn"],
        reporter_config,
        Options::default(),
    );
    assert_eq!(status, ExitStatus::ReporterSetup);
}

#[test]
fn test_log_reporter_end_to_end() {
    let status = lifeline::main::<Daemon, _, _>(
        &bootstrap(),
        [
            "daemon",
            "--listen",
            ":8080",
            "--dsn",
            "https://key@reports.example.com/7",
            "--outcome",
            "fail",
        ],
        reporter_config,
        Options::default(),
    );
    assert_eq!(status, ExitStatus::RuntimeError);
}

#[test]
fn test_cmd_exit_codes() {
    let b = Bootstrap {
        worker_threads: 1,
        ..Bootstrap::cmd()
    };
    assert_eq!(
        lifeline::main_cmd::<Daemon, _, _>(&b, ["daemon", "--listen", "x"]),
        ExitStatus::Success
    );
    assert_eq!(
        lifeline::main_cmd::<Daemon, _, _>(&b, ["daemon", "--listen", "x", "--outcome", "fail"]),
        ExitStatus::RuntimeError
    );
    assert_eq!(
        lifeline::main_cmd::<Daemon, _, _>(&b, ["daemon", "--listen", "x", "--outcome", "cancel"]),
        ExitStatus::Success
    );
    assert_eq!(
        lifeline::main_cmd::<Daemon, _, _>(&b, ["daemon"]),
        ExitStatus::ArgumentParse
    );
}
