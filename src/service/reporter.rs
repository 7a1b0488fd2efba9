//! # Crash reporting.
//!
//! [`CrashReporter`] is the sink that records application errors for offline triage.
//! The [`Service`](crate::Service) is the only component that calls it.
//!
//! [`LogReporter`] is the built-in implementation: every accepted report becomes a
//! structured `error` event on the `lifeline::report` tracing target, tagged with a
//! fresh [`ReportId`]. Route that target to whatever collector the deployment uses.
//!
//! ## Rules
//! - Cancellation-class errors are never reported (`capture_exception` returns `None`).
//! - Errors matching the reporter's own [`ExcludeErrors`] are skipped as well.
//! - After [`close`](CrashReporter::close) every report is rejected.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{ReporterError, TaskError};
use crate::service::options::ExcludeErrors;

/// Identifier of an accepted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Generates a new random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Context attached to a report.
#[derive(Debug, Clone)]
pub struct EventHint {
    /// Lifetime handle of the failed run.
    pub context: CancellationToken,
    /// The error as returned by the application, before any wrapping.
    pub original: TaskError,
}

/// Sink for application errors.
///
/// Implementations must be safe for concurrent use.
pub trait CrashReporter: Send + Sync + 'static {
    /// Records `err`; returns the report id, or `None` if the report was skipped.
    fn capture_exception(&self, err: &TaskError, hint: &EventHint) -> Option<ReportId>;

    /// Waits up to `timeout` for pending reports to be delivered.
    ///
    /// Returns `false` if reports were still pending when the timeout ran out.
    fn flush(&self, timeout: Duration) -> bool {
        let _ = timeout;
        true
    }

    /// Flushes and releases the reporter.
    fn close(&self) -> Result<(), ReporterError>;
}

/// Shared handle to a crash reporter.
pub type ReporterRef = Arc<dyn CrashReporter>;

/// Settings for building a reporter.
#[derive(Clone, Default)]
pub struct ReporterConfig {
    /// Endpoint in the form `scheme://public_key@host/project`.
    pub dsn: Option<String>,
    /// Optional HTTP(S) proxy in front of the endpoint.
    pub proxy: Option<String>,
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("dsn", &self.dsn.as_ref().map(|d| format!("<{} chars>", d.len())))
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// Parsed reporter endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Dsn {
    scheme: String,
    key: String,
    host: String,
    project: String,
}

impl Dsn {
    /// Parses `scheme://public_key@host/project`.
    pub fn parse(raw: &str) -> Result<Self, ReporterError> {
        let invalid = |reason: &str| ReporterError::InvalidDsn {
            reason: reason.to_string(),
        };

        let (scheme, rest) = raw.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
        if scheme != "http" && scheme != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        let (key, rest) = rest.split_once('@').ok_or_else(|| invalid("missing public key"))?;
        if key.is_empty() {
            return Err(invalid("empty public key"));
        }
        let (host, project) = rest.rsplit_once('/').ok_or_else(|| invalid("missing project"))?;
        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        if project.is_empty() {
            return Err(invalid("empty project"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            key: key.to_string(),
            host: host.to_string(),
            project: project.to_string(),
        })
    }

    /// Endpoint host (may include a path prefix).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Project identifier.
    pub fn project(&self) -> &str {
        &self.project
    }
}

impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dsn")
            .field("scheme", &self.scheme)
            .field("key", &"<redacted>")
            .field("host", &self.host)
            .field("project", &self.project)
            .finish()
    }
}

/// Reporter writing reports as structured `tracing` events.
#[derive(Debug)]
pub struct LogReporter {
    dsn: Dsn,
    proxy: Option<String>,
    exclude: ExcludeErrors,
    captured: AtomicU64,
    closed: AtomicBool,
}

impl LogReporter {
    /// Builds a reporter from `config`; `exclude` lists additional errors to skip.
    pub fn new(config: &ReporterConfig, exclude: ExcludeErrors) -> Result<Self, ReporterError> {
        let raw = config.dsn.as_deref().ok_or(ReporterError::MissingDsn)?;
        let dsn = Dsn::parse(raw)?;

        if let Some(proxy) = &config.proxy {
            let valid = ["http://", "https://"]
                .iter()
                .any(|prefix| proxy.strip_prefix(*prefix).is_some_and(|rest| !rest.is_empty()));
            if !valid {
                return Err(ReporterError::InvalidProxy {
                    proxy: proxy.clone(),
                });
            }
            debug!(proxy = %proxy, "reporter uses proxy");
        }

        Ok(Self {
            dsn,
            proxy: config.proxy.clone(),
            exclude,
            captured: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Parsed endpoint.
    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    /// Configured proxy, if any.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Number of reports accepted so far.
    pub fn captured(&self) -> u64 {
        self.captured.load(Ordering::Relaxed)
    }
}

impl CrashReporter for LogReporter {
    fn capture_exception(&self, err: &TaskError, hint: &EventHint) -> Option<ReportId> {
        if self.closed.load(Ordering::Acquire) {
            debug!(error = %err, "reporter closed; dropping report");
            return None;
        }
        if err.is_cancellation() || self.exclude.is_excluded(err) {
            debug!(error = %err, "skip error");
            return None;
        }

        let id = ReportId::new();
        self.captured.fetch_add(1, Ordering::Relaxed);
        error!(
            target: "lifeline::report",
            report_id = %id,
            host = %self.dsn.host,
            project = %self.dsn.project,
            label = err.as_label(),
            cancelled = hint.context.is_cancelled(),
            original = %hint.original,
            error = %err,
            detail = %err.as_message(),
            "captured exception"
        );
        Some(id)
    }

    fn close(&self) -> Result<(), ReporterError> {
        self.flush(Duration::from_secs(2));
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
