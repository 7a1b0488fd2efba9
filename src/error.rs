//! Error types used by the lifeline runtime, tasks and reporters.
//!
//! This module defines two error enums:
//!
//! - [`TaskError`]: the single error type flowing through tasks, the runner and [`Service`](crate::Service).
//! - [`ReporterError`]: errors raised while building or closing a crash reporter.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//!
//! ## "is-a" matching
//! A [`TaskError`] may wrap another one ([`TaskError::Wrapped`]). [`TaskError::is`] walks
//! that chain and compares every node with the target, so a wrapped error still matches
//! the error it was built from:
//!
//! ```text
//! Wrapped("application failed") ──source──► Wrapped("load config") ──source──► Fail("boom")
//!        is(Fail("boom")) == true                                              ▲ match
//! ```

use thiserror::Error;

/// Coarse classification of a [`TaskError`].
///
/// For a [`TaskError::Wrapped`] error the kind is the kind of the innermost source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The lifetime handle was cancelled.
    Canceled,
    /// A deadline was exceeded.
    DeadlineExceeded,
    /// A task panicked and the panic was recovered.
    Panicked,
    /// Any other failure.
    Failed,
}

/// # Errors produced by task execution.
///
/// Tasks, the runner and the [`Service`](crate::Service) all speak this type.
/// It is cheap to clone and compares by value, which is what [`TaskError::is`] relies on.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task was cancelled because its lifetime handle ended.
    #[error("context cancelled")]
    Canceled,

    /// Task ran past its deadline.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Task panicked; the payload was recovered and converted.
    #[error("task panicked: {info}")]
    Panicked {
        /// Message derived from the panic payload.
        info: String,
    },

    /// Task execution failed.
    #[error("{error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// An error annotated with additional context.
    #[error("{context}: {source}")]
    Wrapped {
        /// Annotation added at the wrapping site.
        context: String,
        /// The wrapped error.
        #[source]
        source: Box<TaskError>,
    },
}

impl TaskError {
    /// Builds a plain failure from any displayable value.
    ///
    /// # Example
    /// ```
    /// use lifeline::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Wraps `self` with an annotation; the result still [`is`](Self::is) `self`.
    ///
    /// # Example
    /// ```
    /// use lifeline::TaskError;
    ///
    /// let base = TaskError::fail("boom");
    /// let err = base.clone().wrap("application failed");
    /// assert_eq!(err.to_string(), "application failed: boom");
    /// assert!(err.is(&base));
    /// ```
    pub fn wrap(self, context: impl Into<String>) -> Self {
        TaskError::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns `true` if `self`, or any error it wraps, equals `target`.
    pub fn is(&self, target: &TaskError) -> bool {
        let mut cur = self;
        loop {
            if cur == target {
                return true;
            }
            match cur {
                TaskError::Wrapped { source, .. } => cur = source.as_ref(),
                _ => return false,
            }
        }
    }

    /// Returns the innermost error of a wrap chain (or `self`).
    pub fn root(&self) -> &TaskError {
        let mut cur = self;
        while let TaskError::Wrapped { source, .. } = cur {
            cur = source.as_ref();
        }
        cur
    }

    /// Returns the classification of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            TaskError::Canceled => ErrorKind::Canceled,
            TaskError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            TaskError::Panicked { .. } => ErrorKind::Panicked,
            _ => ErrorKind::Failed,
        }
    }

    /// Returns `true` for cancellation and deadline errors, wrapped or not.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Canceled | ErrorKind::DeadlineExceeded
        )
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use lifeline::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// assert_eq!(TaskError::fail("x").wrap("ctx").as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Canceled => "task_canceled",
            ErrorKind::DeadlineExceeded => "task_deadline_exceeded",
            ErrorKind::Panicked => "task_panicked",
            ErrorKind::Failed => "task_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Canceled => "context cancelled".to_string(),
            TaskError::DeadlineExceeded => "deadline exceeded".to_string(),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Wrapped { .. } => self.to_string(),
        }
    }
}

impl From<tokio::time::error::Elapsed> for TaskError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        TaskError::DeadlineExceeded
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::fail(err)
    }
}

/// # Errors produced while setting up or closing a crash reporter.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReporterError {
    /// No DSN was configured.
    #[error("reporter dsn missing")]
    MissingDsn,

    /// The DSN could not be parsed.
    #[error("invalid reporter dsn: {reason}")]
    InvalidDsn {
        /// What is wrong with the DSN.
        reason: String,
    },

    /// The proxy address could not be parsed.
    #[error("invalid reporter proxy {proxy:?}")]
    InvalidProxy {
        /// The rejected proxy value.
        proxy: String,
    },
}

impl ReporterError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ReporterError::MissingDsn => "reporter_missing_dsn",
            ReporterError::InvalidDsn { .. } => "reporter_invalid_dsn",
            ReporterError::InvalidProxy { .. } => "reporter_invalid_proxy",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_is_matches_equal_values() {
        assert!(TaskError::Canceled.is(&TaskError::Canceled));
        assert!(TaskError::fail("boom").is(&TaskError::fail("boom")));
        assert!(!TaskError::fail("boom").is(&TaskError::fail("bang")));
        assert!(!TaskError::Canceled.is(&TaskError::DeadlineExceeded));
    }

    #[test]
    fn test_is_walks_wrap_chain() {
        let err = TaskError::Canceled.wrap("read body").wrap("handler");
        assert!(err.is(&TaskError::Canceled));
        assert!(err.is(&TaskError::Canceled.wrap("read body")));
        assert!(!err.is(&TaskError::DeadlineExceeded));
        assert_eq!(err.to_string(), "handler: read body: context cancelled");
    }

    #[test]
    fn test_kind_and_label_follow_root() {
        let err = TaskError::DeadlineExceeded.wrap("query");
        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
        assert_eq!(err.as_label(), "task_deadline_exceeded");
        assert!(err.is_cancellation());
        assert!(!TaskError::fail("x").is_cancellation());
    }

    #[test]
    fn test_as_message() {
        assert_eq!(TaskError::fail("boom").as_message(), "error: boom");
        assert_eq!(
            TaskError::Panicked { info: "oops".into() }.as_message(),
            "panic: oops"
        );
        assert_eq!(TaskError::DeadlineExceeded.as_message(), "deadline exceeded");
        assert_eq!(
            TaskError::fail("boom").wrap("load").as_message(),
            "load: boom"
        );
    }

    #[test]
    fn test_source_exposes_inner_error() {
        use std::error::Error as _;

        let err = TaskError::fail("boom").wrap("application failed");
        let src = err.source().map(|s| s.to_string());
        assert_eq!(src.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_elapsed_maps_to_deadline() {
        let res = tokio::time::timeout(
            Duration::from_millis(1),
            std::future::pending::<()>(),
        )
        .await;
        let err: TaskError = res.unwrap_err().into();
        assert_eq!(err, TaskError::DeadlineExceeded);
    }
}
