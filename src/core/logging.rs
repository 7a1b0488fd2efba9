//! # Logging wrap.
//!
//! [`LogErrors`] logs a failed result at `error` level and returns it unchanged.
//! It carries no contract beyond observability.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::tasks::{BoxTaskFuture, Task, TaskRef};

/// Task wrapper logging failures.
pub struct LogErrors {
    inner: TaskRef,
}

impl LogErrors {
    /// Wraps `inner`.
    pub fn new(inner: TaskRef) -> Self {
        Self { inner }
    }
}

impl Task for LogErrors {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        let name = self.inner.name().to_owned();
        let fut = self.inner.spawn(ctx);
        Box::pin(async move {
            let res = fut.await;
            if let Err(e) = &res {
                error!(task = %name, label = e.as_label(), error = %e, "task failed");
            }
            res
        })
    }
}

/// Returns `task` wrapped in a [`LogErrors`] as a shared handle.
pub fn log_errors(task: TaskRef) -> TaskRef {
    Arc::new(LogErrors::new(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn test_result_returned_unchanged() {
        let t = log_errors(TaskFn::arc("fail", |_ctx: CancellationToken| async {
            Err(TaskError::fail("boom"))
        }));
        assert_eq!(t.name(), "fail");
        assert_eq!(
            t.spawn(CancellationToken::new()).await,
            Err(TaskError::fail("boom"))
        );

        let ok = log_errors(TaskFn::arc("ok", |_ctx: CancellationToken| async { Ok(()) }));
        assert_eq!(ok.spawn(CancellationToken::new()).await, Ok(()));
    }
}
