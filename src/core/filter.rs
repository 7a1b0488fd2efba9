//! # Error filter.
//!
//! [`FilterErrors`] turns selected errors into success. An error is filtered when it
//! [`is`](TaskError::is) one of the filtered values: equal to it, or wrapping it.
//! Everything else passes through unchanged.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::{BoxTaskFuture, Task, TaskRef};

/// Task wrapper suppressing selected errors.
pub struct FilterErrors {
    inner: TaskRef,
    filtered: Arc<[TaskError]>,
}

impl FilterErrors {
    /// Wraps `inner`; errors matching any of `filtered` become `Ok(())`.
    pub fn new(inner: TaskRef, filtered: impl IntoIterator<Item = TaskError>) -> Self {
        Self {
            inner,
            filtered: filtered.into_iter().collect(),
        }
    }

    /// Returns `true` if `err` matches one of the filtered errors.
    pub fn is_filtered(&self, err: &TaskError) -> bool {
        matches_any(&self.filtered, err)
    }
}

impl Task for FilterErrors {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        let fut = self.inner.spawn(ctx);
        let filtered = Arc::clone(&self.filtered);
        Box::pin(async move {
            match fut.await {
                Err(e) if matches_any(&filtered, &e) => Ok(()),
                res => res,
            }
        })
    }
}

/// Returns `task` wrapped in a [`FilterErrors`] as a shared handle.
pub fn filter_errors(task: TaskRef, filtered: impl IntoIterator<Item = TaskError>) -> TaskRef {
    Arc::new(FilterErrors::new(task, filtered))
}

fn matches_any(filtered: &[TaskError], err: &TaskError) -> bool {
    filtered.iter().any(|f| err.is(f))
}
