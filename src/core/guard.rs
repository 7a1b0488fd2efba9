//! # Panic guard.
//!
//! [`CatchPanic`] wraps a task so that a panic inside it (while creating the future
//! or while polling it) is recovered and returned as [`TaskError::Panicked`].
//!
//! ```text
//! spawn(ctx) ──► catch_unwind( inner.spawn(ctx).await )
//!                     ├─ Ok(res)      ──► res
//!                     └─ Err(payload) ──► Err(Panicked { info: payload message })
//! ```
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if the task uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::{BoxTaskFuture, Task, TaskRef};

/// Task wrapper converting panics into errors.
pub struct CatchPanic {
    inner: TaskRef,
}

impl CatchPanic {
    /// Wraps `inner`.
    pub fn new(inner: TaskRef) -> Self {
        Self { inner }
    }
}

impl Task for CatchPanic {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let fut = AssertUnwindSafe(async move { inner.spawn(ctx).await });
            match fut.catch_unwind().await {
                Ok(res) => res,
                Err(payload) => Err(TaskError::Panicked {
                    info: panic_message(payload.as_ref()),
                }),
            }
        })
    }
}

/// Returns `task` wrapped in a [`CatchPanic`] as a shared handle.
pub fn catch_panic(task: TaskRef) -> TaskRef {
    Arc::new(CatchPanic::new(task))
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
