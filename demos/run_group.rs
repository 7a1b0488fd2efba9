//! # Example: run_group
//!
//! Runs three tasks with [`lifeline::run_with_grace`]: a ticker, an idle worker and a job that
//! fails after a short delay. The job finishes first, so the other two are cancelled
//! and the job's error is returned.
//!
//! ## Flow
//! ```text
//! run_with_grace(ctx, grace, [ticker, idle, job])
//!     ├─► job returns Err("job failed")    (logged once by LogErrors)
//!     ├─► child token cancelled
//!     │     ├─► ticker returns Err(Canceled) → filtered
//!     │     └─► idle   returns Err(Canceled) → filtered
//!     └─► Err("job failed")
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example run_group
//! ```

use std::time::Duration;

use lifeline::{Bootstrap, TaskError, TaskFn, TaskRef};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    Bootstrap::default().init_logging();

    let ticker: TaskRef = TaskFn::arc("ticker", |ctx: CancellationToken| async move {
        let mut tick = tokio::time::interval(Duration::from_millis(100));
        loop {
            tokio::select! {
                _ = tick.tick() => tracing::info!("tick"),
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
            }
        }
    });

    let idle: TaskRef = TaskFn::arc("idle", |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Err(TaskError::Canceled)
    });

    let job: TaskRef = TaskFn::arc("job", |_ctx: CancellationToken| async move {
        tokio::time::sleep(Duration::from_millis(350)).await;
        Err(TaskError::fail("job failed"))
    });

    let res = lifeline::run_with_grace(
        &CancellationToken::new(),
        Duration::from_secs(1),
        vec![ticker, idle, job],
    )
    .await;
    println!("group finished: {res:?}");
}
