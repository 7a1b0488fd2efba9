//! # Service: run one application, report what matters.
//!
//! ## Flow
//! ```text
//! Service::run(ctx)
//!   └─► app.run(ctx, reporter)
//!          ├─ Ok(())                       ──► Ok(())
//!          ├─ Err(e), options exclude e    ──► Ok(())            (swallowed)
//!          └─ Err(e)                       ──► reporter.capture_exception(e)   (once)
//!                                              └─► Err(e.wrap("application failed"))
//! ```
//!
//! ## Rules
//! - Exactly one report per failing, non-excluded run
//! - The returned error still [`is`](crate::TaskError::is) the original one

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::TaskError,
    service::{
        application::Application,
        options::Options,
        reporter::{EventHint, ReporterRef},
    },
};

/// Annotation added to every reported failure.
pub const APPLICATION_FAILED: &str = "application failed";

/// Binds an [`Application`] to a crash reporter and an exclusion policy.
pub struct Service {
    reporter: ReporterRef,
    app: Arc<dyn Application>,
    options: Options,
}

impl Service {
    /// Creates a new service.
    pub fn new(reporter: ReporterRef, app: Arc<dyn Application>, options: Options) -> Self {
        Self {
            reporter,
            app,
            options,
        }
    }

    /// Runs the application once and applies the reporting policy to its result.
    pub async fn run(&self, ctx: &CancellationToken) -> Result<(), TaskError> {
        let err = match self.app.run(ctx.clone(), Arc::clone(&self.reporter)).await {
            Ok(()) => {
                debug!("run finished without error");
                return Ok(());
            }
            Err(err) => err,
        };

        if self.options.is_excluded(&err) {
            debug!(error = %err, "run finished with error, but is excluded");
            return Ok(());
        }

        let hint = EventHint {
            context: ctx.clone(),
            original: err.clone(),
        };
        let report = self.reporter.capture_exception(&err, &hint);
        debug!(report_id = ?report.map(|id| id.to_string()), "error reported");
        Err(err.wrap(APPLICATION_FAILED))
    }
}
