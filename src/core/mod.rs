//! Runtime core: task wrappers and the cancel-on-first-finish runner.
//!
//! Internal modules:
//! - [`guard`]: converts task panics into errors;
//! - [`filter`]: suppresses selected errors;
//! - [`logging`]: logs task failures;
//! - [`runner`]: runs a group until the first task finishes;
//! - [`run`]: composes the wrappers around a group and drives the runner;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod filter;
mod guard;
mod logging;
mod run;
mod runner;
mod shutdown;

pub use filter::{FilterErrors, filter_errors};
pub use guard::{CatchPanic, catch_panic};
pub use logging::{LogErrors, log_errors};
pub use run::{run, run_with_grace};
pub use runner::{cancel_on_first_finish, cancel_on_first_finish_wait};
pub use shutdown::{token_with_signal, wait_for_shutdown_signal};
