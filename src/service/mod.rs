//! # Service layer.
//!
//! - [`Application`] / [`Runnable`] - units of business logic
//! - [`Service`] - runs an application and applies the reporting policy
//! - [`Options`] - exclusion policy (which errors are not reported)
//! - [`CrashReporter`] - reporting sink, with [`LogReporter`] built in

mod application;
mod options;
mod reporter;
#[allow(clippy::module_inception)]
mod service;

pub use application::{Application, Runnable};
pub use options::{ExcludeError, ExcludeErrors, Options, OptionsBuilder, OptionsFn, is_error, is_kind};
pub use reporter::{CrashReporter, Dsn, EventHint, LogReporter, ReportId, ReporterConfig, ReporterRef};
pub use service::{APPLICATION_FAILED, Service};
