//! # Process bootstrap configuration.
//!
//! Provides [`Bootstrap`], the explicit settings the main driver applies at startup
//! instead of mutating process-wide state from library code.
//!
//! ## Sentinel values
//! - `worker_threads = 0` → one worker per available CPU
//! - `flush_timeout = 0s` → do not wait for the reporter to flush

use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Output format of the process logger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Startup settings for [`main`](crate::main) and [`main_cmd`](crate::main_cmd).
///
/// ## Field semantics
/// - `log_filter`: `tracing` filter directive, used when `RUST_LOG` is unset
/// - `log_format`: text or JSON output (always written to stderr)
/// - `worker_threads`: runtime worker count (`0` = number of CPUs)
/// - `flush_timeout`: how long to wait for the reporter before exit
/// - `verbose_lifecycle`: log "application started/finished" at `info` instead of `debug`
///   ([`main`](crate::main) only)
#[derive(Clone, Debug)]
pub struct Bootstrap {
    /// Default log filter directive.
    pub log_filter: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Number of runtime worker threads.
    ///
    /// - `0` = one per available CPU
    /// - `n > 0` = exactly `n`
    pub worker_threads: usize,

    /// Maximum time spent flushing the crash reporter on exit.
    pub flush_timeout: Duration,

    /// Whether [`main`](crate::main) logs lifecycle messages at `info`.
    pub verbose_lifecycle: bool,
}

impl Bootstrap {
    /// Settings for command-line tools: quiet lifecycle, warnings only by default.
    pub fn cmd() -> Self {
        Self {
            log_filter: "warn".to_string(),
            verbose_lifecycle: false,
            ..Self::default()
        }
    }

    /// Returns the effective worker count.
    #[inline]
    pub fn worker_threads_or_default(&self) -> usize {
        match self.worker_threads {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        }
    }

    /// Installs the global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over [`Bootstrap::log_filter`]. Returns `false` if a
    /// global subscriber was already installed (the existing one is kept).
    pub fn init_logging(&self) -> bool {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);

        let res = match self.log_format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        res.is_ok()
    }

    /// Builds the multi-thread runtime the process runs on.
    pub fn build_runtime(&self) -> std::io::Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.worker_threads_or_default())
            .enable_all()
            .build()
    }
}

impl Default for Bootstrap {
    /// Default configuration:
    ///
    /// - `log_filter = "info"`
    /// - `log_format = Text`
    /// - `worker_threads = 0` (one per CPU)
    /// - `flush_timeout = 2s`
    /// - `verbose_lifecycle = true`
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_format: LogFormat::Text,
            worker_threads: 0,
            flush_timeout: Duration::from_secs(2),
            verbose_lifecycle: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_threads_sentinel() {
        let mut b = Bootstrap::default();
        assert!(b.worker_threads_or_default() >= 1);
        b.worker_threads = 3;
        assert_eq!(b.worker_threads_or_default(), 3);
    }

    #[test]
    fn test_cmd_is_quiet() {
        let b = Bootstrap::cmd();
        assert_eq!(b.log_filter, "warn");
        assert!(!b.verbose_lifecycle);
        assert_eq!(b.flush_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_build_runtime() {
        let b = Bootstrap {
            worker_threads: 1,
            ..Bootstrap::default()
        };
        let rt = b.build_runtime().unwrap();
        assert_eq!(rt.block_on(async { 1 + 1 }), 2);
    }
}
