//! # Cross-platform OS signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], an async helper that completes when the process
//! receives a termination signal, and [`token_with_signal`], which ties a
//! [`CancellationToken`] to it.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in a terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Waits for a termination signal and returns its name.
///
/// Listeners are registered on every call. An `Err` means registration failed and
/// no signal will be observed through this call.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Waits for Ctrl-C and returns its name.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl_c")
}

/// Returns a child of `parent` that is cancelled when a termination signal arrives.
///
/// The listener exits as soon as the returned token is cancelled by any other path.
/// If signal registration fails the token is left alone and only follows `parent`.
///
/// Must be called from within a tokio runtime.
pub fn token_with_signal(parent: &CancellationToken) -> CancellationToken {
    let token = parent.child_token();
    let listener = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => match res {
                Ok(signal) => {
                    debug!(signal, "got shutdown signal; cancelling");
                    listener.cancel();
                }
                Err(err) => warn!(error = %err, "signal registration failed"),
            },
            _ = listener.cancelled() => {}
        }
    });
    token
}
