//! Process-level helpers.

use tokio::signal;
use tracing::warn;

/// Resolve once the process receives Ctrl+C or (on Unix) SIGTERM.
///
/// Handed to `axum::serve` as the graceful-shutdown trigger: in-flight
/// requests drain, new connections stop being accepted.
///
/// # Panics
///
/// Panics if a signal handler cannot be installed; without one the process
/// could never be stopped cleanly, so refusing to start is the safer failure.
pub async fn shutdown_signal() {
    #[allow(clippy::expect_used)]
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        "Ctrl+C"
    };

    #[cfg(unix)]
    #[allow(clippy::expect_used)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let signal = tokio::select! {
        s = ctrl_c => s,
        s = terminate => s,
    };
    warn!("Received {signal}, shutting down");
}
