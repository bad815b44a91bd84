//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (ctrl-c) or SIGTERM
//! - Wait for an in-process shutdown trigger
//! - Resolve once, whichever arrives first

use tokio::sync::broadcast;

/// Resolves when the process is asked to stop.
///
/// Passed to `axum::serve(..).with_graceful_shutdown`; in-flight requests
/// are allowed to finish after it resolves.
pub async fn shutdown_signal(mut trigger: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutdown signal received: ctrl-c"),
        _ = terminate => tracing::info!("Shutdown signal received: SIGTERM"),
        _ = trigger.recv() => tracing::info!("Shutdown triggered"),
    }
}
