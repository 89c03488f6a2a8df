//! Shutdown Controller: waits for SIGINT/SIGTERM, tells the coordinator to
//! wind down, and bounds how long it waits for that to finish.

use crate::coordinator::Envelope;
use std::time::Duration;
use tokio::sync::mpsc;

/// Waits for a termination signal, then enqueues [`Envelope::Shutdown`] onto
/// the coordinator mailbox. Returns once the signal has fired — the caller
/// is expected to be racing this future against the coordinator's own `run`
/// future and to stop accepting new connections as soon as it resolves.
pub async fn wait_for_signal(mailbox: mpsc::UnboundedSender<Envelope>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received");
    let _ = mailbox.send(Envelope::Shutdown);
}

/// Gives the coordinator's own shutdown handling (broadcast + in-flight
/// cascades) a bounded window to finish before the process exits, matching
/// `close_timeout_sec`.
pub async fn drain(coordinator_task: tokio::task::JoinHandle<()>, close_timeout: Duration) {
    if tokio::time::timeout(close_timeout, coordinator_task).await.is_err() {
        tracing::warn!("coordinator did not finish draining within close_timeout_sec");
    }
}
