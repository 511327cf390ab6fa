use std::fmt::Display;
use std::future::Future;
use tracing::{error, info};

pub async fn shutdown_signal() {
    let ctrl_c = wait_for_signal("Ctrl+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for_signal("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Resolves when the signal arrives. A handler that cannot be installed never
/// resolves, so the server keeps running on the remaining signal.
async fn wait_for_signal<E, F>(name: &str, signal: F)
where
    E: Display,
    F: Future<Output = Result<(), E>>,
{
    if let Err(e) = signal.await {
        error!("Failed to install {name} handler: {e}");
        std::future::pending::<()>().await;
    }
}
