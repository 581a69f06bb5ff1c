//! Signal-driven cancellation.

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Derive a token from `parent` that cancels when the process receives
/// SIGINT or SIGTERM. The watcher task exits once the token cancels,
/// whichever side triggers it.
pub fn cancel_on_signals(parent: &CancellationToken) -> std::io::Result<CancellationToken> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let token = parent.child_token();
    let watcher = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = interrupt.recv() => {
                info!("interrupt received, shutting down");
                watcher.cancel();
            }
            _ = terminate.recv() => {
                info!("termination requested, shutting down");
                watcher.cancel();
            }
            _ = watcher.cancelled() => {}
        }
    });
    Ok(token)
}
