//! Background task appending every change notification to the change log.

use std::time::Duration;

use tokio::sync::broadcast;

use super::PostgresPersistence;
use crate::domain::ChangeBus;

/// Appends every notification published on `bus` to the `change_log`
/// table and prunes rows older than `cleanup_after_days` once an hour
/// (`0` keeps them forever).
///
/// Runs until the bus is closed.
pub async fn run_change_log(
    persistence: PostgresPersistence,
    bus: ChangeBus,
    cleanup_after_days: u64,
) {
    let mut rx = bus.subscribe();
    let mut cleanup = tokio::time::interval(Duration::from_secs(3600));

    loop {
        tokio::select! {
            change = rx.recv() => match change {
                Ok(change) => {
                    if let Err(err) = persistence.append_change(&change).await {
                        tracing::warn!(
                            error = %err,
                            match_id = %change.match_id,
                            "failed to append change log row"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "change log writer lagged behind change bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = cleanup.tick(), if cleanup_after_days > 0 => {
                match persistence.delete_old_changes(cleanup_after_days).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "pruned change log"),
                    Err(err) => tracing::warn!(error = %err, "change log cleanup failed"),
                }
            }
        }
    }

    tracing::debug!("change log writer stopped");
}
