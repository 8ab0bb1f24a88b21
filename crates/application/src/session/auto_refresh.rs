use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::store::{Reconciled, SessionStore};

/// Default period between background reloads
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Reload the store every `period` until cancelled or the store shuts down
///
/// Reloads fire regardless of what the operator is doing. Overlap with
/// manual reloads is harmless because the store discards stale responses.
pub fn spawn_auto_refresh(
    store: Arc<SessionStore>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs(), "Auto-refresh started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if store.is_shut_down() {
                        break;
                    }
                    match store.load().await {
                        Ok(Reconciled::Applied) => {
                            let inside = store.inside_count().await;
                            let total = store.total_count().await;
                            info!(inside, total, "Auto-refresh applied");
                        }
                        Ok(Reconciled::Discarded) => debug!("Auto-refresh superseded"),
                        Err(e) => warn!(error = %e, "Auto-refresh failed"),
                    }
                }
            }
        }

        info!("Auto-refresh stopped");
    })
}
