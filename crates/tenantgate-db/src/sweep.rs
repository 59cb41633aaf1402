//! Background expiry sweep for the session store.

use std::sync::Arc;
use std::time::Duration;

use tenantgate_core::repository::SessionStore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Spawn a task deleting sessions untouched for longer than `max_age`,
/// once every `period`, until `shutdown` is cancelled.
///
/// The first sweep runs one full `period` after spawning. Failures are
/// logged and the next tick tries again.
pub fn spawn_session_sweep<S>(
    store: Arc<S>,
    period: Duration,
    max_age: chrono::Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    S: SessionStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Session sweep stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match store.cleanup_expired(max_age).await {
                        Ok(0) => {}
                        Ok(removed) => info!(removed, "Expired sessions removed"),
                        Err(e) => warn!(error = %e, "Session sweep failed"),
                    }
                }
            }
        }
    })
}
