use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info};

use super::TaskStore;

/// Shortest pause between two sweeps
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically purge terminal tasks older than `ttl`
///
/// The sweeper runs until the returned handle is aborted. Intervals shorter
/// than one second are raised to one second.
pub fn spawn_retention_sweeper(
    store: Arc<TaskStore>,
    ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let purged = store.purge_terminal_older_than(ttl);
            if purged > 0 {
                info!(purged, remaining = store.len(), "purged expired tasks");
            } else {
                debug!("retention sweep found nothing to purge");
            }
        }
    })
}
