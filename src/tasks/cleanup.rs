//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//! Reads already ignore stale entries; the sweep only bounds memory held
//! by keys that are never requested again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::EntityCache;

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// Returns the task handle so it can be aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = EntityCache::new();
/// let sweep = spawn_cleanup_task(cache.clone(), Duration::from_secs(600));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task(cache: EntityCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs_f64(), "Starting TTL sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
