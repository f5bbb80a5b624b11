//! Expiry Sweep Task
//!
//! Optional background task that periodically purges expired cache entries.
//! Without it, expired entries are reclaimed lazily on read or pushed out by
//! eviction.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::LruCache;

/// Spawns a task that calls [`LruCache::purge_expired`] every `interval`.
///
/// The task exits once `shutdown` is cancelled. The first sweep happens one
/// full interval after spawning.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(LruCache::new(1000)?);
/// let shutdown = CancellationToken::new();
/// let sweeper = spawn_expiry_sweeper(cache.clone(), Duration::from_secs(1), shutdown.clone());
/// // Later, during shutdown:
/// shutdown.cancel();
/// sweeper.await?;
/// ```
pub fn spawn_expiry_sweeper<K, V>(
    cache: Arc<LruCache<K, V>>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Starting expiry sweeper");

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Expiry sweeper stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let removed = cache.purge_expired();
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
