//! Expiry Sweeper
//!
//! Background task that periodically compacts the keyspace. Lazy expiration
//! on read stays the source of truth; the sweep only reclaims memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::Store;

/// Spawns a background task that sweeps `store` every `interval`.
///
/// Each cycle takes the keyspace lock once. The returned handle is aborted
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Store::new(Duration::from_secs(86_400));
/// let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(10));
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper(store: Store, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let report = store.sweep_expired().await;

            if report.expired_entries > 0 || report.abandoned_waiters > 0 {
                info!(
                    "Expiry sweep: removed {} expired entries, {} abandoned waiters",
                    report.expired_entries, report.abandoned_waiters
                );
            } else {
                debug!("Expiry sweep: nothing to remove");
            }
        }
    })
}
