//! Store Handle
//!
//! Cloneable, thread-safe handle around a `Keyspace`. This is the surface the
//! HTTP layer and the sweeper talk to.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::store::keyspace::{Keyspace, SweepReport};
use crate::store::SetCondition;

// == Pending Pop ==
/// A registered blocking pop.
///
/// If the caller's future is dropped after a push handed it a value but
/// before the value was read, dropping this guard gives the value back to the
/// keyspace instead of losing it.
struct PendingPop {
    inner: Arc<Mutex<Keyspace>>,
    key: String,
    rx: oneshot::Receiver<String>,
}

impl PendingPop {
    fn new(inner: Arc<Mutex<Keyspace>>, key: &str, rx: oneshot::Receiver<String>) -> Self {
        Self {
            inner,
            key: key.to_string(),
            rx,
        }
    }
}

impl Drop for PendingPop {
    fn drop(&mut self) {
        // Closing first means no push can hand this waiter anything new.
        self.rx.close();
        let Ok(value) = self.rx.try_recv() else {
            return;
        };

        match self.inner.try_lock() {
            Ok(mut keyspace) => {
                keyspace.reclaim(&self.key, value);
            }
            Err(_) => match Handle::try_current() {
                Ok(handle) => {
                    let inner = Arc::clone(&self.inner);
                    let key = std::mem::take(&mut self.key);
                    handle.spawn(async move {
                        inner.lock().await.reclaim(&key, value);
                    });
                }
                Err(_) => {
                    self.inner.blocking_lock().reclaim(&self.key, value);
                }
            },
        }
    }
}

// == Store ==
/// Shared handle to one keyspace. Clones refer to the same data.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<Mutex<Keyspace>>,
}

impl Store {
    // == Constructor ==
    /// Creates an empty store whose queue items live for `queue_item_ttl`.
    pub fn new(queue_item_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Keyspace::new(queue_item_ttl))),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.queue_item_lifetime())
    }

    // == Set ==
    /// Conditionally writes a scalar. Returns false when `condition` fails.
    pub async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
        condition: SetCondition,
    ) -> bool {
        self.inner.lock().await.set(key, value, ttl, condition)
    }

    // == Get ==
    pub async fn get(&self, key: &str) -> Result<String> {
        self.inner.lock().await.get(key)
    }

    // == Queue Push ==
    pub async fn queue_push(&self, key: &str, values: Vec<String>) -> Result<()> {
        self.inner.lock().await.queue_push(key, values).map(|_| ())
    }

    // == Queue Pop ==
    /// Non-blocking pop from the head of the queue.
    pub async fn queue_pop(&self, key: &str) -> Result<String> {
        self.inner.lock().await.queue_pop(key)
    }

    // == Blocking Queue Pop ==
    /// Pops the head of the queue at `key`, waiting up to `timeout` for a
    /// push if there is nothing to take.
    ///
    /// `Ok(None)` means nothing arrived in time or the store shut down. A
    /// zero timeout never waits. An absent key is waited on like an empty
    /// queue, so the first push to it can satisfy the caller.
    pub async fn blocking_queue_pop(&self, key: &str, timeout: Duration) -> Result<Option<String>> {
        let (id, mut pending) = {
            let mut keyspace = self.inner.lock().await;
            match keyspace.queue_pop(key) {
                Ok(value) => return Ok(Some(value)),
                Err(StoreError::KeyNotFound(_)) | Err(StoreError::QueueEmpty(_)) => {}
                Err(err) => return Err(err),
            }

            if timeout.is_zero() {
                return Ok(None);
            }
            match keyspace.register_waiter(key) {
                Some((id, rx)) => (id, PendingPop::new(self.inner.clone(), key, rx)),
                None => return Ok(None),
            }
        };

        match tokio::time::timeout(timeout, &mut pending.rx).await {
            Ok(Ok(value)) => Ok(Some(value)),
            // Sender dropped: the store was shut down
            Ok(Err(_)) => Ok(None),
            Err(_) => {
                let mut keyspace = self.inner.lock().await;
                if keyspace.cancel_waiter(key, id) {
                    debug!(key, "blocking pop timed out");
                    return Ok(None);
                }
                drop(keyspace);
                // A push claimed this waiter before the deregistration.
                Ok(pending.rx.try_recv().ok())
            }
        }
    }

    // == Sweep ==
    /// Runs one expiry sweep under the keyspace lock.
    pub async fn sweep_expired(&self) -> SweepReport {
        self.inner.lock().await.cleanup_expired()
    }

    // == Shutdown ==
    /// Releases every pending blocking pop with an empty result. Later
    /// blocking pops return immediately.
    pub async fn shutdown(&self) {
        let released = self.inner.lock().await.close();
        info!("Store shut down, released {} pending waiters", released);
    }

    // == Introspection ==
    /// Number of physically stored entries, including not yet swept ones.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Existence check with lazy expiration applied.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().await.contains_key(key)
    }

    /// Number of callers currently blocked on `key`.
    pub async fn waiting_on(&self, key: &str) -> usize {
        self.inner.lock().await.waiting_on(key)
    }
}
