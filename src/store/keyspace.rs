//! Keyspace Module
//!
//! The map from key to entry plus the waiter registry. Every method takes
//! `&mut self`; the `Store` handle wraps a keyspace in a single mutex so each
//! call is one atomic step.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::store::entry::{Entry, QueueEntry};
use crate::store::waiters::{WaiterId, WaiterRegistry};
use crate::store::SetCondition;

// == Sweep Report ==
/// What one sweep cycle removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_entries: usize,
    pub abandoned_waiters: usize,
}

// == Keyspace ==
#[derive(Debug)]
pub struct Keyspace {
    entries: HashMap<String, Entry>,
    waiters: WaiterRegistry,
    /// Lifetime given to each pushed queue item
    queue_item_ttl: Duration,
    /// Set once on shutdown; no new waiters are accepted afterwards
    closed: bool,
}

impl Keyspace {
    // == Constructor ==
    pub fn new(queue_item_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            waiters: WaiterRegistry::new(),
            queue_item_ttl,
            closed: false,
        }
    }

    // == Lazy Expiration ==
    /// Returns the live entry for `key`, deleting it first if it is an
    /// expired scalar.
    fn live_entry(&mut self, key: &str) -> Option<&mut Entry> {
        if self.entries.get(key).is_some_and(Entry::is_expired_scalar) {
            self.entries.remove(key);
            debug!(key, "lazily expired scalar");
            return None;
        }
        self.entries.get_mut(key)
    }

    /// Existence check with lazy expiration applied.
    pub fn contains_key(&mut self, key: &str) -> bool {
        self.live_entry(key).is_some()
    }

    // == Set ==
    /// Writes a scalar if `condition` holds for the current state of `key`.
    ///
    /// Returns false, writing nothing, when the condition fails. A queue
    /// counts as present and is replaced by the scalar on success.
    pub fn set(
        &mut self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
        condition: SetCondition,
    ) -> bool {
        let exists = self.contains_key(key);
        if !condition.allows(exists) {
            return false;
        }

        self.entries
            .insert(key.to_string(), Entry::scalar(value, ttl));
        true
    }

    // == Get ==
    pub fn get(&mut self, key: &str) -> Result<String> {
        match self.live_entry(key) {
            Some(Entry::Scalar(scalar)) => Ok(scalar.value.clone()),
            Some(Entry::Queue(_)) => Err(StoreError::TypeMismatch(key.to_string())),
            None => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    // == Queue Push ==
    /// Appends `values` in order, handing each one to the oldest pending
    /// waiter on `key` before falling back to the queue itself.
    ///
    /// Returns how many values went straight to waiters.
    pub fn queue_push(&mut self, key: &str, values: Vec<String>) -> Result<usize> {
        if values.is_empty() {
            return Err(StoreError::InvalidRequest(
                "qpush requires at least one value".to_string(),
            ));
        }

        let ttl = self.queue_item_ttl;
        if self.live_entry(key).is_none() {
            self.entries
                .insert(key.to_string(), Entry::Queue(QueueEntry::new()));
        }

        let Some(Entry::Queue(queue)) = self.entries.get_mut(key) else {
            return Err(StoreError::TypeMismatch(key.to_string()));
        };

        let mut handed_off = 0;
        for value in values {
            match self.waiters.deliver(key, value) {
                Ok(()) => handed_off += 1,
                Err(value) => queue.push(value, ttl),
            }
        }

        if handed_off > 0 {
            debug!(key, handed_off, "woke blocked poppers");
        }
        Ok(handed_off)
    }

    // == Queue Pop ==
    /// Removes the head of the queue at `key`.
    pub fn queue_pop(&mut self, key: &str) -> Result<String> {
        match self.live_entry(key) {
            Some(Entry::Queue(queue)) => queue
                .pop()
                .ok_or_else(|| StoreError::QueueEmpty(key.to_string())),
            Some(Entry::Scalar(_)) => Err(StoreError::TypeMismatch(key.to_string())),
            None => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    // == Reclaim ==
    /// Takes back a value that was handed to a waiter who went away before
    /// reading it. The next waiter gets it if one is listening, otherwise it
    /// returns to the head of the queue.
    ///
    /// Returns false if the key has since become a scalar and the value had
    /// nowhere to go.
    pub fn reclaim(&mut self, key: &str, value: String) -> bool {
        let value = match self.waiters.deliver(key, value) {
            Ok(()) => return true,
            Err(value) => value,
        };

        let ttl = self.queue_item_ttl;
        if self.live_entry(key).is_none() {
            self.entries
                .insert(key.to_string(), Entry::Queue(QueueEntry::new()));
        }

        match self.entries.get_mut(key) {
            Some(Entry::Queue(queue)) => {
                queue.push_front(value, ttl);
                debug!(key, "reclaimed value from abandoned pop");
                true
            }
            _ => {
                warn!(key, "discarding reclaimed value, key now holds a scalar");
                false
            }
        }
    }

    // == Waiters ==
    /// Registers interest in the next value pushed to `key`.
    ///
    /// Returns None once the keyspace is closed.
    pub fn register_waiter(&mut self, key: &str) -> Option<(WaiterId, oneshot::Receiver<String>)> {
        if self.closed {
            return None;
        }
        Some(self.waiters.register(key))
    }

    pub fn cancel_waiter(&mut self, key: &str, id: WaiterId) -> bool {
        self.waiters.cancel(key, id)
    }

    pub fn waiting_on(&self, key: &str) -> usize {
        self.waiters.waiting_on(key)
    }

    /// Releases every pending waiter and refuses new ones.
    pub fn close(&mut self) -> usize {
        self.closed = true;
        self.waiters.close_all()
    }

    // == Cleanup Expired ==
    /// Deletes expired scalars and queues without live items, and drops
    /// waiter registrations whose caller has gone away.
    pub fn cleanup_expired(&mut self) -> SweepReport {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_sweepable());

        SweepReport {
            expired_entries: before - self.entries.len(),
            abandoned_waiters: self.waiters.prune(),
        }
    }

    // == Length ==
    /// Number of physically stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
