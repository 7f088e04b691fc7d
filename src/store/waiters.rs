//! Waiter Registry
//!
//! Per-key FIFO of callers suspended in a blocking pop. Each waiter owns the
//! receiving half of a oneshot channel and is completed exactly once: by a
//! push handing it a value, by deregistration after its deadline, or by the
//! registry being closed.
//!
//! The registry has no lock of its own. It lives inside the keyspace so that
//! registration, delivery and cancellation are serialized with every other
//! operation on the same key.

use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

/// Identifies one registration so it can be cancelled after a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterId(u64);

#[derive(Debug)]
struct Waiter {
    id: WaiterId,
    tx: oneshot::Sender<String>,
}

#[derive(Debug, Default)]
pub struct WaiterRegistry {
    next_id: u64,
    pending: HashMap<String, VecDeque<Waiter>>,
}

impl WaiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a new waiter behind any existing ones on `key`.
    pub fn register(&mut self, key: &str) -> (WaiterId, oneshot::Receiver<String>) {
        let (tx, rx) = oneshot::channel();
        let id = WaiterId(self.next_id);
        self.next_id += 1;

        self.pending
            .entry(key.to_string())
            .or_default()
            .push_back(Waiter { id, tx });

        (id, rx)
    }

    /// Hands `value` to the oldest waiter still listening on `key`.
    ///
    /// Waiters whose receiver is gone are discarded. Returns the value back
    /// when nobody took it.
    pub fn deliver(&mut self, key: &str, value: String) -> Result<(), String> {
        let Some(waiters) = self.pending.get_mut(key) else {
            return Err(value);
        };

        let mut value = value;
        let outcome = loop {
            match waiters.pop_front() {
                Some(waiter) => match waiter.tx.send(value) {
                    Ok(()) => break Ok(()),
                    Err(returned) => value = returned,
                },
                None => break Err(value),
            }
        };

        if waiters.is_empty() {
            self.pending.remove(key);
        }
        outcome
    }

    /// Removes a registration. Returns false if it was already completed.
    pub fn cancel(&mut self, key: &str, id: WaiterId) -> bool {
        let Some(waiters) = self.pending.get_mut(key) else {
            return false;
        };

        let before = waiters.len();
        waiters.retain(|waiter| waiter.id != id);
        let removed = waiters.len() != before;

        if waiters.is_empty() {
            self.pending.remove(key);
        }
        removed
    }

    /// Drops registrations whose caller went away without cancelling.
    pub fn prune(&mut self) -> usize {
        let mut pruned = 0;
        self.pending.retain(|_, waiters| {
            let before = waiters.len();
            waiters.retain(|waiter| !waiter.tx.is_closed());
            pruned += before - waiters.len();
            !waiters.is_empty()
        });
        pruned
    }

    /// Releases every waiter. Their receivers observe a closed channel.
    pub fn close_all(&mut self) -> usize {
        let released = self.len();
        self.pending.clear();
        released
    }

    // == Introspection ==
    /// Number of registrations pending on `key`.
    pub fn waiting_on(&self, key: &str) -> usize {
        self.pending.get(key).map_or(0, VecDeque::len)
    }

    /// Total registrations across all keys, including ones whose caller has
    /// gone away but which no push or sweep has pruned yet.
    pub fn len(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }

    /// True when no key has a pending registration.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_without_waiters_returns_value() {
        let mut registry = WaiterRegistry::new();
        assert_eq!(registry.deliver("q", "v".to_string()), Err("v".to_string()));
    }

    #[test]
    fn test_deliver_serves_oldest_waiter_first() {
        let mut registry = WaiterRegistry::new();
        let (_, mut first) = registry.register("q");
        let (_, mut second) = registry.register("q");

        registry.deliver("q", "a".to_string()).unwrap();
        registry.deliver("q", "b".to_string()).unwrap();

        assert_eq!(first.try_recv().unwrap(), "a");
        assert_eq!(second.try_recv().unwrap(), "b");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_deliver_skips_dropped_receivers() {
        let mut registry = WaiterRegistry::new();
        let (_, gone) = registry.register("q");
        let (_, mut alive) = registry.register("q");
        drop(gone);

        registry.deliver("q", "a".to_string()).unwrap();

        assert_eq!(alive.try_recv().unwrap(), "a");
        assert_eq!(registry.waiting_on("q"), 0);
    }

    #[test]
    fn test_cancel_removes_only_that_waiter() {
        let mut registry = WaiterRegistry::new();
        let (first_id, _first) = registry.register("q");
        let (_, mut second) = registry.register("q");

        assert!(registry.cancel("q", first_id));
        assert!(!registry.cancel("q", first_id));
        assert_eq!(registry.waiting_on("q"), 1);

        registry.deliver("q", "a".to_string()).unwrap();
        assert_eq!(second.try_recv().unwrap(), "a");
    }

    #[test]
    fn test_cancel_after_delivery_reports_completed() {
        let mut registry = WaiterRegistry::new();
        let (id, mut rx) = registry.register("q");

        registry.deliver("q", "a".to_string()).unwrap();

        assert!(!registry.cancel("q", id));
        assert_eq!(rx.try_recv().unwrap(), "a");
    }

    #[test]
    fn test_prune_and_close_all() {
        let mut registry = WaiterRegistry::new();
        let (_, dropped) = registry.register("a");
        let (_, mut kept) = registry.register("b");
        drop(dropped);

        assert_eq!(registry.prune(), 1);
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.close_all(), 1);
        assert!(registry.is_empty());
        assert!(kept.try_recv().is_err());
    }
}
