//! Entry Module
//!
//! The value model: every key maps to either a scalar or a queue, each with
//! its own expiration policy.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

// == Entry ==
/// A single keyspace slot.
#[derive(Debug)]
pub enum Entry {
    Scalar(ScalarEntry),
    Queue(QueueEntry),
}

impl Entry {
    /// Creates a scalar entry expiring `ttl` from now, or never when `ttl` is None.
    pub fn scalar(value: String, ttl: Option<Duration>) -> Self {
        Entry::Scalar(ScalarEntry::new(value, ttl))
    }

    /// True for a scalar whose deadline has passed.
    ///
    /// Such an entry is logically absent and must be deleted by whoever
    /// observes it. Queues are never lazily absent.
    pub fn is_expired_scalar(&self) -> bool {
        matches!(self, Entry::Scalar(scalar) if scalar.is_expired())
    }

    /// True when the sweeper may delete this entry.
    pub fn is_sweepable(&self) -> bool {
        match self {
            Entry::Scalar(scalar) => scalar.is_expired(),
            Entry::Queue(queue) => !queue.has_live_items(),
        }
    }
}

// == Scalar Entry ==
#[derive(Debug, Clone)]
pub struct ScalarEntry {
    pub value: String,
    /// None = no expiration
    pub expires_at: Option<Instant>,
}

/// Deadline `ttl` from now. A TTL too large to represent never expires.
fn deadline_after(ttl: Duration) -> Option<Instant> {
    Instant::now().checked_add(ttl)
}

fn is_past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|expires| Instant::now() >= expires)
}

impl ScalarEntry {
    pub fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(deadline_after),
        }
    }

    /// Expired once the current time reaches the deadline.
    pub fn is_expired(&self) -> bool {
        is_past(self.expires_at)
    }
}

// == Queue Item ==
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub value: String,
    /// None when the configured lifetime overflows the clock
    pub expires_at: Option<Instant>,
}

impl QueueItem {
    pub fn is_expired(&self) -> bool {
        is_past(self.expires_at)
    }
}

// == Queue Entry ==
/// FIFO of values; the head is the oldest item.
#[derive(Debug, Default)]
pub struct QueueEntry {
    items: VecDeque<QueueItem>,
}

impl QueueEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value at the tail with a fixed lifetime.
    pub fn push(&mut self, value: String, lifetime: Duration) {
        self.items.push_back(QueueItem {
            value,
            expires_at: deadline_after(lifetime),
        });
    }

    /// Puts a value back at the head, ahead of everything queued after it.
    pub fn push_front(&mut self, value: String, lifetime: Duration) {
        self.items.push_front(QueueItem {
            value,
            expires_at: deadline_after(lifetime),
        });
    }

    /// Removes and returns the oldest live value.
    ///
    /// Expired items found at the head are dropped on the way.
    pub fn pop(&mut self) -> Option<String> {
        while let Some(item) = self.items.pop_front() {
            if !item.is_expired() {
                return Some(item.value);
            }
        }
        None
    }

    /// A reclaimed item pushed back at the head gets a fresh deadline, so
    /// every item is checked rather than only the tail.
    pub fn has_live_items(&self) -> bool {
        self.items.iter().any(|item| !item.is_expired())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_scalar_no_ttl_never_expires() {
        let entry = Entry::scalar("value".to_string(), None);

        assert!(matches!(entry, Entry::Scalar(_)));
        assert!(!entry.is_expired_scalar());
        assert!(!entry.is_sweepable());
    }

    #[test]
    fn test_scalar_expiration() {
        let entry = Entry::scalar("value".to_string(), Some(Duration::from_millis(50)));
        assert!(!entry.is_expired_scalar());

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired_scalar());
        assert!(entry.is_sweepable());
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let scalar = ScalarEntry::new("value".to_string(), Some(Duration::ZERO));
        assert!(scalar.is_expired(), "deadline equal to now counts as expired");
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let scalar = ScalarEntry::new("value".to_string(), Some(Duration::from_secs(u64::MAX)));
        assert!(scalar.expires_at.is_none());
        assert!(!scalar.is_expired());

        let mut queue = QueueEntry::new();
        queue.push("item".to_string(), Duration::MAX);
        assert!(queue.has_live_items());
        assert_eq!(queue.pop().as_deref(), Some("item"));
    }

    #[test]
    fn test_push_front_goes_ahead_of_queued_items() {
        let mut queue = QueueEntry::new();
        queue.push("later".to_string(), Duration::from_secs(60));
        queue.push_front("first".to_string(), Duration::from_secs(60));

        assert_eq!(queue.pop().as_deref(), Some("first"));
        assert_eq!(queue.pop().as_deref(), Some("later"));
    }

    #[test]
    fn test_queue_pops_head_first() {
        let mut queue = QueueEntry::new();
        queue.push("x".to_string(), Duration::from_secs(60));
        queue.push("y".to_string(), Duration::from_secs(60));

        assert_eq!(queue.pop().as_deref(), Some("x"));
        assert_eq!(queue.pop().as_deref(), Some("y"));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_skips_expired_head() {
        let mut queue = QueueEntry::new();
        queue.push("stale".to_string(), Duration::from_millis(10));
        sleep(Duration::from_millis(30));
        queue.push("fresh".to_string(), Duration::from_secs(60));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().as_deref(), Some("fresh"));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_empty_queue_is_sweepable_but_not_expired_scalar() {
        let entry = Entry::Queue(QueueEntry::new());

        assert!(!entry.is_expired_scalar());
        assert!(entry.is_sweepable());
    }

    #[test]
    fn test_queue_with_expired_items_is_sweepable() {
        let mut queue = QueueEntry::new();
        queue.push("a".to_string(), Duration::from_millis(10));
        let entry = Entry::Queue(queue);
        assert!(!entry.is_sweepable());

        sleep(Duration::from_millis(30));
        assert!(entry.is_sweepable());
    }
}
