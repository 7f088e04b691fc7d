//! Store Module
//!
//! In-memory keyspace holding TTL scalars and FIFO queues, with a blocking
//! pop backed by a per-key waiter registry.

mod engine;
mod entry;
mod keyspace;
mod waiters;


use std::str::FromStr;

use crate::error::StoreError;

// Re-export public types
pub use engine::Store;
pub use entry::{Entry, QueueEntry, QueueItem, ScalarEntry};
pub use keyspace::{Keyspace, SweepReport};
pub use waiters::{WaiterId, WaiterRegistry};

// == Set Condition ==
/// Existence precondition for a SET.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetCondition {
    /// Unconditional write
    #[default]
    Always,
    /// `NX`: only if the key is absent
    IfAbsent,
    /// `XX`: only if the key is present
    IfPresent,
}

impl SetCondition {
    /// Whether a write may proceed given the key's current existence.
    pub fn allows(self, exists: bool) -> bool {
        match self {
            SetCondition::Always => true,
            SetCondition::IfAbsent => !exists,
            SetCondition::IfPresent => exists,
        }
    }
}

impl FromStr for SetCondition {
    type Err = StoreError;

    /// Accepts `""`, `NX` and `XX` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Ok(SetCondition::Always)
        } else if s.eq_ignore_ascii_case("NX") {
            Ok(SetCondition::IfAbsent)
        } else if s.eq_ignore_ascii_case("XX") {
            Ok(SetCondition::IfPresent)
        } else {
            Err(StoreError::InvalidRequest("invalid command".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_parse_case_insensitive() {
        assert_eq!("".parse::<SetCondition>().unwrap(), SetCondition::Always);
        assert_eq!("nx".parse::<SetCondition>().unwrap(), SetCondition::IfAbsent);
        assert_eq!("Xx".parse::<SetCondition>().unwrap(), SetCondition::IfPresent);
        assert!("EX".parse::<SetCondition>().is_err());
    }

    #[test]
    fn test_condition_allows() {
        assert!(SetCondition::Always.allows(true));
        assert!(SetCondition::Always.allows(false));
        assert!(SetCondition::IfAbsent.allows(false));
        assert!(!SetCondition::IfAbsent.allows(true));
        assert!(SetCondition::IfPresent.allows(true));
        assert!(!SetCondition::IfPresent.allows(false));
    }
}
