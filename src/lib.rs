//! kv-datastore - An in-memory key-value store
//!
//! Holds TTL scalars and FIFO queues in one keyspace, with conditional SET
//! and a blocking queue pop.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{SetCondition, Store};
pub use tasks::spawn_sweeper;
