//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: removes expired scalars, drained queues and abandoned
//!   waiter registrations at the configured interval

mod sweeper;

pub use sweeper::spawn_sweeper;
