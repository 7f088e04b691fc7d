//! API Module
//!
//! HTTP handlers and routing for the datastore.
//!
//! # Endpoints
//! - `POST /` - Run a write command (`SET`, `QPUSH`)
//! - `GET /` - Run a read command (`GET`, `QPOP`, `BQPOP`)
//! - `GET /health` - Health check endpoint
//!
//! Both command endpoints take a JSON body `{"command": "VERB key [args...]"}`.

pub mod command;
pub mod handlers;
pub mod routes;

pub use command::{Command, Outcome};
pub use handlers::*;
pub use routes::create_router;
