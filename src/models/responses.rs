//! Response DTOs for the datastore API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for write commands (SET, QPUSH)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// SET wrote the value
    pub fn stored(key: &str) -> Self {
        Self::new(format!("value set for key: {}", key))
    }

    /// SET skipped by its NX/XX condition
    pub fn condition_not_met() -> Self {
        Self::new("Already satisfies condition for NX or XX")
    }

    pub fn pushed() -> Self {
        Self::new("values pushed to queue")
    }
}

/// Response body for read commands (GET, QPOP, BQPOP)
///
/// `value` is null when a blocking pop timed out.
#[derive(Debug, Clone, Serialize)]
pub struct ValueResponse {
    pub value: Option<String>,
}

impl ValueResponse {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
