//! Error types for the datastore
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Unified error type for store operations and the command adapter.
///
/// A failed NX/XX condition is not an error (`Store::set` returns `false`),
/// and a blocking pop timing out is `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Key does not exist (or held an expired scalar)
    #[error("key not found")]
    KeyNotFound(String),

    /// Key holds a queue with no live items
    #[error("queue is empty")]
    QueueEmpty(String),

    /// Scalar operation on a queue, or queue operation on a scalar
    #[error("wrong type for key: {0}")]
    TypeMismatch(String),

    /// Malformed command or arguments
    #[error("{0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::KeyNotFound(_) | StoreError::QueueEmpty(_) => StatusCode::NOT_FOUND,
            StoreError::TypeMismatch(_) => StatusCode::CONFLICT,
            StoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the datastore.
pub type Result<T> = std::result::Result<T, StoreError>;
