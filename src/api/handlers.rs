//! API Handlers
//!
//! HTTP request handlers. Each command handler parses the text command in the
//! JSON body, runs it against the store and maps the outcome to a response.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::api::command::{Command, Outcome};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::models::{CommandRequest, HealthResponse, MessageResponse, ValueResponse};
use crate::store::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared store handle
    pub store: Store,
}

impl AppState {
    /// Creates a new AppState with the given store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Store::from_config(config))
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Stored(key) => (StatusCode::OK, Json(MessageResponse::stored(&key))).into_response(),
            Outcome::ConditionNotMet => {
                (StatusCode::CONFLICT, Json(MessageResponse::condition_not_met())).into_response()
            }
            Outcome::Pushed => (StatusCode::OK, Json(MessageResponse::pushed())).into_response(),
            Outcome::Value(value) => Json(ValueResponse::new(Some(value))).into_response(),
            Outcome::MaybeValue(value) => Json(ValueResponse::new(value)).into_response(),
        }
    }
}

/// Parses the request and checks the verb belongs to this endpoint.
fn parse_request(req: &CommandRequest, writes: bool) -> Result<Command> {
    if let Some(error_msg) = req.validate() {
        return Err(StoreError::InvalidRequest(error_msg));
    }

    let command = Command::parse(&req.command)?;
    if command.is_write() != writes {
        return Err(StoreError::InvalidRequest("invalid command".to_string()));
    }
    Ok(command)
}

/// Handler for POST /
///
/// Runs write commands: SET and QPUSH.
pub async fn write_command_handler(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Outcome> {
    let command = parse_request(&req, true)?;
    debug!(?command, "write command");

    command.execute(&state.store).await
}

/// Handler for GET /
///
/// Runs read commands: GET, QPOP and BQPOP. BQPOP holds the request open
/// until a value arrives or its timeout passes.
pub async fn read_command_handler(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Outcome> {
    let command = parse_request(&req, false)?;
    debug!(?command, "read command");

    command.execute(&state.store).await
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(Store::new(Duration::from_secs(60)))
    }

    fn request(command: &str) -> Json<CommandRequest> {
        Json(CommandRequest {
            command: command.to_string(),
        })
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = state();

        let outcome = write_command_handler(State(state.clone()), request("SET k v")).await;
        assert_eq!(outcome.unwrap(), Outcome::Stored("k".to_string()));

        let outcome = read_command_handler(State(state), request("GET k")).await;
        assert_eq!(outcome.unwrap(), Outcome::Value("v".to_string()));
    }

    #[tokio::test]
    async fn test_verb_on_wrong_endpoint() {
        let state = state();

        let result = read_command_handler(State(state.clone()), request("SET k v")).await;
        assert_eq!(result, Err(StoreError::InvalidRequest("invalid command".to_string())));

        let result = write_command_handler(State(state), request("QPOP q")).await;
        assert_eq!(result, Err(StoreError::InvalidRequest("invalid command".to_string())));
    }

    #[tokio::test]
    async fn test_queue_errors_are_distinct() {
        let state = state();

        let result = read_command_handler(State(state.clone()), request("QPOP q")).await;
        assert!(matches!(result, Err(StoreError::KeyNotFound(_))));

        write_command_handler(State(state.clone()), request("QPUSH q a")).await.unwrap();
        read_command_handler(State(state.clone()), request("QPOP q")).await.unwrap();

        let result = read_command_handler(State(state), request("QPOP q")).await;
        assert!(matches!(result, Err(StoreError::QueueEmpty(_))));
    }

    #[tokio::test]
    async fn test_condition_not_met_is_conflict() {
        let response = Outcome::ConditionNotMet.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
