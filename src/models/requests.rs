//! Request DTOs for the datastore API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body carrying one text command, e.g. `{"command": "SET k v EX 10"}`
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    /// The raw command line
    pub command: String,
}

impl CommandRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.command.trim().is_empty() {
            return Some("Command cannot be empty".to_string());
        }
        None
    }
}
