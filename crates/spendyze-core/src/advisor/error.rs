use serde_json::{json, Value};
use thiserror::Error;

/// A failed advisor request, as the HTTP status and message the route
/// answers with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AdvisorError {
    pub fn status(&self) -> u16 {
        match self {
            AdvisorError::BadRequest(_) => 400,
            AdvisorError::Internal(_) => 500,
        }
    }

    /// JSON error body: `{"message": "..."}`
    pub fn body(&self) -> Value {
        json!({ "message": self.to_string() })
    }
}
