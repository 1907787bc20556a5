use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {}", display_message(.message, .body))]
    BadRequest { message: Option<String>, body: String },

    #[error("Unauthorized - token may be expired")]
    Unauthorized { message: Option<String> },

    #[error("Access denied: {}", display_message(.message, .body))]
    AccessDenied { message: Option<String>, body: String },

    #[error("Resource not found: {}", display_message(.message, .body))]
    NotFound { message: Option<String>, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {}", display_message(.message, .body))]
    ServerError { message: Option<String>, body: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error bodies from the store look like `{"message": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn display_message<'a>(message: &'a Option<String>, body: &'a str) -> &'a str {
    message.as_deref().unwrap_or(body)
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the `message` field out of a JSON error body, if there is one
    fn extract_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        let body = Self::truncate_body(body);
        match status.as_u16() {
            400 | 422 => ApiError::BadRequest { message, body },
            401 => ApiError::Unauthorized { message },
            403 => ApiError::AccessDenied { message, body },
            404 => ApiError::NotFound { message, body },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { message, body },
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message.unwrap_or(body))),
        }
    }

    /// The message the server put in its error body, when it sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { message, .. }
            | ApiError::Unauthorized { message }
            | ApiError::AccessDenied { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::ServerError { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True when the request never got an HTTP response
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkError(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }

    /// Message suitable for showing to a user: the server's own message,
    /// a connection hint for transport failures, or `default`.
    pub fn user_message(&self, default: &str) -> String {
        if let Some(message) = self.server_message() {
            message.to_string()
        } else if self.is_network() {
            "Could not connect to the server.".to_string()
        } else {
            default.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_message() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"Validation failed"}"#);
        assert!(matches!(err, ApiError::BadRequest { .. }));
        assert_eq!(err.server_message(), Some("Validation failed"));
        assert_eq!(err.user_message("Failed to update transaction."), "Validation failed");
        assert_eq!(err.to_string(), "Bad request: Validation failed");
    }

    #[test]
    fn test_from_status_without_json_body_uses_default() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.user_message("Failed to delete transaction."), "Failed to delete transaction.");
        assert_eq!(err.to_string(), "Server error: <html>oops</html>");
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"message":"Not authorized, token failed"}"#),
            ApiError::Unauthorized { message: Some(_) }
        ));
        assert!(matches!(ApiError::from_status(StatusCode::NOT_FOUND, ""), ApiError::NotFound { .. }));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "short and stout"),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"message":"  "}"#);
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 520 total bytes)"));
    }
}
