//! Error types for the mini app client.

use thiserror::Error;

/// Body marker the backend sends when the account is administratively blocked.
pub const BLOCKED_DETAIL: &str = "User is blocked";

/// Result type alias for the mini app client.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Main error type for the mini app client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Transport-level failure, no response was received
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {}", http_message(.detail, .body))]
    Http {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    /// Launch context missing or not issued by the expected host
    #[error("Environment error: {message}")]
    Environment { message: String },

    /// Login exchange rejected
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Client-side form constraint violated
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Session persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration source errors
    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Session persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Serialization failed: {message}")]
    Serialization { message: String },

    #[error("Storage operation failed: {message}")]
    OperationFailed { message: String },
}

fn http_message<'a>(detail: &'a Option<String>, body: &'a str) -> &'a str {
    detail.as_deref().unwrap_or(body)
}

impl ClientError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new environment error
    pub fn environment(message: impl Into<String>) -> Self {
        Self::Environment {
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Build an HTTP error from a status and the raw response body.
    ///
    /// The `detail` field is extracted when the body is a JSON object carrying
    /// a string `detail`; any other body is kept only as text.
    pub fn from_response(status: u16, body: String) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("detail")
                    .and_then(|d| d.as_str())
                    .map(str::to_owned)
            });
        Self::Http {
            status,
            detail,
            body,
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `detail` field of the error body, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True for HTTP 403 responses.
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// True when the body carries the blocked-account marker, whatever the status.
    pub fn is_block_marker(&self) -> bool {
        self.detail() == Some(BLOCKED_DETAIL)
    }
}

impl StorageError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new operation failed error
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_extracted_from_json_body() {
        let err = ClientError::from_response(400, r#"{"detail":"User is blocked"}"#.to_string());
        assert_eq!(err.status(), Some(400));
        assert!(err.is_block_marker());
        assert!(!err.is_forbidden());
        assert_eq!(err.to_string(), "HTTP 400: User is blocked");
    }

    #[test]
    fn test_plain_body_kept_as_text() {
        let err = ClientError::from_response(502, "Bad Gateway".to_string());
        assert_eq!(err.detail(), None);
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_forbidden_without_marker() {
        let err = ClientError::from_response(403, r#"{"detail":"Not enough permissions"}"#.into());
        assert!(err.is_forbidden());
        assert!(!err.is_block_marker());
    }

    #[test]
    fn test_non_string_detail_ignored() {
        let err = ClientError::from_response(422, r#"{"detail":[{"loc":["body"]}]}"#.into());
        assert_eq!(err.detail(), None);
    }
}
