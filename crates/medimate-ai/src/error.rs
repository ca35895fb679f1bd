//! Error types for the consultation client

use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Export(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the request never reached the backend.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            ClientError::Http(err) => err.is_connect() || err.is_timeout(),
            _ => false,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_exposes_code() {
        let err = ClientError::Status {
            status: 503,
            message: "No AI chat service is available.".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_connection_failure());
        assert_eq!(
            err.to_string(),
            "Backend returned status 503: No AI chat service is available."
        );
    }

    #[test]
    fn export_error_displays_message_verbatim() {
        let err = ClientError::Export("PDF export is disabled.".to_string());
        assert_eq!(err.to_string(), "PDF export is disabled.");
        assert_eq!(err.status(), None);
    }
}
