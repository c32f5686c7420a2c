//! Error types for postmark-transport.

use thiserror::Error;

/// Errors that can occur when building or sending a message.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// No transport has been configured and none could be created from the environment.
    #[error("Mail transport not configured")]
    NotConfigured,

    /// Configuration error (missing env var, invalid value, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing required field (e.g., from address).
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Invalid email address format.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Attachment file not found.
    #[error("Attachment file not found: {0}")]
    AttachmentFileNotFound(String),

    /// Failed to read attachment file.
    #[error("Failed to read attachment: {0}")]
    AttachmentReadError(String),

    /// The HTTP call to the delivery API failed.
    ///
    /// `status` is set when the API answered with a non-2xx response and is
    /// `None` for network-level failures.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        /// Optional HTTP status code
        status: Option<u16>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl MailError {
    /// Create a transport error for a network-level failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Create a transport error for a rejected HTTP status.
    pub fn transport_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Transport {
            message: message.into(),
            status: Some(status),
        }
    }

    /// HTTP status attached to a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_status() {
        let err = MailError::transport_with_status("[300] Invalid email request", 422);
        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.to_string(),
            "Transport error: [300] Invalid email request"
        );

        let err = MailError::transport("connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_missing_field_message() {
        let err = MailError::MissingField("from");
        assert_eq!(err.to_string(), "Missing required field: from");
        assert_eq!(err.status(), None);
    }
}
