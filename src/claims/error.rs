//! Claims error types
//!
//! Errors raised by the transport and by the claim operations built on it.

use thiserror::Error;

use super::validation::{summarize_rejections, FileRejection};

/// Errors that can occur when talking to the claims API
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Claims API unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Failed to read attachment {name}: {error}")]
    Attachment { name: String, error: String },
}

impl TransportError {
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Unavailable
        } else {
            TransportError::Request(err)
        }
    }
}

/// Client-side validation failures, raised before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", summarize_rejections(.0).unwrap_or_default())]
    Files(Vec<FileRejection>),

    #[error("Agent name is required")]
    MissingAgentName,

    #[error("Claim type is required")]
    MissingClaimType,
}

/// Errors returned by claim operations
#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Detail fetch attempted without an id
    #[error("Claim id is required to fetch claim detail")]
    MissingId,
}

impl ClaimsError {
    /// Message suitable for an error banner
    pub fn user_message(&self) -> String {
        match self {
            ClaimsError::Validation(e) => e.to_string(),
            ClaimsError::Transport(_) => {
                "Something went wrong while talking to the claims service. Please try again later."
                    .to_string()
            }
            ClaimsError::MissingId => self.to_string(),
        }
    }
}

/// Result type for claim operations
pub type ClaimsResult<T> = Result<T, ClaimsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::validation::RejectReason;

    #[test]
    fn test_error_display() {
        let err = TransportError::ApiError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error 502: bad gateway");

        let err = ClaimsError::MissingId;
        assert_eq!(err.to_string(), "Claim id is required to fetch claim detail");
    }

    #[test]
    fn test_validation_message_uses_summary() {
        let err = ValidationError::Files(vec![FileRejection {
            file_name: "huge.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            reason: RejectReason::TooLarge,
        }]);
        assert_eq!(
            err.to_string(),
            "Some files were rejected: huge.pdf is too large (max 10MB)"
        );
    }

    #[test]
    fn test_transport_user_message_is_generic() {
        let err: ClaimsError = TransportError::Unavailable.into();
        assert!(err.user_message().contains("try again later"));
    }
}
