//! Per-link verification errors.
//!
//! A link failing never aborts the batch; its error lands in the report's
//! error map keyed by the link.

use thiserror::Error;

use crate::fetch::FetchError;

/// Why a single link was recorded as failed.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The fetch itself failed (network, timeout, redirect limit, ...).
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A validator rejected the response.
    #[error("{message}")]
    Validation {
        /// The validator's failure message.
        message: String,
    },

    /// No validator decided and the terminal status was not 200.
    #[error("HTTP status code {status}")]
    HttpStatus {
        /// The terminal status code.
        status: u16,
    },
}

impl LinkError {
    /// Creates a validator-signaled failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_is_the_message() {
        let error = LinkError::validation("blocked by policy");
        assert_eq!(error.to_string(), "blocked by policy");
    }

    #[test]
    fn test_http_status_display() {
        let error = LinkError::HttpStatus { status: 404 };
        assert_eq!(error.to_string(), "HTTP status code 404");
    }

    #[test]
    fn test_fetch_error_passes_through() {
        let error = LinkError::from(FetchError::timeout("http://example.com/x"));
        assert!(error.to_string().contains("timeout"));
    }
}
