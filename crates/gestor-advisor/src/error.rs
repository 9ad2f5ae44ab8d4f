//! Error types for gestor-advisor

use gestor_core::ErrorSeverity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for advice requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisorErrorCode {
    MissingApiKey,
    RequestFailed,
    HttpStatus,
    InvalidResponse,
}

impl std::fmt::Display for AdvisorErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvisorErrorCode::MissingApiKey => write!(f, "MISSING_API_KEY"),
            AdvisorErrorCode::RequestFailed => write!(f, "REQUEST_FAILED"),
            AdvisorErrorCode::HttpStatus => write!(f, "HTTP_STATUS"),
            AdvisorErrorCode::InvalidResponse => write!(f, "INVALID_RESPONSE"),
        }
    }
}

/// Advice request error
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("API key not set: environment variable {var} is empty")]
    MissingApiKey { var: String },

    #[error("Advice request failed: {message}")]
    Request { message: String },

    #[error("Advice API answered {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected advice response: {message}")]
    InvalidResponse { message: String },
}

impl AdvisorError {
    pub fn code(&self) -> AdvisorErrorCode {
        match self {
            AdvisorError::MissingApiKey { .. } => AdvisorErrorCode::MissingApiKey,
            AdvisorError::Request { .. } => AdvisorErrorCode::RequestFailed,
            AdvisorError::Http { .. } => AdvisorErrorCode::HttpStatus,
            AdvisorError::InvalidResponse { .. } => AdvisorErrorCode::InvalidResponse,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdvisorError::MissingApiKey { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }
}

impl From<reqwest::Error> for AdvisorError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            AdvisorError::InvalidResponse {
                message: error.to_string(),
            }
        } else {
            AdvisorError::Request {
                message: error.to_string(),
            }
        }
    }
}

/// Result type with AdvisorError
pub type AdvisorResult<T> = Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let error = AdvisorError::MissingApiKey { var: "API_KEY".to_string() };
        assert_eq!(error.code().to_string(), "MISSING_API_KEY");
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(error.to_string().contains("API_KEY"));

        let error = AdvisorError::Http { status: 503, body: "busy".to_string() };
        assert_eq!(error.code(), AdvisorErrorCode::HttpStatus);
        assert_eq!(error.severity(), ErrorSeverity::Error);
    }
}
