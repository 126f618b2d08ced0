//! Error types for record services and report assembly
//!
//! Errors are classified by recoverability:
//! - Retryable: network issues, gateway timeouts
//! - NonRetryable: validation, missing records, malformed responses
//! - RequiresUserAction: missing or broken configuration

use thiserror::Error;

use crate::gateway::{Collection, RecordId};

/// Error types for gateway-backed operations
#[derive(Debug, Error)]
pub enum CrmError {
    // Retryable errors
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Gateway request timed out after {0} ms")]
    Timeout(u64),

    // Non-retryable errors
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Gateway(String),

    #[error("{collection} not found: {id}")]
    NotFound { collection: Collection, id: RecordId },

    #[error("Failed to parse gateway response: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(String),

    // Requires user action
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl CrmError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, CrmError::NetworkError(_) | CrmError::Timeout(_))
    }

    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(self, CrmError::ConfigurationError(_))
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CrmError::NetworkError(_) => "Check your internet connection and try again.",
            CrmError::Timeout(_) => "The record service took too long. Try again.",
            CrmError::Validation(_) => "Fill in the required fields and submit again.",
            CrmError::Gateway(_) => "The record service rejected the request. Check the details.",
            CrmError::NotFound { .. } => "The record may have been deleted. Refresh the list.",
            CrmError::ParseError(_) => "The record service returned an unexpected response.",
            CrmError::IoError(_) => "Check file permissions and disk space.",
            CrmError::ConfigurationError(_) => "Check your configuration in ~/.leadpulse/config.json",
        }
    }
}

impl From<std::io::Error> for CrmError {
    fn from(err: std::io::Error) -> Self {
        CrmError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        CrmError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for CrmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CrmError::ParseError(err.to_string())
        } else {
            CrmError::NetworkError(err.to_string())
        }
    }
}

/// Serializable error representation for UI surfaces
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    RequiresUserAction,
}

impl From<&CrmError> for ServiceError {
    fn from(err: &CrmError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::NonRetryable
        };

        ServiceError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_collection() {
        let err = CrmError::NotFound {
            collection: Collection::Lead,
            id: 42,
        };
        assert_eq!(err.to_string(), "Lead not found: 42");
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = CrmError::Timeout(1500);
        let surfaced = ServiceError::from(&err);
        assert!(surfaced.can_retry);
        assert_eq!(surfaced.error_type, ErrorType::Retryable);
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err = CrmError::Validation("Website URL is required".to_string());
        let surfaced = ServiceError::from(&err);
        assert!(!surfaced.can_retry);
        assert_eq!(surfaced.error_type, ErrorType::NonRetryable);
        assert_eq!(surfaced.message, "Website URL is required");
    }

    #[test]
    fn test_configuration_requires_user_action() {
        let err = CrmError::ConfigurationError("missing baseUrl".to_string());
        assert_eq!(
            ServiceError::from(&err).error_type,
            ErrorType::RequiresUserAction
        );
    }
}
