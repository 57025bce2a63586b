//! Core error types.

use thiserror::Error;

use crate::types::{ApiErrorEntry, ResponseStatus};

/// Errors raised while building, sending or shaping a single API call.
#[derive(Error, Debug, Clone)]
pub enum VaultError {
    /// Malformed input to the request builder (conflicting bodies, empty file part).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid client configuration (base URL, header names, proxy).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Local file read/write failure.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The HTTP call could not be completed (connection, timeout, DNS).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The response body did not match the expected shape.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// The remote service answered with an error payload.
    #[error("API error (HTTP {status}): {}", summarize(errors))]
    ApiError {
        status: u16,
        errors: Vec<ApiErrorEntry>,
    },
}

/// Coarse error category, useful for presentation and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Programmer or caller input errors.
    Client,
    /// Local filesystem failures.
    Local,
    /// Network and connection failures.
    Network,
    /// Response payloads that could not be decoded.
    Parsing,
    /// Errors reported by the remote service.
    Api,
}

impl VaultError {
    /// Coarse category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument(_) | Self::ConfigurationError(_) => ErrorCategory::Client,
            Self::IoError(_) => ErrorCategory::Local,
            Self::TransportError(_) => ErrorCategory::Network,
            Self::DeserializationError(_) => ErrorCategory::Parsing,
            Self::ApiError { .. } => ErrorCategory::Api,
        }
    }

    /// The normalized status a result carrying this error is reported with.
    pub fn response_status(&self) -> ResponseStatus {
        match self {
            Self::ApiError { .. } => ResponseStatus::Failure,
            _ => ResponseStatus::Exception,
        }
    }

    /// HTTP status code, when the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error type tag used for synthetic error entries.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::ConfigurationError(_) => "CONFIGURATION_ERROR",
            Self::IoError(_) => "IO_ERROR",
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::DeserializationError(_) => "PARSE_ERROR",
            Self::ApiError { .. } => "API_ERROR",
        }
    }

    /// Error entries describing this error, in the normalized `{type, message}` form.
    ///
    /// API errors keep the entries reported by the service; local failures
    /// produce a single synthetic entry.
    pub fn to_entries(&self) -> Vec<ApiErrorEntry> {
        match self {
            Self::ApiError { errors, .. } if !errors.is_empty() => errors.clone(),
            Self::InvalidArgument(msg)
            | Self::ConfigurationError(msg)
            | Self::IoError(msg)
            | Self::TransportError(msg)
            | Self::DeserializationError(msg) => {
                vec![ApiErrorEntry::new(self.error_type(), msg.clone())]
            }
            Self::ApiError { status, .. } => {
                vec![ApiErrorEntry::new(self.error_type(), format!("HTTP {status}"))]
            }
        }
    }
}

fn summarize(errors: &[ApiErrorEntry]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.error_type, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            VaultError::InvalidArgument("x".into()).category(),
            ErrorCategory::Client
        );
        assert_eq!(VaultError::IoError("x".into()).category(), ErrorCategory::Local);
        assert_eq!(
            VaultError::TransportError("x".into()).category(),
            ErrorCategory::Network
        );
        assert_eq!(
            VaultError::DeserializationError("x".into()).category(),
            ErrorCategory::Parsing
        );
    }

    #[test]
    fn only_api_errors_surface_as_failure() {
        let api = VaultError::ApiError {
            status: 404,
            errors: vec![ApiErrorEntry::new("NOT_FOUND", "no such document")],
        };
        assert_eq!(api.response_status(), ResponseStatus::Failure);
        assert_eq!(api.status_code(), Some(404));
        assert_eq!(
            VaultError::TransportError("refused".into()).response_status(),
            ResponseStatus::Exception
        );
    }

    #[test]
    fn display_lists_api_error_entries() {
        let api = VaultError::ApiError {
            status: 400,
            errors: vec![
                ApiErrorEntry::new("PARAMETER_REQUIRED", "missing name__v"),
                ApiErrorEntry::new("INVALID_DATA", "bad lifecycle"),
            ],
        };
        let text = api.to_string();
        assert!(text.contains("HTTP 400"));
        assert!(text.contains("PARAMETER_REQUIRED: missing name__v"));
        assert!(text.contains("INVALID_DATA: bad lifecycle"));
    }

    #[test]
    fn local_failures_produce_one_synthetic_entry() {
        let entries = VaultError::IoError("permission denied".into()).to_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].error_type, "IO_ERROR");
        assert_eq!(entries[0].message, "permission denied");
    }
}
