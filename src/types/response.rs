//! Normalized call results.

use std::path::PathBuf;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, OneOrMany, serde_as};

use crate::error::VaultError;

/// Normalized outcome of one API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failure,
    Exception,
}

impl ResponseStatus {
    /// Map an upstream `responseStatus` value.
    ///
    /// `WARNING` is a successful call that carries warnings; it normalizes to
    /// `Success` and the warnings are kept on the result.
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" | "WARNING" => Some(Self::Success),
            "FAILURE" => Some(Self::Failure),
            "EXCEPTION" => Some(Self::Exception),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Exception => "EXCEPTION",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{type, message}` error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub message: String,
}

impl ApiErrorEntry {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }
}

/// One upstream warning entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiWarning {
    #[serde(rename = "type", default)]
    pub warning_type: String,
    #[serde(default)]
    pub message: String,
}

/// Status fields every upstream JSON response may carry.
///
/// Repeatable elements are inconsistently sent as a single object or an
/// array, so both lists accept either.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ResponseEnvelope {
    #[serde(rename = "responseStatus", default)]
    pub response_status: Option<String>,
    #[serde(rename = "responseMessage", default)]
    pub response_message: Option<String>,
    #[serde(rename = "errorType", default)]
    pub error_type: Option<String>,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_>>")]
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_>>")]
    #[serde(default)]
    pub warnings: Vec<ApiWarning>,
}

impl ResponseEnvelope {
    /// Whether the body explicitly reports a failed call.
    ///
    /// Without a recognized `responseStatus`, an `errors` list or an
    /// `errorType` counts as a failure report.
    pub fn reports_failure(&self) -> bool {
        match self
            .response_status
            .as_deref()
            .and_then(ResponseStatus::from_upstream)
        {
            Some(status) => status != ResponseStatus::Success,
            None => !self.errors.is_empty() || self.error_type.is_some(),
        }
    }

    /// Error entries, falling back to the top-level `errorType`/`responseMessage` pair.
    pub fn error_entries(&self) -> Vec<ApiErrorEntry> {
        if !self.errors.is_empty() {
            return self.errors.clone();
        }
        match (&self.error_type, &self.response_message) {
            (Some(t), msg) => vec![ApiErrorEntry::new(t.clone(), msg.clone().unwrap_or_default())],
            (None, Some(msg)) => vec![ApiErrorEntry::new("API_ERROR", msg.clone())],
            (None, None) => Vec::new(),
        }
    }
}

/// Raw payload retained alongside a structured result.
#[derive(Debug, Clone)]
pub struct BinaryContent {
    pub bytes: Bytes,
    /// `Content-Type` of the response, when present.
    pub content_type: Option<String>,
    /// File name from `Content-Disposition`, when present.
    pub file_name: Option<String>,
}

/// Result of a single dispatched call.
///
/// Always carries a normalized [`ResponseStatus`]; callers inspect it (or use
/// [`ApiResult::error_for_status`]) instead of handling faults.
#[derive(Debug)]
pub struct ApiResult<T> {
    pub response_status: ResponseStatus,
    pub response_message: Option<String>,
    pub errors: Vec<ApiErrorEntry>,
    pub warnings: Vec<ApiWarning>,
    /// HTTP status, absent when no response was received.
    pub http_status: Option<u16>,
    pub headers: HeaderMap,
    /// Deserialized body.
    pub data: Option<T>,
    /// Raw body, for `StructuredWithBinary` calls.
    pub binary: Option<BinaryContent>,
    /// Where the body was written, for `ToFile` calls.
    pub output_file: Option<PathBuf>,
    /// The error behind a non-success status.
    pub cause: Option<VaultError>,
}

impl<T> ApiResult<T> {
    /// An empty successful result for the given HTTP status.
    pub fn success(http_status: u16, headers: HeaderMap) -> Self {
        Self {
            response_status: ResponseStatus::Success,
            response_message: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            http_status: Some(http_status),
            headers,
            data: None,
            binary: None,
            output_file: None,
            cause: None,
        }
    }

    /// A result describing `error`.
    ///
    /// API errors become `Failure` with the reported entries, everything else
    /// becomes `Exception` with one synthetic entry.
    pub fn from_error(error: VaultError) -> Self {
        Self {
            response_status: error.response_status(),
            response_message: Some(error.to_string()),
            errors: error.to_entries(),
            warnings: Vec::new(),
            http_status: error.status_code(),
            headers: HeaderMap::new(),
            data: None,
            binary: None,
            output_file: None,
            cause: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.response_status == ResponseStatus::Success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Turn a non-success result into its error.
    pub fn error_for_status(self) -> Result<Self, VaultError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(self.into_error())
    }

    /// The deserialized body of a successful call.
    pub fn into_data(self) -> Result<T, VaultError> {
        let result = self.error_for_status()?;
        result.data.ok_or_else(|| {
            VaultError::DeserializationError("response carried no structured payload".into())
        })
    }

    fn into_error(self) -> VaultError {
        if let Some(cause) = self.cause {
            return cause;
        }
        VaultError::ApiError {
            status: self.http_status.unwrap_or_default(),
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_normalizes_to_success() {
        assert_eq!(
            ResponseStatus::from_upstream("WARNING"),
            Some(ResponseStatus::Success)
        );
        assert_eq!(
            ResponseStatus::from_upstream("failure"),
            Some(ResponseStatus::Failure)
        );
        assert_eq!(ResponseStatus::from_upstream("PENDING"), None);
    }

    #[test]
    fn envelope_accepts_single_error_object() {
        let envelope: ResponseEnvelope = serde_json::from_str(
            r#"{"responseStatus":"FAILURE","errors":{"type":"INVALID_DATA","message":"bad"}}"#,
        )
        .unwrap();
        assert!(envelope.reports_failure());
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].error_type, "INVALID_DATA");
    }

    #[test]
    fn error_list_without_status_reports_failure() {
        let envelope: ResponseEnvelope = serde_json::from_str(
            r#"{"errors":[{"type":"INVALID_DATA","message":"bad field"}]}"#,
        )
        .unwrap();
        assert!(envelope.reports_failure());

        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"errorType":"INVALID_SESSION_ID"}"#).unwrap();
        assert!(envelope.reports_failure());

        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"responseStatus":"SUCCESS","errors":null}"#).unwrap();
        assert!(!envelope.reports_failure());
    }

    #[test]
    fn envelope_falls_back_to_error_type() {
        let envelope: ResponseEnvelope = serde_json::from_str(
            r#"{"responseStatus":"FAILURE","errorType":"INVALID_SESSION_ID","responseMessage":"expired"}"#,
        )
        .unwrap();
        let entries = envelope.error_entries();
        assert_eq!(entries, vec![ApiErrorEntry::new("INVALID_SESSION_ID", "expired")]);
    }

    #[test]
    fn into_data_returns_cause_for_failed_results() {
        let result: ApiResult<()> =
            ApiResult::from_error(VaultError::TransportError("connection refused".into()));
        assert_eq!(result.response_status, ResponseStatus::Exception);
        let err = result.into_data().unwrap_err();
        assert!(matches!(err, VaultError::TransportError(_)));
    }
}
