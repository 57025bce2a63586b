//! Response shaping: turns a raw transport response into an [`ApiResult`].
//!
//! A response is `Success` only when the HTTP status is 2xx and the body does
//! not report a failure. Error payloads become `Failure`; bodies that cannot
//! be decoded on a 2xx response become `Exception`.

use std::path::Path;

use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::VaultError;
use crate::execution::http::headers::{content_disposition_file_name, header_str};
use crate::execution::http::transport::TransportResponse;
use crate::types::{
    ApiErrorEntry, ApiResult, BinaryContent, DeserializeOptions, OutputMode, ResponseEnvelope,
    ResponseShape,
};

const BODY_SAMPLE_CHARS: usize = 200;

pub(crate) async fn shape_response<T: DeserializeOwned>(
    response: TransportResponse,
    shape: &ResponseShape,
) -> ApiResult<T> {
    match &shape.mode {
        OutputMode::Structured => shape_structured(response, &shape.options),
        OutputMode::StructuredWithBinary => shape_with_binary(response, &shape.options),
        OutputMode::ToFile(path) => shape_to_file(response, path).await,
    }
}

fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

fn is_json(headers: &HeaderMap) -> bool {
    header_str(headers, "content-type")
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
}

fn body_sample(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_SAMPLE_CHARS)
        .collect()
}

/// A result for `error`, keeping the response metadata that was received.
fn failed<T>(error: VaultError, status: u16, headers: HeaderMap) -> ApiResult<T> {
    let mut result = ApiResult::from_error(error);
    result.http_status = Some(status);
    result.headers = headers;
    result
}

fn parse_envelope(value: &Value) -> ResponseEnvelope {
    if !value.is_object() {
        return ResponseEnvelope::default();
    }
    ResponseEnvelope::deserialize(value).unwrap_or_default()
}

/// Deserialize the body into `T`, normalizing the status from HTTP code and envelope.
pub(crate) fn shape_structured<T: DeserializeOwned>(
    response: TransportResponse,
    options: &DeserializeOptions,
) -> ApiResult<T> {
    let TransportResponse {
        status,
        headers,
        body,
    } = response;
    let http_ok = is_success_status(status);

    if body.iter().all(u8::is_ascii_whitespace) {
        if !http_ok {
            return failed(http_error(status, &body), status, headers);
        }
        let mut result = ApiResult::success(status, headers);
        result.data = serde_json::from_value(Value::Null).ok();
        return result;
    }

    let mut value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) if http_ok => {
            return failed(
                VaultError::DeserializationError(format!("malformed JSON response body: {e}")),
                status,
                headers,
            );
        }
        Err(_) => return failed(http_error(status, &body), status, headers),
    };

    let envelope = parse_envelope(&value);
    if !http_ok || envelope.reports_failure() {
        let mut errors = envelope.error_entries();
        if errors.is_empty() {
            errors = http_error(status, &body).to_entries();
        }
        let mut result = failed(VaultError::ApiError { status, errors }, status, headers);
        result.response_message = envelope.response_message.clone().or(result.response_message);
        result.warnings = envelope.warnings;
        options.apply(&mut value);
        result.data = serde_json::from_value(value).ok();
        return result;
    }

    options.apply(&mut value);
    match serde_json::from_value::<T>(value) {
        Ok(data) => {
            let mut result = ApiResult::success(status, headers);
            result.response_message = envelope.response_message;
            result.warnings = envelope.warnings;
            result.data = Some(data);
            result
        }
        Err(e) => failed(
            VaultError::DeserializationError(format!(
                "response body did not match the expected shape: {e}"
            )),
            status,
            headers,
        ),
    }
}

fn http_error(status: u16, body: &[u8]) -> VaultError {
    let sample = body_sample(body);
    let message = if sample.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {sample}")
    };
    VaultError::ApiError {
        status,
        errors: vec![ApiErrorEntry::new("HTTP_ERROR", message)],
    }
}

/// Keep the raw body; JSON bodies are also deserialized into `T`.
fn shape_with_binary<T: DeserializeOwned>(
    response: TransportResponse,
    options: &DeserializeOptions,
) -> ApiResult<T> {
    if !is_success_status(response.status) {
        return shape_structured(response, options);
    }
    let binary = BinaryContent {
        bytes: response.body.clone(),
        content_type: header_str(&response.headers, "content-type").map(str::to_string),
        file_name: content_disposition_file_name(&response.headers),
    };
    let mut result = if is_json(&response.headers) {
        shape_structured(response, options)
    } else {
        ApiResult::success(response.status, response.headers)
    };
    result.binary = Some(binary);
    result
}

/// Write a successful body to `path`; error responses are shaped as structured failures.
///
/// `output_file` is the path as written, canonicalized when the filesystem
/// can resolve it.
async fn shape_to_file<T: DeserializeOwned>(response: TransportResponse, path: &Path) -> ApiResult<T> {
    if !is_success_status(response.status) {
        return shape_structured(response, &DeserializeOptions::default());
    }
    if is_json(&response.headers)
        && let Ok(value) = serde_json::from_slice::<Value>(&response.body)
        && parse_envelope(&value).reports_failure()
    {
        return shape_structured(response, &DeserializeOptions::default());
    }

    let TransportResponse {
        status,
        headers,
        body,
    } = response;
    if let Err(e) = tokio::fs::write(path, &body).await {
        return failed(
            VaultError::IoError(format!("cannot write '{}': {e}", path.display())),
            status,
            headers,
        );
    }
    let resolved = tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf());
    let mut result = ApiResult::success(status, headers);
    result.output_file = Some(resolved);
    result
}
