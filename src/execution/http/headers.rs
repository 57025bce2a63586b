//! HTTP Headers Utility
//!
//! Builds the header set of a call: configured defaults first (auth, client id,
//! accept), then the request's own headers on top.

use std::collections::{BTreeMap, HashMap};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::config::ClientConfig;
use crate::error::VaultError;

/// Header carrying the integration's client id.
pub const CLIENT_ID_HEADER: &str = "x-vaultapi-clientid";

/// HTTP header builder for API requests
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Add Bearer token authorization
    pub fn with_bearer_auth(mut self, token: &SecretString) -> Result<Self, VaultError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| VaultError::ConfigurationError(format!("Invalid session token format: {e}")))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Add JSON accept header
    pub fn with_json_accept(mut self) -> Self {
        self.headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, VaultError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            VaultError::InvalidArgument(format!("Invalid header name '{name}': {e}"))
        })?;
        self.headers.insert(
            header_name,
            HeaderValue::from_str(value).map_err(|e| {
                VaultError::InvalidArgument(format!("Invalid header value for '{name}': {e}"))
            })?,
        );
        Ok(self)
    }

    /// Add multiple custom headers from a HashMap
    pub fn with_custom_headers(
        mut self,
        custom_headers: &HashMap<String, String>,
    ) -> Result<Self, VaultError> {
        for (key, value) in custom_headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                VaultError::ConfigurationError(format!("Invalid header name '{key}': {e}"))
            })?;
            self.headers.insert(
                header_name,
                HeaderValue::from_str(value).map_err(|e| {
                    VaultError::ConfigurationError(format!("Invalid header value '{value}': {e}"))
                })?,
            );
        }
        Ok(self)
    }

    /// Build the final HeaderMap
    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

impl Default for HttpHeaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Headers for one call: configured auth/client id/accept, overridden by `request_headers`.
pub fn build_request_headers(
    config: &ClientConfig,
    request_headers: &BTreeMap<String, String>,
) -> Result<HeaderMap, VaultError> {
    let mut builder = HttpHeaderBuilder::new().with_json_accept();
    if let Some(token) = config.session_token() {
        builder = builder.with_bearer_auth(token)?;
    }
    if let Some(client_id) = config.client_id() {
        builder = builder.with_header(CLIENT_ID_HEADER, client_id)?;
    }
    for (name, value) in request_headers {
        builder = builder.with_header(name, value)?;
    }
    Ok(builder.build())
}

/// Header value as `&str`, when present and valid UTF-8.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// File name from a `Content-Disposition` header (`filename*=` preferred over `filename=`).
pub fn content_disposition_file_name(headers: &HeaderMap) -> Option<String> {
    let value = header_str(headers, "content-disposition")?;
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let raw = raw.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // RFC 5987: charset'lang'percent-encoded
                let encoded = raw.rsplit('\'').next().unwrap_or(raw);
                if let Ok(decoded) = urlencoding::decode(encoded) {
                    return Some(decoded.into_owned());
                }
            }
            "filename" => plain = Some(raw.trim_matches('"').to_string()),
            _ => {}
        }
    }
    plain.filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("https://acme.example.com")
            .unwrap()
            .with_session_token("session-123")
            .with_client_id("acme-loader")
    }

    #[test]
    fn request_headers_include_auth_and_client_id() {
        let headers = build_request_headers(&config(), &BTreeMap::new()).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer session-123");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(CLIENT_ID_HEADER).unwrap(), "acme-loader");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn request_headers_override_defaults() {
        let overrides = BTreeMap::from([("accept".to_string(), "text/csv".to_string())]);
        let headers = build_request_headers(&config(), &overrides).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "text/csv");
    }

    #[test]
    fn invalid_request_header_is_invalid_argument() {
        let bad = BTreeMap::from([("bad header".to_string(), "x".to_string())]);
        let err = build_request_headers(&config(), &bad).unwrap_err();
        assert!(matches!(err, VaultError::InvalidArgument(_)));
    }

    #[test]
    fn content_disposition_prefers_extended_name() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-disposition",
            HeaderValue::from_static(
                "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''Protocol%20v2.pdf",
            ),
        );
        assert_eq!(
            content_disposition_file_name(&headers).as_deref(),
            Some("Protocol v2.pdf")
        );
    }

    #[test]
    fn content_disposition_plain_name() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-disposition",
            HeaderValue::from_static("attachment;filename=\"site_list.csv\""),
        );
        assert_eq!(
            content_disposition_file_name(&headers).as_deref(),
            Some("site_list.csv")
        );
        assert_eq!(content_disposition_file_name(&HeaderMap::new()), None);
    }
}
