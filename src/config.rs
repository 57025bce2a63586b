//! Client configuration.
//!
//! [`ClientConfig`] is built once and shared read-only (behind `Arc`) by every
//! dispatch. Nothing in the dispatch path mutates it.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Url;
use secrecy::SecretString;

use crate::error::VaultError;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v24.1";

/// Transport-level settings used to build the `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// Default headers sent with every request
    pub headers: HashMap<String, String>,
    /// Proxy URL
    pub proxy: Option<String>,
    /// User agent
    pub user_agent: Option<String>,
}

/// Process-wide client configuration: where to send calls and how to authenticate.
#[derive(Debug)]
pub struct ClientConfig {
    base_url: Url,
    api_version: String,
    session_token: Option<SecretString>,
    client_id: Option<String>,
    http: HttpConfig,
}

impl ClientConfig {
    /// Create a configuration for `base_url` (a bare host gets `https://`).
    pub fn new(base_url: &str) -> Result<Self, VaultError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(VaultError::ConfigurationError(
                "base URL must not be empty".into(),
            ));
        }
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };
        let base_url = Url::parse(&with_scheme).map_err(|e| {
            VaultError::ConfigurationError(format!("Invalid base URL '{base_url}': {e}"))
        })?;
        Ok(Self {
            base_url,
            api_version: DEFAULT_API_VERSION.to_string(),
            session_token: None,
            client_id: None,
            http: HttpConfig::default(),
        })
    }

    /// Read configuration from `DOCVAULT_*` environment variables.
    pub fn from_env() -> Result<Self, VaultError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps variable names to values.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, VaultError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("DOCVAULT_BASE_URL").ok_or_else(|| {
            VaultError::ConfigurationError("DOCVAULT_BASE_URL is not set".into())
        })?;
        let mut config = Self::new(&base_url)?;
        if let Some(version) = lookup("DOCVAULT_API_VERSION") {
            config = config.with_api_version(version);
        }
        if let Some(token) = lookup("DOCVAULT_SESSION_TOKEN") {
            config = config.with_session_token(token);
        }
        if let Some(client_id) = lookup("DOCVAULT_CLIENT_ID") {
            config = config.with_client_id(client_id);
        }
        if let Some(secs) = lookup("DOCVAULT_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                VaultError::ConfigurationError(format!("Invalid DOCVAULT_TIMEOUT_SECS '{secs}': {e}"))
            })?;
            config.http.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into().trim_matches('/').to_string();
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn session_token(&self) -> Option<&SecretString> {
        self.session_token.as_ref()
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn http(&self) -> &HttpConfig {
        &self.http
    }

    /// `{base_url}/api/{version}`, without a trailing slash.
    pub fn base_endpoint(&self) -> String {
        format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.api_version
        )
    }

    /// Join a relative API path onto the base endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_endpoint(), path.trim_start_matches('/'))
    }

    /// Resolve a "next page"/"previous page" URL returned by the API.
    ///
    /// Absolute URLs are kept, `/`-rooted ones resolve against the base URL's
    /// origin, anything else against the base endpoint.
    pub fn resolve_page_url(&self, page_url: &str) -> Result<String, VaultError> {
        let page_url = page_url.trim();
        if page_url.is_empty() {
            return Err(VaultError::InvalidArgument("page URL must not be empty".into()));
        }
        if page_url.starts_with("http://") || page_url.starts_with("https://") {
            return Ok(page_url.to_string());
        }
        let resolved = if page_url.starts_with('/') {
            self.base_url.join(page_url)
        } else {
            Url::parse(&format!("{}/", self.base_endpoint())).and_then(|base| base.join(page_url))
        };
        resolved
            .map(|url| url.to_string())
            .map_err(|e| VaultError::InvalidArgument(format!("Invalid page URL '{page_url}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn config() -> ClientConfig {
        ClientConfig::new("https://acme.example.com/")
            .unwrap()
            .with_api_version("v24.1")
    }

    #[test]
    fn base_endpoint_includes_version() {
        assert_eq!(
            config().base_endpoint(),
            "https://acme.example.com/api/v24.1"
        );
    }

    #[test]
    fn bare_host_defaults_to_https() {
        let config = ClientConfig::new("acme.example.com").unwrap();
        assert_eq!(config.base_url().scheme(), "https");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = ClientConfig::new("  ").unwrap_err();
        assert!(matches!(err, VaultError::ConfigurationError(_)));
    }

    #[test]
    fn endpoint_joins_relative_path() {
        assert_eq!(
            config().endpoint("/objects/documents/123"),
            "https://acme.example.com/api/v24.1/objects/documents/123"
        );
    }

    #[test]
    fn page_urls_resolve_against_base() {
        let config = config();
        assert_eq!(
            config
                .resolve_page_url("/api/v24.1/query/00001?pagesize=100&pageoffset=100")
                .unwrap(),
            "https://acme.example.com/api/v24.1/query/00001?pagesize=100&pageoffset=100"
        );
        assert_eq!(
            config.resolve_page_url("query/00001?pageoffset=200").unwrap(),
            "https://acme.example.com/api/v24.1/query/00001?pageoffset=200"
        );
        assert_eq!(
            config
                .resolve_page_url("https://other.example.com/api/v24.1/query/1")
                .unwrap(),
            "https://other.example.com/api/v24.1/query/1"
        );
    }

    #[test]
    fn env_lookup_populates_config() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DOCVAULT_BASE_URL", "https://acme.example.com"),
            ("DOCVAULT_API_VERSION", "v23.3"),
            ("DOCVAULT_SESSION_TOKEN", "session-abc"),
            ("DOCVAULT_CLIENT_ID", "acme-integration"),
            ("DOCVAULT_TIMEOUT_SECS", "30"),
        ]);
        let config =
            ClientConfig::from_env_with(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_version(), "v23.3");
        assert_eq!(
            config.session_token().map(|t| t.expose_secret().to_string()),
            Some("session-abc".to_string())
        );
        assert_eq!(config.client_id(), Some("acme-integration"));
        assert_eq!(config.http().timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn env_lookup_requires_base_url() {
        let err = ClientConfig::from_env_with(|_| None).unwrap_err();
        assert!(matches!(err, VaultError::ConfigurationError(_)));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = config().with_session_token("super-secret");
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
