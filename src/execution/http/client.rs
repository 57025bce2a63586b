//! HTTP client builder utilities

use crate::config::HttpConfig;
use crate::error::VaultError;

/// Build an HTTP client from `HttpConfig`.
///
/// # Example
/// ```rust,no_run
/// use docvault::config::HttpConfig;
/// use docvault::execution::http::client::build_http_client_from_config;
///
/// let client = build_http_client_from_config(&HttpConfig::default())?;
/// # Ok::<(), docvault::VaultError>(())
/// ```
pub fn build_http_client_from_config(config: &HttpConfig) -> Result<reqwest::Client, VaultError> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| VaultError::ConfigurationError(format!("Invalid proxy URL: {e}")))?;
        builder = builder.proxy(proxy);
    }

    builder = builder.user_agent(
        config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("docvault/{}", env!("CARGO_PKG_VERSION"))),
    );

    if !config.headers.is_empty() {
        let headers = super::headers::HttpHeaderBuilder::new()
            .with_custom_headers(&config.headers)?
            .build();
        builder = builder.default_headers(headers);
    }

    builder
        .build()
        .map_err(|e| VaultError::ConfigurationError(format!("Failed to create HTTP client: {e}")))
}
