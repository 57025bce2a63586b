//! Client Module
//!
//! [`VaultClient`] is the entry point endpoint call sites hang off. It owns the
//! shared configuration and a [`Dispatcher`]; endpoint groups borrow it.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::endpoints::documents::Documents;
use crate::error::VaultError;
use crate::execution::Dispatcher;
use crate::execution::http::{HttpInterceptor, HttpTransport};
use crate::request::{HttpMethod, RequestBuilder};
use crate::types::{ApiResult, DeserializeOptions};

/// Client for the document-management API.
///
/// Cloning is cheap and clones share configuration and connection pool.
#[derive(Debug, Clone)]
pub struct VaultClient {
    dispatcher: Dispatcher,
}

impl VaultClient {
    /// Build a client using the reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, VaultError> {
        Ok(Self {
            dispatcher: Dispatcher::new(Arc::new(config))?,
        })
    }

    /// Build a client on top of a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            dispatcher: Dispatcher::with_transport(Arc::new(config), transport),
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.dispatcher = self.dispatcher.with_interceptor(interceptor);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Start a request for `path`.
    ///
    /// Relative paths resolve against `{base_url}/api/{version}`; absolute
    /// URLs are used as given.
    pub fn request(&self, method: HttpMethod, path: &str) -> RequestBuilder {
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.config().endpoint(path)
        };
        RequestBuilder::new(method, url)
    }

    /// GET a "next page"/"previous page" URL from an earlier response.
    pub async fn follow_page<T: DeserializeOwned>(
        &self,
        page_url: &str,
        options: DeserializeOptions,
    ) -> ApiResult<T> {
        self.dispatcher.follow_page(page_url, options).await
    }

    /// Document endpoints.
    pub fn documents(&self) -> Documents<'_> {
        Documents::new(self)
    }
}
