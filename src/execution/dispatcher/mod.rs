//! Dispatcher
//!
//! Executes exactly one HTTP round trip per call and shapes the response into
//! an [`ApiResult`]. Every failure (invalid request, unreadable file, broken
//! connection, malformed body, API error) is folded into the result's
//! normalized status; nothing is retried and nothing escapes as a fault.
//!
//! Flow of a call:
//! 1. build the request descriptor (builder errors become `Exception`)
//! 2. merge configured headers (auth, client id, accept) with the request's
//! 3. resolve the body, opening local files
//! 4. run `on_before_send` interceptors, then the transport
//! 5. shape the response per [`ResponseShape`]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::VaultError;
use crate::execution::http::headers::build_request_headers;
use crate::execution::http::interceptor::{HttpInterceptor, HttpRequestContext};
use crate::execution::http::transport::{
    HttpTransport, ReqwestTransport, TransportBody, TransportRequest, TransportResponse,
};
use crate::request::{RequestBuilder, VaultRequest};
use crate::types::{ApiResult, DeserializeOptions, ResponseShape, ResponseStatus};

mod shaping;


/// Executes request descriptors against the configured endpoint.
///
/// Cheap to clone; clones share configuration, transport and interceptors.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// A dispatcher using the reqwest transport built from `config.http()`.
    pub fn new(config: Arc<ClientConfig>) -> Result<Self, VaultError> {
        let transport = ReqwestTransport::from_config(config.http())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// A dispatcher using a caller-supplied transport.
    pub fn with_transport(config: Arc<ClientConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            interceptors: Vec::new(),
        }
    }

    /// Append an interceptor; interceptors run in insertion order.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Deserialize the response body into `T`.
    pub async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        self.dispatch(builder, ResponseShape::structured()).await
    }

    /// Deserialize what can be deserialized and keep the raw body.
    pub async fn execute_with_binary<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        self.dispatch(builder, ResponseShape::with_binary()).await
    }

    /// Write the response body to `path`.
    ///
    /// `data` is only populated when the call failed with a JSON error body.
    pub async fn execute_to_file(
        &self,
        builder: RequestBuilder,
        path: impl Into<PathBuf>,
    ) -> ApiResult<serde_json::Value> {
        self.dispatch(builder, ResponseShape::to_file(path)).await
    }

    /// GET a "next page"/"previous page" URL returned by an earlier call.
    pub async fn follow_page<T: DeserializeOwned>(
        &self,
        page_url: &str,
        options: DeserializeOptions,
    ) -> ApiResult<T> {
        match self.config.resolve_page_url(page_url) {
            Ok(url) => {
                self.dispatch(RequestBuilder::get(url), ResponseShape::structured().options(options))
                    .await
            }
            Err(e) => ApiResult::from_error(e),
        }
    }

    /// Build the descriptor and dispatch it.
    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        shape: ResponseShape,
    ) -> ApiResult<T> {
        match builder.build() {
            Ok(request) => self.dispatch_request(request, shape).await,
            Err(e) => {
                tracing::error!(target: "docvault::http", err=%e, "invalid request");
                ApiResult::from_error(e)
            }
        }
    }

    /// Dispatch an already built descriptor.
    pub async fn dispatch_request<T: DeserializeOwned>(
        &self,
        request: VaultRequest,
        shape: ResponseShape,
    ) -> ApiResult<T> {
        let ctx = HttpRequestContext::new(request.method, request.full_url());
        let started = Instant::now();

        let result = match self.send(&ctx, request).await {
            Ok(response) => shaping::shape_response(response, &shape).await,
            Err(e) => ApiResult::from_error(e),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result.response_status {
            ResponseStatus::Success => {
                tracing::debug!(target: "docvault::http", request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, status=?result.http_status, elapsed_ms, "request succeeded");
            }
            ResponseStatus::Failure => {
                tracing::warn!(target: "docvault::http", request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, status=?result.http_status, errors=result.errors.len(), elapsed_ms, "request failed");
            }
            ResponseStatus::Exception => {
                tracing::error!(target: "docvault::http", request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, status=?result.http_status, message=?result.response_message, elapsed_ms, "request raised an exception");
            }
        }
        if let Some(cause) = &result.cause {
            for interceptor in &self.interceptors {
                interceptor.on_error(&ctx, cause);
            }
        }
        result
    }

    async fn send(
        &self,
        ctx: &HttpRequestContext,
        request: VaultRequest,
    ) -> Result<TransportResponse, VaultError> {
        let headers = build_request_headers(&self.config, &request.headers)?;
        let body = TransportBody::resolve(request.body).await?;
        let transport_request = TransportRequest {
            ctx: ctx.clone(),
            method: request.method,
            url: ctx.url.clone(),
            headers,
            body,
            timeout: request.timeout,
        };

        for interceptor in &self.interceptors {
            interceptor.on_before_send(ctx, &transport_request)?;
        }
        tracing::debug!(target: "docvault::http", request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, body=%transport_request.body.kind(), "sending request");

        let response = self.transport.execute(transport_request).await?;
        for interceptor in &self.interceptors {
            interceptor.on_response(ctx, response.status, &response.headers);
        }
        Ok(response)
    }
}
