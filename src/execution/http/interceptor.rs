//! HTTP Interceptor interfaces
//!
//! Interceptors observe each dispatch: they see the resolved request before it
//! is sent, the status of the response, and any error. The hooks are
//! best-effort and should avoid expensive work. A `before_send` hook may veto
//! a call by returning an error.

use reqwest::header::HeaderMap;

use crate::error::VaultError;
use crate::execution::http::transport::TransportRequest;
use crate::request::HttpMethod;

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    pub request_id: String,
    pub method: HttpMethod,
    pub url: String,
}

impl HttpRequestContext {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            request_id: generate_request_id(),
            method,
            url: url.into(),
        }
    }
}

/// Generate a unique request id.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending. Returning an error short-circuits the call.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        _request: &TransportRequest,
    ) -> Result<(), VaultError> {
        Ok(())
    }

    /// Called once a response has been received, whatever its status.
    fn on_response(&self, _ctx: &HttpRequestContext, _status: u16, _headers: &HeaderMap) {}

    /// Called when the call ends in an error (transport, I/O, API or parse).
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &VaultError) {}
}

/// A simple logging interceptor backed by `tracing` (no sensitive data).
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        request: &TransportRequest,
    ) -> Result<(), VaultError> {
        tracing::debug!(target: "docvault::http", request_id=%ctx.request_id, method=%ctx.method, url=%ctx.url, body=%request.body.kind(), "sending request");
        Ok(())
    }

    fn on_response(&self, ctx: &HttpRequestContext, status: u16, _headers: &HeaderMap) {
        tracing::debug!(target: "docvault::http", request_id=%ctx.request_id, url=%ctx.url, status=%status, "response received");
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &VaultError) {
        tracing::debug!(target: "docvault::http", request_id=%ctx.request_id, url=%ctx.url, err=%error, "request error");
    }
}
