//! # docvault - request/response dispatch core for a document-management REST API
//!
//! Every endpoint call is the same shape: expand a URL template, describe the
//! call with a [`RequestBuilder`], and hand it to the [`Dispatcher`] together
//! with the expected response shape. The dispatcher performs exactly one HTTP
//! round trip and always returns an [`ApiResult`] carrying a normalized
//! `SUCCESS`/`FAILURE`/`EXCEPTION` status; transport, file and parse failures
//! are reported the same way as API errors.
//!
#![deny(unsafe_code)]

//! ## Quick Start
//!
//! ```rust,no_run
//! use docvault::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), VaultError> {
//!     let config = ClientConfig::new("https://acme.example.com")?
//!         .with_api_version("v24.1")
//!         .with_session_token("session-id");
//!     let client = VaultClient::new(config)?;
//!
//!     let result = client.documents().retrieve_document(123).await;
//!     match result.response_status {
//!         ResponseStatus::Success => println!("{:?}", result.data),
//!         _ => eprintln!("{:?}", result.errors),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod execution;
pub mod request;
pub mod types;

pub use client::VaultClient;
pub use config::{ClientConfig, HttpConfig};
pub use error::VaultError;
pub use execution::Dispatcher;
pub use request::{HttpMethod, RequestBuilder, VaultRequest};
pub use types::{ApiResult, DeserializeOptions, OutputMode, ResponseShape, ResponseStatus};

/// Commonly used types.
pub mod prelude {
    pub use crate::client::VaultClient;
    pub use crate::config::{ClientConfig, HttpConfig};
    pub use crate::error::{ErrorCategory, VaultError};
    pub use crate::execution::Dispatcher;
    pub use crate::execution::http::{HttpInterceptor, HttpTransport, LoggingInterceptor};
    pub use crate::request::{FilePart, HttpMethod, RequestBuilder};
    pub use crate::types::{
        ApiErrorEntry, ApiResult, ApiWarning, BinaryContent, DeserializeOptions, OutputMode,
        ResponseShape, ResponseStatus,
    };
}
