//! HTTP transport abstraction.
//!
//! The dispatcher resolves a request descriptor into a [`TransportRequest`]
//! (opening any local files), then hands it to an [`HttpTransport`]. The
//! default transport is [`ReqwestTransport`]; tests and embedders can inject
//! their own to observe requests or return synthetic responses.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use crate::config::HttpConfig;
use crate::error::VaultError;
use crate::execution::http::client::build_http_client_from_config;
use crate::execution::http::interceptor::HttpRequestContext;
use crate::request::{HttpMethod, PartSource, RequestBody, form_encode};

/// Content type of URL-encoded form bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Payload of one multipart part.
#[derive(Debug)]
pub enum PartData {
    Text(String),
    Bytes(Bytes),
    /// An opened file and its length, streamed by the transport.
    File { file: tokio::fs::File, length: u64 },
}

/// One part of a resolved multipart body.
#[derive(Debug)]
pub struct ResolvedPart {
    pub name: String,
    /// Present for file parts only.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: PartData,
}

/// Transport-level request payload.
#[derive(Debug)]
pub enum TransportBody {
    Empty,
    Bytes {
        content_type: String,
        data: Bytes,
    },
    /// An opened file, streamed by the transport.
    File {
        content_type: String,
        file: tokio::fs::File,
        length: u64,
    },
    /// Form fields first (sorted by name), then file parts in insertion order.
    Multipart(Vec<ResolvedPart>),
}

/// A payload buffered into memory.
#[derive(Debug, Clone)]
pub struct BufferedBody {
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl TransportBody {
    /// Resolve a request body, opening local files.
    ///
    /// Fails with `IoError` when a referenced file cannot be opened.
    pub async fn resolve(body: RequestBody) -> Result<Self, VaultError> {
        let resolved = match body {
            RequestBody::None => Self::Empty,
            RequestBody::Form(fields) => Self::Bytes {
                content_type: FORM_CONTENT_TYPE.to_string(),
                data: Bytes::from(form_encode(&fields)),
            },
            RequestBody::Raw {
                content_type,
                content,
            } => Self::Bytes {
                content_type,
                data: Bytes::from(content),
            },
            RequestBody::Binary {
                content_type,
                bytes,
            } => Self::Bytes {
                content_type,
                data: bytes,
            },
            RequestBody::File { content_type, path } => {
                let (file, length) = open_file(&path).await?;
                Self::File {
                    content_type,
                    file,
                    length,
                }
            }
            RequestBody::Multipart(body) => {
                let mut parts = Vec::with_capacity(body.form_fields.len() + body.file_parts.len());
                for (name, value) in body.form_fields {
                    parts.push(ResolvedPart {
                        name,
                        file_name: None,
                        content_type: None,
                        data: PartData::Text(value),
                    });
                }
                for part in body.file_parts {
                    let data = match part.source {
                        PartSource::Bytes(bytes) => PartData::Bytes(bytes),
                        PartSource::Path(path) => {
                            let (file, length) = open_file(&path).await?;
                            PartData::File { file, length }
                        }
                    };
                    parts.push(ResolvedPart {
                        name: part.field_name,
                        file_name: Some(part.file_name),
                        content_type: Some(part.content_type),
                        data,
                    });
                }
                Self::Multipart(parts)
            }
        };
        Ok(resolved)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Bytes { .. } => "bytes",
            Self::File { .. } => "file",
            Self::Multipart(_) => "multipart",
        }
    }

    /// Buffer the payload into memory, for transports that cannot stream.
    ///
    /// Multipart bodies are encoded with `boundary`.
    pub async fn buffer(self, boundary: &str) -> Result<BufferedBody, VaultError> {
        match self {
            Self::Empty => Ok(BufferedBody {
                content_type: None,
                data: Bytes::new(),
            }),
            Self::Bytes { content_type, data } => Ok(BufferedBody {
                content_type: Some(content_type),
                data,
            }),
            Self::File {
                content_type,
                mut file,
                length,
            } => Ok(BufferedBody {
                content_type: Some(content_type),
                data: read_file(&mut file, length).await?,
            }),
            Self::Multipart(parts) => Ok(BufferedBody {
                content_type: Some(format!("multipart/form-data; boundary={boundary}")),
                data: encode_multipart(parts, boundary).await?,
            }),
        }
    }
}

async fn open_file(path: &Path) -> Result<(tokio::fs::File, u64), VaultError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| VaultError::IoError(format!("cannot open '{}': {e}", path.display())))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| VaultError::IoError(format!("cannot stat '{}': {e}", path.display())))?
        .len();
    Ok((file, length))
}

async fn read_file(file: &mut tokio::fs::File, length: u64) -> Result<Bytes, VaultError> {
    let mut buf = Vec::with_capacity(usize::try_from(length).unwrap_or_default());
    file.read_to_end(&mut buf).await?;
    Ok(Bytes::from(buf))
}

fn quote(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Encode resolved parts as a `multipart/form-data` payload.
pub async fn encode_multipart(parts: Vec<ResolvedPart>, boundary: &str) -> Result<Bytes, VaultError> {
    let mut out = BytesMut::new();
    for part in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", quote(&part.name));
        if let Some(file_name) = &part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", quote(file_name)));
        }
        out.extend_from_slice(disposition.as_bytes());
        out.extend_from_slice(b"\r\n");
        if let Some(content_type) = &part.content_type {
            out.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        match part.data {
            PartData::Text(text) => out.extend_from_slice(text.as_bytes()),
            PartData::Bytes(bytes) => out.extend_from_slice(&bytes),
            PartData::File { mut file, length } => {
                out.extend_from_slice(&read_file(&mut file, length).await?)
            }
        }
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Ok(out.freeze())
}

/// Transport-level request data.
#[derive(Debug)]
pub struct TransportRequest {
    pub ctx: HttpRequestContext,
    pub method: HttpMethod,
    /// Full URL including the query string.
    pub url: String,
    pub headers: HeaderMap,
    pub body: TransportBody,
    /// Per-call deadline.
    pub timeout: Option<Duration>,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes one HTTP round trip.
///
/// Implementations report connection, timeout and DNS failures as
/// `TransportError`; they never retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, VaultError>;
}

/// The default transport, backed by `reqwest`. File bodies and file parts are streamed.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, VaultError> {
        Ok(Self::new(build_http_client_from_config(config)?))
    }
}

fn content_type_value(content_type: &str) -> Result<HeaderValue, VaultError> {
    HeaderValue::from_str(content_type)
        .map_err(|e| VaultError::InvalidArgument(format!("Invalid content type '{content_type}': {e}")))
}

fn build_form(parts: Vec<ResolvedPart>) -> Result<reqwest::multipart::Form, VaultError> {
    use reqwest::multipart::{Form, Part};

    let mut form = Form::new();
    for part in parts {
        let mut p = match part.data {
            PartData::Text(text) => Part::text(text),
            PartData::Bytes(bytes) => Part::bytes(bytes.to_vec()),
            PartData::File { file, length } => Part::stream_with_length(
                reqwest::Body::wrap_stream(ReaderStream::new(file)),
                length,
            ),
        };
        if let Some(file_name) = part.file_name {
            p = p.file_name(file_name);
        }
        if let Some(content_type) = &part.content_type {
            p = p.mime_str(content_type).map_err(|e| {
                VaultError::InvalidArgument(format!("Invalid content type '{content_type}': {e}"))
            })?;
        }
        form = form.part(part.name, p);
    }
    Ok(form)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, VaultError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
            timeout,
            ..
        } = request;

        let mut rb = self.client.request(method.into(), &url);
        if let Some(timeout) = timeout {
            rb = rb.timeout(timeout);
        }
        rb = match body {
            TransportBody::Empty => rb.headers(headers),
            TransportBody::Bytes { content_type, data } => {
                headers.insert(CONTENT_TYPE, content_type_value(&content_type)?);
                rb.headers(headers).body(data)
            }
            TransportBody::File {
                content_type,
                file,
                length,
            } => {
                headers.insert(CONTENT_TYPE, content_type_value(&content_type)?);
                headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
                rb.headers(headers)
                    .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            }
            TransportBody::Multipart(parts) => {
                // Multipart owns its boundary-based Content-Type.
                headers.remove(CONTENT_TYPE);
                rb.headers(headers).multipart(build_form(parts)?)
            }
        };

        let resp = rb.send().await?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|e| VaultError::TransportError(format!("failed to read response body: {e}")))?;
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
