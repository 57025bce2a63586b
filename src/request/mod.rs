//! Request Builder
//!
//! Accumulates the pieces of one outbound call (method, URL, headers, query
//! parameters and exactly one body variant) without doing any I/O. Files named
//! in file bodies or multipart parts are only opened at dispatch time.
//!
//! Body variants are mutually exclusive: repeating the same variant merges
//! (form fields, multipart parts) or replaces (raw, file, binary), while mixing
//! two different variants makes [`RequestBuilder::build`] fail with
//! `InvalidArgument`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;

use crate::error::VaultError;

pub mod encoding;

pub use encoding::{expand_path, form_decode, form_encode, query_string};

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A query or form value in its canonical string form.
///
/// Booleans render as `true`/`false`, integers in plain decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamValue(String);

impl ParamValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self(if value { "true" } else { "false" }.to_string())
    }
}

macro_rules! param_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                Self(value.to_string())
            }
        })*
    };
}

param_value_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self(value.to_string())
    }
}

/// Where a multipart file part's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartSource {
    /// Streamed from a local file at dispatch time.
    Path(PathBuf),
    /// Sent from memory.
    Bytes(Bytes),
}

/// One file part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field_name: String,
    pub source: PartSource,
    pub file_name: String,
    pub content_type: String,
}

impl FilePart {
    /// A part read from `path`; the file name defaults to the last path component.
    pub fn from_path(field_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = guess_content_type(&file_name);
        Self {
            field_name: field_name.into(),
            source: PartSource::Path(path),
            file_name,
            content_type,
        }
    }

    /// A part sent from memory under `file_name`.
    pub fn from_bytes(
        field_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        file_name: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name);
        Self {
            field_name: field_name.into(),
            source: PartSource::Bytes(bytes.into()),
            file_name,
            content_type,
        }
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    fn validate(&self) -> Result<(), VaultError> {
        if self.field_name.is_empty() {
            return Err(VaultError::InvalidArgument(
                "multipart file part needs a field name".into(),
            ));
        }
        match &self.source {
            PartSource::Path(path) if path.as_os_str().is_empty() => {
                Err(VaultError::InvalidArgument(format!(
                    "multipart file part '{}' has neither a path nor bytes",
                    self.field_name
                )))
            }
            _ => Ok(()),
        }
    }
}

fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// A `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    pub form_fields: BTreeMap<String, String>,
    pub file_parts: Vec<FilePart>,
}

/// The single active body of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    None,
    /// URL-encoded form fields.
    Form(BTreeMap<String, String>),
    /// A string with an explicit content type.
    Raw {
        content_type: String,
        content: String,
    },
    /// A local file, streamed at dispatch time.
    File {
        content_type: String,
        path: PathBuf,
    },
    /// An in-memory buffer.
    Binary { content_type: String, bytes: Bytes },
    Multipart(MultipartBody),
}

impl RequestBody {
    /// Short name of the variant, used in conflict errors and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Form(_) => "form",
            Self::Raw { .. } => "raw",
            Self::File { .. } => "file",
            Self::Binary { .. } => "binary",
            Self::Multipart(_) => "multipart",
        }
    }
}

/// A fully built, immutable request descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Header names are lowercase.
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

impl VaultRequest {
    /// Sorted, percent-encoded query string (empty when there are no parameters).
    pub fn query_string(&self) -> String {
        query_string(&self.query)
    }

    /// The URL with the query string appended.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, self.query_string())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Chaining builder for [`VaultRequest`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    url: String,
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    body: RequestBody,
    timeout: Option<Duration>,
    error: Option<VaultError>,
}

impl RequestBuilder {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: RequestBody::None,
            timeout: None,
            error: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set a header, replacing any value under the same (case-insensitive) name.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Shorthand for the `Accept` header.
    pub fn accept(self, value: impl Into<String>) -> Self {
        self.header("accept", value)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query.insert(name.into(), value.into().into_string());
        self
    }

    /// Add query parameters only when a value is present.
    pub fn query_opt<V: Into<ParamValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Per-call deadline, forwarded to the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        if self.switch_body("form") {
            if let RequestBody::None = self.body {
                self.body = RequestBody::Form(BTreeMap::new());
            }
            if let RequestBody::Form(fields) = &mut self.body {
                fields.insert(name.into(), value.into().into_string());
            }
        }
        self
    }

    pub fn form_fields<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        fields
            .into_iter()
            .fold(self, |builder, (k, v)| builder.form_field(k, v))
    }

    pub fn raw_body(mut self, content_type: impl Into<String>, content: impl Into<String>) -> Self {
        if self.switch_body("raw") {
            self.body = RequestBody::Raw {
                content_type: content_type.into(),
                content: content.into(),
            };
        }
        self
    }

    /// Stream the file at `path` as the body. The file is not touched until dispatch.
    pub fn file_body(mut self, content_type: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        if self.switch_body("file") {
            self.body = RequestBody::File {
                content_type: content_type.into(),
                path: path.into(),
            };
        }
        self
    }

    pub fn binary_body(mut self, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        if self.switch_body("binary") {
            self.body = RequestBody::Binary {
                content_type: content_type.into(),
                bytes: bytes.into(),
            };
        }
        self
    }

    pub fn multipart_field(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        if let Some(body) = self.multipart_mut() {
            body.form_fields
                .insert(name.into(), value.into().into_string());
        }
        self
    }

    pub fn multipart_part(mut self, part: FilePart) -> Self {
        if let Err(e) = part.validate() {
            self.record(e);
            return self;
        }
        if let Some(body) = self.multipart_mut() {
            body.file_parts.push(part);
        }
        self
    }

    /// Add a file part streamed from `path`.
    pub fn multipart_file(self, field_name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.multipart_part(FilePart::from_path(field_name, path.as_ref()))
    }

    /// Add a file part sent from memory.
    pub fn multipart_bytes(
        self,
        field_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        file_name: impl Into<String>,
    ) -> Self {
        self.multipart_part(FilePart::from_bytes(field_name, bytes, file_name))
    }

    /// Finish the descriptor, reporting the first builder error.
    pub fn build(self) -> Result<VaultRequest, VaultError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.url.trim().is_empty() {
            return Err(VaultError::InvalidArgument("request URL must not be empty".into()));
        }
        Ok(VaultRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            body: self.body,
            timeout: self.timeout,
        })
    }

    fn multipart_mut(&mut self) -> Option<&mut MultipartBody> {
        if !self.switch_body("multipart") {
            return None;
        }
        if let RequestBody::None = self.body {
            self.body = RequestBody::Multipart(MultipartBody::default());
        }
        match &mut self.body {
            RequestBody::Multipart(body) => Some(body),
            _ => None,
        }
    }

    /// Whether the body may become (or stay) `next`; records a conflict otherwise.
    fn switch_body(&mut self, next: &'static str) -> bool {
        let current = self.body.kind();
        if current == "none" || current == next {
            return true;
        }
        self.record(VaultError::InvalidArgument(format!(
            "conflicting request bodies: {current} body already set, cannot add {next} body"
        )));
        false
    }

    fn record(&mut self, error: VaultError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
