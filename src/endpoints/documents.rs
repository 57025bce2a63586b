//! Document endpoints.
//!
//! Thin call sites over `objects/documents`: each one expands a URL template,
//! attaches parameters and picks a response shape. There is no logic here
//! beyond that.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DefaultOnNull, OneOrMany, serde_as};

use crate::client::VaultClient;
use crate::request::{HttpMethod, ParamValue, RequestBuilder, expand_path};
use crate::types::{ApiErrorEntry, ApiResult, DeserializeOptions, ResponseShape};

const DOCUMENTS: &str = "objects/documents";
const DOCUMENT: &str = "objects/documents/{doc_id}";
const DOCUMENT_FILE: &str = "objects/documents/{doc_id}/file";
const DOCUMENT_BATCH: &str = "objects/documents/batch";

/// A document and its field values.
///
/// Well-known fields are typed; everything else (custom fields included) is
/// kept in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    #[serde(rename = "name__v", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "title__v", default)]
    pub title: Option<String>,
    #[serde(rename = "type__v", default)]
    pub document_type: Option<String>,
    #[serde(rename = "lifecycle__v", default)]
    pub lifecycle: Option<String>,
    #[serde(rename = "status__v", default)]
    pub status: Option<String>,
    #[serde(rename = "major_version_number__v", default)]
    pub major_version: Option<u32>,
    #[serde(rename = "minor_version_number__v", default)]
    pub minor_version: Option<u32>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub number: String,
    pub value: String,
}

/// Body of "retrieve document".
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    pub document: Document,
    #[serde_as(as = "DefaultOnNull<OneOrMany<_>>")]
    #[serde(default)]
    pub versions: Vec<DocumentVersion>,
    #[serde(default)]
    pub renditions: BTreeMap<String, String>,
}

/// Paging block of list responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseDetails {
    pub size: Option<u64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub total: Option<u64>,
    pub next_page: Option<String>,
    pub previous_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentEntry {
    pub document: Document,
}

/// Body of "list documents".
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
    #[serde(rename = "responseDetails", default)]
    pub response_details: Option<ResponseDetails>,
}

impl DocumentList {
    pub fn next_page(&self) -> Option<&str> {
        self.response_details
            .as_ref()
            .and_then(|d| d.next_page.as_deref())
    }

    pub fn previous_page(&self) -> Option<&str> {
        self.response_details
            .as_ref()
            .and_then(|d| d.previous_page.as_deref())
    }
}

/// Paging and filtering for "list documents".
#[derive(Debug, Clone, Default)]
pub struct ListDocuments {
    pub limit: Option<u32>,
    pub start: Option<u32>,
    pub sort: Option<String>,
    pub named_filter: Option<String>,
    pub search: Option<String>,
}

/// Body of create/update calls.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentIdResponse {
    pub id: u64,
}

/// One row of a batch result.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRow {
    #[serde(rename = "responseStatus")]
    pub response_status: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

/// Body of batch calls; a one-row batch may come back as a single object.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub data: Vec<BatchRow>,
}

/// Document endpoint group, borrowed from a [`VaultClient`].
#[derive(Debug, Clone, Copy)]
pub struct Documents<'a> {
    client: &'a VaultClient,
}

impl<'a> Documents<'a> {
    pub fn new(client: &'a VaultClient) -> Self {
        Self { client }
    }

    fn document_path(template: &str, doc_id: u64) -> String {
        expand_path(template, &[("doc_id", &doc_id.to_string())])
    }

    fn request(&self, method: HttpMethod, path: &str) -> RequestBuilder {
        self.client.request(method, path)
    }

    /// `GET objects/documents/{doc_id}`
    pub async fn retrieve_document(&self, doc_id: u64) -> ApiResult<DocumentResponse> {
        let path = Self::document_path(DOCUMENT, doc_id);
        self.client
            .dispatcher()
            .execute(self.request(HttpMethod::Get, &path))
            .await
    }

    /// `GET objects/documents`
    pub async fn list_documents(&self, params: &ListDocuments) -> ApiResult<DocumentList> {
        let builder = self
            .request(HttpMethod::Get, DOCUMENTS)
            .query_opt("limit", params.limit)
            .query_opt("start", params.start)
            .query_opt("sort", params.sort.as_ref())
            .query_opt("named_filter", params.named_filter.as_ref())
            .query_opt("search", params.search.as_ref());
        self.client
            .dispatcher()
            .dispatch(builder, ResponseShape::structured().options(list_options()))
            .await
    }

    /// Follow `next_page`/`previous_page` of a [`DocumentList`].
    pub async fn list_documents_page(&self, page_url: &str) -> ApiResult<DocumentList> {
        self.client.follow_page(page_url, list_options()).await
    }

    /// `POST objects/documents` with form fields.
    pub async fn create_document<I, K, V>(&self, fields: I) -> ApiResult<DocumentIdResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let builder = self.request(HttpMethod::Post, DOCUMENTS).form_fields(fields);
        self.client.dispatcher().execute(builder).await
    }

    /// `POST objects/documents` with the source file as a multipart part.
    pub async fn create_document_with_file<I, K, V>(
        &self,
        fields: I,
        file: impl AsRef<Path>,
    ) -> ApiResult<DocumentIdResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let builder = fields
            .into_iter()
            .fold(self.request(HttpMethod::Post, DOCUMENTS), |b, (k, v)| {
                b.multipart_field(k, v)
            })
            .multipart_file("file", file);
        self.client.dispatcher().execute(builder).await
    }

    /// `PUT objects/documents/{doc_id}` with form fields.
    pub async fn update_document<I, K, V>(
        &self,
        doc_id: u64,
        fields: I,
    ) -> ApiResult<DocumentIdResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let path = Self::document_path(DOCUMENT, doc_id);
        let builder = self.request(HttpMethod::Put, &path).form_fields(fields);
        self.client.dispatcher().execute(builder).await
    }

    /// `GET objects/documents/{doc_id}/file`, written to `output`.
    pub async fn download_document_file(
        &self,
        doc_id: u64,
        output: impl Into<PathBuf>,
    ) -> ApiResult<Value> {
        let path = Self::document_path(DOCUMENT_FILE, doc_id);
        self.client
            .dispatcher()
            .execute_to_file(self.request(HttpMethod::Get, &path).accept("*/*"), output)
            .await
    }

    /// `GET objects/documents/{doc_id}/file`, kept in memory.
    pub async fn retrieve_document_file(&self, doc_id: u64) -> ApiResult<Value> {
        let path = Self::document_path(DOCUMENT_FILE, doc_id);
        self.client
            .dispatcher()
            .execute_with_binary(self.request(HttpMethod::Get, &path).accept("*/*"))
            .await
    }

    /// `POST objects/documents/batch` with a CSV body.
    pub async fn upload_document_csv(&self, csv: impl Into<String>) -> ApiResult<BatchResponse> {
        let builder = self
            .request(HttpMethod::Post, DOCUMENT_BATCH)
            .raw_body("text/csv", csv);
        self.client
            .dispatcher()
            .dispatch(
                builder,
                ResponseShape::structured()
                    .options(DeserializeOptions::new().single_value_as_array_at("/data")),
            )
            .await
    }
}

fn list_options() -> DeserializeOptions {
    DeserializeOptions::new().single_value_as_array_at("/documents")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::types::ResponseStatus;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> VaultClient {
        let config = ClientConfig::new(&server.url())
            .unwrap()
            .with_api_version("v24.1")
            .with_session_token("session-1");
        VaultClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn retrieve_document_accepts_single_version_object() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v24.1/objects/documents/42")
            .match_header("authorization", "Bearer session-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"responseStatus":"SUCCESS","document":{"id":42,"name__v":"Protocol","product__v":"P-1"},
                    "versions":{"number":"0.1","value":"https://host/api/v24.1/objects/documents/42/versions/0/1"}}"#,
            )
            .create_async()
            .await;

        let result = client(&server).documents().retrieve_document(42).await;
        mock.assert_async().await;

        assert_eq!(result.response_status, ResponseStatus::Success);
        let data = result.into_data().unwrap();
        assert_eq!(data.document.id, 42);
        assert_eq!(data.document.name.as_deref(), Some("Protocol"));
        assert_eq!(data.document.fields["product__v"], "P-1");
        assert_eq!(data.versions.len(), 1);
    }

    #[tokio::test]
    async fn list_documents_sends_paging_and_exposes_next_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v24.1/objects/documents")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "1".into()),
                Matcher::UrlEncoded("start".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"responseStatus":"SUCCESS",
                    "responseDetails":{"size":1,"limit":1,"offset":0,"total":2,
                        "next_page":"/api/v24.1/objects/documents?start=1&limit=1"},
                    "documents":{"document":{"id":1}}}"#,
            )
            .create_async()
            .await;

        let params = ListDocuments {
            limit: Some(1),
            start: Some(0),
            ..Default::default()
        };
        let result = client(&server).documents().list_documents(&params).await;
        mock.assert_async().await;

        let list = result.into_data().unwrap();
        assert_eq!(list.documents.len(), 1);
        assert_eq!(list.documents[0].document.id, 1);
        assert_eq!(
            list.next_page(),
            Some("/api/v24.1/objects/documents?start=1&limit=1")
        );
        assert!(list.previous_page().is_none());
    }

    #[tokio::test]
    async fn update_document_sends_form_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v24.1/objects/documents/7")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("title__v".into(), "Annual report & summary".into()),
                Matcher::UrlEncoded("major_version_number__v".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"responseStatus":"SUCCESS","id":7}"#)
            .create_async()
            .await;

        let result = client(&server)
            .documents()
            .update_document(
                7,
                [
                    ("title__v", ParamValue::from("Annual report & summary")),
                    ("major_version_number__v", ParamValue::from(2_u32)),
                ],
            )
            .await;
        mock.assert_async().await;
        assert_eq!(result.into_data().unwrap().id, 7);
    }

    #[tokio::test]
    async fn csv_batch_coerces_single_row() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v24.1/objects/documents/batch")
            .match_header("content-type", "text/csv")
            .match_body("file,name__v\nreport.pdf,Report\n")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"responseStatus":"SUCCESS","data":{"responseStatus":"SUCCESS","id":99}}"#)
            .create_async()
            .await;

        let result = client(&server)
            .documents()
            .upload_document_csv("file,name__v\nreport.pdf,Report\n")
            .await;
        mock.assert_async().await;

        let batch = result.into_data().unwrap();
        assert_eq!(batch.data.len(), 1);
        assert_eq!(batch.data[0].id, Some(99));
    }
}
