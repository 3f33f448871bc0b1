//! Backend API
//!
//! The [`DocsBackend`] trait is the seam between PolicyBot and the external
//! Q&A service. [`HttpBackend`] implements it over HTTP; tests implement it
//! in memory.
//!
//! # Endpoints
//!
//! | Call | Method | Path |
//! |------|--------|------|
//! | [`list_documents`](DocsBackend::list_documents) | GET | `/api/docs/history` |
//! | [`upload_to_index`](DocsBackend::upload_to_index) | POST | `/api/rag/upload` |
//! | [`upload_record`](DocsBackend::upload_record) | POST | `/api/docs/upload` |
//! | [`delete_record`](DocsBackend::delete_record) | DELETE | `/api/docs/{id}` |
//! | [`delete_from_index`](DocsBackend::delete_from_index) | DELETE | `/api/rag/delete?filename=` |
//! | [`ask`](DocsBackend::ask) | GET | `/api/query/ask?question=` |
//! | [`health`](DocsBackend::health) | GET | `/api/query/health` |
//!
//! Upload and delete responses are only checked for status; their bodies
//! are human-readable strings nobody parses.

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Url;

use crate::config::BackendSettings;
use crate::error::{BackendError, BackendResult};
use crate::model::{Document, DocumentId, HealthReport, UploadFile};

const HISTORY_PATH: &str = "/api/docs/history";
const RECORD_UPLOAD_PATH: &str = "/api/docs/upload";
const RECORD_PATH: &str = "/api/docs/";
const INDEX_UPLOAD_PATH: &str = "/api/rag/upload";
const INDEX_DELETE_PATH: &str = "/api/rag/delete";
const ASK_PATH: &str = "/api/query/ask";
const HEALTH_PATH: &str = "/api/query/health";

/// Operations the PolicyBot backend offers
///
/// Implement this trait to point PolicyBot at something other than HTTP.
#[async_trait]
pub trait DocsBackend: Send + Sync {
    /// Get the backend name for logs
    fn name(&self) -> &str;

    /// Fetch the full document history from the record store
    async fn list_documents(&self) -> BackendResult<Vec<Document>>;

    /// Write a file into the index store
    async fn upload_to_index(&self, file: &UploadFile) -> BackendResult<()>;

    /// Write a file into the record store
    async fn upload_record(&self, file: &UploadFile) -> BackendResult<()>;

    /// Delete a record-store entry by id
    async fn delete_record(&self, id: &DocumentId) -> BackendResult<()>;

    /// Delete every index entry whose source is `filename`
    async fn delete_from_index(&self, filename: &str) -> BackendResult<()>;

    /// Ask a question; returns the answer text as-is (possibly empty)
    async fn ask(&self, question: &str) -> BackendResult<String>;

    /// Ask the backend how it is doing
    async fn health(&self) -> BackendResult<HealthReport>;
}

/// [`DocsBackend`] over HTTP
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Origin every path is joined onto
    base_url: Url,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend for `base_url` with no request timeout
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidUrl`] if `base_url` does not parse, or
    /// [`BackendError::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> BackendResult<Self> {
        Self::from_config(&BackendSettings {
            base_url: base_url.to_string(),
            request_timeout: None,
        })
    }

    /// Create from [`BackendSettings`]
    ///
    /// # Errors
    ///
    /// Same as [`HttpBackend::new`].
    pub fn from_config(settings: &BackendSettings) -> BackendResult<Self> {
        let mut base_url = Url::parse(&settings.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        // Endpoint paths are joined relative to the origin's path prefix
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http_client: builder.build()?,
        })
    }

    /// The configured origin
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an endpoint path onto the origin, keeping any path prefix
    fn endpoint(&self, path: &str) -> BackendResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| BackendError::InvalidUrl(format!("{path}: {e}")))
    }

    fn record_url(&self, id: &DocumentId) -> BackendResult<Url> {
        let mut url = self.endpoint(RECORD_PATH)?;
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    fn ask_url(&self, question: &str) -> BackendResult<Url> {
        let mut url = self.endpoint(ASK_PATH)?;
        url.query_pairs_mut().append_pair("question", question);
        Ok(url)
    }

    fn index_delete_url(&self, filename: &str) -> BackendResult<Url> {
        let mut url = self.endpoint(INDEX_DELETE_PATH)?;
        url.query_pairs_mut().append_pair("filename", filename);
        Ok(url)
    }

    fn file_form(file: &UploadFile) -> multipart::Form {
        let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        multipart::Form::new().part("file", part)
    }

    /// Turn a non-success response into [`BackendError::Status`]
    async fn check(response: reqwest::Response) -> BackendResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status { status, body })
    }

    async fn post_file(&self, path: &str, file: &UploadFile) -> BackendResult<()> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, file = %file.name, bytes = file.bytes.len(), "Uploading file");

        let response = self
            .http_client
            .post(url)
            .multipart(Self::file_form(file))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, url: Url) -> BackendResult<()> {
        tracing::debug!(%url, "Deleting");
        let response = self.http_client.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocsBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list_documents(&self) -> BackendResult<Vec<Document>> {
        let url = self.endpoint(HISTORY_PATH)?;
        let response = self.http_client.get(url).send().await?;
        let response = Self::check(response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn upload_to_index(&self, file: &UploadFile) -> BackendResult<()> {
        self.post_file(INDEX_UPLOAD_PATH, file).await
    }

    async fn upload_record(&self, file: &UploadFile) -> BackendResult<()> {
        self.post_file(RECORD_UPLOAD_PATH, file).await
    }

    async fn delete_record(&self, id: &DocumentId) -> BackendResult<()> {
        self.delete(self.record_url(id)?).await
    }

    async fn delete_from_index(&self, filename: &str) -> BackendResult<()> {
        self.delete(self.index_delete_url(filename)?).await
    }

    async fn ask(&self, question: &str) -> BackendResult<String> {
        let url = self.ask_url(question)?;
        let response = self.http_client.get(url).send().await?;
        let response = Self::check(response).await?;
        Ok(response.text().await?)
    }

    async fn health(&self) -> BackendResult<HealthReport> {
        let url = self.endpoint(HEALTH_PATH)?;
        let response = self.http_client.get(url).send().await?;
        let response = Self::check(response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}
