//! Document Service
//!
//! The one data-access layer both surfaces share. It owns the multi-step
//! semantics the views should not care about: reading the selected file,
//! the two-store upload, the delete policy, and optional compensation when
//! an upload lands in only one store.

use std::sync::Arc;

use crate::api::DocsBackend;
use crate::config::DeletePolicy;
use crate::error::{BackendError, BackendResult};
use crate::model::{Document, HealthReport, UploadFile, UploadSelection};

/// Knobs the service reads from configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceSettings {
    /// What a confirmed delete removes
    pub delete_policy: DeletePolicy,
    /// Undo the index write when the record write fails
    pub rollback_partial_uploads: bool,
}

/// How an upload ended
#[derive(Debug)]
pub enum UploadOutcome {
    /// Written to the index store and the record store
    Complete,
    /// Written to the index store only; the record write failed
    Partial {
        /// Why the record write failed
        error: BackendError,
        /// `Some(true)` if the index write was undone, `Some(false)` if the
        /// undo failed, `None` if no undo was attempted
        rolled_back: Option<bool>,
    },
    /// Nothing was written
    Failed {
        /// Why (file unreadable or index write rejected)
        error: BackendError,
    },
}

impl UploadOutcome {
    /// Whether both stores now hold the file
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether the index store changed (so history may have changed too)
    #[must_use]
    pub fn wrote_anything(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// How a delete ended
#[derive(Debug)]
pub struct DeleteOutcome {
    /// Result of the record-store delete
    pub record: BackendResult<()>,
    /// Result of the index delete, if the policy asked for one
    pub index: Option<BackendResult<()>>,
}

impl DeleteOutcome {
    /// Whether every attempted delete succeeded
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.record.is_ok() && self.index.as_ref().map_or(true, Result::is_ok)
    }
}

/// Shared document operations over any [`DocsBackend`]
#[derive(Clone)]
pub struct DocsService {
    backend: Arc<dyn DocsBackend>,
    settings: ServiceSettings,
}

impl DocsService {
    /// Create a service over `backend`
    pub fn new(backend: impl DocsBackend + 'static, settings: ServiceSettings) -> Self {
        Self::from_arc(Arc::new(backend), settings)
    }

    /// Create a service over a shared backend
    pub fn from_arc(backend: Arc<dyn DocsBackend>, settings: ServiceSettings) -> Self {
        Self { backend, settings }
    }

    /// Fetch the record store's document history
    ///
    /// # Errors
    ///
    /// Any backend failure, unchanged.
    pub async fn fetch_history(&self) -> BackendResult<Vec<Document>> {
        let docs = self.backend.list_documents().await?;
        tracing::debug!(backend = self.backend.name(), count = docs.len(), "Fetched history");
        Ok(docs)
    }

    /// Upload a selected file to the index store, then the record store
    ///
    /// The two writes are not atomic. A record failure after a successful
    /// index write is reported as [`UploadOutcome::Partial`].
    pub async fn upload(&self, selection: &UploadSelection) -> UploadOutcome {
        let bytes = match tokio::fs::read(&selection.path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                let error = BackendError::ReadFile {
                    path: selection.path.clone(),
                    source,
                };
                tracing::warn!(file = %selection.name, %error, "Upload failed before sending");
                return UploadOutcome::Failed { error };
            }
        };
        self.upload_file(&UploadFile::new(selection.name.clone(), bytes))
            .await
    }

    /// Upload in-memory file contents to both stores
    pub async fn upload_file(&self, file: &UploadFile) -> UploadOutcome {
        if let Err(error) = self.backend.upload_to_index(file).await {
            tracing::warn!(file = %file.name, kind = error.kind(), %error, "Index upload failed");
            return UploadOutcome::Failed { error };
        }

        let Err(error) = self.backend.upload_record(file).await else {
            tracing::info!(file = %file.name, "Uploaded to index and record store");
            return UploadOutcome::Complete;
        };

        tracing::warn!(
            file = %file.name,
            kind = error.kind(),
            %error,
            "Record upload failed after index upload succeeded"
        );

        let rolled_back = if self.settings.rollback_partial_uploads {
            match self.backend.delete_from_index(&file.name).await {
                Ok(()) => {
                    tracing::info!(file = %file.name, "Rolled back index upload");
                    Some(true)
                }
                Err(undo_error) => {
                    tracing::error!(
                        file = %file.name,
                        error = %undo_error,
                        "Index rollback failed; stores are inconsistent"
                    );
                    Some(false)
                }
            }
        } else {
            None
        };

        UploadOutcome::Partial { error, rolled_back }
    }

    /// Delete a document according to the configured [`DeletePolicy`]
    pub async fn delete(&self, document: &Document) -> DeleteOutcome {
        let record = self.backend.delete_record(&document.id).await;
        if let Err(ref error) = record {
            tracing::warn!(id = %document.id, %error, "Record delete failed");
        }

        let index = match self.settings.delete_policy {
            DeletePolicy::RecordOnly => None,
            DeletePolicy::RecordAndIndex => {
                let result = self.backend.delete_from_index(&document.name).await;
                if let Err(ref error) = result {
                    tracing::warn!(file = %document.name, %error, "Index delete failed");
                }
                Some(result)
            }
        };

        DeleteOutcome { record, index }
    }

    /// Ask a question
    ///
    /// # Errors
    ///
    /// Any backend failure, unchanged.
    pub async fn ask(&self, question: &str) -> BackendResult<String> {
        self.backend.ask(question).await
    }

    /// Probe backend health
    ///
    /// # Errors
    ///
    /// Any backend failure, unchanged.
    pub async fn health(&self) -> BackendResult<HealthReport> {
        self.backend.health().await
    }
}

impl std::fmt::Debug for DocsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsService")
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .finish()
    }
}
