//! Document Manager surface
//!
//! Upload, list and delete with no chat. Every result is reported through
//! a modal [`Alert`] the user has to dismiss.

use std::collections::VecDeque;

use crate::dispatch::{Completion, Envelope, Request};
use crate::lifetime::{Lifetime, Ticket};
use crate::model::{Document, DocumentId, UploadSelection};
use crate::service::{DeleteOutcome, UploadOutcome};
use crate::views::{DocumentList, UploadPanel};

use super::{partial_upload_notice, BackendStatus};

/// Alert when upload is pressed with nothing selected
pub const SELECT_FILE_FIRST: &str = "Please select a file first!";

/// Alert after a complete upload
pub const UPLOAD_SUCCEEDED: &str = "File uploaded to index and record store";

/// Alert after an upload that wrote nothing
pub const UPLOAD_FAILED: &str = "Upload failed!";

/// Alert after a successful delete
pub const DELETE_SUCCEEDED: &str = "Document deleted!";

/// Alert after a failed delete
pub const DELETE_FAILED: &str = "Delete failed!";

/// A modal message the user must dismiss
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    /// Text to show
    pub text: String,
}

impl Alert {
    /// Create an alert
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Standalone upload/list/delete surface
#[derive(Debug, Default)]
pub struct DocumentManager {
    lifetime: Lifetime,
    upload: UploadPanel,
    documents: DocumentList,
    alerts: VecDeque<Alert>,
    backend_status: BackendStatus,
}

impl DocumentManager {
    /// Create an unmounted surface
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the surface: fetch history, then probe health
    pub fn mount(&mut self) -> Vec<(Ticket, Request)> {
        self.lifetime.begin();
        self.reset_pending();
        tracing::debug!("DocumentManager mounted");
        self.refresh()
    }

    /// Unmount the surface; completions still in flight will be discarded
    pub fn unmount(&mut self) {
        self.lifetime.end();
        self.reset_pending();
        tracing::debug!("DocumentManager unmounted");
    }

    fn reset_pending(&mut self) {
        self.upload.reset_pending();
        self.documents.reset_pending();
    }

    /// Whether the surface is mounted
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.lifetime.is_active()
    }

    fn issue(&mut self, request: Request) -> (Ticket, Request) {
        (self.lifetime.ticket(), request)
    }

    /// Refetch history and re-probe health
    pub fn refresh(&mut self) -> Vec<(Ticket, Request)> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let fetch = self.documents.begin_fetch();
        vec![self.issue(fetch), self.issue(Request::ProbeHealth)]
    }

    /// Select a file for upload
    pub fn select_file(&mut self, selection: UploadSelection) {
        self.upload.select(selection);
    }

    /// Upload the selected file, or alert that there is none
    pub fn submit_upload(&mut self) -> Vec<(Ticket, Request)> {
        if !self.is_mounted() || self.upload.is_uploading() {
            return Vec::new();
        }
        match self.upload.submit() {
            Some(request) => vec![self.issue(request)],
            None => {
                self.raise(SELECT_FILE_FIRST);
                Vec::new()
            }
        }
    }

    /// Open the delete confirmation for a document
    pub fn request_delete(&mut self, id: &DocumentId) -> bool {
        self.documents.request_delete(id)
    }

    /// Confirm the open delete prompt
    pub fn confirm_delete(&mut self) -> Vec<(Ticket, Request)> {
        if !self.is_mounted() {
            return Vec::new();
        }
        match self.documents.confirm_delete() {
            Some(request) => vec![self.issue(request)],
            None => Vec::new(),
        }
    }

    /// Dismiss the open delete prompt
    pub fn cancel_delete(&mut self) {
        self.documents.cancel_delete();
    }

    // ------------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------------

    fn raise(&mut self, text: impl Into<String>) {
        let alert = Alert::new(text);
        tracing::debug!(text = %alert.text, "Alert raised");
        self.alerts.push_back(alert);
    }

    /// The alert currently showing
    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    /// Dismiss the alert currently showing
    pub fn dismiss_alert(&mut self) -> Option<Alert> {
        self.alerts.pop_front()
    }

    // ------------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------------

    /// Apply a completion; returns follow-up requests
    ///
    /// Envelopes whose ticket this surface no longer accepts are dropped
    /// without touching any state.
    pub fn apply(&mut self, envelope: Envelope) -> Vec<(Ticket, Request)> {
        let Envelope { ticket, completion } = envelope;
        if !self.lifetime.accepts(&ticket) {
            tracing::debug!(%ticket, kind = %completion.kind(), "Discarding stale completion");
            return Vec::new();
        }

        match completion {
            Completion::Uploaded { selection, outcome } => self.settle_upload(&selection, &outcome),
            Completion::Deleted { document, outcome } => self.settle_delete(&document, &outcome),
            Completion::History(result) => {
                self.documents.settle_fetch(result);
                Vec::new()
            }
            Completion::Health(result) => {
                self.backend_status = BackendStatus::from_probe(result);
                Vec::new()
            }
            Completion::Answer(_) => {
                tracing::warn!(%ticket, "DocumentManager never asks questions; answer ignored");
                Vec::new()
            }
        }
    }

    fn settle_upload(
        &mut self,
        selection: &UploadSelection,
        outcome: &UploadOutcome,
    ) -> Vec<(Ticket, Request)> {
        self.upload.settle(selection, outcome);
        match outcome {
            UploadOutcome::Complete => self.raise(UPLOAD_SUCCEEDED),
            UploadOutcome::Partial { rolled_back, .. } => {
                self.raise(partial_upload_notice(&selection.name, *rolled_back));
            }
            UploadOutcome::Failed { .. } => {
                self.raise(UPLOAD_FAILED);
                return Vec::new();
            }
        }
        let fetch = self.documents.begin_fetch();
        vec![self.issue(fetch)]
    }

    fn settle_delete(
        &mut self,
        document: &Document,
        outcome: &DeleteOutcome,
    ) -> Vec<(Ticket, Request)> {
        self.raise(if outcome.succeeded() {
            DELETE_SUCCEEDED
        } else {
            DELETE_FAILED
        });
        let fetch = self.documents.settle_delete(document, outcome);
        vec![self.issue(fetch)]
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    /// Upload panel
    #[must_use]
    pub fn upload(&self) -> &UploadPanel {
        &self.upload
    }

    /// Upload panel, for editing the path
    pub fn upload_mut(&mut self) -> &mut UploadPanel {
        &mut self.upload
    }

    /// Document list
    #[must_use]
    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    /// Document list, for moving the cursor
    pub fn documents_mut(&mut self) -> &mut DocumentList {
        &mut self.documents
    }

    /// Last health probe result
    #[must_use]
    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend_status
    }
}
