//! Document List
//!
//! The record store's history, a cursor over it, the delete confirmation
//! and the fetch/delete operations.

use crate::dispatch::Request;
use crate::error::BackendResult;
use crate::model::{Document, DocumentId};
use crate::ops::{OpState, Settlement};
use crate::service::DeleteOutcome;

/// Busy indicator while history is being fetched
pub const REFRESHING_INDICATOR: &str = "Refreshing...";

/// Asked before any delete is sent
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this document?";

/// Document history with selection and delete confirmation
#[derive(Clone, Debug, Default)]
pub struct DocumentList {
    documents: Vec<Document>,
    cursor: usize,
    confirming: Option<Document>,
    fetches_in_flight: usize,
    delete: OpState,
}

impl DocumentList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents from the most recent successful fetch
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    // ------------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------------

    /// Start a history fetch
    pub fn begin_fetch(&mut self) -> Request {
        self.fetches_in_flight += 1;
        Request::FetchHistory
    }

    /// Whether any fetch is in flight
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.fetches_in_flight > 0
    }

    /// Forget fetches and deletes whose completions will never arrive
    pub fn reset_pending(&mut self) {
        self.fetches_in_flight = 0;
        self.delete.reset();
    }

    /// Settle one fetch. A success replaces the list wholesale; a failure is
    /// logged and leaves it alone. Returns whether the list was replaced.
    pub fn settle_fetch(&mut self, result: BackendResult<Vec<Document>>) -> bool {
        self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);
        match result {
            Ok(documents) => {
                tracing::debug!(count = documents.len(), "Document list replaced");
                self.documents = documents;
                self.clamp_cursor();
                true
            }
            Err(error) => {
                tracing::error!(kind = error.kind(), %error, "Failed to fetch documents");
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------------

    /// Index of the highlighted document
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The highlighted document
    #[must_use]
    pub fn selected(&self) -> Option<&Document> {
        self.documents.get(self.cursor)
    }

    /// Move the highlight down
    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.documents.len() {
            self.cursor += 1;
        }
    }

    /// Move the highlight up
    pub fn select_previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.documents.len().saturating_sub(1));
    }

    // ------------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------------

    /// Open the confirmation for document `id`
    ///
    /// Returns `false` if no such document is listed, a confirmation is
    /// already open, or a delete is in flight.
    pub fn request_delete(&mut self, id: &DocumentId) -> bool {
        if self.confirming.is_some() || self.delete.is_pending() {
            return false;
        }
        match self.documents.iter().find(|d| &d.id == id) {
            Some(document) => {
                self.confirming = Some(document.clone());
                true
            }
            None => false,
        }
    }

    /// Open the confirmation for the highlighted document
    pub fn request_delete_selected(&mut self) -> bool {
        match self.selected().map(|d| d.id.clone()) {
            Some(id) => self.request_delete(&id),
            None => false,
        }
    }

    /// The document awaiting confirmation
    #[must_use]
    pub fn pending_confirmation(&self) -> Option<&Document> {
        self.confirming.as_ref()
    }

    /// Confirm the open prompt and start the delete
    pub fn confirm_delete(&mut self) -> Option<Request> {
        let document = self.confirming.take()?;
        self.delete.begin();
        Some(Request::Delete(document))
    }

    /// Dismiss the open prompt
    pub fn cancel_delete(&mut self) {
        self.confirming = None;
    }

    /// Whether a delete is in flight
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.delete.is_pending()
    }

    /// Settle the in-flight delete
    ///
    /// Whatever happened, the list is refetched exactly once; the returned
    /// request is that refetch.
    pub fn settle_delete(&mut self, document: &Document, outcome: &DeleteOutcome) -> Request {
        if outcome.succeeded() {
            tracing::info!(id = %document.id, name = %document.name, "Document deleted");
            self.delete.settle(Settlement::Success);
        } else {
            tracing::error!(id = %document.id, name = %document.name, "Delete failed");
            self.delete.settle(Settlement::Failure);
        }
        self.begin_fetch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;

    fn listed() -> DocumentList {
        let mut list = DocumentList::new();
        list.begin_fetch();
        list.settle_fetch(Ok(vec![
            Document::new(1, "a.pdf"),
            Document::new(2, "b.pdf"),
            Document::new(3, "c.pdf"),
        ]));
        list
    }

    fn failed_delete() -> DeleteOutcome {
        DeleteOutcome {
            record: Err(BackendError::Status {
                status: 404,
                body: String::new(),
            }),
            index: None,
        }
    }

    #[test]
    fn test_fetch_replaces_wholesale() {
        let mut list = listed();
        assert!(!list.is_refreshing());

        list.begin_fetch();
        assert!(list.is_refreshing());
        list.settle_fetch(Ok(vec![Document::new(9, "z.pdf")]));

        assert_eq!(list.documents(), &[Document::new(9, "z.pdf")]);
        assert!(!list.is_refreshing());
    }

    #[test]
    fn test_reset_pending_clears_fetches_and_delete() {
        let mut list = listed();
        list.begin_fetch();
        list.begin_fetch();
        assert!(list.request_delete_selected());
        assert!(list.confirm_delete().is_some());

        list.reset_pending();

        assert!(!list.is_refreshing());
        assert!(!list.is_deleting());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_failed_fetch_keeps_list() {
        let mut list = listed();
        list.begin_fetch();
        let replaced = list.settle_fetch(Err(BackendError::Decode("nope".to_string())));

        assert!(!replaced);
        assert_eq!(list.len(), 3);
        assert!(!list.is_refreshing());
    }

    #[test]
    fn test_cursor_is_clamped_after_shrink() {
        let mut list = listed();
        list.select_next();
        list.select_next();
        list.select_next();
        assert_eq!(list.cursor(), 2);

        list.settle_fetch(Ok(vec![Document::new(1, "a.pdf")]));
        assert_eq!(list.cursor(), 0);

        list.settle_fetch(Ok(Vec::new()));
        assert!(list.selected().is_none());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut list = listed();
        assert!(list.confirm_delete().is_none());

        assert!(list.request_delete(&DocumentId::from(2)));
        assert_eq!(list.pending_confirmation().unwrap().name, "b.pdf");
        assert!(!list.request_delete(&DocumentId::from(3)));

        let request = list.confirm_delete();
        assert_eq!(request, Some(Request::Delete(Document::new(2, "b.pdf"))));
        assert!(list.is_deleting());
        assert!(list.pending_confirmation().is_none());
    }

    #[test]
    fn test_cancel_sends_nothing() {
        let mut list = listed();
        list.request_delete_selected();
        list.cancel_delete();
        assert!(list.confirm_delete().is_none());
        assert!(!list.is_deleting());
    }

    #[test]
    fn test_unknown_id_cannot_be_deleted() {
        let mut list = listed();
        assert!(!list.request_delete(&DocumentId::from(42)));
    }

    #[test]
    fn test_delete_refetches_even_on_failure() {
        let mut list = listed();
        list.request_delete(&DocumentId::from(1));
        let request = list.confirm_delete().unwrap();
        let Request::Delete(document) = request else {
            panic!("expected delete");
        };

        let refetch = list.settle_delete(&document, &failed_delete());
        assert_eq!(refetch, Request::FetchHistory);
        assert!(!list.is_deleting());
        assert!(list.is_refreshing());
    }
}
