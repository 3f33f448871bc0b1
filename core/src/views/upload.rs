//! Upload Panel
//!
//! Holds at most one [`UploadSelection`] and the upload operation.

use crate::dispatch::Request;
use crate::model::UploadSelection;
use crate::ops::{OpState, Settlement};
use crate::service::UploadOutcome;

/// Busy indicator while an upload is in flight
pub const UPLOADING_INDICATOR: &str = "Uploading...";

/// File selection and upload state
#[derive(Clone, Debug, Default)]
pub struct UploadPanel {
    path_input: String,
    selection: Option<UploadSelection>,
    recently_uploaded: Vec<String>,
    upload: OpState,
}

impl UploadPanel {
    /// Create an empty panel
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path being typed
    #[must_use]
    pub fn path_input(&self) -> &str {
        &self.path_input
    }

    /// Type one character of the path
    pub fn push_char(&mut self, c: char) {
        self.path_input.push(c);
    }

    /// Delete the last path character
    pub fn backspace(&mut self) {
        self.path_input.pop();
    }

    /// Turn the typed path into the selection
    ///
    /// Returns `false` and keeps the previous selection if the path has no
    /// file name. Existence is checked when the upload reads the file.
    pub fn select_typed_path(&mut self) -> bool {
        let typed = self.path_input.trim();
        match UploadSelection::from_path(typed) {
            Some(selection) => {
                self.select(selection);
                self.path_input.clear();
                true
            }
            None => false,
        }
    }

    /// Replace the selection
    pub fn select(&mut self, selection: UploadSelection) {
        tracing::debug!(file = %selection.name, "File selected");
        self.selection = Some(selection);
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// The selected file, if any
    #[must_use]
    pub fn selection(&self) -> Option<&UploadSelection> {
        self.selection.as_ref()
    }

    /// Filenames uploaded during this session, oldest first
    #[must_use]
    pub fn recently_uploaded(&self) -> &[String] {
        &self.recently_uploaded
    }

    /// Whether an upload is in flight
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.upload.is_pending()
    }

    /// Start uploading the selection
    ///
    /// Returns `None` when nothing is selected or an upload is in flight.
    pub fn submit(&mut self) -> Option<Request> {
        if self.is_uploading() {
            return None;
        }
        let selection = self.selection.clone()?;
        self.upload.begin();
        Some(Request::Upload(selection))
    }

    /// Forget an upload whose completion will never arrive
    pub fn reset_pending(&mut self) {
        self.upload.reset();
    }

    /// Settle the in-flight upload
    ///
    /// A complete upload is remembered and clears the selection, unless the
    /// user has picked a different file in the meantime.
    pub fn settle(&mut self, uploaded: &UploadSelection, outcome: &UploadOutcome) {
        if outcome.is_complete() {
            self.upload.settle(Settlement::Success);
            self.recently_uploaded.push(uploaded.name.clone());
            if self.selection.as_ref() == Some(uploaded) {
                self.clear_selection();
            }
        } else {
            self.upload.settle(Settlement::Failure);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;

    fn selection(path: &str) -> UploadSelection {
        UploadSelection::from_path(path).unwrap()
    }

    #[test]
    fn test_submit_without_selection() {
        let mut panel = UploadPanel::new();
        assert!(panel.submit().is_none());
        assert!(!panel.is_uploading());
    }

    #[test]
    fn test_typed_path_becomes_selection() {
        let mut panel = UploadPanel::new();
        for c in " /docs/leave.pdf ".chars() {
            panel.push_char(c);
        }
        assert!(panel.select_typed_path());
        assert_eq!(panel.selection().unwrap().name, "leave.pdf");
        assert!(panel.path_input().is_empty());

        panel.push_char('/');
        assert!(!panel.select_typed_path());
        assert_eq!(panel.selection().unwrap().name, "leave.pdf");
    }

    #[test]
    fn test_complete_upload_clears_selection() {
        let mut panel = UploadPanel::new();
        let sel = selection("/docs/a.pdf");
        panel.select(sel.clone());

        assert_eq!(panel.submit(), Some(Request::Upload(sel.clone())));
        assert!(panel.is_uploading());
        assert!(panel.submit().is_none());

        panel.settle(&sel, &UploadOutcome::Complete);
        assert!(!panel.is_uploading());
        assert!(panel.selection().is_none());
        assert_eq!(panel.recently_uploaded(), &["a.pdf".to_string()]);
    }

    #[test]
    fn test_failed_upload_keeps_selection() {
        let mut panel = UploadPanel::new();
        let sel = selection("/docs/a.pdf");
        panel.select(sel.clone());
        panel.submit();

        panel.settle(
            &sel,
            &UploadOutcome::Failed {
                error: BackendError::Decode("x".to_string()),
            },
        );
        assert!(!panel.is_uploading());
        assert_eq!(panel.selection(), Some(&sel));
        assert!(panel.recently_uploaded().is_empty());
    }

    #[test]
    fn test_newer_selection_survives_completion() {
        let mut panel = UploadPanel::new();
        let first = selection("/docs/a.pdf");
        panel.select(first.clone());
        panel.submit();
        panel.select(selection("/docs/b.pdf"));

        panel.settle(&first, &UploadOutcome::Complete);
        assert_eq!(panel.selection().unwrap().name, "b.pdf");
    }

    #[test]
    fn test_reset_pending_allows_resubmit() {
        let mut panel = UploadPanel::new();
        let sel = selection("/docs/a.pdf");
        panel.select(sel.clone());
        panel.submit();
        assert!(panel.submit().is_none());

        panel.reset_pending();

        assert!(!panel.is_uploading());
        assert_eq!(panel.submit(), Some(Request::Upload(sel)));
    }
}
