//! Chat and Docs surface
//!
//! Chat and upload panels on two tabs, a sidebar with the document list,
//! and a light/dark theme. Upload results and failures show up as bot
//! messages in the transcript; delete failures are only logged.

use crate::config::{Theme, UiSettings};
use crate::dispatch::{Completion, Envelope, Request};
use crate::lifetime::{Lifetime, Ticket};
use crate::model::{Document, DocumentId, UploadSelection};
use crate::service::{DeleteOutcome, UploadOutcome};
use crate::views::{ChatPanel, DocumentList, UploadPanel};

use super::{partial_upload_notice, BackendStatus};

/// Bot message after a complete upload
pub const UPLOAD_SUCCEEDED: &str = "File uploaded successfully";

/// Bot message after an upload that wrote nothing
pub const UPLOAD_FAILED: &str = "Upload failed";

/// Which main panel is showing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    /// Chat transcript and input
    #[default]
    Chat,
    /// File selection and upload
    Upload,
}

impl Tab {
    /// The other tab
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Chat => Self::Upload,
            Self::Upload => Self::Chat,
        }
    }

    /// Tab title
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Chat => "Chat",
            Self::Upload => "Upload",
        }
    }
}

/// Chat, upload and document sidebar in one view
#[derive(Debug)]
pub struct ChatAndDocsApp {
    lifetime: Lifetime,
    chat: ChatPanel,
    upload: UploadPanel,
    documents: DocumentList,
    tab: Tab,
    sidebar_visible: bool,
    theme: Theme,
    backend_status: BackendStatus,
}

impl ChatAndDocsApp {
    /// Create an unmounted surface
    #[must_use]
    pub fn new(ui: &UiSettings) -> Self {
        Self {
            lifetime: Lifetime::new(),
            chat: ChatPanel::new(Some(&ui.greeting)),
            upload: UploadPanel::new(),
            documents: DocumentList::new(),
            tab: Tab::default(),
            sidebar_visible: true,
            theme: ui.theme,
            backend_status: BackendStatus::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Lifetime
    // ------------------------------------------------------------------------

    /// Mount the surface: fetch history, then probe health
    pub fn mount(&mut self) -> Vec<(Ticket, Request)> {
        self.lifetime.begin();
        self.reset_pending();
        tracing::debug!("ChatAndDocsApp mounted");
        self.refresh()
    }

    /// Unmount the surface; completions still in flight will be discarded
    pub fn unmount(&mut self) {
        self.lifetime.end();
        self.reset_pending();
        tracing::debug!("ChatAndDocsApp unmounted");
    }

    /// Requests from an ended lifetime never settle; drop their busy states
    fn reset_pending(&mut self) {
        self.chat.reset_pending();
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

    fn issue_optional(&mut self, request: Option<Request>) -> Vec<(Ticket, Request)> {
        request.map(|r| self.issue(r)).into_iter().collect()
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    /// Refetch history and re-probe health
    pub fn refresh(&mut self) -> Vec<(Ticket, Request)> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let fetch = self.documents.begin_fetch();
        vec![self.issue(fetch), self.issue(Request::ProbeHealth)]
    }

    /// Submit the chat input
    pub fn submit_question(&mut self) -> Vec<(Ticket, Request)> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let request = self.chat.submit();
        self.issue_optional(request)
    }

    /// Upload the selected file; does nothing without a selection
    pub fn submit_upload(&mut self) -> Vec<(Ticket, Request)> {
        if !self.is_mounted() {
            return Vec::new();
        }
        let request = self.upload.submit();
        self.issue_optional(request)
    }

    /// Select a file for upload
    pub fn select_file(&mut self, selection: UploadSelection) {
        self.upload.select(selection);
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
        let request = self.documents.confirm_delete();
        self.issue_optional(request)
    }

    /// Dismiss the open delete prompt
    pub fn cancel_delete(&mut self) {
        self.documents.cancel_delete();
    }

    /// Switch between chat and upload
    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    /// Show or hide the document sidebar
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
    }

    /// Flip between light and dark
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
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
            Completion::Answer(result) => {
                self.chat.settle_answer(result);
                Vec::new()
            }
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
        }
    }

    fn settle_upload(
        &mut self,
        selection: &UploadSelection,
        outcome: &UploadOutcome,
    ) -> Vec<(Ticket, Request)> {
        self.upload.settle(selection, outcome);
        match outcome {
            UploadOutcome::Complete => self.chat.push_notice(UPLOAD_SUCCEEDED),
            UploadOutcome::Partial { rolled_back, .. } => self
                .chat
                .push_notice(partial_upload_notice(&selection.name, *rolled_back)),
            UploadOutcome::Failed { .. } => {
                self.chat.push_notice(UPLOAD_FAILED);
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
        let fetch = self.documents.settle_delete(document, outcome);
        vec![self.issue(fetch)]
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    /// Chat panel
    #[must_use]
    pub fn chat(&self) -> &ChatPanel {
        &self.chat
    }

    /// Chat panel, for editing the input
    pub fn chat_mut(&mut self) -> &mut ChatPanel {
        &mut self.chat
    }

    /// Upload panel
    #[must_use]
    pub fn upload(&self) -> &UploadPanel {
        &self.upload
    }

    /// Upload panel, for editing the path
    pub fn upload_mut(&mut self) -> &mut UploadPanel {
        &mut self.upload
    }

    /// Document sidebar
    #[must_use]
    pub fn documents(&self) -> &DocumentList {
        &self.documents
    }

    /// Document sidebar, for moving the cursor
    pub fn documents_mut(&mut self) -> &mut DocumentList {
        &mut self.documents
    }

    /// Active tab
    #[must_use]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Whether the sidebar is showing
    #[must_use]
    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    /// Active theme
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Last health probe result
    #[must_use]
    pub fn backend_status(&self) -> &BackendStatus {
        &self.backend_status
    }

    /// Line shown above the transcript
    #[must_use]
    pub fn document_count_line(&self) -> String {
        match self.documents.len() {
            1 => "1 document available".to_string(),
            n => format!("{n} documents available"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::model::Sender;
    use crate::views::chat::CONNECTION_ERROR;

    fn mounted() -> (ChatAndDocsApp, Vec<(Ticket, Request)>) {
        let mut app = ChatAndDocsApp::new(&UiSettings::default());
        let requests = app.mount();
        (app, requests)
    }

    fn envelope(ticket: Ticket, completion: Completion) -> Envelope {
        Envelope { ticket, completion }
    }

    #[test]
    fn test_mount_fetches_history_then_health() {
        let (app, requests) = mounted();
        let kinds: Vec<&Request> = requests.iter().map(|(_, r)| r).collect();
        assert_eq!(kinds, vec![&Request::FetchHistory, &Request::ProbeHealth]);
        assert!(app.documents().is_refreshing());
        assert_eq!(app.chat().messages().len(), 1, "greeting");
    }

    #[test]
    fn test_unmounted_surface_issues_nothing() {
        let mut app = ChatAndDocsApp::new(&UiSettings::default());
        app.chat_mut().set_input("hello");
        assert!(app.submit_question().is_empty());
        assert!(app.refresh().is_empty());
        assert_eq!(app.chat().messages().len(), 1);
    }

    #[test]
    fn test_answer_lands_in_transcript() {
        let (mut app, _) = mounted();
        app.chat_mut().set_input("leave?");
        let (ticket, request) = app.submit_question().remove(0);
        assert_eq!(request, Request::Ask("leave?".to_string()));

        let follow_up = app.apply(envelope(
            ticket,
            Completion::Answer(Err(BackendError::Decode(String::new()))),
        ));
        assert!(follow_up.is_empty());

        let last = app.chat().messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, CONNECTION_ERROR);
    }

    #[test]
    fn test_failed_upload_posts_notice_without_refetch() {
        let (mut app, _) = mounted();
        let selection = UploadSelection::from_path("/tmp/a.pdf").unwrap();
        app.select_file(selection.clone());
        let (ticket, _) = app.submit_upload().remove(0);

        let follow_up = app.apply(envelope(
            ticket,
            Completion::Uploaded {
                selection,
                outcome: UploadOutcome::Failed {
                    error: BackendError::Decode(String::new()),
                },
            },
        ));

        assert!(follow_up.is_empty());
        assert_eq!(app.chat().messages().last().unwrap().text, UPLOAD_FAILED);
        assert!(app.upload().selection().is_some());
    }

    #[test]
    fn test_partial_upload_refetches_and_keeps_selection() {
        let (mut app, _) = mounted();
        let selection = UploadSelection::from_path("/tmp/a.pdf").unwrap();
        app.select_file(selection.clone());
        let (ticket, _) = app.submit_upload().remove(0);

        let follow_up = app.apply(envelope(
            ticket,
            Completion::Uploaded {
                selection,
                outcome: UploadOutcome::Partial {
                    error: BackendError::Decode(String::new()),
                    rolled_back: None,
                },
            },
        ));

        assert_eq!(follow_up.len(), 1);
        assert_eq!(follow_up[0].1, Request::FetchHistory);
        let notice = &app.chat().messages().last().unwrap().text;
        assert!(notice.starts_with("Upload incomplete"));
        assert_ne!(notice, UPLOAD_FAILED);
        assert!(app.upload().selection().is_some());
    }

    #[test]
    fn test_stale_envelope_is_discarded() {
        let (mut app, requests) = mounted();
        let (stale, _) = requests[0];

        app.unmount();
        app.mount();

        let follow_up = app.apply(envelope(
            stale,
            Completion::History(Ok(vec![Document::new(1, "a.pdf")])),
        ));
        assert!(follow_up.is_empty());
        assert!(app.documents().is_empty());
    }

    #[test]
    fn test_chrome_toggles() {
        let (mut app, _) = mounted();
        assert_eq!(app.tab(), Tab::Chat);
        app.next_tab();
        assert_eq!(app.tab(), Tab::Upload);

        assert!(app.sidebar_visible());
        app.toggle_sidebar();
        assert!(!app.sidebar_visible());

        assert_eq!(app.theme(), Theme::Light);
        app.toggle_theme();
        assert_eq!(app.theme(), Theme::Dark);
    }

    #[test]
    fn test_document_count_line() {
        let (mut app, requests) = mounted();
        assert_eq!(app.document_count_line(), "0 documents available");
        app.apply(envelope(
            requests[0].0,
            Completion::History(Ok(vec![Document::new(1, "a.pdf")])),
        ));
        assert_eq!(app.document_count_line(), "1 document available");
    }
}
