//! Request Dispatch
//!
//! Views never call the backend. They return [`Request`]s; the event loop
//! hands each one to the [`Dispatcher`] together with the [`Ticket`] the view
//! minted for it. The dispatcher runs the request as a tokio task and posts
//! an [`Envelope`] with the matching [`Completion`] back over an mpsc
//! channel. The event loop applies envelopes one at a time, so view state is
//! only ever mutated from one place.
//!
//! Every dispatched request produces exactly one completion. If the task
//! panics or is aborted the dispatcher synthesizes a failure completion, so
//! busy indicators always clear.

use tokio::sync::mpsc;

use crate::error::{BackendError, BackendResult};
use crate::lifetime::Ticket;
use crate::model::{Document, HealthReport, UploadSelection};
use crate::ops::OpKind;
use crate::service::{DeleteOutcome, DocsService, UploadOutcome};

/// Something a view wants the backend to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Ask a question
    Ask(String),
    /// Upload the selected file to both stores
    Upload(UploadSelection),
    /// Delete a document according to the delete policy
    Delete(Document),
    /// Refetch the full document history
    FetchHistory,
    /// Probe backend health
    ProbeHealth,
}

impl Request {
    /// The operation this request belongs to
    #[must_use]
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Ask(_) => OpKind::Ask,
            Self::Upload(_) => OpKind::Upload,
            Self::Delete(_) => OpKind::Delete,
            Self::FetchHistory => OpKind::History,
            Self::ProbeHealth => OpKind::Health,
        }
    }

    /// The completion reported when the request never finished
    fn abandoned(self, reason: String) -> Completion {
        let error = BackendError::TaskFailed(reason);
        match self {
            Self::Ask(_) => Completion::Answer(Err(error)),
            Self::Upload(selection) => Completion::Uploaded {
                selection,
                outcome: UploadOutcome::Failed { error },
            },
            Self::Delete(document) => Completion::Deleted {
                document,
                outcome: DeleteOutcome {
                    record: Err(error),
                    index: None,
                },
            },
            Self::FetchHistory => Completion::History(Err(error)),
            Self::ProbeHealth => Completion::Health(Err(error)),
        }
    }
}

/// What came back for a [`Request`]
#[derive(Debug)]
pub enum Completion {
    /// Answer text for [`Request::Ask`]
    Answer(BackendResult<String>),
    /// Result of [`Request::Upload`]
    Uploaded {
        /// The selection that was uploaded
        selection: UploadSelection,
        /// How it went
        outcome: UploadOutcome,
    },
    /// Result of [`Request::Delete`]
    Deleted {
        /// The document that was deleted
        document: Document,
        /// How it went
        outcome: DeleteOutcome,
    },
    /// Result of [`Request::FetchHistory`]
    History(BackendResult<Vec<Document>>),
    /// Result of [`Request::ProbeHealth`]
    Health(BackendResult<HealthReport>),
}

impl Completion {
    /// The operation this completion settles
    #[must_use]
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Answer(_) => OpKind::Ask,
            Self::Uploaded { .. } => OpKind::Upload,
            Self::Deleted { .. } => OpKind::Delete,
            Self::History(_) => OpKind::History,
            Self::Health(_) => OpKind::Health,
        }
    }
}

/// A completion addressed to the lifetime that asked for it
#[derive(Debug)]
pub struct Envelope {
    /// Ticket the request was dispatched with
    pub ticket: Ticket,
    /// The result
    pub completion: Completion,
}

/// Runs requests against a [`DocsService`] and reports back
#[derive(Clone, Debug)]
pub struct Dispatcher {
    service: DocsService,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl Dispatcher {
    /// Create a dispatcher and the receiver completions arrive on
    #[must_use]
    pub fn new(service: DocsService) -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { service, tx }, rx)
    }

    /// Run `request` in the background
    ///
    /// Must be called from within a tokio runtime. Requests are never
    /// cancelled once started.
    pub fn dispatch(&self, ticket: Ticket, request: Request) {
        let kind = request.kind();
        tracing::debug!(%ticket, %kind, "Dispatching request");

        let service = self.service.clone();
        let tx = self.tx.clone();
        let fallback = request.clone();

        tokio::spawn(async move {
            let worker = tokio::spawn(async move { run(&service, request).await });

            let completion = match worker.await {
                Ok(completion) => completion,
                Err(join_error) => {
                    tracing::error!(%ticket, %kind, error = %join_error, "Request task failed");
                    fallback.abandoned(join_error.to_string())
                }
            };

            if tx.send(Envelope { ticket, completion }).is_err() {
                tracing::debug!(%ticket, %kind, "Completion dropped; event loop is gone");
            }
        });
    }
}

async fn run(service: &DocsService, request: Request) -> Completion {
    match request {
        Request::Ask(question) => Completion::Answer(service.ask(&question).await),
        Request::Upload(selection) => {
            let outcome = service.upload(&selection).await;
            Completion::Uploaded { selection, outcome }
        }
        Request::Delete(document) => {
            let outcome = service.delete(&document).await;
            Completion::Deleted { document, outcome }
        }
        Request::FetchHistory => Completion::History(service.fetch_history().await),
        Request::ProbeHealth => Completion::Health(service.health().await),
    }
}
