//! Surfaces
//!
//! The two top-level views. Each one owns a [`Lifetime`], assembles the
//! panels from [`crate::views`], and exposes key-agnostic actions. Actions
//! and [`apply`](ChatAndDocsApp::apply) return the requests to dispatch,
//! already ticketed.
//!
//! The surfaces never share state with each other.
//!
//! [`Lifetime`]: crate::lifetime::Lifetime

pub mod chat_and_docs;
pub mod manager;

pub use chat_and_docs::{ChatAndDocsApp, Tab};
pub use manager::{Alert, DocumentManager};

use crate::error::BackendResult;
use crate::model::HealthReport;

/// What the last health probe said
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendStatus {
    /// No probe has settled yet
    #[default]
    Unknown,
    /// The backend answered the probe
    Reachable(HealthReport),
    /// The probe failed
    Offline,
}

impl BackendStatus {
    fn from_probe(result: BackendResult<HealthReport>) -> Self {
        match result {
            Ok(report) => {
                tracing::debug!(status = %report.status, "Backend health");
                Self::Reachable(report)
            }
            Err(error) => {
                tracing::warn!(kind = error.kind(), %error, "Health probe failed");
                Self::Offline
            }
        }
    }

    /// Short status-bar label
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Unknown => "connecting".to_string(),
            Self::Reachable(report) if report.status.is_empty() => "online".to_string(),
            Self::Reachable(report) => report.status.to_lowercase(),
            Self::Offline => "offline".to_string(),
        }
    }

    /// Whether the backend reports itself healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Reachable(report) if report.is_healthy())
    }
}

/// Notice for an upload that reached the index store but not the record store
fn partial_upload_notice(name: &str, rolled_back: Option<bool>) -> String {
    let base = format!("Upload incomplete: {name} was indexed but the record store rejected it");
    match rolled_back {
        Some(true) => format!("{base}; the index entry was removed"),
        Some(false) => format!("{base}; removing the index entry also failed"),
        None => base,
    }
}
