//! View State
//!
//! The pieces both surfaces are assembled from. Each panel owns its own
//! data and operation state, turns user actions into [`Request`]s and
//! applies settlements. None of them know about tickets, tabs or alerts;
//! that is the surfaces' job.
//!
//! [`Request`]: crate::dispatch::Request

pub mod chat;
pub mod documents;
pub mod upload;

pub use chat::ChatPanel;
pub use documents::DocumentList;
pub use upload::UploadPanel;
