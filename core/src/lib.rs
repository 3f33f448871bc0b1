//! PolicyBot Core - Headless Client for the PolicyBot Q&A Backend
//!
//! This crate holds everything a PolicyBot surface needs except drawing:
//! the backend client, the view state machines for both surfaces, request
//! dispatch and view lifetimes. A terminal UI, a test harness or any other
//! front end drives it the same way.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Surfaces                             │
//! │     ┌──────────────────┐          ┌──────────────────┐       │
//! │     │  ChatAndDocsApp  │          │ DocumentManager  │       │
//! │     └────────┬─────────┘          └────────┬─────────┘       │
//! │              │   Request (up)               │                 │
//! │              │   Completion (down)          │                 │
//! └──────────────┼──────────────────────────────┼─────────────────┘
//!                └──────────────┬───────────────┘
//!                        ┌──────┴──────┐
//!                        │ Dispatcher  │  spawns one task per request
//!                        └──────┬──────┘
//!                        ┌──────┴──────┐
//!                        │ DocsService │  shared data-access layer
//!                        └──────┬──────┘
//!                        ┌──────┴──────┐
//!                        │ DocsBackend │  HTTP (reqwest) or mock
//!                        └─────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatAndDocsApp`]: chat + upload tabs with a document sidebar
//! - [`DocumentManager`]: standalone upload/list/delete surface
//! - [`Request`] / [`Completion`]: the only way views talk to the backend
//! - [`Dispatcher`]: runs requests and posts completions back
//! - [`DocsService`]: upload/delete/ask/history semantics over a [`DocsBackend`]
//! - [`HttpBackend`]: the reqwest implementation of [`DocsBackend`]
//!
//! # Quick Start
//!
//! ```ignore
//! use policybot_core::{load_config, ChatAndDocsApp, Dispatcher, DocsService, HttpBackend};
//!
//! let config = load_config()?;
//! let backend = HttpBackend::from_config(&config.backend)?;
//! let (dispatcher, mut rx) = Dispatcher::new(DocsService::new(backend, config.service()));
//!
//! let mut app = ChatAndDocsApp::new(&config.ui);
//! for (ticket, request) in app.mount() {
//!     dispatcher.dispatch(ticket, request);
//! }
//!
//! while let Some(envelope) = rx.recv().await {
//!     for (ticket, request) in app.apply(envelope) {
//!         dispatcher.dispatch(ticket, request);
//!     }
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod lifetime;
pub mod model;
pub mod ops;
pub mod service;
pub mod surfaces;
pub mod views;

pub use api::{DocsBackend, HttpBackend};
pub use config::{
    default_config_path, load_config, load_config_from_path, BackendSettings, ConfigError,
    ConfigOverrides, ConfigSource, DeletePolicy, PolicyBotConfig, PolicyBotToml, Theme,
    UiSettings,
};
pub use dispatch::{Completion, Dispatcher, Envelope, Request};
pub use error::{BackendError, BackendResult};
pub use lifetime::{Lifetime, Ticket};
pub use model::{Document, DocumentId, HealthReport, Message, Sender, UploadFile, UploadSelection};
pub use ops::{OpKind, OpState, Settlement};
pub use service::{DeleteOutcome, DocsService, ServiceSettings, UploadOutcome};
pub use surfaces::{Alert, BackendStatus, ChatAndDocsApp, DocumentManager, Tab};
pub use views::{ChatPanel, DocumentList, UploadPanel};
