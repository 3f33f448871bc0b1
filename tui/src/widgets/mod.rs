//! Widgets
//!
//! Custom ratatui widgets. Everything else is drawn with the stock ones.

pub mod transcript;

pub use transcript::{Transcript, TranscriptState};
