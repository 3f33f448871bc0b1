//! PolicyBot TUI - Terminal interface for PolicyBot
//!
//! This crate draws the two PolicyBot surfaces from `policybot-core` with
//! ratatui and feeds them keyboard input from crossterm.
//!
//! # Architecture
//!
//! - **App**: event loop, key routing, request dispatch
//! - **Render**: pure drawing from surface state
//! - **Widgets**: the scrollable chat transcript
//! - **Theme**: light and dark palettes

pub mod app;
pub mod render;
pub mod theme;
pub mod widgets;

pub use app::{App, Surface};
