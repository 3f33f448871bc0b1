//! Chat Panel
//!
//! Input line, append-only transcript and the ask operation.

use crate::dispatch::Request;
use crate::error::BackendResult;
use crate::model::Message;
use crate::ops::{OpState, Settlement};

/// Shown when the backend answers with an empty body
pub const NO_RESPONSE: &str = "No response received";

/// Shown when the question could not be answered for any reason
pub const CONNECTION_ERROR: &str = "Error connecting to server";

/// Busy indicator while a question is in flight
pub const TYPING_INDICATOR: &str = "PolicyBot is typing...";

/// Chat transcript plus the line being typed
#[derive(Clone, Debug, Default)]
pub struct ChatPanel {
    messages: Vec<Message>,
    input: String,
    ask: OpState,
}

impl ChatPanel {
    /// Create a panel, optionally opening with a bot greeting
    pub fn new(greeting: Option<&str>) -> Self {
        let messages = greeting
            .filter(|g| !g.trim().is_empty())
            .map(|g| vec![Message::bot(g)])
            .unwrap_or_default();
        Self {
            messages,
            ..Default::default()
        }
    }

    /// The transcript, oldest first
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current input text
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Type one character
    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    /// Delete the last character
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Whether a question is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.ask.is_pending()
    }

    /// Forget a question whose answer will never arrive
    pub fn reset_pending(&mut self) {
        self.ask.reset();
    }

    /// Whether submit would do anything right now
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    /// Submit the input line
    ///
    /// Returns `None` without touching anything if the input is blank or a
    /// question is already in flight. Otherwise appends the user message,
    /// clears the input and returns the ask request.
    pub fn submit(&mut self) -> Option<Request> {
        if !self.can_submit() {
            return None;
        }
        let question = std::mem::take(&mut self.input);
        self.messages.push(Message::user(question.clone()));
        self.ask.begin();
        Some(Request::Ask(question))
    }

    /// Settle the in-flight question with exactly one bot message
    pub fn settle_answer(&mut self, result: BackendResult<String>) {
        self.ask.settle(Settlement::of(&result));
        let text = match result {
            Ok(answer) if answer.trim().is_empty() => NO_RESPONSE.to_string(),
            Ok(answer) => answer,
            Err(error) => {
                tracing::warn!(kind = error.kind(), %error, "Question failed");
                CONNECTION_ERROR.to_string()
            }
        };
        self.messages.push(Message::bot(text));
    }

    /// Append a bot notice (upload results and the like)
    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.messages.push(Message::bot(text));
    }
}
