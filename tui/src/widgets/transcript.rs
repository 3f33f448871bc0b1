//! Transcript Widget
//!
//! A borderless, scrollable chat transcript. Scrolling counts lines up from
//! the bottom, so new messages stay in view unless the user scrolled back.

use policybot_core::{Message, Sender};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

use crate::theme::Palette;

/// State for a transcript
#[derive(Debug, Default)]
pub struct TranscriptState {
    /// Lines scrolled up from the bottom (0 = latest)
    pub scroll_offset: usize,
    /// Total wrapped lines at the last render
    pub total_lines: usize,
}

impl TranscriptState {
    /// Scroll by delta (positive = back in history)
    pub fn scroll(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }

    /// Jump to the latest message
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

/// Messages with sender prefixes and an optional busy line at the end
pub struct Transcript<'a> {
    messages: &'a [Message],
    palette: Palette,
    busy: Option<&'a str>,
}

impl<'a> Transcript<'a> {
    /// Render `messages` with `palette`
    #[must_use]
    pub fn new(messages: &'a [Message], palette: Palette) -> Self {
        Self {
            messages,
            palette,
            busy: None,
        }
    }

    /// Show a busy indicator below the last message
    #[must_use]
    pub fn busy(mut self, indicator: Option<&'a str>) -> Self {
        self.busy = indicator;
        self
    }

    fn lines(&self, width: usize) -> Vec<(String, Style)> {
        let mut lines = Vec::new();
        for message in self.messages {
            let style = match message.sender {
                Sender::User => self.palette.base().fg(self.palette.user),
                Sender::Bot => self.palette.base().fg(self.palette.accent),
            };
            let content = format!("{}{}", message.sender.prefix(), message.text);
            for line in content.lines() {
                if line.is_empty() {
                    lines.push((String::new(), style));
                    continue;
                }
                lines.extend(wrap(line, width).into_iter().map(|l| (l.into_owned(), style)));
            }
            lines.push((String::new(), self.palette.base()));
        }
        if let Some(indicator) = self.busy {
            lines.push((indicator.to_string(), self.palette.base().fg(self.palette.busy)));
        }
        lines
    }
}

impl StatefulWidget for Transcript<'_> {
    type State = TranscriptState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let height = usize::from(area.height);
        let lines = self.lines(usize::from(area.width));
        state.total_lines = lines.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let end = state.total_lines - state.scroll_offset;
        let start = end.saturating_sub(height);

        for (row, (line, style)) in (area.y..).zip(&lines[start..end]) {
            buf.set_stringn(area.x, row, line, usize::from(area.width), *style);
        }
    }
}
