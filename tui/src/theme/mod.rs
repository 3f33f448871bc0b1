//! Theme and Colors
//!
//! PolicyBot's light and dark palettes. Every widget takes its colors from
//! a [`Palette`] so the theme toggle repaints the whole screen at once.

use policybot_core::Theme;
use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Brand Colors
// ============================================================================

/// PolicyBot accent blue (titles, bot prefix)
pub const POLICY_BLUE: Color = Color::Rgb(37, 99, 235);

/// Lighter accent for dark backgrounds
pub const POLICY_BLUE_LIGHT: Color = Color::Rgb(96, 165, 250);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(22, 163, 74);

/// User input green on dark
pub const USER_GREEN_LIGHT: Color = Color::Rgb(130, 220, 130);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(220, 38, 38);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Busy indicator amber
pub const BUSY_AMBER: Color = Color::Rgb(245, 158, 11);

// ============================================================================
// Palettes
// ============================================================================

/// Colors for one theme
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Screen background
    pub background: Color,
    /// Body text
    pub text: Color,
    /// Hints, borders, timestamps
    pub dim: Color,
    /// Titles and bot messages
    pub accent: Color,
    /// User messages and input
    pub user: Color,
    /// Busy indicators
    pub busy: Color,
    /// Failures and offline status
    pub error: Color,
    /// Healthy status
    pub success: Color,
    /// Highlighted list row
    pub highlight: Color,
}

/// Light palette
pub const LIGHT: Palette = Palette {
    background: Color::Rgb(248, 250, 252),
    text: Color::Rgb(15, 23, 42),
    dim: Color::Rgb(100, 116, 139),
    accent: POLICY_BLUE,
    user: USER_GREEN,
    busy: BUSY_AMBER,
    error: ERROR_RED,
    success: USER_GREEN,
    highlight: Color::Rgb(219, 234, 254),
};

/// Dark palette
pub const DARK: Palette = Palette {
    background: Color::Rgb(17, 24, 39),
    text: Color::Rgb(229, 231, 235),
    dim: Color::Rgb(100, 100, 100),
    accent: POLICY_BLUE_LIGHT,
    user: USER_GREEN_LIGHT,
    busy: BUSY_AMBER,
    error: Color::Rgb(255, 80, 80),
    success: SUCCESS_GREEN,
    highlight: Color::Rgb(31, 41, 55),
};

impl Palette {
    /// The palette for a theme
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }

    /// Base style: text on background
    #[must_use]
    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    /// Dimmed text
    #[must_use]
    pub fn dimmed(&self) -> Style {
        self.base().fg(self.dim)
    }

    /// Bold accent, for titles
    #[must_use]
    pub fn title(&self) -> Style {
        self.base().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Highlighted list row
    #[must_use]
    pub fn selected(&self) -> Style {
        self.base().bg(self.highlight).add_modifier(Modifier::BOLD)
    }
}
