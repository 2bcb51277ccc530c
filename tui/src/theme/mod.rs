//! Theme and Colors
//!
//! The chuleta palette: warm titles, cyan for anything that can be spoken,
//! gold stars for favorites.

use ratatui::style::{Color, Modifier, Style};

use crate::display::SpanRole;

// ============================================================================
// Content Colors
// ============================================================================

/// Section titles
pub const TITLE_ORANGE: Color = Color::Rgb(255, 170, 90);

/// Column headers
pub const HEADER_SAND: Color = Color::Rgb(215, 195, 150);

/// Sub-heading rules
pub const SUBHEADING_TEAL: Color = Color::Rgb(110, 190, 180);

/// Speakable cells
pub const SPEAK_CYAN: Color = Color::Rgb(120, 210, 240);

/// Active favorite star
pub const FAVORITE_GOLD: Color = Color::Rgb(255, 210, 80);

/// Quiz buttons
pub const CONTROL_MAGENTA: Color = Color::Magenta;

/// Selected option background
pub const SELECTED_BG: Color = Color::Rgb(60, 70, 110);

/// Focused element background
pub const FOCUS_BG: Color = Color::Rgb(80, 80, 30);

// ============================================================================
// UI Colors
// ============================================================================

/// Secondary text
pub const DIM_GRAY: Color = Color::Rgb(120, 120, 120);

/// Errors and wrong answers
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Confirmations and right answers
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Warnings
pub const WARNING_YELLOW: Color = Color::Yellow;

/// Input line text
pub const INPUT_GREEN: Color = Color::Rgb(130, 220, 130);

/// Base style for a span role
#[must_use]
pub fn style_for(role: SpanRole) -> Style {
    match role {
        SpanRole::Title => Style::default()
            .fg(TITLE_ORANGE)
            .add_modifier(Modifier::BOLD),
        SpanRole::Note => Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        SpanRole::Header => Style::default()
            .fg(HEADER_SAND)
            .add_modifier(Modifier::UNDERLINED),
        SpanRole::Subheading => Style::default().fg(SUBHEADING_TEAL),
        SpanRole::Text => Style::default(),
        SpanRole::Speakable => Style::default().fg(SPEAK_CYAN),
        SpanRole::Favorite { active: true } => Style::default().fg(FAVORITE_GOLD),
        SpanRole::Favorite { active: false } => Style::default().fg(DIM_GRAY),
        SpanRole::Control => Style::default()
            .fg(CONTROL_MAGENTA)
            .add_modifier(Modifier::BOLD),
        SpanRole::Selected => Style::default().bg(SELECTED_BG),
        SpanRole::Dim => Style::default().fg(DIM_GRAY),
        SpanRole::Prompt => Style::default().add_modifier(Modifier::BOLD),
        SpanRole::Answer => Style::default().fg(INPUT_GREEN),
        SpanRole::FeedbackOk => Style::default().fg(SUCCESS_GREEN),
        SpanRole::FeedbackErr => Style::default().fg(ERROR_RED),
    }
}

/// Style of the focused element
#[must_use]
pub fn focused(style: Style) -> Style {
    style.bg(FOCUS_BG).add_modifier(Modifier::REVERSED)
}
