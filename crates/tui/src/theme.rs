//! Theme and styling for the snaptty console.
//!
//! A single dark palette with a teal accent; helpers return `Style`s so the
//! widgets never hardcode colors.

use ratatui::style::{Color, Modifier, Style};

/// Accent color for focus indicators and primary actions.
pub const ACCENT: Color = Color::Rgb(64, 196, 180);

/// Primary foreground color for normal text.
pub const FG: Color = Color::Rgb(224, 224, 230);

/// Muted foreground for hints, labels, and secondary information.
pub const FG_MUTED: Color = Color::Rgb(150, 150, 158);

/// Border color for unfocused elements.
pub const BORDER: Color = Color::Rgb(70, 70, 78);

/// Warning color for errors and validation failures.
pub const WARN: Color = Color::Rgb(222, 100, 110);

/// Success color for completed tasks.
pub const OK: Color = Color::Rgb(120, 200, 120);

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn text_style() -> Style {
    Style::default().fg(FG)
}

pub fn muted_style() -> Style {
    Style::default().fg(FG_MUTED)
}

pub fn warn_style() -> Style {
    Style::default().fg(WARN)
}

pub fn ok_style() -> Style {
    Style::default().fg(OK)
}

pub fn title_style() -> Style {
    Style::default().fg(FG).add_modifier(Modifier::BOLD)
}

pub fn selection_style() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Style for an action button. Disabled buttons render dim regardless of
/// focus so it is obvious no action will fire.
pub fn button_style(enabled: bool, focused: bool) -> Style {
    match (enabled, focused) {
        (false, _) => Style::default().fg(FG_MUTED).add_modifier(Modifier::DIM),
        (true, true) => Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(ACCENT),
    }
}
