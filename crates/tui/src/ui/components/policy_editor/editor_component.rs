//! Rendering and input for the embedded policy editor.
//!
//! Shown only while a source is resolved, titled with the resolved
//! identity. Not a routed component: the snapshot form embeds it and
//! forwards keys while it has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme;
use crate::ui::components::policy_editor::state::FIELD_LABELS;

/// Handle a key while the policy editor has focus. Returns `true` when the
/// key was consumed.
pub fn handle_policy_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Up => {
            app.policy.select_prev();
            true
        }
        KeyCode::Down => {
            app.policy.select_next();
            true
        }
        KeyCode::Left => {
            app.policy.current_field_mut().move_left();
            true
        }
        KeyCode::Right => {
            app.policy.current_field_mut().move_right();
            true
        }
        KeyCode::Backspace => {
            app.policy.current_field_mut().backspace();
            true
        }
        KeyCode::Delete => {
            app.policy.current_field_mut().delete();
            true
        }
        KeyCode::Char(c) if !c.is_control() && (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT) => {
            app.policy.current_field_mut().insert_char(c);
            true
        }
        _ => false,
    }
}

/// Render the editor into `rect`. Each field is one line: label, value,
/// and a live validation marker for the selected field.
pub fn render_policy_editor(frame: &mut Frame, rect: Rect, app: &mut App, focused: bool) {
    let title = match app.form.resolved_source() {
        Some(source) => format!("Policy for {source}"),
        None => "Policy".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style(focused));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let selected = app.policy.field_idx();
    let mut lines = Vec::with_capacity(FIELD_LABELS.len());
    for (idx, label) in FIELD_LABELS.iter().enumerate() {
        let is_selected = focused && idx == selected;
        let marker = if is_selected { "> " } else { "  " };
        let value = app.policy.field(idx).input();
        let value_span = if value.is_empty() {
            Span::styled(if idx < 6 { "(inherit)" } else { "(none)" }, theme::muted_style())
        } else {
            Span::styled(value.to_string(), theme::text_style())
        };
        lines.push(Line::from(vec![
            Span::styled(marker, theme::selection_style()),
            Span::styled(format!("{label:<13}"), if is_selected { theme::selection_style() } else { theme::muted_style() }),
            value_span,
        ]));
    }
    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);

    if focused && inner.height as usize > selected {
        let field = app.policy.current_field();
        // marker (2) + padded label (13)
        let cursor_x = inner.x + 15 + field.cursor_columns() as u16;
        let cursor_y = inner.y + selected as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), cursor_y));
    }
}
