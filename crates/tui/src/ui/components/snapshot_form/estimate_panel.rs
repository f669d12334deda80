//! Results panel for a running or finished estimate task.
//!
//! The panel is display-only: it renders whatever the latest polled task
//! summary says. Polling itself is driven by the form's tick handling.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use snaptty_types::TaskStatus;
use snaptty_util::format_bytes;

use crate::app::App;
use crate::theme;

pub fn render_estimate_panel(frame: &mut Frame, rect: Rect, app: &mut App) {
    let block = Block::default()
        .title(Span::styled("Estimate", theme::title_style()))
        .borders(Borders::ALL)
        .border_style(theme::border_style(false));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let estimate = &app.form.estimate;
    let mut lines = Vec::new();

    let status_span = match estimate.summary.as_ref().map(|s| s.status) {
        Some(TaskStatus::Success) => Span::styled("done", theme::ok_style()),
        Some(TaskStatus::Failed) => Span::styled("failed", theme::warn_style()),
        Some(TaskStatus::Canceled) => Span::styled("canceled", theme::warn_style()),
        Some(TaskStatus::Running) | None => {
            Span::styled(format!("{} estimating…", app.throbber()), theme::muted_style())
        }
    };
    lines.push(Line::from(vec![
        Span::styled(estimate.description.clone(), theme::text_style()),
        Span::raw("  "),
        status_span,
    ]));

    if let Some(summary) = estimate.summary.as_ref() {
        if let Some(error) = summary.error_message.as_ref() {
            lines.push(Line::from(Span::styled(error.clone(), theme::warn_style())));
        }
        for (name, counter) in &summary.counters {
            let rendered = match counter.units.as_deref() {
                Some("bytes") => format_bytes(counter.value),
                Some(units) => format!("{} {units}", counter.value),
                None => counter.value.to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{name:<20}"), theme::muted_style()),
                Span::styled(rendered, theme::text_style()),
            ]));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
