//! The sources screen: configured backup locations, entry point to the
//! snapshot-creation form.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};
use snaptty_types::{Alert, Effect, ExecOutcome, Modal, Msg, Route};

use crate::app::App;
use crate::theme;
use crate::ui::component::Component;
use crate::ui::utils::build_hint_spans;

#[derive(Debug, Default)]
pub struct SourcesComponent {
    table_state: TableState,
}

impl Component for SourcesComponent {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        if let Msg::ExecCompleted(outcome) = msg {
            match outcome.as_ref() {
                ExecOutcome::SourcesLoaded(response) => {
                    app.sources.apply_response(response.clone());
                }
                ExecOutcome::SourcesFailed(error) => {
                    // Root screen: nowhere to navigate away to, alert in place.
                    app.sources.load_failed();
                    app.logs.push(format!("Loading sources failed: {error}"));
                    return vec![Effect::ShowModal(Modal::Alert(Alert::new(
                        "Loading sources failed",
                        error.clone(),
                    )))];
                }
                _ => {}
            }
        }
        Vec::new()
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up => app.sources.move_selection(-1),
            KeyCode::Down => app.sources.move_selection(1),
            KeyCode::Char('r') => {
                app.sources.begin_load();
                return vec![Effect::FetchSources];
            }
            KeyCode::Char('n') => return vec![Effect::SwitchTo(Route::SnapshotForm)],
            KeyCode::Enter => {
                // open the form pre-filled with the selected source's path
                if let Some(entry) = app.sources.selected_entry() {
                    let path = entry.source.path.clone();
                    app.form.set_path(path);
                    return vec![Effect::SwitchTo(Route::SnapshotForm)];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let title = match app.sources.local_identity() {
            Some((user, host)) => format!("Sources — {user}@{host}"),
            None if app.sources.is_loading() => "Sources — loading…".to_string(),
            None => "Sources".to_string(),
        };
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_style(theme::border_style(true));

        let header = Row::new(vec!["Source", "Status", "Last snapshot"]).style(theme::muted_style());
        let rows: Vec<Row> = app
            .sources
            .entries()
            .iter()
            .map(|entry| {
                let last = entry
                    .last_snapshot_time
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string());
                Row::new(vec![
                    Cell::from(entry.source.to_string()),
                    Cell::from(entry.status.clone()),
                    Cell::from(last),
                ])
                .style(theme::text_style())
            })
            .collect();

        self.table_state.select(if app.sources.entries().is_empty() {
            None
        } else {
            Some(app.sources.selected())
        });

        let table = Table::new(
            rows,
            [Constraint::Min(30), Constraint::Length(12), Constraint::Length(18)],
        )
        .header(header)
        .block(block)
        .row_highlight_style(theme::selection_style())
        .highlight_symbol("> ");
        frame.render_stateful_widget(table, rect, &mut self.table_state);

        if app.sources.entries().is_empty() && !app.sources.is_loading() && rect.width > 4 && rect.height > 3 {
            let hint = Span::styled("No sources configured. Press n to create a snapshot.", theme::muted_style());
            let inner = Rect {
                x: rect.x + 2,
                y: rect.y + 2,
                width: rect.width.saturating_sub(4),
                height: 1,
            };
            frame.render_widget(ratatui::widgets::Paragraph::new(hint).style(Style::default()), inner);
        }
    }

    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        build_hint_spans(&[
            (" n", " New snapshot "),
            (" Enter", " Snapshot selected "),
            (" r", " Refresh "),
            (" ↑/↓", " Navigate "),
        ])
    }

    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        app.sources.begin_load();
        vec![Effect::FetchSources]
    }
}
