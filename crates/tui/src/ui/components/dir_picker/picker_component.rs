//! Modal that browses local directories and feeds the chosen one into the
//! form's path input.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use snaptty_types::{Effect, ExecOutcome, Msg};

use crate::app::App;
use crate::theme;
use crate::ui::component::Component;
use crate::ui::utils::build_hint_spans;

#[derive(Debug, Default)]
pub struct DirPickerModal {
    list_state: ListState,
}

impl Component for DirPickerModal {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        let (Msg::ExecCompleted(outcome), Some(picker)) = (msg, app.dir_picker.as_mut()) else {
            return Vec::new();
        };
        match outcome.as_ref() {
            ExecOutcome::DirectoryListed { root, entries } => {
                picker.apply_listing(root, entries.clone());
            }
            ExecOutcome::DirectoryListFailed { root, error } => {
                picker.apply_error(root, error.clone());
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let Some(picker) = app.dir_picker.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::Enter => {
                if let Some(entry) = picker.selected_entry() {
                    let target = entry.path.clone();
                    picker.enter_dir(target.clone());
                    return vec![Effect::ListDirectory(target)];
                }
            }
            KeyCode::Backspace | KeyCode::Left => {
                if let Some(parent) = picker.parent_dir() {
                    picker.enter_dir(parent.clone());
                    return vec![Effect::ListDirectory(parent)];
                }
            }
            KeyCode::Char('s') => {
                let chosen = picker.cur_dir().to_string_lossy().to_string();
                app.form.set_path(chosen);
                return vec![Effect::CloseModal];
            }
            KeyCode::Esc => return vec![Effect::CloseModal],
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let Some(picker) = app.dir_picker.as_ref() else {
            return;
        };
        let block = Block::default()
            .title(Span::styled(
                format!("Choose directory — {}", picker.cur_dir().display()),
                theme::title_style(),
            ))
            .borders(Borders::ALL)
            .border_style(theme::border_style(true));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let areas = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        if let Some(error) = picker.error() {
            frame.render_widget(Paragraph::new(Line::from(Span::styled(error.to_string(), theme::warn_style()))), areas[0]);
        } else if picker.is_loading() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(format!("{} listing…", app.throbber()), theme::muted_style()))),
                areas[0],
            );
        } else if picker.entries().is_empty() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled("no subdirectories", theme::muted_style()))),
                areas[0],
            );
        } else {
            let items: Vec<ListItem> = picker
                .entries()
                .iter()
                .map(|entry| ListItem::new(entry.name.clone()).style(theme::text_style()))
                .collect();
            self.list_state.select(Some(picker.selected()));
            let list = List::new(items).highlight_style(theme::selection_style()).highlight_symbol("> ");
            frame.render_stateful_widget(list, areas[0], &mut self.list_state);
        }

        let footer = Line::from(build_hint_spans(&[
            (" Enter", " Descend "),
            (" Backspace", " Up "),
            (" s", " Select this dir "),
            (" Esc", " Cancel "),
        ]));
        frame.render_widget(Paragraph::new(footer), areas[1]);
    }

    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        build_hint_spans(&[(" s", " Select "), (" Esc", " Cancel ")])
    }
}
