//! Top-level view: routes the current screen, overlays modals, and owns
//! the header, log panel, and hint bar chrome.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use snaptty_types::{Effect, ExecOutcome, Modal, Msg, Route};

use crate::app::App;
use crate::theme;
use crate::ui::component::Component;
use crate::ui::components::alert::AlertModal;
use crate::ui::components::dir_picker::{DirPickerModal, DirPickerState};
use crate::ui::components::snapshot_form::SnapshotFormComponent;
use crate::ui::components::sources::SourcesComponent;
use crate::ui::utils::{build_hint_spans, centered_rect};

pub struct MainView {
    content_view: Box<dyn Component>,
    modal_view: Option<Box<dyn Component>>,
}

impl MainView {
    pub fn new() -> Self {
        Self {
            content_view: Box::new(SourcesComponent::default()),
            modal_view: None,
        }
    }

    /// Mount the initial route.
    pub fn enter_initial_route(&mut self, app: &mut App) -> Vec<Effect> {
        self.content_view.on_route_enter(app)
    }

    fn view_for(route: Route) -> Box<dyn Component> {
        match route {
            Route::Sources => Box::new(SourcesComponent::default()),
            Route::SnapshotForm => Box::new(SnapshotFormComponent),
        }
    }

    /// Switch to `route`, remembering the current one for GoBack. Exit and
    /// enter hooks run here so their effects join the current batch.
    pub fn switch_route(&mut self, app: &mut App, route: Route, queued: &mut Vec<Effect>) {
        if app.route == route {
            return;
        }
        queued.extend(self.content_view.on_route_exit(app));
        app.route_stack.push(app.route);
        app.route = route;
        self.content_view = Self::view_for(route);
        queued.extend(self.content_view.on_route_enter(app));
    }

    /// Return to the previous route (the sources screen when the stack is
    /// exhausted).
    pub fn go_back(&mut self, app: &mut App, queued: &mut Vec<Effect>) {
        let target = app.route_stack.pop().unwrap_or(Route::Sources);
        if target == app.route {
            return;
        }
        queued.extend(self.content_view.on_route_exit(app));
        app.route = target;
        self.content_view = Self::view_for(target);
        queued.extend(self.content_view.on_route_enter(app));
    }

    /// Open or close a modal. Opening the directory picker seeds its state
    /// from the form's current path and requests the first listing.
    pub fn set_open_modal(&mut self, app: &mut App, modal: Option<Modal>) -> Vec<Effect> {
        let mut effects = Vec::new();
        match modal.as_ref() {
            Some(Modal::DirPicker) => {
                let start = dir_picker_start(app);
                app.dir_picker = Some(DirPickerState::new(start.clone()));
                self.modal_view = Some(Box::new(DirPickerModal::default()));
                effects.push(Effect::ListDirectory(start));
            }
            Some(Modal::Alert(_)) => {
                app.dir_picker = None;
                self.modal_view = Some(Box::new(AlertModal));
            }
            None => {
                app.dir_picker = None;
                self.modal_view = None;
            }
        }
        app.open_modal = modal;
        effects
    }
}

/// Start the picker at the typed path when it names a local directory,
/// otherwise at the home directory.
fn dir_picker_start(app: &App) -> std::path::PathBuf {
    let typed = app.form.path();
    if !typed.is_empty() {
        let candidate = std::path::Path::new(typed);
        if candidate.is_absolute() && candidate.is_dir() {
            return candidate.to_path_buf();
        }
    }
    dirs_next::home_dir().unwrap_or_else(|| std::path::PathBuf::from("/"))
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        let mut effects = app.update(msg);

        // Directory listings belong to the picker modal; everything else is
        // the current screen's business, even while a modal is up (path
        // resolution keeps converging underneath it).
        let for_modal = matches!(
            msg,
            Msg::ExecCompleted(outcome)
                if matches!(
                    outcome.as_ref(),
                    ExecOutcome::DirectoryListed { .. } | ExecOutcome::DirectoryListFailed { .. }
                )
        );
        if for_modal {
            if let Some(modal) = self.modal_view.as_mut() {
                effects.extend(modal.handle_message(app, msg));
            }
        } else {
            effects.extend(self.content_view.handle_message(app, msg));
        }
        effects
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.logs.toggle_visible();
            return Vec::new();
        }
        if let Some(modal) = self.modal_view.as_mut() {
            return modal.handle_key_events(app, key);
        }
        self.content_view.handle_key_events(app, key)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let logs_height = if app.logs.visible { 8 } else { 0 };
        let areas = Layout::vertical([
            Constraint::Length(1),           // header
            Constraint::Min(1),              // content
            Constraint::Length(logs_height), // log panel
            Constraint::Length(1),           // hints
        ])
        .split(area);

        let header = Line::from(vec![
            Span::styled("snaptty", theme::selection_style()),
            Span::styled(" — snapshot console   ", theme::muted_style()),
            Span::styled(app.ctx.client.base_url().to_string(), theme::muted_style()),
        ]);
        frame.render_widget(Paragraph::new(header), areas[0]);

        self.content_view.render(frame, areas[1], app);

        if app.logs.visible {
            let block = Block::default()
                .title(Span::styled("Logs", theme::title_style()))
                .borders(Borders::ALL)
                .border_style(theme::border_style(false));
            let inner_height = block.inner(areas[2]).height as usize;
            let start = app.logs.entries.len().saturating_sub(inner_height);
            let lines: Vec<Line> = app.logs.entries[start..]
                .iter()
                .map(|entry| Line::from(Span::styled(entry.clone(), theme::muted_style())))
                .collect();
            frame.render_widget(Paragraph::new(lines).block(block), areas[2]);
        }

        let mut hints = match self.modal_view.as_ref() {
            Some(modal) => modal.get_hint_spans(app),
            None => self.content_view.get_hint_spans(app),
        };
        hints.extend(build_hint_spans(&[(" Ctrl+L", " Logs "), (" Ctrl+C", " Quit ")]));
        frame.render_widget(Paragraph::new(Line::from(hints)), areas[3]);

        if let Some(modal) = self.modal_view.as_mut() {
            let modal_area = match app.open_modal.as_ref() {
                Some(Modal::Alert(_)) => centered_rect(60, 30, area),
                _ => centered_rect(70, 70, area),
            };
            frame.render_widget(Clear, modal_area);
            modal.render(frame, modal_area, app);
        }
    }
}
