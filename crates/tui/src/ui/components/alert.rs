//! Dismissible alert modal for in-place errors and blocking warnings.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use snaptty_types::{Effect, Modal};

use crate::app::App;
use crate::theme;
use crate::ui::component::Component;
use crate::ui::utils::build_hint_spans;

#[derive(Debug, Default)]
pub struct AlertModal;

impl Component for AlertModal {
    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => vec![Effect::CloseModal],
            // swallow everything else; the alert is blocking until dismissed
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let Some(Modal::Alert(alert)) = app.open_modal.as_ref() else {
            return;
        };
        let block = Block::default()
            .title(Span::styled(alert.title.clone(), theme::title_style()))
            .borders(Borders::ALL)
            .border_style(theme::warn_style());
        let inner = block.inner(rect);
        frame.render_widget(Clear, rect);
        frame.render_widget(block, rect);
        let body = Paragraph::new(Line::from(Span::styled(alert.message.clone(), theme::text_style())))
            .wrap(Wrap { trim: true });
        frame.render_widget(body, inner);
    }

    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        build_hint_spans(&[(" Esc/Enter", " Dismiss ")])
    }
}
