//! Component abstraction for the snaptty console.
//!
//! Components own local UI behavior: they translate input and application
//! messages into state changes on [`App`] and report side effects back as
//! `Effect`s. Rendering draws from state only; any mutation happens in the
//! event handlers.

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::text::Span;
use ratatui::Frame;
use snaptty_types::{Effect, Msg};

use crate::app::App;

pub(crate) trait Component {
    /// Handle an application-level message this component cares about.
    fn handle_message(&mut self, _app: &mut App, _msg: &Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle a key event while this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Draw the component into the given area.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key-binding hints for the footer bar.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        Vec::new()
    }

    /// Called when the component's route becomes current.
    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }

    /// Called when the component's route is left.
    fn on_route_exit(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }
}
