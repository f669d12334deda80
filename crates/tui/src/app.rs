//! Application state for the snaptty console.
//!
//! `App` is the central state container: per-screen state structs, the
//! shared server client, the route stack, and the in-memory log panel.
//! Components mutate this state and report side effects back as `Effect`s;
//! nothing here performs I/O.

use std::sync::Arc;

use snaptty_api::ServerClient;
use snaptty_types::{Effect, ExecOutcome, Modal, Msg, Route};

use crate::ui::components::dir_picker::DirPickerState;
use crate::ui::components::policy_editor::PolicyEditorState;
use crate::ui::components::snapshot_form::SnapshotFormState;
use crate::ui::components::sources::SourcesState;

/// Cross-cutting shared context owned by the App.
///
/// Holds runtime-wide objects so they do not have to be threaded through
/// every component call.
#[derive(Debug, Clone)]
pub struct SharedCtx {
    /// Shared handle to the server API client
    pub client: Arc<ServerClient>,
}

/// Application log panel entries, newest last.
#[derive(Debug, Default)]
pub struct LogsState {
    pub entries: Vec<String>,
    pub visible: bool,
}

impl LogsState {
    /// Append an entry, keeping the panel bounded.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
        let len = self.entries.len();
        if len > 500 {
            self.entries.drain(0..len - 500);
        }
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }
}

/// The main application state.
pub struct App {
    /// Current primary route
    pub route: Route,
    /// Routes to return to on GoBack, oldest first
    pub route_stack: Vec<Route>,
    /// Shared, cross-cutting context
    pub ctx: SharedCtx,
    /// Sources screen state
    pub sources: SourcesState,
    /// Snapshot-creation form state
    pub form: SnapshotFormState,
    /// Embedded policy editor state
    pub policy: PolicyEditorState,
    /// Directory picker state, present while the picker modal is open
    pub dir_picker: Option<DirPickerState>,
    /// Currently open modal, if any
    pub open_modal: Option<Modal>,
    /// Application log panel
    pub logs: LogsState,
    /// Whether background requests are currently in flight
    pub executing: bool,
    /// Animation frame for throbbers
    pub throbber_idx: usize,
}

impl App {
    pub fn new(client: Arc<ServerClient>) -> Self {
        Self {
            route: Route::Sources,
            route_stack: Vec::new(),
            ctx: SharedCtx { client },
            sources: SourcesState::default(),
            form: SnapshotFormState::default(),
            policy: PolicyEditorState::default(),
            dir_picker: None,
            open_modal: None,
            logs: LogsState::default(),
            executing: false,
            throbber_idx: 0,
        }
    }

    /// Handle cross-cutting messages before they are routed to a component.
    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.executing || self.form.estimate_running() {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                }
            }
            Msg::Resize(_, _) => {}
            Msg::ExecCompleted(outcome) => {
                if let ExecOutcome::TaskAborted(error) = outcome.as_ref() {
                    self.logs.push(format!("Background task failed: {error}"));
                }
            }
        }
        Vec::new()
    }

    /// Post-update reconciliation choke point, run by the runtime after
    /// every processed event. Drives the path-resolution loop and stale
    /// estimate invalidation; a no-op unless form state actually changed.
    pub fn post_update(&mut self) -> Vec<Effect> {
        if self.route != Route::SnapshotForm {
            return Vec::new();
        }
        self.form.reconcile()
    }

    /// Current throbber glyph for spinners.
    pub fn throbber(&self) -> char {
        THROBBER_FRAMES[self.throbber_idx % THROBBER_FRAMES.len()]
    }
}

const THROBBER_FRAMES: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];
