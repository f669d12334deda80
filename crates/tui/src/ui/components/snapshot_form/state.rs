//! State of the snapshot-creation form.
//!
//! The form owns three cooperating pieces of state: the free-text path
//! input, the resolution loop that keeps `resolved_source` consistent with
//! that text, and the estimate display driven by a server task. All
//! mutation goes through the methods here; the reconciliation step in
//! [`SnapshotFormState::reconcile`] is the only place resolution requests
//! originate.

use snaptty_types::{Effect, EstimateTaskRef, SourceDescriptor, TaskStatus, TaskSummary};

use crate::ui::components::common::TextInputState;

/// Poll the running estimate task every this many UI ticks.
const ESTIMATE_POLL_TICKS: u8 = 5;

/// Which part of the form has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormFocus {
    #[default]
    Path,
    EstimateButton,
    SnapshotButton,
    Policy,
}

/// Display state of the estimate results panel.
#[derive(Debug, Default)]
pub struct EstimateDisplay {
    /// Server task backing the panel
    pub task_id: Option<String>,
    /// Human-readable description returned when the task started
    pub description: String,
    /// Whether the panel is shown
    pub visible: bool,
    /// Resolved path the current results were computed for
    pub last_estimated_path: String,
    /// Set once the task reaches a terminal status
    pub did_estimate: bool,
    /// Latest polled task state
    pub summary: Option<TaskSummary>,
    poll_in_flight: bool,
    ticks_since_poll: u8,
}

impl EstimateDisplay {
    fn reset(&mut self) {
        *self = EstimateDisplay::default();
    }

    pub fn is_running(&self) -> bool {
        self.visible && self.task_id.is_some() && !self.did_estimate
    }
}

#[derive(Debug, Default)]
pub struct SnapshotFormState {
    path_input: TextInputState,
    /// Path the most recent completed resolution was issued for
    last_resolved_path: String,
    /// Backend identity of the current path, if confirmed
    resolved_source: Option<SourceDescriptor>,
    /// Local identity fetched on entry, for display
    local_username: Option<String>,
    local_host: Option<String>,
    pub estimate: EstimateDisplay,
    /// True while a snapshot-now request is in flight
    snapshot_pending: bool,
    focus: FormFocus,
    dirty: bool,
}

impl SnapshotFormState {
    // ========================
    // Path input
    // ========================
    pub fn path(&self) -> &str {
        self.path_input.input()
    }

    pub fn path_input(&self) -> &TextInputState {
        &self.path_input
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path_input.set_input(path);
        let len = self.path_input.input().len();
        self.path_input.set_cursor(len);
        self.dirty = true;
    }

    pub fn insert_path_char(&mut self, c: char) {
        self.path_input.insert_char(c);
        self.dirty = true;
    }

    pub fn backspace_path_char(&mut self) {
        self.path_input.backspace();
        self.dirty = true;
    }

    pub fn delete_path_char(&mut self) {
        self.path_input.delete();
        self.dirty = true;
    }

    pub fn path_cursor_left(&mut self) {
        self.path_input.move_left();
    }

    pub fn path_cursor_right(&mut self) {
        self.path_input.move_right();
    }

    pub fn path_cursor_home(&mut self) {
        self.path_input.set_cursor(0);
    }

    pub fn path_cursor_end(&mut self) {
        let len = self.path_input.input().len();
        self.path_input.set_cursor(len);
    }

    // ========================
    // Resolution loop
    // ========================
    pub fn resolved_source(&self) -> Option<&SourceDescriptor> {
        self.resolved_source.as_ref()
    }

    /// The resolved path, when the current text has been confirmed to
    /// denote a real source. Action buttons gate on this.
    pub fn resolved_path(&self) -> Option<&str> {
        self.resolved_source
            .as_ref()
            .map(|s| s.path.as_str())
            .filter(|p| !p.is_empty())
    }

    pub fn can_act(&self) -> bool {
        self.resolved_path().is_some()
    }

    pub fn last_resolved_path(&self) -> &str {
        &self.last_resolved_path
    }

    /// Record a completed resolution. The completion names the path it was
    /// issued for; a stale completion is recorded as-is and corrected by
    /// the next `reconcile` pass.
    pub fn apply_resolved(&mut self, requested_path: String, source: SourceDescriptor) {
        self.last_resolved_path = requested_path;
        self.resolved_source = Some(source);
        self.dirty = true;
    }

    /// Level-triggered reconciliation, run after every state transition.
    ///
    /// Drives the resolution loop toward `last_resolved_path == path` and
    /// hides estimate results computed for a path that is no longer the
    /// resolved one. Returns at most one resolution request; in-flight
    /// requests are never cancelled, so overlapping completions are
    /// expected and self-correct here within one extra round trip.
    pub fn reconcile(&mut self) -> Vec<Effect> {
        if !self.take_dirty() {
            return Vec::new();
        }

        let mut effects = Vec::new();
        loop {
            let current = self.path_input.input().to_string();
            if self.last_resolved_path == current {
                break;
            }
            if current.is_empty() {
                self.resolved_source = None;
                self.last_resolved_path.clear();
                // re-check; converges since the path is already empty
                continue;
            }
            effects.push(Effect::ResolvePath(current));
            break;
        }

        // An estimate shown for one path must not survive the resolved
        // source becoming another.
        if self.estimate.visible {
            let resolved = self.resolved_source.as_ref().map(|s| s.path.as_str());
            if resolved != Some(self.estimate.last_estimated_path.as_str()) {
                self.estimate.visible = false;
            }
        }

        effects
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ========================
    // Local identity
    // ========================
    pub fn apply_local_identity(&mut self, username: String, host: String) {
        self.local_username = Some(username);
        self.local_host = Some(host);
        self.dirty = true;
    }

    pub fn local_identity(&self) -> Option<(&str, &str)> {
        match (self.local_username.as_deref(), self.local_host.as_deref()) {
            (Some(user), Some(host)) => Some((user, host)),
            _ => None,
        }
    }

    // ========================
    // Estimate display
    // ========================
    pub fn apply_estimate_started(&mut self, root: String, task: EstimateTaskRef) {
        self.estimate.last_estimated_path = root;
        self.estimate.task_id = Some(task.id);
        self.estimate.description = task.description;
        self.estimate.visible = true;
        self.estimate.did_estimate = false;
        self.estimate.summary = None;
        self.estimate.poll_in_flight = false;
        self.estimate.ticks_since_poll = ESTIMATE_POLL_TICKS;
        self.dirty = true;
    }

    /// Called on each UI tick; returns the task to poll when a refresh is
    /// due and none is already in flight.
    pub fn estimate_poll_due(&mut self) -> Option<String> {
        if !self.estimate.is_running() || self.estimate.poll_in_flight {
            return None;
        }
        self.estimate.ticks_since_poll = self.estimate.ticks_since_poll.saturating_add(1);
        if self.estimate.ticks_since_poll < ESTIMATE_POLL_TICKS {
            return None;
        }
        self.estimate.ticks_since_poll = 0;
        self.estimate.poll_in_flight = true;
        self.estimate.task_id.clone()
    }

    pub fn apply_estimate_summary(&mut self, summary: TaskSummary) {
        self.estimate.poll_in_flight = false;
        if self.estimate.task_id.as_deref() != Some(summary.id.as_str()) {
            // completion for a task the panel no longer tracks
            return;
        }
        if summary.status.is_terminal() {
            self.estimate.did_estimate = true;
        }
        self.estimate.summary = Some(summary);
        self.dirty = true;
    }

    pub fn estimate_poll_failed(&mut self) {
        self.estimate.poll_in_flight = false;
    }

    pub fn estimate_running(&self) -> bool {
        self.estimate.is_running()
    }

    /// Whether the estimate panel should render, and for which task.
    pub fn visible_estimate_task(&self) -> Option<&str> {
        if self.estimate.visible {
            self.estimate.task_id.as_deref()
        } else {
            None
        }
    }

    pub fn estimate_status(&self) -> Option<TaskStatus> {
        self.estimate.summary.as_ref().map(|s| s.status)
    }

    // ========================
    // Snapshot action
    // ========================
    pub fn begin_snapshot(&mut self) {
        self.snapshot_pending = true;
        self.dirty = true;
    }

    pub fn snapshot_failed(&mut self) {
        self.snapshot_pending = false;
        self.dirty = true;
    }

    pub fn snapshot_pending(&self) -> bool {
        self.snapshot_pending
    }

    // ========================
    // Focus
    // ========================
    pub fn focus(&self) -> FormFocus {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            FormFocus::Path => FormFocus::EstimateButton,
            FormFocus::EstimateButton => FormFocus::SnapshotButton,
            FormFocus::SnapshotButton if self.can_act() => FormFocus::Policy,
            FormFocus::SnapshotButton | FormFocus::Policy => FormFocus::Path,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            FormFocus::Path if self.can_act() => FormFocus::Policy,
            FormFocus::Path => FormFocus::SnapshotButton,
            FormFocus::EstimateButton => FormFocus::Path,
            FormFocus::SnapshotButton => FormFocus::EstimateButton,
            FormFocus::Policy => FormFocus::SnapshotButton,
        };
    }

    /// Reset to a pristine form. Called when the route is left so no state
    /// survives into the next visit.
    pub fn reset(&mut self) {
        *self = SnapshotFormState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaptty_types::TaskStatus;

    fn source(host: &str, user: &str, path: &str) -> SourceDescriptor {
        SourceDescriptor {
            host: host.into(),
            user_name: user.into(),
            path: path.into(),
        }
    }

    fn resolve_target(effects: &[Effect]) -> Option<&str> {
        effects.iter().find_map(|e| match e {
            Effect::ResolvePath(path) => Some(path.as_str()),
            _ => None,
        })
    }

    #[test]
    fn resolution_converges_after_edits_settle() {
        let mut form = SnapshotFormState::default();

        form.set_path("/da");
        let effects = form.reconcile();
        assert_eq!(resolve_target(&effects), Some("/da"));

        // user keeps typing while the first request is in flight
        form.set_path("/data");
        let effects = form.reconcile();
        assert_eq!(resolve_target(&effects), Some("/data"));

        // the stale completion for "/da" lands first and is applied as-is
        form.apply_resolved("/da".into(), source("h1", "u1", "/da"));
        let effects = form.reconcile();
        assert_eq!(resolve_target(&effects), Some("/data"), "stale response triggers corrective resolve");

        // the corrective completion converges the loop
        form.apply_resolved("/data".into(), source("h1", "u1", "/data"));
        assert!(form.reconcile().is_empty());
        assert_eq!(form.last_resolved_path(), form.path());
        assert_eq!(form.resolved_path(), Some("/data"));
    }

    #[test]
    fn duplicate_reconcile_without_updates_is_a_noop() {
        let mut form = SnapshotFormState::default();
        form.set_path("/data");
        assert_eq!(resolve_target(&form.reconcile()), Some("/data"));
        // nothing changed since; no second request for the same state
        assert!(form.reconcile().is_empty());
    }

    #[test]
    fn clearing_the_path_clears_the_resolved_source() {
        let mut form = SnapshotFormState::default();
        form.set_path("/data");
        form.reconcile();
        form.apply_resolved("/data".into(), source("h1", "u1", "/data"));
        form.reconcile();
        assert!(form.can_act());

        form.set_path("");
        let effects = form.reconcile();
        assert!(effects.is_empty(), "empty path converges without a request");
        assert!(form.resolved_source().is_none());
        assert_eq!(form.last_resolved_path(), "");
        assert!(!form.can_act());
    }

    #[test]
    fn actions_enabled_iff_resolved_path_present() {
        let mut form = SnapshotFormState::default();
        assert!(!form.can_act());

        form.set_path("/data");
        form.reconcile();
        assert!(!form.can_act(), "typing alone does not enable actions");

        form.apply_resolved("/data".into(), source("h1", "u1", "/data"));
        assert!(form.can_act());

        // a resolution to an empty canonical path stays disabled
        form.apply_resolved("/data".into(), source("h1", "u1", ""));
        assert!(!form.can_act());
    }

    #[test]
    fn estimate_results_hidden_when_resolved_path_changes() {
        let mut form = SnapshotFormState::default();
        form.set_path("/data");
        form.reconcile();
        form.apply_resolved("/data".into(), source("h1", "u1", "/data"));
        form.reconcile();

        form.apply_estimate_started(
            "/data".into(),
            EstimateTaskRef {
                id: "t1".into(),
                description: "scanning /data".into(),
            },
        );
        form.reconcile();
        assert_eq!(form.visible_estimate_task(), Some("t1"));

        // path edited; results stay visible until the new resolution lands
        form.set_path("/other");
        form.reconcile();
        assert_eq!(form.visible_estimate_task(), Some("t1"));

        form.apply_resolved("/other".into(), source("h1", "u1", "/other"));
        form.reconcile();
        assert_eq!(form.visible_estimate_task(), None);
    }

    #[test]
    fn estimate_summary_marks_terminal_states() {
        let mut form = SnapshotFormState::default();
        form.set_path("/data");
        form.reconcile();
        form.apply_resolved("/data".into(), source("h1", "u1", "/data"));
        form.reconcile();
        form.apply_estimate_started(
            "/data".into(),
            EstimateTaskRef {
                id: "t1".into(),
                description: "scanning /data".into(),
            },
        );
        assert!(form.estimate_running());

        let task_id = form.estimate_poll_due().expect("poll due after start");
        assert_eq!(task_id, "t1");
        assert!(form.estimate_poll_due().is_none(), "no overlapping polls");

        form.apply_estimate_summary(TaskSummary {
            id: "t1".into(),
            status: TaskStatus::Success,
            start_time: None,
            end_time: None,
            error_message: None,
            counters: Default::default(),
        });
        assert!(!form.estimate_running());
        assert_eq!(form.estimate_status(), Some(TaskStatus::Success));
        assert_eq!(form.visible_estimate_task(), Some("t1"), "finished results stay visible");
    }

    #[test]
    fn stale_task_summaries_are_ignored() {
        let mut form = SnapshotFormState::default();
        form.apply_estimate_started(
            "/data".into(),
            EstimateTaskRef {
                id: "t2".into(),
                description: "scanning /data".into(),
            },
        );
        form.apply_estimate_summary(TaskSummary {
            id: "t1".into(),
            status: TaskStatus::Success,
            start_time: None,
            end_time: None,
            error_message: None,
            counters: Default::default(),
        });
        assert!(form.estimate.summary.is_none());
        assert!(!form.estimate.did_estimate);
    }

    #[test]
    fn reset_returns_to_pristine_state() {
        let mut form = SnapshotFormState::default();
        form.set_path("/data");
        form.reconcile();
        form.apply_resolved("/data".into(), source("h1", "u1", "/data"));
        form.begin_snapshot();
        form.reset();
        assert_eq!(form.path(), "");
        assert!(form.resolved_source().is_none());
        assert!(!form.snapshot_pending());
        assert!(form.reconcile().is_empty());
    }
}
