//! The snapshot-creation form: path entry, estimate and snapshot-now
//! actions, the embedded policy editor, and the CLI-equivalent footer.
//!
//! Error classes follow the console-wide split: failures of the initial
//! sources fetch and of path resolution leave the form (there is nothing
//! sensible to show without them), while estimate/snapshot failures and
//! policy validation errors alert in place and keep the form up.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use snaptty_types::{
    Alert, CreateSourceRequest, Effect, EstimateRequest, ExecOutcome, Modal, Msg, MAX_EXAMPLES_PER_BUCKET,
};
use snaptty_util::snapshot_create_command;

use crate::app::App;
use crate::theme;
use crate::ui::component::Component;
use crate::ui::components::policy_editor::{handle_policy_key, render_policy_editor};
use crate::ui::components::snapshot_form::estimate_panel::render_estimate_panel;
use crate::ui::components::snapshot_form::state::FormFocus;
use crate::ui::utils::build_hint_spans;

#[derive(Debug, Default)]
pub struct SnapshotFormComponent;

impl SnapshotFormComponent {
    /// Ask the server for a bounded-size estimate of the resolved path,
    /// using the currently edited (unsaved) policy.
    fn estimate(&self, app: &mut App) -> Vec<Effect> {
        let Some(root) = app.form.resolved_path().map(str::to_string) else {
            return Vec::new();
        };
        match app.policy.get_and_validate_policy() {
            Ok(policy) => vec![Effect::StartEstimate(EstimateRequest {
                root,
                max_examples_per_bucket: MAX_EXAMPLES_PER_BUCKET,
                policy_override: policy,
            })],
            Err(error) => vec![Effect::ShowModal(Modal::Alert(Alert::new("Invalid policy", error.to_string())))],
        }
    }

    /// Register the resolved path as a source and snapshot it immediately.
    fn snapshot_now(&self, app: &mut App) -> Vec<Effect> {
        let Some(path) = app.form.resolved_path().map(str::to_string) else {
            return vec![Effect::ShowModal(Modal::Alert(Alert::new(
                "Nothing to snapshot",
                "Specify a directory to snapshot first.",
            )))];
        };
        match app.policy.get_and_validate_policy() {
            Ok(policy) => {
                app.form.begin_snapshot();
                vec![Effect::CreateSource(CreateSourceRequest {
                    path,
                    create_snapshot: true,
                    policy,
                })]
            }
            Err(error) => vec![Effect::ShowModal(Modal::Alert(Alert::new("Invalid policy", error.to_string())))],
        }
    }

    fn cli_equivalent(&self, app: &App) -> String {
        let path = app.form.resolved_path().unwrap_or_else(|| app.form.path());
        let policy = app.policy.get_and_validate_policy().unwrap_or_default();
        snapshot_create_command(path, &policy)
    }

    fn render_path_input(&self, frame: &mut Frame, rect: Rect, app: &App) {
        let focused = app.form.focus() == FormFocus::Path;
        let block = Block::default()
            .title(Span::styled("Path", theme::title_style()))
            .borders(Borders::ALL)
            .border_style(theme::border_style(focused));
        let inner = block.inner(rect);
        let path = app.form.path();
        let content = if path.is_empty() && !focused {
            Line::from(Span::styled("enter path to snapshot", theme::muted_style()))
        } else {
            Line::from(Span::styled(path.to_string(), theme::text_style()))
        };
        frame.render_widget(Paragraph::new(content).block(block), rect);
        if focused {
            let cursor_x = inner.x + app.form.path_input().cursor_columns() as u16;
            frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }

    fn render_actions(&self, frame: &mut Frame, rect: Rect, app: &App) {
        let enabled = app.form.can_act();
        let focus = app.form.focus();
        let mut spans = vec![
            Span::styled(
                " Estimate ",
                theme::button_style(enabled, focus == FormFocus::EstimateButton),
            ),
            Span::raw("  "),
            Span::styled(
                if app.form.snapshot_pending() {
                    " Snapshotting… ".to_string()
                } else {
                    " Snapshot Now ".to_string()
                },
                theme::button_style(enabled && !app.form.snapshot_pending(), focus == FormFocus::SnapshotButton),
            ),
            Span::raw("   "),
        ];
        match app.form.resolved_source() {
            Some(source) => spans.push(Span::styled(source.to_string(), theme::ok_style())),
            None if !app.form.path().is_empty() => {
                spans.push(Span::styled(format!("{} resolving…", app.throbber()), theme::muted_style()));
            }
            None => {
                if let Some((user, host)) = app.form.local_identity() {
                    spans.push(Span::styled(format!("local: {user}@{host}"), theme::muted_style()));
                }
            }
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), rect);
    }

    fn render_footer(&self, frame: &mut Frame, rect: Rect, app: &App) {
        let line = Line::from(vec![
            Span::styled("CLI equivalent: ", theme::muted_style()),
            Span::styled(self.cli_equivalent(app), theme::text_style()),
        ]);
        frame.render_widget(Paragraph::new(line), rect);
    }
}

impl Component for SnapshotFormComponent {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if let Some(task_id) = app.form.estimate_poll_due() {
                    return vec![Effect::RefreshEstimateTask(task_id)];
                }
            }
            Msg::ExecCompleted(outcome) => match outcome.as_ref() {
                ExecOutcome::SourcesLoaded(response) => {
                    app.form
                        .apply_local_identity(response.local_username.clone(), response.local_host.clone());
                }
                ExecOutcome::SourcesFailed(error) => {
                    app.logs.push(format!("Loading server identity failed: {error}"));
                    return vec![Effect::GoBack];
                }
                ExecOutcome::PathResolved { requested_path, source } => {
                    app.form.apply_resolved(requested_path.clone(), source.clone());
                }
                ExecOutcome::ResolveFailed { requested_path, error } => {
                    app.logs.push(format!("Resolving {requested_path:?} failed: {error}"));
                    return vec![Effect::GoBack];
                }
                ExecOutcome::EstimateStarted { root, task } => {
                    app.form.apply_estimate_started(root.clone(), task.clone());
                }
                ExecOutcome::EstimateFailed(error) => {
                    return vec![Effect::ShowModal(Modal::Alert(Alert::new("Estimate failed", error.clone())))];
                }
                ExecOutcome::EstimateTaskUpdated(summary) => {
                    app.form.apply_estimate_summary(summary.clone());
                }
                ExecOutcome::EstimateTaskPollFailed(error) => {
                    app.form.estimate_poll_failed();
                    app.logs.push(format!("Estimate status refresh failed: {error}"));
                }
                ExecOutcome::SourceCreated => {
                    return vec![Effect::GoBack];
                }
                ExecOutcome::CreateSourceFailed(error) => {
                    app.form.snapshot_failed();
                    return vec![Effect::ShowModal(Modal::Alert(Alert::new("Snapshot failed", error.clone())))];
                }
                _ => {}
            },
            Msg::Resize(_, _) => {}
        }
        Vec::new()
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        // global form keys first
        match key.code {
            KeyCode::Tab => {
                app.form.focus_next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.form.focus_prev();
                return Vec::new();
            }
            KeyCode::Esc => return vec![Effect::GoBack],
            KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return vec![Effect::ShowModal(Modal::DirPicker)];
            }
            KeyCode::Char('y') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return vec![Effect::CopyToClipboard(self.cli_equivalent(app))];
            }
            _ => {}
        }

        match app.form.focus() {
            FormFocus::Path => match key.code {
                KeyCode::Enter => app.form.focus_next(),
                KeyCode::Backspace => app.form.backspace_path_char(),
                KeyCode::Delete => app.form.delete_path_char(),
                KeyCode::Left => app.form.path_cursor_left(),
                KeyCode::Right => app.form.path_cursor_right(),
                KeyCode::Home => app.form.path_cursor_home(),
                KeyCode::End => app.form.path_cursor_end(),
                KeyCode::Char(c) if !c.is_control() && (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT) => {
                    app.form.insert_path_char(c);
                }
                _ => {}
            },
            FormFocus::EstimateButton => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') if app.form.can_act() => return self.estimate(app),
                KeyCode::Right => app.form.focus_next(),
                KeyCode::Left => app.form.focus_prev(),
                _ => {}
            },
            FormFocus::SnapshotButton => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') if !app.form.snapshot_pending() => return self.snapshot_now(app),
                KeyCode::Right => app.form.focus_next(),
                KeyCode::Left => app.form.focus_prev(),
                _ => {}
            },
            FormFocus::Policy => {
                handle_policy_key(app, key);
            }
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let estimate_height = if app.form.visible_estimate_task().is_some() {
            let counters = app
                .form
                .estimate
                .summary
                .as_ref()
                .map(|s| s.counters.len())
                .unwrap_or(0);
            (counters as u16).saturating_add(4).min(12)
        } else {
            0
        };
        let policy_height = if app.form.resolved_source().is_some() { 10 } else { 0 };
        let areas = Layout::vertical([
            Constraint::Length(3),               // path input
            Constraint::Length(1),               // action row
            Constraint::Length(estimate_height), // estimate panel
            Constraint::Length(policy_height),   // policy editor
            Constraint::Min(0),                  // spacer
            Constraint::Length(1),               // CLI equivalent
        ])
        .split(rect);

        self.render_path_input(frame, areas[0], app);
        self.render_actions(frame, areas[1], app);
        if estimate_height > 0 {
            render_estimate_panel(frame, areas[2], app);
        }
        if policy_height > 0 {
            render_policy_editor(frame, areas[3], app, app.form.focus() == FormFocus::Policy);
        }
        self.render_footer(frame, areas[5], app);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hints = vec![(" Tab", " Next "), (" Ctrl+O", " Browse "), (" Ctrl+Y", " Copy CLI ")];
        if app.form.can_act() {
            hints.push((" Enter", " Activate "));
        }
        hints.push((" Esc", " Back "));
        build_hint_spans(&hints)
    }

    /// Mount: fetch the source list once, solely for the local identity.
    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        vec![Effect::FetchSources]
    }

    /// Unmount: the form is a one-shot view, nothing survives into the
    /// next visit.
    fn on_route_exit(&mut self, app: &mut App) -> Vec<Effect> {
        app.form.reset();
        app.policy.reset();
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use snaptty_api::ServerClient;
    use snaptty_types::{EstimateTaskRef, SourceDescriptor};

    fn test_app() -> App {
        let client = ServerClient::with_token("http://localhost:51515", None).expect("client");
        App::new(Arc::new(client))
    }

    fn exec(outcome: ExecOutcome) -> Msg {
        Msg::ExecCompleted(Box::new(outcome))
    }

    fn source(path: &str) -> SourceDescriptor {
        SourceDescriptor {
            host: "h1".into(),
            user_name: "u1".into(),
            path: path.into(),
        }
    }

    #[test]
    fn snapshot_now_without_resolved_path_blocks_with_alert() {
        let mut app = test_app();
        let component = SnapshotFormComponent;
        app.form.set_path("/data"); // typed but never resolved

        let effects = component.snapshot_now(&mut app);
        assert_eq!(effects.len(), 1);
        assert!(
            matches!(&effects[0], Effect::ShowModal(Modal::Alert(alert)) if alert.title == "Nothing to snapshot"),
            "expected a blocking alert, got {effects:?}"
        );
        assert!(!app.form.snapshot_pending());
    }

    #[test]
    fn estimate_sends_resolved_root_and_fixed_bucket_cap() {
        let mut app = test_app();
        let component = SnapshotFormComponent;
        app.form.set_path("/data");
        app.form.reconcile();
        app.form.apply_resolved("/data".into(), source("/data"));

        let effects = component.estimate(&mut app);
        match &effects[..] {
            [Effect::StartEstimate(request)] => {
                assert_eq!(request.root, "/data");
                assert_eq!(request.max_examples_per_bucket, 10);
            }
            other => panic!("expected StartEstimate, got {other:?}"),
        }
    }

    #[test]
    fn invalid_policy_aborts_before_any_request() {
        let mut app = test_app();
        let component = SnapshotFormComponent;
        app.form.set_path("/data");
        app.form.apply_resolved("/data".into(), source("/data"));
        app.policy.current_field_mut().set_input("not-a-number");

        for effects in [component.estimate(&mut app), component.snapshot_now(&mut app)] {
            assert_eq!(effects.len(), 1);
            assert!(
                matches!(&effects[0], Effect::ShowModal(Modal::Alert(alert)) if alert.title == "Invalid policy"),
                "expected a validation alert, got {effects:?}"
            );
        }
        assert!(!app.form.snapshot_pending());
    }

    #[test]
    fn estimate_then_new_resolution_hides_results() {
        let mut app = test_app();
        let mut component = SnapshotFormComponent;
        app.form.set_path("/data");
        app.form.reconcile();
        component.handle_message(
            &mut app,
            &exec(ExecOutcome::PathResolved {
                requested_path: "/data".into(),
                source: source("/data"),
            }),
        );
        app.form.reconcile();

        component.handle_message(
            &mut app,
            &exec(ExecOutcome::EstimateStarted {
                root: "/data".into(),
                task: EstimateTaskRef {
                    id: "t1".into(),
                    description: "scanning /data".into(),
                },
            }),
        );
        app.form.reconcile();
        assert_eq!(app.form.visible_estimate_task(), Some("t1"));

        app.form.set_path("/other");
        app.form.reconcile();
        component.handle_message(
            &mut app,
            &exec(ExecOutcome::PathResolved {
                requested_path: "/other".into(),
                source: source("/other"),
            }),
        );
        app.form.reconcile();
        assert_eq!(app.form.visible_estimate_task(), None);
    }

    #[test]
    fn source_created_navigates_back() {
        let mut app = test_app();
        let mut component = SnapshotFormComponent;
        let effects = component.handle_message(&mut app, &exec(ExecOutcome::SourceCreated));
        assert_eq!(effects, vec![Effect::GoBack]);
    }

    #[test]
    fn create_failure_clears_pending_and_alerts_in_place() {
        let mut app = test_app();
        let mut component = SnapshotFormComponent;
        app.form.begin_snapshot();
        let effects = component.handle_message(&mut app, &exec(ExecOutcome::CreateSourceFailed("boom".into())));
        assert!(!app.form.snapshot_pending());
        assert!(matches!(&effects[0], Effect::ShowModal(Modal::Alert(alert)) if alert.title == "Snapshot failed"));
    }

    #[test]
    fn resolve_failure_is_navigation_worthy() {
        let mut app = test_app();
        let mut component = SnapshotFormComponent;
        let effects = component.handle_message(
            &mut app,
            &exec(ExecOutcome::ResolveFailed {
                requested_path: "/data".into(),
                error: "session expired".into(),
            }),
        );
        assert_eq!(effects, vec![Effect::GoBack]);
        assert!(app.logs.entries.iter().any(|e| e.contains("session expired")));
    }
}
