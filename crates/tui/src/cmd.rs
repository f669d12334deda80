//! # Command Execution Layer
//!
//! Translates application `Effect`s into imperative commands and executes
//! them. This is the boundary where pure state management meets side
//! effects: clipboard writes, local directory listings, and HTTP calls to
//! the snapshot server.
//!
//! State updates stay pure; every backend call runs as a spawned task whose
//! [`ExecOutcome`] is joined back into the event loop and delivered as
//! `Msg::ExecCompleted`. Requests are never cancelled once spawned — a
//! completion that turns out to be stale is corrected by the post-update
//! reconciliation pass instead.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::stream::FuturesUnordered;
use snaptty_api::ServerClient;
use snaptty_types::{CreateSourceRequest, DirEntryInfo, Effect, EstimateRequest, ExecOutcome};
use tokio::task::{spawn, JoinHandle};
use tracing::debug;

use crate::app::App;

/// Side-effectful commands executed outside of pure state updates.
#[derive(Debug)]
pub enum Cmd {
    /// Write text into the system clipboard.
    ClipboardSet(String),
    /// Fetch the configured sources and local identity.
    FetchSources,
    /// Resolve a user-entered path against the server inventory.
    ResolvePath(String),
    /// Start an estimation task.
    StartEstimate(EstimateRequest),
    /// Register a source, optionally snapshotting immediately.
    CreateSource(CreateSourceRequest),
    /// Poll a running estimate task.
    RefreshEstimateTask(String),
    /// List subdirectories of a local directory.
    ListDirectory(PathBuf),
}

/// Convert the non-navigation `Effect`s of a batch into commands.
/// Navigation effects are consumed by the runtime before this runs.
pub fn from_effects(effects: Vec<Effect>) -> Vec<Cmd> {
    let mut commands = Vec::new();
    for effect in effects {
        match effect {
            Effect::CopyToClipboard(text) => commands.push(Cmd::ClipboardSet(text)),
            Effect::FetchSources => commands.push(Cmd::FetchSources),
            Effect::ResolvePath(path) => commands.push(Cmd::ResolvePath(path)),
            Effect::StartEstimate(request) => commands.push(Cmd::StartEstimate(request)),
            Effect::CreateSource(request) => commands.push(Cmd::CreateSource(request)),
            Effect::RefreshEstimateTask(task_id) => commands.push(Cmd::RefreshEstimateTask(task_id)),
            Effect::ListDirectory(root) => commands.push(Cmd::ListDirectory(root)),
            // navigation is handled before the command layer
            Effect::SwitchTo(_) | Effect::GoBack | Effect::ShowModal(_) | Effect::CloseModal => {}
        }
    }
    commands
}

/// Execute commands: clipboard writes happen inline, everything else is
/// spawned and joined back through `pending`.
pub fn run_cmds(app: &mut App, commands: Vec<Cmd>, pending: &mut FuturesUnordered<JoinHandle<ExecOutcome>>) {
    for command in commands {
        match command {
            Cmd::ClipboardSet(text) => execute_clipboard_set(app, text),
            other => {
                let client = Arc::clone(&app.ctx.client);
                if !app.executing {
                    app.throbber_idx = 0;
                }
                app.executing = true;
                pending.push(spawn(execute_remote(client, other)));
            }
        }
    }
}

fn execute_clipboard_set(app: &mut App, text: String) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => app.logs.push("Copied to clipboard."),
        Err(error) => app.logs.push(format!("Clipboard error: {error}")),
    }
}

async fn execute_remote(client: Arc<ServerClient>, command: Cmd) -> ExecOutcome {
    debug!(?command, "executing");
    match command {
        Cmd::FetchSources => match client.list_sources().await {
            Ok(response) => ExecOutcome::SourcesLoaded(response),
            Err(error) => ExecOutcome::SourcesFailed(format!("{error:#}")),
        },
        Cmd::ResolvePath(path) => match client.resolve_path(&path).await {
            Ok(source) => ExecOutcome::PathResolved {
                requested_path: path,
                source,
            },
            Err(error) => ExecOutcome::ResolveFailed {
                requested_path: path,
                error: format!("{error:#}"),
            },
        },
        Cmd::StartEstimate(request) => {
            let root = request.root.clone();
            match client.start_estimate(&request).await {
                Ok(task) => ExecOutcome::EstimateStarted { root, task },
                Err(error) => ExecOutcome::EstimateFailed(format!("{error:#}")),
            }
        }
        Cmd::CreateSource(request) => match client.create_source(&request).await {
            Ok(()) => ExecOutcome::SourceCreated,
            Err(error) => ExecOutcome::CreateSourceFailed(format!("{error:#}")),
        },
        Cmd::RefreshEstimateTask(task_id) => match client.task_summary(&task_id).await {
            Ok(summary) => ExecOutcome::EstimateTaskUpdated(summary),
            Err(error) => ExecOutcome::EstimateTaskPollFailed(format!("{error:#}")),
        },
        Cmd::ListDirectory(root) => list_directory(root).await,
        Cmd::ClipboardSet(_) => unreachable!("clipboard commands run inline"),
    }
}

/// List the subdirectories of `root`, sorted by name. Entries that cannot
/// be inspected are skipped rather than failing the whole listing.
async fn list_directory(root: PathBuf) -> ExecOutcome {
    let result = async {
        let mut read_dir = tokio::fs::read_dir(&root).await?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().to_string(),
                path: entry.path(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok::<_, std::io::Error>(entries)
    }
    .await;

    match result {
        Ok(entries) => ExecOutcome::DirectoryListed { root, entries },
        Err(error) => ExecOutcome::DirectoryListFailed {
            root,
            error: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaptty_types::{Modal, Policy, Route};

    #[test]
    fn navigation_effects_produce_no_commands() {
        let commands = from_effects(vec![
            Effect::SwitchTo(Route::SnapshotForm),
            Effect::GoBack,
            Effect::CloseModal,
            Effect::ShowModal(Modal::DirPicker),
        ]);
        assert!(commands.is_empty());
    }

    #[test]
    fn request_effects_map_one_to_one() {
        let commands = from_effects(vec![
            Effect::FetchSources,
            Effect::ResolvePath("/data".into()),
            Effect::CreateSource(CreateSourceRequest {
                path: "/data".into(),
                create_snapshot: true,
                policy: Policy::default(),
            }),
        ]);
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], Cmd::FetchSources));
        assert!(matches!(&commands[1], Cmd::ResolvePath(path) if path == "/data"));
        assert!(matches!(&commands[2], Cmd::CreateSource(request) if request.create_snapshot));
    }
}
