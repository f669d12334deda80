//! # Snaptty TUI Library
//!
//! Terminal console for a snapshot/backup server. The interface is a small
//! component tree over ratatui: a sources screen listing configured backup
//! locations and a snapshot-creation form that resolves a user-entered path
//! against the server, previews an estimate, edits retention policy, and
//! triggers a snapshot.
//!
//! ## Architecture
//!
//! State transitions are message-driven: components translate input into
//! `Effect`s, the command layer executes them as background requests, and
//! completions come back as `Msg::ExecCompleted`. A single post-update
//! reconciliation step keeps the resolved source consistent with the latest
//! path text no matter how requests interleave.

mod app;
mod cmd;
mod runtime;
mod theme;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use snaptty_api::ServerClient;

/// Runs the main TUI application loop.
///
/// Sets up the terminal, builds the component tree, and drives the event
/// loop until the user quits. Returns any terminal setup or runtime error.
pub async fn run(client: Arc<ServerClient>) -> Result<()> {
    runtime::run_app(client).await
}
