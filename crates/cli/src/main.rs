use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snaptty_api::ServerClient;
use snaptty_types::{
    CreateSourceRequest, EstimateRequest, FilesPolicy, Policy, RetentionPolicy, MAX_EXAMPLES_PER_BUCKET,
};

#[derive(Parser)]
#[command(name = "snaptty", version, about = "Terminal console for a snapshot/backup server")]
struct Cli {
    /// Server base URL
    #[arg(long, env = "SNAPTTY_SERVER", default_value = snaptty_api::DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List configured sources
    Sources,
    /// Resolve a path against the server inventory
    Resolve { path: String },
    /// Start an estimate for a path and wait for the result
    Estimate {
        path: String,
        /// Give up after this many seconds
        #[arg(long, default_value_t = 120)]
        timeout: u64,
    },
    /// Snapshot operations
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

#[derive(Subcommand)]
enum SnapshotCommand {
    /// Register a source and snapshot it immediately
    Create {
        path: String,
        #[arg(long)]
        keep_latest: Option<u32>,
        #[arg(long)]
        keep_hourly: Option<u32>,
        #[arg(long)]
        keep_daily: Option<u32>,
        #[arg(long)]
        keep_weekly: Option<u32>,
        #[arg(long)]
        keep_monthly: Option<u32>,
        #[arg(long)]
        keep_annual: Option<u32>,
        /// Glob pattern to exclude (repeatable)
        #[arg(long = "ignore")]
        ignore: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let client = Arc::new(ServerClient::new(&cli.server)?);

    // No subcommand => TUI
    let Some(command) = cli.command else {
        return snaptty_tui::run(client).await;
    };

    match command {
        Command::Sources => run_sources(&client).await,
        Command::Resolve { path } => run_resolve(&client, &path).await,
        Command::Estimate { path, timeout } => run_estimate(&client, &path, timeout).await,
        Command::Snapshot(SnapshotCommand::Create {
            path,
            keep_latest,
            keep_hourly,
            keep_daily,
            keep_weekly,
            keep_monthly,
            keep_annual,
            ignore,
        }) => {
            let policy = Policy {
                retention: RetentionPolicy {
                    keep_latest,
                    keep_hourly,
                    keep_daily,
                    keep_weekly,
                    keep_monthly,
                    keep_annual,
                },
                files: FilesPolicy { ignore },
            };
            run_snapshot_create(&client, &path, policy).await
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_sources(client: &ServerClient) -> Result<()> {
    let response = client.list_sources().await?;
    println!("local identity: {}@{}", response.local_username, response.local_host);
    for entry in &response.sources {
        let last = entry
            .last_snapshot_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!("{}\t{}\t{}", entry.source, entry.status, last);
    }
    Ok(())
}

async fn run_resolve(client: &ServerClient, path: &str) -> Result<()> {
    let source = client.resolve_path(path).await?;
    println!("{}", serde_json::to_string_pretty(&source)?);
    Ok(())
}

/// One-shot rendition of the form's estimate action: resolve, start the
/// task, poll until it finishes, print the counters.
async fn run_estimate(client: &ServerClient, path: &str, timeout: u64) -> Result<()> {
    let source = client.resolve_path(path).await?;
    let task = client
        .start_estimate(&EstimateRequest {
            root: source.path.clone(),
            max_examples_per_bucket: MAX_EXAMPLES_PER_BUCKET,
            policy_override: Policy::default(),
        })
        .await?;
    eprintln!("{} (task {})", task.description, task.id);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout);
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let summary = client.task_summary(&task.id).await?;
        if summary.status.is_terminal() {
            if let Some(error) = summary.error_message {
                anyhow::bail!("estimate failed: {error}");
            }
            for (name, counter) in &summary.counters {
                let rendered = match counter.units.as_deref() {
                    Some("bytes") => snaptty_util::format_bytes(counter.value),
                    Some(units) => format!("{} {units}", counter.value),
                    None => counter.value.to_string(),
                };
                println!("{name}\t{rendered}");
            }
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("estimate task {} still running after {timeout}s", task.id);
        }
    }
}

async fn run_snapshot_create(client: &ServerClient, path: &str, policy: Policy) -> Result<()> {
    let source = client.resolve_path(path).await.context("resolve path")?;
    client
        .create_source(&CreateSourceRequest {
            path: source.path.clone(),
            create_snapshot: true,
            policy,
        })
        .await
        .context("create source")?;
    println!("snapshot requested for {source}");
    Ok(())
}
