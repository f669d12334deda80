use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Fixed cap on example items the server returns per classification bucket
/// when starting an estimate.
pub const MAX_EXAMPLES_PER_BUCKET: u32 = 10;

/// A backend-registered snapshot location: the (host, user, path) triple the
/// server hands back once a free-text path has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    pub host: String,
    pub user_name: String,
    pub path: String,
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user_name, self.host, self.path)
    }
}

/// One configured source as reported by `GET /api/v1/sources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    pub source: SourceDescriptor,
    /// Server-side scheduling state (e.g. "IDLE", "PENDING", "UPLOADING").
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_snapshot_time: Option<DateTime<Utc>>,
}

/// Response of `GET /api/v1/sources`. The snapshot form consumes only the
/// local identity fields; the sources screen consumes the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesResponse {
    pub local_username: String,
    pub local_host: String,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// Request body of `POST /api/v1/paths/resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvePathRequest {
    pub path: String,
}

/// Response of `POST /api/v1/paths/resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvePathResponse {
    pub source: SourceDescriptor,
}

/// Retention counts of a policy. Unset counts are omitted on the wire so the
/// server falls back to its inherited defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_latest: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_hourly: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_daily: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_weekly: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_monthly: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_annual: Option<u32>,
}

impl RetentionPolicy {
    pub fn is_empty(&self) -> bool {
        *self == RetentionPolicy::default()
    }
}

/// File selection rules of a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesPolicy {
    /// Glob patterns excluded from the snapshot.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

impl FilesPolicy {
    pub fn is_empty(&self) -> bool {
        self.ignore.is_empty()
    }
}

/// Retention/exclusion policy attached to a source. The console edits it;
/// storage and inheritance are the server's business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default, skip_serializing_if = "RetentionPolicy::is_empty")]
    pub retention: RetentionPolicy,
    #[serde(default, skip_serializing_if = "FilesPolicy::is_empty")]
    pub files: FilesPolicy,
}

/// Request body of `POST /api/v1/estimate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub root: String,
    pub max_examples_per_bucket: u32,
    pub policy_override: Policy,
}

/// Handle to a server-tracked estimation job. The console displays its
/// progress by id; it does not own the job's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateTaskRef {
    pub id: String,
    pub description: String,
}

/// Request body of `POST /api/v1/sources`: registers a source and optionally
/// triggers an immediate snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourceRequest {
    pub path: String,
    pub create_snapshot: bool,
    pub policy: Policy,
}

/// Lifecycle state of a server task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Running,
    Success,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Running)
    }
}

/// One progress counter of a task (e.g. bucket sizes of an estimate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounter {
    pub value: i64,
    #[serde(default)]
    pub units: Option<String>,
}

/// Response of `GET /api/v1/tasks/{id}`. Counter order is
/// server-defined and preserved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub counters: IndexMap<String, TaskCounter>,
}

/// A directory offered by the local directory picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
}

/// Top-level screens of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Sources,
    SnapshotForm,
}

/// A dismissible in-place alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Modal overlays that can appear atop any route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    DirPicker,
    Alert(Alert),
}

/// Messages that update application state. Key events are routed to
/// components directly; everything else arrives here.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (throbbers, estimate polling)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Background request completed with outcome
    ExecCompleted(Box<ExecOutcome>),
}

/// Result of an asynchronous backend call, delivered back onto the UI
/// thread as `Msg::ExecCompleted`. Completions carry the input they were
/// issued for so stale responses can be recognized and corrected.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    SourcesLoaded(SourcesResponse),
    SourcesFailed(String),
    PathResolved {
        requested_path: String,
        source: SourceDescriptor,
    },
    ResolveFailed {
        requested_path: String,
        error: String,
    },
    EstimateStarted {
        root: String,
        task: EstimateTaskRef,
    },
    EstimateFailed(String),
    EstimateTaskUpdated(TaskSummary),
    EstimateTaskPollFailed(String),
    SourceCreated,
    CreateSourceFailed(String),
    DirectoryListed {
        root: PathBuf,
        entries: Vec<DirEntryInfo>,
    },
    DirectoryListFailed {
        root: PathBuf,
        error: String,
    },
    /// A background task died before producing an outcome.
    TaskAborted(String),
}

/// Side effects requested by state transitions. The command layer turns
/// these into clipboard writes, filesystem reads, or HTTP requests; the
/// navigation variants are consumed by the main view.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch the configured sources (also supplies local identity)
    FetchSources,
    /// Resolve a user-entered path against the server inventory
    ResolvePath(String),
    /// Start an estimation task for a resolved root
    StartEstimate(EstimateRequest),
    /// Register a source, optionally snapshotting immediately
    CreateSource(CreateSourceRequest),
    /// Re-read the status of a running estimate task
    RefreshEstimateTask(String),
    /// List subdirectories of a local directory (picker)
    ListDirectory(PathBuf),
    /// Write text into the system clipboard
    CopyToClipboard(String),
    /// Change the main view
    SwitchTo(Route),
    /// Return to the previous view
    GoBack,
    /// Display a modal atop the current view
    ShowModal(Modal),
    /// Hide any open modal
    CloseModal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_response_wire_shape() {
        let json = r#"{
            "localUsername": "alice",
            "localHost": "workbench",
            "sources": [{
                "source": {"host": "workbench", "userName": "alice", "path": "/data"},
                "status": "IDLE",
                "lastSnapshotTime": "2026-03-01T10:15:00Z"
            }]
        }"#;
        let resp: SourcesResponse = serde_json::from_str(json).expect("deserialize SourcesResponse");
        assert_eq!(resp.local_username, "alice");
        assert_eq!(resp.local_host, "workbench");
        assert_eq!(resp.sources.len(), 1);
        assert_eq!(resp.sources[0].source.user_name, "alice");
        assert_eq!(resp.sources[0].status, "IDLE");
        assert!(resp.sources[0].last_snapshot_time.is_some());
    }

    #[test]
    fn sources_response_tolerates_missing_list() {
        let json = r#"{"localUsername": "alice", "localHost": "workbench"}"#;
        let resp: SourcesResponse = serde_json::from_str(json).expect("deserialize");
        assert!(resp.sources.is_empty());
    }

    #[test]
    fn resolve_response_wire_shape() {
        let json = r#"{"source": {"host": "h1", "userName": "u1", "path": "/data"}}"#;
        let resp: ResolvePathResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(resp.source.host, "h1");
        assert_eq!(resp.source.to_string(), "u1@h1:/data");
    }

    #[test]
    fn estimate_request_uses_camel_case_keys() {
        let req = EstimateRequest {
            root: "/data".into(),
            max_examples_per_bucket: MAX_EXAMPLES_PER_BUCKET,
            policy_override: Policy::default(),
        };
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value["root"], "/data");
        assert_eq!(value["maxExamplesPerBucket"], 10);
        // An empty override serializes as an empty object, not null.
        assert_eq!(value["policyOverride"], serde_json::json!({}));
    }

    #[test]
    fn unset_retention_counts_are_omitted() {
        let policy = Policy {
            retention: RetentionPolicy {
                keep_latest: Some(5),
                ..RetentionPolicy::default()
            },
            files: FilesPolicy::default(),
        };
        let value = serde_json::to_value(&policy).expect("serialize");
        assert_eq!(value["retention"]["keepLatest"], 5);
        assert!(value["retention"].get("keepDaily").is_none());
        assert!(value.get("files").is_none());
    }

    #[test]
    fn create_source_request_wire_shape() {
        let req = CreateSourceRequest {
            path: "/data".into(),
            create_snapshot: true,
            policy: Policy::default(),
        };
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value["createSnapshot"], true);
        assert_eq!(value["path"], "/data");
    }

    #[test]
    fn task_summary_preserves_counter_order() {
        let json = r#"{
            "id": "t1",
            "status": "RUNNING",
            "counters": {
                "Bytes": {"value": 4096, "units": "bytes"},
                "Files": {"value": 12},
                "Directories": {"value": 3}
            }
        }"#;
        let summary: TaskSummary = serde_json::from_str(json).expect("deserialize");
        assert_eq!(summary.status, TaskStatus::Running);
        assert!(!summary.status.is_terminal());
        let keys: Vec<&str> = summary.counters.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Bytes", "Files", "Directories"]);
        assert_eq!(summary.counters["Bytes"].units.as_deref(), Some("bytes"));
    }

    #[test]
    fn terminal_task_statuses() {
        for (raw, terminal) in [
            ("\"RUNNING\"", false),
            ("\"SUCCESS\"", true),
            ("\"FAILED\"", true),
            ("\"CANCELED\"", true),
        ] {
            let status: TaskStatus = serde_json::from_str(raw).expect("deserialize");
            assert_eq!(status.is_terminal(), terminal, "{raw}");
        }
    }
}
