//! CLI-equivalent preview of the pending console action.

use snaptty_types::Policy;

/// Build the `snaptty snapshot create ...` command line matching what the
/// form would submit. Paths with whitespace are quoted; explicit retention
/// counts and ignore rules become the flags the real subcommand accepts.
pub fn snapshot_create_command(path: &str, policy: &Policy) -> String {
    let mut command = String::from("snaptty snapshot create ");
    command.push_str(&quote_if_needed(path));

    let retention = &policy.retention;
    for (flag, value) in [
        ("--keep-latest", retention.keep_latest),
        ("--keep-hourly", retention.keep_hourly),
        ("--keep-daily", retention.keep_daily),
        ("--keep-weekly", retention.keep_weekly),
        ("--keep-monthly", retention.keep_monthly),
        ("--keep-annual", retention.keep_annual),
    ] {
        if let Some(count) = value {
            command.push_str(&format!(" {flag} {count}"));
        }
    }
    for rule in &policy.files.ignore {
        command.push_str(&format!(" --ignore {}", quote_if_needed(rule)));
    }
    command
}

fn quote_if_needed(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) {
        format!("{value:?}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaptty_types::{FilesPolicy, RetentionPolicy};

    #[test]
    fn bare_path_preview() {
        let cmd = snapshot_create_command("/data", &Policy::default());
        assert_eq!(cmd, "snaptty snapshot create /data");
    }

    #[test]
    fn preview_carries_policy_flags() {
        let policy = Policy {
            retention: RetentionPolicy {
                keep_latest: Some(3),
                keep_daily: Some(7),
                ..RetentionPolicy::default()
            },
            files: FilesPolicy {
                ignore: vec!["*.tmp".into()],
            },
        };
        let cmd = snapshot_create_command("/data", &policy);
        assert_eq!(
            cmd,
            "snaptty snapshot create /data --keep-latest 3 --keep-daily 7 --ignore *.tmp"
        );
    }

    #[test]
    fn whitespace_paths_are_quoted() {
        let cmd = snapshot_create_command("/home/alice/My Documents", &Policy::default());
        assert_eq!(cmd, "snaptty snapshot create \"/home/alice/My Documents\"");
    }
}
