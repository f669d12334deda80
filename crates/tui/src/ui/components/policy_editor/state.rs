//! State of the embedded policy editor.
//!
//! The editor owns a flat list of free-text fields; the form never touches
//! them directly, it only asks for a validated [`Policy`] when an action
//! fires. Parsing failures never reach the network layer.

use snaptty_types::{FilesPolicy, Policy, RetentionPolicy};
use snaptty_util::{parse_ignore_rules, parse_keep_count, PolicyFieldError};

use crate::ui::components::common::TextInputState;

/// Index-stable field labels, retention counts first.
pub const FIELD_LABELS: [&str; 7] = [
    "keep latest",
    "keep hourly",
    "keep daily",
    "keep weekly",
    "keep monthly",
    "keep annual",
    "ignore rules",
];

const IGNORE_FIELD: usize = 6;

#[derive(Debug)]
pub struct PolicyEditorState {
    fields: Vec<TextInputState>,
    field_idx: usize,
}

impl Default for PolicyEditorState {
    fn default() -> Self {
        Self {
            fields: (0..FIELD_LABELS.len()).map(|_| TextInputState::new()).collect(),
            field_idx: 0,
        }
    }
}

impl PolicyEditorState {
    pub fn field_idx(&self) -> usize {
        self.field_idx
    }

    pub fn field(&self, idx: usize) -> &TextInputState {
        &self.fields[idx]
    }

    pub fn current_field(&self) -> &TextInputState {
        &self.fields[self.field_idx]
    }

    pub fn current_field_mut(&mut self) -> &mut TextInputState {
        &mut self.fields[self.field_idx]
    }

    pub fn select_next(&mut self) {
        self.field_idx = (self.field_idx + 1) % self.fields.len();
    }

    pub fn select_prev(&mut self) {
        self.field_idx = if self.field_idx == 0 {
            self.fields.len() - 1
        } else {
            self.field_idx - 1
        };
    }

    /// Parse every field into a policy, failing on the first invalid one
    /// with the field name preserved for the alert.
    pub fn get_and_validate_policy(&self) -> Result<Policy, PolicyFieldError> {
        let mut counts = [None; 6];
        for (idx, slot) in counts.iter_mut().enumerate() {
            *slot = parse_keep_count(FIELD_LABELS[idx], self.fields[idx].input())?;
        }
        let ignore = parse_ignore_rules(FIELD_LABELS[IGNORE_FIELD], self.fields[IGNORE_FIELD].input())?;
        Ok(Policy {
            retention: RetentionPolicy {
                keep_latest: counts[0],
                keep_hourly: counts[1],
                keep_daily: counts[2],
                keep_weekly: counts[3],
                keep_monthly: counts[4],
                keep_annual: counts[5],
            },
            files: FilesPolicy { ignore },
        })
    }

    pub fn reset(&mut self) {
        *self = PolicyEditorState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_validate_to_the_default_policy() {
        let editor = PolicyEditorState::default();
        let policy = editor.get_and_validate_policy().expect("blank policy is valid");
        assert_eq!(policy, Policy::default());
    }

    #[test]
    fn filled_fields_produce_the_matching_policy() {
        let mut editor = PolicyEditorState::default();
        editor.fields[0].set_input("3");
        editor.fields[2].set_input("7");
        editor.fields[IGNORE_FIELD].set_input("*.tmp, .cache");
        let policy = editor.get_and_validate_policy().expect("valid policy");
        assert_eq!(policy.retention.keep_latest, Some(3));
        assert_eq!(policy.retention.keep_daily, Some(7));
        assert_eq!(policy.retention.keep_hourly, None);
        assert_eq!(policy.files.ignore, vec!["*.tmp", ".cache"]);
    }

    #[test]
    fn invalid_count_fails_and_names_the_field() {
        let mut editor = PolicyEditorState::default();
        editor.fields[1].set_input("lots");
        let err = editor.get_and_validate_policy().unwrap_err();
        assert_eq!(err.field, "keep hourly");
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut editor = PolicyEditorState::default();
        editor.select_prev();
        assert_eq!(editor.field_idx(), FIELD_LABELS.len() - 1);
        editor.select_next();
        assert_eq!(editor.field_idx(), 0);
    }
}
