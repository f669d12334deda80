//! Parsing for the policy editor's free-text fields.
//!
//! Validation happens entirely on the client: a field that fails to parse
//! aborts the pending action before any request is built.

use thiserror::Error;

/// A policy field that failed validation, with the field name preserved so
/// the alert can point at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for {field}: {reason}")]
pub struct PolicyFieldError {
    pub field: String,
    pub reason: String,
}

impl PolicyFieldError {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse a retention keep-count. Blank means "inherit" and maps to `None`.
pub fn parse_keep_count(field: &str, raw: &str) -> Result<Option<u32>, PolicyFieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| PolicyFieldError::new(field, format!("expected a non-negative count, got {trimmed:?}")))
}

/// Parse the comma-separated ignore-rule line into individual patterns.
/// Blank input means no rules; blank segments between commas are rejected
/// rather than silently dropped.
pub fn parse_ignore_rules(field: &str, raw: &str) -> Result<Vec<String>, PolicyFieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let mut rules = Vec::new();
    for segment in trimmed.split(',') {
        let rule = segment.trim();
        if rule.is_empty() {
            return Err(PolicyFieldError::new(field, "empty pattern between commas"));
        }
        rules.push(rule.to_string());
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_count_means_inherit() {
        assert_eq!(parse_keep_count("keep latest", ""), Ok(None));
        assert_eq!(parse_keep_count("keep latest", "   "), Ok(None));
    }

    #[test]
    fn valid_counts_parse() {
        assert_eq!(parse_keep_count("keep daily", "7"), Ok(Some(7)));
        assert_eq!(parse_keep_count("keep daily", " 30 "), Ok(Some(30)));
    }

    #[test]
    fn bad_counts_name_the_field() {
        let err = parse_keep_count("keep hourly", "many").unwrap_err();
        assert_eq!(err.field, "keep hourly");
        assert!(err.reason.contains("many"));

        let err = parse_keep_count("keep hourly", "-3").unwrap_err();
        assert_eq!(err.field, "keep hourly");
    }

    #[test]
    fn ignore_rules_split_and_trim() {
        let rules = parse_ignore_rules("ignore rules", "*.tmp, node_modules , .cache").unwrap();
        assert_eq!(rules, vec!["*.tmp", "node_modules", ".cache"]);
        assert!(parse_ignore_rules("ignore rules", "").unwrap().is_empty());
    }

    #[test]
    fn empty_segment_is_rejected() {
        let err = parse_ignore_rules("ignore rules", "*.tmp,,*.log").unwrap_err();
        assert_eq!(err.field, "ignore rules");
    }
}
