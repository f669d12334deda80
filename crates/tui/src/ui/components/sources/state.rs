//! State of the sources screen.

use snaptty_types::{SourceEntry, SourcesResponse};

#[derive(Debug, Default)]
pub struct SourcesState {
    entries: Vec<SourceEntry>,
    local_username: Option<String>,
    local_host: Option<String>,
    selected: usize,
    loading: bool,
}

impl SourcesState {
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&SourceEntry> {
        self.entries.get(self.selected)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn apply_response(&mut self, response: SourcesResponse) {
        self.loading = false;
        self.local_username = Some(response.local_username);
        self.local_host = Some(response.local_host);
        self.entries = response.sources;
        self.selected = self.selected.min(self.entries.len().saturating_sub(1));
    }

    pub fn load_failed(&mut self) {
        self.loading = false;
    }

    pub fn local_identity(&self) -> Option<(&str, &str)> {
        match (self.local_username.as_deref(), self.local_host.as_deref()) {
            (Some(user), Some(host)) => Some((user, host)),
            _ => None,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let selected = if delta > 0 {
            self.selected.saturating_add(delta as usize)
        } else {
            self.selected.saturating_sub(delta.unsigned_abs())
        };
        self.selected = selected.min(self.entries.len() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snaptty_types::SourceDescriptor;

    fn response(paths: &[&str]) -> SourcesResponse {
        SourcesResponse {
            local_username: "alice".into(),
            local_host: "workbench".into(),
            sources: paths
                .iter()
                .map(|p| SourceEntry {
                    source: SourceDescriptor {
                        host: "workbench".into(),
                        user_name: "alice".into(),
                        path: (*p).into(),
                    },
                    status: "IDLE".into(),
                    last_snapshot_time: None,
                })
                .collect(),
        }
    }

    #[test]
    fn selection_is_clamped_to_the_list() {
        let mut state = SourcesState::default();
        state.apply_response(response(&["/a", "/b", "/c"]));
        state.move_selection(10);
        assert_eq!(state.selected(), 2);
        state.move_selection(-10);
        assert_eq!(state.selected(), 0);

        // shrinking refresh keeps the selection valid
        state.move_selection(2);
        state.apply_response(response(&["/a"]));
        assert_eq!(state.selected(), 0);
    }

    #[test]
    fn identity_is_available_after_first_load() {
        let mut state = SourcesState::default();
        assert!(state.local_identity().is_none());
        state.apply_response(response(&[]));
        assert_eq!(state.local_identity(), Some(("alice", "workbench")));
    }
}
