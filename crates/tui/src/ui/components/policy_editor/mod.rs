mod editor_component;
mod state;

pub use editor_component::{handle_policy_key, render_policy_editor};
pub use state::PolicyEditorState;
