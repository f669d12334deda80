mod estimate_panel;
mod form_component;
mod state;

pub use form_component::SnapshotFormComponent;
pub use state::SnapshotFormState;
