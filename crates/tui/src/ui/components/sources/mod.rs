mod sources_component;
mod state;

pub use sources_component::SourcesComponent;
pub use state::SourcesState;
