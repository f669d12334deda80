mod picker_component;
mod state;

pub use picker_component::DirPickerModal;
pub use state::DirPickerState;
