pub mod selection;
pub mod settings;

pub use selection::{HoverState, SelectionSet, Toggle, VERTEX_CAPACITY};
pub use settings::{AppearanceSettings, CarveSettings, EditorSettings, PickingSettings};
