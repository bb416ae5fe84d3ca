mod component;
mod diagram;
mod render;
mod shapes;
mod state;
mod types;
mod viewport;

pub use component::CartographyView;
pub use render::navigate_to;
pub use types::{ActivitySummary, EntityId, ShapeMap};
