mod component;
mod render;
mod state;

pub use component::BubbleChart;
pub use state::{ChartInstance, HoverDetails, Label, Viewport};
