mod component;
mod plot;

pub use component::PostingsChart;
