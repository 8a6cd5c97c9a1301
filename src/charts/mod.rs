//! Charts module - Chart resolution and rendering

pub mod palette;
mod plotter;
mod resolver;
mod spec;

pub use plotter::ChartPlotter;
pub use resolver::{ChartConfigResolver, ConfigError};
pub use spec::{ChartKind, ChartSpec, Selection, DEFAULT_TITLE};
