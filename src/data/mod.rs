//! Data module - CSV loading and the typed table model

mod loader;
mod table;

pub use loader::{DataLoader, LoaderError};
pub use table::{AxisLabels, AxisValues, Cell, Column, ColumnKind, Table, TableError};
