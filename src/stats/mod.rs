//! Stats module - Trend line fitting

mod calculator;

pub use calculator::{LinearFit, StatsCalculator};
