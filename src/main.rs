//! Chart Maker - pick columns from a CSV file and chart them
//!
//! Upload a table, choose x and y columns plus a chart style, and get a line,
//! scatter or bar chart with optional dual axis and trend line.

mod charts;
mod data;
mod gui;
mod stats;

use eframe::egui;
use gui::ChartMakerApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Chart Maker"),
        ..Default::default()
    };

    eframe::run_native(
        "Chart Maker",
        options,
        Box::new(|cc| Ok(Box::new(ChartMakerApp::new(cc)))),
    )
}
