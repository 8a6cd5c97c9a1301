//! Chart Maker Main Application
//! Main window with control panel and chart viewer.

use crate::data::{DataLoader, Table};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use anyhow::Context;
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

/// File loading result from background thread
enum LoadResult {
    Complete(Table),
    Error(String),
}

/// Main application window.
pub struct ChartMakerApp {
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async file loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl ChartMakerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    fn load_table(path: &Path) -> anyhow::Result<Table> {
        DataLoader::load(path).with_context(|| format!("Could not read {}", path.display()))
    }

    /// Handle data file selection; the file is parsed on a worker thread.
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Data Files", &["csv", "txt", "xlsx", "xls"])
            .pick_file()
        else {
            return;
        };

        self.start_loading(path);
    }

    fn start_loading(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.control_panel.csv_path = Some(path.clone());
        self.control_panel.set_status("Loading file...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match Self::load_table(&path) {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => LoadResult::Error(format!("{:#}", e)),
            };
            // The receiver is gone only if the window closed mid-load.
            let _ = tx.send(result);
        });
    }

    /// Check for file loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(table)) => {
                log::info!(
                    "Loaded {} rows, {} columns",
                    table.row_count(),
                    table.column_count()
                );
                self.control_panel.set_status(&format!(
                    "Loaded {} rows, {} columns",
                    table.row_count(),
                    table.column_count()
                ));
                self.control_panel.update_columns(table.column_names());
                self.chart_viewer.set_table(table);
                self.is_loading = false;
            }
            Ok(LoadResult::Error(error)) => {
                log::error!("Failed to load file: {}", error);
                self.control_panel.set_status(&format!("Error: {}", error));
                self.is_loading = false;
            }
            Err(TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(TryRecvError::Disconnected) => {
                log::error!("Loader thread exited without a result");
                self.control_panel.set_status("Error: loading was interrupted");
                self.is_loading = false;
            }
        }
    }
}

impl eframe::App for ChartMakerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if self.control_panel.show(ui) == ControlPanelAction::BrowseCsv {
                        self.handle_browse_csv();
                    }
                });
            });

        let selection = self.control_panel.selection();
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &selection);
        });
    }
}
