//! Control Panel Widget
//! Left side panel with file selection and chart options.

use crate::charts::{ChartKind, Selection, DEFAULT_TITLE};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::PathBuf;

/// Left side control panel. Assembles a [`Selection`] from its widgets.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub columns: Vec<String>,
    pub title: String,
    pub x_col: String,
    /// Parallel to `columns`.
    pub y_checked: Vec<bool>,
    pub dual_axis: bool,
    pub chart_kind: ChartKind,
    pub show_trend: bool,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            columns: Vec::new(),
            title: DEFAULT_TITLE.to_string(),
            x_col: String::new(),
            y_checked: Vec::new(),
            dual_axis: false,
            chart_kind: ChartKind::default(),
            show_trend: false,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update available columns after a file loads.
    pub fn update_columns(&mut self, columns: Vec<String>) {
        self.x_col = columns.first().cloned().unwrap_or_default();
        self.y_checked = vec![false; columns.len()];
        self.columns = columns;
    }

    /// Current choices as a [`Selection`]. Y columns keep table order.
    pub fn selection(&self) -> Selection {
        let y_columns = self
            .columns
            .iter()
            .zip(self.y_checked.iter())
            .filter(|(col, &checked)| checked && **col != self.x_col)
            .map(|(col, _)| col.clone())
            .collect();

        Selection {
            x_column: self.x_col.clone(),
            y_columns,
            dual_axis: self.dual_axis,
            chart_kind: self.chart_kind,
            title: self.title.clone(),
            show_trend: self.chart_kind.supports_trend() && self.show_trend,
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌈 Chart Maker")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.horizontal(|ui| {
            let path_text = self
                .csv_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(RichText::new(path_text).size(12.0));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("📂 Browse").clicked() {
                    action = ControlPanelAction::BrowseCsv;
                }
            });
        });

        ui.add_space(10.0);
        ui.separator();

        // ===== Title =====
        ui.label(RichText::new("1️⃣ Chart Title").size(14.0).strong());
        ui.text_edit_singleline(&mut self.title);

        ui.add_space(10.0);

        // ===== X axis =====
        ui.label(RichText::new("2️⃣ X Axis").size(14.0).strong());
        ComboBox::from_id_salt("x_col")
            .width(200.0)
            .selected_text(&self.x_col)
            .show_ui(ui, |ui| {
                for col in &self.columns {
                    ui.selectable_value(&mut self.x_col, col.clone(), col);
                }
            });

        ui.add_space(10.0);

        // ===== Y axis =====
        ui.label(RichText::new("3️⃣ Y Axis (up to 2)").size(14.0).strong());
        ScrollArea::vertical()
            .id_salt("y_cols")
            .max_height(160.0)
            .show(ui, |ui| {
                for (col, checked) in self.columns.iter().zip(self.y_checked.iter_mut()) {
                    if *col != self.x_col {
                        ui.checkbox(checked, col);
                    }
                }
            });

        ui.add_space(10.0);

        // ===== Options =====
        ui.label(RichText::new("⚙️ Options").size(14.0).strong());
        ui.checkbox(&mut self.dual_axis, "Split into left/right y axes");
        ui.horizontal(|ui| {
            for kind in ChartKind::ALL {
                ui.radio_value(&mut self.chart_kind, kind, kind.label());
            }
        });
        if self.chart_kind.supports_trend() {
            ui.checkbox(&mut self.show_trend, "📈 Show trend line and correlation");
        }

        ui.add_space(10.0);
        ui.separator();

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
}
