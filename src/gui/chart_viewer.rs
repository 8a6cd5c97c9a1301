//! Chart Viewer Widget
//! Central panel that resolves the current selection and draws the chart.

use crate::charts::{ChartConfigResolver, ChartPlotter, ChartSpec, ConfigError, Selection};
use crate::data::Table;
use egui::{Color32, Grid, RichText, ScrollArea};

/// Rows shown in the data preview under the chart.
pub const PREVIEW_ROWS: usize = 10;

/// Holds the loaded table and the most recent resolution.
#[derive(Default)]
pub struct ChartViewer {
    table: Option<Table>,
    resolved: Option<(Selection, Result<ChartSpec, ConfigError>)>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table(&mut self, table: Table) {
        self.table = Some(table);
        self.resolved = None;
    }

    pub fn clear(&mut self) {
        self.table = None;
        self.resolved = None;
    }

    /// Resolve `selection` unless it matches the previous one.
    pub fn refresh(&mut self, selection: &Selection) -> Option<&Result<ChartSpec, ConfigError>> {
        let table = self.table.as_ref()?;

        let stale = self
            .resolved
            .as_ref()
            .map_or(true, |(previous, _)| previous != selection);
        if stale {
            let result = ChartConfigResolver::resolve(table, selection);
            match &result {
                Ok(spec) => log::debug!(
                    "Resolved '{}' with {} series",
                    spec.title,
                    spec.series.len()
                ),
                Err(e) => log::warn!("Chart not drawn: {}", e),
            }
            self.resolved = Some((selection.clone(), result));
        }

        self.resolved.as_ref().map(|(_, result)| result)
    }

    pub fn show(&mut self, ui: &mut egui::Ui, selection: &Selection) {
        if self.refresh(selection).is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Upload a CSV or Excel file to get started").size(20.0));
            });
            return;
        }

        let (Some(table), Some((_, result))) = (&self.table, &self.resolved) else {
            return;
        };

        ScrollArea::vertical().show(ui, |ui| {
            match result {
                Ok(spec) => {
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new(&spec.title).size(spec.layout.title_size).strong());
                    });
                    ui.add_space(8.0);

                    ui.allocate_ui(
                        egui::vec2(spec.layout.width, spec.layout.height),
                        |ui| ChartPlotter::draw_chart(ui, table, spec),
                    );

                    ui.add_space(8.0);
                    if ui.button("📋 Copy chart JSON").clicked() {
                        match spec.to_json() {
                            Ok(json) => ui.ctx().copy_text(json),
                            Err(e) => log::error!("Failed to serialize chart: {}", e),
                        }
                    }
                }
                Err(e) => {
                    ui.label(
                        RichText::new(format!("⚠ {}", e))
                            .size(14.0)
                            .color(Color32::from_rgb(220, 160, 0)),
                    );
                }
            }

            ui.add_space(12.0);
            ui.separator();
            Self::show_preview(ui, table);
        });
    }

    /// Striped grid of the first rows, headers included.
    fn show_preview(ui: &mut egui::Ui, table: &Table) {
        ui.label(
            RichText::new(format!(
                "🔎 Data preview (first {} of {} rows)",
                table.row_count().min(PREVIEW_ROWS),
                table.row_count()
            ))
            .size(14.0)
            .strong(),
        );

        ScrollArea::horizontal().id_salt("preview").show(ui, |ui| {
            Grid::new("data_preview").striped(true).show(ui, |ui| {
                for name in table.column_names() {
                    ui.label(RichText::new(name).strong());
                }
                ui.end_row();

                for row in table.preview_rows(PREVIEW_ROWS) {
                    for value in row {
                        ui.label(value);
                    }
                    ui.end_row();
                }
            });
        });
    }
}
