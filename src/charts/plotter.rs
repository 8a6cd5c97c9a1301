//! Chart Plotter Module
//! Draws a resolved [`ChartSpec`] with egui_plot.

use crate::charts::palette::{self, TREND_COLOR};
use crate::charts::spec::{Axis, ChartSpec, SeriesSpec, SeriesStyle};
use crate::data::{AxisLabels, Cell, Table};
use egui::{Align2, Color32, RichText};
use egui_plot::{
    AxisHints, Bar, BarChart, HPlacement, Line, LineStyle, Plot, PlotPoint, PlotPoints, Points,
    Text,
};
use std::collections::HashMap;

/// Share of the gap between neighbouring x values filled by a bar group.
const BAR_GROUP_FILL: f64 = 0.8;

/// Affine map from one value range onto another.
///
/// Used to overlay the secondary series on the primary scale; the right-hand
/// axis labels apply [`AxisMap::inverse`] to show the original values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    scale: f64,
    offset: f64,
}

impl AxisMap {
    pub const IDENTITY: AxisMap = AxisMap {
        scale: 1.0,
        offset: 0.0,
    };

    /// Map `from` onto `to`. A degenerate range keeps unit scale and
    /// aligns the centres instead.
    pub fn between(from: (f64, f64), to: (f64, f64)) -> Self {
        let from_span = from.1 - from.0;
        let to_span = to.1 - to.0;

        if from_span.abs() < f64::EPSILON || to_span.abs() < f64::EPSILON {
            let from_mid = (from.0 + from.1) / 2.0;
            let to_mid = (to.0 + to.1) / 2.0;
            return AxisMap {
                scale: 1.0,
                offset: to_mid - from_mid,
            };
        }

        let scale = to_span / from_span;
        AxisMap {
            scale,
            offset: to.0 - from.0 * scale,
        }
    }

    pub fn forward(&self, v: f64) -> f64 {
        v * self.scale + self.offset
    }

    pub fn inverse(&self, v: f64) -> f64 {
        (v - self.offset) / self.scale
    }
}

/// Minimum and maximum of the present values, if any.
fn value_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Smallest positive gap between distinct x positions, or 1 if there is none.
pub fn min_spacing(positions: &[Option<f64>]) -> f64 {
    let mut sorted: Vec<f64> = positions.iter().flatten().copied().collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |m| m.min(gap))))
        .unwrap_or(1.0)
}

/// Bar width and centre offset for one offset group.
pub fn bar_geometry(spacing: f64, offset_group: usize, group_count: usize) -> (f64, f64) {
    let count = group_count.max(1) as f64;
    let width = spacing * BAR_GROUP_FILL / count;
    let offset = (offset_group as f64 - (count - 1.0) / 2.0) * width;
    (width, offset)
}

/// Plot-space base and height of a bar for `value` on the axis behind `map`.
///
/// Bars grow from zero on their own axis, so a secondary bar starts at the
/// mapped zero rather than at the primary origin.
pub fn bar_span(map: AxisMap, value: f64) -> (f64, f64) {
    let base = map.forward(0.0);
    (base, map.forward(value) - base)
}

/// Creates interactive charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Secondary-axis map for a spec, identity when there is no secondary axis.
    pub fn secondary_map(table: &Table, spec: &ChartSpec) -> AxisMap {
        if !spec.has_secondary_axis() {
            return AxisMap::IDENTITY;
        }

        let range_of = |axis: Axis| {
            spec.series
                .iter()
                .filter(|s| s.axis == axis)
                .filter_map(|s| table.column(&s.column))
                .map(|c| c.cells.iter().map(Cell::as_f64).collect::<Vec<_>>())
                .filter_map(|values| value_range(&values))
                .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
        };

        match (range_of(Axis::Secondary), range_of(Axis::Primary)) {
            (Some(secondary), Some(primary)) => AxisMap::between(secondary, primary),
            _ => AxisMap::IDENTITY,
        }
    }

    /// Draw the full chart: plot area then a horizontal legend beneath it.
    pub fn draw_chart(ui: &mut egui::Ui, table: &Table, spec: &ChartSpec) {
        let Some(x_column) = table.column(&spec.x_label) else {
            return;
        };
        let x_axis = x_column.axis_values();
        let spacing = min_spacing(&x_axis.positions);
        let secondary = Self::secondary_map(table, spec);

        let x_labels = x_axis.labels.clone();
        let hover: HashMap<String, (SeriesSpec, AxisMap)> = spec
            .series
            .iter()
            .map(|s| {
                let map = if s.axis == Axis::Secondary {
                    secondary
                } else {
                    AxisMap::IDENTITY
                };
                (s.column.clone(), (s.clone(), map))
            })
            .collect();

        let mut y_axes = vec![AxisHints::new_y().label(spec.primary_axis_label.clone())];
        if let Some(label) = &spec.secondary_axis_label {
            y_axes.push(
                AxisHints::new_y()
                    .label(label.clone())
                    .placement(HPlacement::Right)
                    .formatter(move |mark, _range| {
                        format!("{:.2}", secondary.inverse(mark.value))
                    }),
            );
        }

        let mut plot = Plot::new(format!("chart_{}", spec.title))
            .height(spec.layout.height)
            .x_axis_label(spec.x_label.clone())
            .custom_y_axes(y_axes)
            .label_formatter(move |name, value| match hover.get(name) {
                Some((series, map)) => series.hover_text(map.inverse(value.y)),
                None => String::new(),
            });

        if !matches!(x_labels, AxisLabels::Numeric) {
            plot = plot.x_axis_formatter(move |mark, _range| x_labels.format(mark.value));
        }

        plot.show(ui, |plot_ui| {
            for series in &spec.series {
                let map = if series.axis == Axis::Secondary {
                    secondary
                } else {
                    AxisMap::IDENTITY
                };
                let Some(column) = table.column(&series.column) else {
                    continue;
                };
                let points: Vec<[f64; 2]> = x_axis
                    .positions
                    .iter()
                    .zip(column.cells.iter())
                    .filter_map(|(x, cell)| Some([(*x)?, cell.as_f64()?]))
                    .collect();
                let color = palette::color(series.color_index);

                Self::draw_series(plot_ui, series, &points, map, color, spacing);

                if let Some(trend) = &series.trend {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(trend.segment()))
                            .color(TREND_COLOR)
                            .style(LineStyle::dotted_dense())
                            .width(1.5)
                            .name(&trend.label),
                    );
                }
            }

            if !spec.annotations.is_empty() {
                let bounds = plot_ui.plot_bounds();
                let (min, max) = (bounds.min(), bounds.max());
                for note in &spec.annotations {
                    let x = min[0] + (max[0] - min[0]) * note.anchor.0 as f64;
                    let y = min[1] + (max[1] - min[1]) * note.anchor.1 as f64;
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(x, y),
                            RichText::new(&note.text).size(14.0).strong(),
                        )
                        .anchor(Align2::RIGHT_TOP)
                        .color(Color32::BLACK),
                    );
                }
            }
        });

        Self::draw_legend(ui, spec);
    }

    fn draw_series(
        plot_ui: &mut egui_plot::PlotUi,
        series: &SeriesSpec,
        values: &[[f64; 2]],
        map: AxisMap,
        color: Color32,
        spacing: f64,
    ) {
        let points: Vec<[f64; 2]> = values.iter().map(|&[x, y]| [x, map.forward(y)]).collect();

        match series.style {
            SeriesStyle::LinesMarkers {
                marker_size,
                line_width,
            } => {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(color)
                        .width(line_width)
                        .name(&series.column),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(marker_size / 2.0)
                        .color(color)
                        .name(&series.column),
                );
            }
            SeriesStyle::Markers {
                marker_size,
                opacity,
            } => {
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(marker_size / 2.0)
                        .color(color.gamma_multiply(opacity))
                        .name(&series.column),
                );
            }
            SeriesStyle::Bars {
                offset_group,
                group_count,
            } => {
                let (width, offset) = bar_geometry(spacing, offset_group, group_count);
                let bars = values
                    .iter()
                    .map(|&[x, y]| {
                        let (base, height) = bar_span(map, y);
                        Bar::new(x + offset, height).base_offset(base).width(width)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(color).name(&series.column));
            }
        }
    }

    /// Horizontal row of colour swatches below the plot.
    pub fn draw_legend(ui: &mut egui::Ui, spec: &ChartSpec) {
        ui.horizontal_wrapped(|ui| {
            for series in &spec.series {
                Self::legend_entry(ui, palette::color(series.color_index), &series.column);
                if let Some(trend) = &series.trend {
                    Self::legend_entry(ui, TREND_COLOR, &trend.label);
                }
            }
        });
    }

    fn legend_entry(ui: &mut egui::Ui, color: Color32, label: &str) {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 3.0, color);
        ui.label(RichText::new(label).size(13.0));
        ui.add_space(12.0);
    }
}
