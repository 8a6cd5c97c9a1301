//! Chart description types.
//!
//! A [`Selection`] captures what the user picked; a [`ChartSpec`] is the
//! fully resolved, renderer-agnostic description produced from it.

use serde::{Deserialize, Serialize};

/// Title used until the user types one.
pub const DEFAULT_TITLE: &str = "My Chart";

pub const MARKER_SIZE: f32 = 8.0;
pub const LINE_WIDTH: f32 = 2.0;
pub const SCATTER_OPACITY: f32 = 0.6;

/// Chart style chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Line,
    Scatter,
    Bar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Scatter, ChartKind::Bar];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Scatter => "Scatter",
            ChartKind::Bar => "Bar",
        }
    }

    /// Visual style for series `index` of `count`.
    pub fn series_style(self, index: usize, count: usize) -> SeriesStyle {
        match self {
            ChartKind::Line => SeriesStyle::LinesMarkers {
                marker_size: MARKER_SIZE,
                line_width: LINE_WIDTH,
            },
            ChartKind::Scatter => SeriesStyle::Markers {
                marker_size: MARKER_SIZE,
                opacity: SCATTER_OPACITY,
            },
            ChartKind::Bar => SeriesStyle::Bars {
                offset_group: index,
                group_count: count,
            },
        }
    }

    pub fn supports_trend(self) -> bool {
        self == ChartKind::Scatter
    }
}

/// What the user picked. Rebuilt on every interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub x_column: String,
    pub y_columns: Vec<String>,
    pub dual_axis: bool,
    pub chart_kind: ChartKind,
    pub title: String,
    pub show_trend: bool,
}

impl Selection {
    pub fn new(x_column: impl Into<String>, y_columns: &[&str], chart_kind: ChartKind) -> Self {
        Self {
            x_column: x_column.into(),
            y_columns: y_columns.iter().map(|s| s.to_string()).collect(),
            dual_axis: false,
            chart_kind,
            title: DEFAULT_TITLE.to_string(),
            show_trend: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_dual_axis(mut self, dual_axis: bool) -> Self {
        self.dual_axis = dual_axis;
        self
    }

    pub fn with_trend(mut self, show_trend: bool) -> Self {
        self.show_trend = show_trend;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Primary,
    Secondary,
}

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SeriesStyle {
    LinesMarkers { marker_size: f32, line_width: f32 },
    Markers { marker_size: f32, opacity: f32 },
    /// Each series sits in its own offset group so bars never overlap.
    Bars { offset_group: usize, group_count: usize },
}

/// Fitted straight line drawn over the first scatter series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendOverlay {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r: f64,
    pub p_value: f64,
    pub std_err: f64,
    pub pair_count: usize,
    /// Smallest and largest x of the fitted pairs.
    pub x_extent: (f64, f64),
    pub label: String,
}

impl TrendOverlay {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// End points of the fitted segment across the data.
    pub fn segment(&self) -> [[f64; 2]; 2] {
        let (lo, hi) = self.x_extent;
        [[lo, self.predict(lo)], [hi, self.predict(hi)]]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub column: String,
    pub axis: Axis,
    pub style: SeriesStyle,
    pub color_index: usize,
    pub unit: String,
    /// Tooltip text; `{y}` is replaced by the hovered value.
    pub hover_template: String,
    pub trend: Option<TrendOverlay>,
}

impl SeriesSpec {
    pub fn hover_text(&self, y: f64) -> String {
        self.hover_template.replace("{y}", &format!("{}", y))
    }
}

/// Free text pinned to the plot area; `anchor` is in plot-area fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub anchor: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPlacement {
    HorizontalBelow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutHints {
    pub legend: LegendPlacement,
    pub width: f32,
    pub height: f32,
    pub title_size: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            legend: LegendPlacement::HorizontalBelow,
            width: 900.0,
            height: 500.0,
            title_size: 24.0,
            margin_top: 80.0,
            margin_bottom: 100.0,
        }
    }
}

/// Resolved chart, ready to draw. Holds no reference to the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub chart_kind: ChartKind,
    pub x_label: String,
    pub series: Vec<SeriesSpec>,
    pub primary_axis_label: String,
    pub secondary_axis_label: Option<String>,
    pub annotations: Vec<Annotation>,
    pub layout: LayoutHints,
}

impl ChartSpec {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn has_secondary_axis(&self) -> bool {
        self.secondary_axis_label.is_some()
    }

    pub fn trend(&self) -> Option<&TrendOverlay> {
        self.series.iter().find_map(|s| s.trend.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_series_get_their_own_offset_group() {
        assert_eq!(
            ChartKind::Bar.series_style(1, 2),
            SeriesStyle::Bars {
                offset_group: 1,
                group_count: 2
            }
        );
    }

    #[test]
    fn scatter_markers_are_translucent() {
        match ChartKind::Scatter.series_style(0, 1) {
            SeriesStyle::Markers { opacity, .. } => assert!(opacity < 1.0),
            other => panic!("unexpected style {:?}", other),
        }
        assert!(ChartKind::Scatter.supports_trend());
        assert!(!ChartKind::Line.supports_trend());
    }

    #[test]
    fn trend_segment_spans_extent() {
        let trend = TrendOverlay {
            slope: 2.0,
            intercept: 1.0,
            r: 1.0,
            p_value: 0.0,
            std_err: 0.0,
            pair_count: 2,
            x_extent: (0.0, 3.0),
            label: "Trend (y)".to_string(),
        };

        assert_eq!(trend.segment(), [[0.0, 1.0], [3.0, 7.0]]);
    }

    #[test]
    fn hover_text_fills_in_value() {
        let series = SeriesSpec {
            column: "Temp (C)".to_string(),
            axis: Axis::Primary,
            style: ChartKind::Line.series_style(0, 1),
            color_index: 0,
            unit: "C".to_string(),
            hover_template: "Temp (C): {y} C".to_string(),
            trend: None,
        };

        assert_eq!(series.hover_text(21.5), "Temp (C): 21.5 C");
    }

    #[test]
    fn selection_round_trips_through_json() {
        let selection = Selection::new("Year", &["Rank"], ChartKind::Bar).with_dual_axis(true);
        let json = serde_json::to_string(&selection).unwrap();

        assert!(json.contains("\"chart_kind\":\"bar\""));
        assert_eq!(serde_json::from_str::<Selection>(&json).unwrap(), selection);
    }
}
