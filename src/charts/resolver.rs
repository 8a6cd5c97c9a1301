//! Chart Configuration Resolver
//! Turns a table plus the user's selection into a complete [`ChartSpec`].

use super::spec::{
    Annotation, Axis, ChartSpec, LayoutHints, Selection, SeriesSpec, TrendOverlay,
};
use crate::data::Table;
use crate::stats::StatsCalculator;
use thiserror::Error;

/// At most this many y columns can be charted at once.
pub const MAX_SERIES: usize = 2;

/// Top-right corner of the plot area.
const CORRELATION_ANCHOR: (f32, f32) = (0.98, 0.98);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Select at least one column for the y axis")]
    NoSeriesSelected,
    #[error("Select at most two columns for the y axis")]
    TooManySeries,
    #[error("Column '{0}' does not exist in the table")]
    UnknownColumn(String),
    #[error("Column '{0}' is already used for the x axis")]
    AxisCollision(String),
    #[error("Column '{0}' is selected twice")]
    DuplicateSeries(String),
}

/// Text inside the first `(...)` group of a column name, or empty.
pub fn extract_unit(column: &str) -> &str {
    column
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(unit, _)| unit)
        .unwrap_or("")
}

/// Stateless resolver from `(Table, Selection)` to [`ChartSpec`].
pub struct ChartConfigResolver;

impl ChartConfigResolver {
    pub fn resolve(table: &Table, selection: &Selection) -> Result<ChartSpec, ConfigError> {
        Self::validate(table, selection)?;

        let count = selection.y_columns.len();
        let trend_enabled =
            selection.chart_kind.supports_trend() && selection.show_trend && count == 1;

        let series: Vec<SeriesSpec> = selection
            .y_columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let unit = extract_unit(column).to_string();
                let trend = if trend_enabled && i == 0 {
                    Self::fit_trend(table, &selection.x_column, column)
                } else {
                    None
                };

                SeriesSpec {
                    column: column.clone(),
                    axis: Self::axis_for(i, selection.dual_axis),
                    style: selection.chart_kind.series_style(i, count),
                    color_index: i,
                    hover_template: format!("{}: {{y}} {}", column, unit),
                    unit,
                    trend,
                }
            })
            .collect();

        let secondary_axis_label = if selection.dual_axis && count == MAX_SERIES {
            Some(selection.y_columns[1].clone())
        } else {
            None
        };

        let annotations = series
            .iter()
            .filter_map(|s| s.trend.as_ref())
            .map(|trend| Annotation {
                text: format!("r = {:.2}", trend.r),
                anchor: CORRELATION_ANCHOR,
            })
            .collect();

        Ok(ChartSpec {
            title: selection.title.clone(),
            chart_kind: selection.chart_kind,
            x_label: selection.x_column.clone(),
            primary_axis_label: selection.y_columns[0].clone(),
            secondary_axis_label,
            series,
            annotations,
            layout: LayoutHints::default(),
        })
    }

    fn validate(table: &Table, selection: &Selection) -> Result<(), ConfigError> {
        match selection.y_columns.len() {
            0 => return Err(ConfigError::NoSeriesSelected),
            n if n > MAX_SERIES => return Err(ConfigError::TooManySeries),
            _ => {}
        }

        let referenced =
            std::iter::once(&selection.x_column).chain(selection.y_columns.iter());
        for name in referenced {
            if !table.contains(name) {
                return Err(ConfigError::UnknownColumn(name.clone()));
            }
        }

        if let Some(name) = selection
            .y_columns
            .iter()
            .find(|&y| *y == selection.x_column)
        {
            return Err(ConfigError::AxisCollision(name.clone()));
        }

        if let [first, second] = selection.y_columns.as_slice() {
            if first == second {
                return Err(ConfigError::DuplicateSeries(second.clone()));
            }
        }

        Ok(())
    }

    fn axis_for(index: usize, dual_axis: bool) -> Axis {
        if dual_axis && index == 1 {
            Axis::Secondary
        } else {
            Axis::Primary
        }
    }

    /// Fit `y` against `x` over complete rows. Too little data means no trend.
    fn fit_trend(table: &Table, x: &str, y: &str) -> Option<TrendOverlay> {
        let (xs, ys) = table.paired_values(x, y);
        let fit = StatsCalculator::linear_regression(&xs, &ys)?;

        let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(TrendOverlay {
            slope: fit.slope,
            intercept: fit.intercept,
            r: fit.r_value,
            p_value: fit.p_value,
            std_err: fit.std_err,
            pair_count: fit.count,
            x_extent: (lo, hi),
            label: format!("Trend ({})", y),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::spec::{ChartKind, SeriesStyle};
    use crate::data::{Cell, Column, ColumnKind};

    fn scores_table() -> Table {
        Table::new(vec![
            Column::numeric("Year", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            Column::numeric(
                "Score (pts)",
                &[Some(2.0), Some(4.0), Some(6.0), Some(8.0)],
            ),
            Column::numeric("Rank", &[Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
        ])
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn extracts_unit_from_parentheses() {
        assert_eq!(extract_unit("Temp (C)"), "C");
        assert_eq!(extract_unit("Count"), "");
        assert_eq!(extract_unit("Speed (km/h) (avg)"), "km/h");
        assert_eq!(extract_unit("Empty ()"), "");
        assert_eq!(extract_unit("Open (never closed"), "");
    }

    #[test]
    fn no_series_is_rejected() {
        let selection = Selection::new("Year", &[], ChartKind::Line);
        assert_eq!(
            ChartConfigResolver::resolve(&scores_table(), &selection),
            Err(ConfigError::NoSeriesSelected)
        );
    }

    #[test]
    fn too_many_series_is_rejected_before_lookup() {
        let selection = Selection::new("Year", &["Rank", "Score (pts)", "Ghost"], ChartKind::Line);
        assert_eq!(
            ChartConfigResolver::resolve(&scores_table(), &selection),
            Err(ConfigError::TooManySeries)
        );
    }

    #[test]
    fn unknown_columns_are_reported_x_first() {
        let table = scores_table();

        let selection = Selection::new("Month", &["Ghost"], ChartKind::Line);
        assert_eq!(
            ChartConfigResolver::resolve(&table, &selection),
            Err(ConfigError::UnknownColumn("Month".to_string()))
        );

        let selection = Selection::new("Year", &["Rank", "Ghost"], ChartKind::Line);
        assert_eq!(
            ChartConfigResolver::resolve(&table, &selection),
            Err(ConfigError::UnknownColumn("Ghost".to_string()))
        );
    }

    #[test]
    fn y_column_matching_x_collides() {
        let selection = Selection::new("Year", &["Rank", "Year"], ChartKind::Scatter);
        assert_eq!(
            ChartConfigResolver::resolve(&scores_table(), &selection),
            Err(ConfigError::AxisCollision("Year".to_string()))
        );
    }

    #[test]
    fn repeated_y_column_is_rejected() {
        let selection = Selection::new("Year", &["Rank", "Rank"], ChartKind::Line);
        assert_eq!(
            ChartConfigResolver::resolve(&scores_table(), &selection),
            Err(ConfigError::DuplicateSeries("Rank".to_string()))
        );
    }

    #[test]
    fn resolve_is_deterministic() {
        let table = scores_table();
        let selection = Selection::new("Year", &["Score (pts)"], ChartKind::Scatter)
            .with_trend(true)
            .with_title("Scores");

        let first = ChartConfigResolver::resolve(&table, &selection).unwrap();
        let second = ChartConfigResolver::resolve(&table, &selection).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scatter_with_trend_scenario() {
        let selection =
            Selection::new("Year", &["Score (pts)"], ChartKind::Scatter).with_trend(true);
        let spec = ChartConfigResolver::resolve(&scores_table(), &selection).unwrap();

        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.x_label, "Year");
        assert_eq!(spec.primary_axis_label, "Score (pts)");
        assert_eq!(spec.secondary_axis_label, None);

        let series = &spec.series[0];
        assert_eq!(series.unit, "pts");
        assert_eq!(series.axis, Axis::Primary);
        assert_eq!(series.hover_template, "Score (pts): {y} pts");

        let trend = series.trend.as_ref().unwrap();
        assert!(approx(trend.slope, 2.0));
        assert!(approx(trend.intercept, 0.0));
        assert!(approx(trend.r, 1.0));
        assert_eq!(trend.pair_count, 4);
        assert_eq!(trend.x_extent, (1.0, 4.0));
        assert_eq!(trend.label, "Trend (Score (pts))");

        assert_eq!(spec.annotations.len(), 1);
        assert_eq!(spec.annotations[0].text, "r = 1.00");
    }

    #[test]
    fn dual_axis_scenario() {
        let selection = Selection::new("Year", &["Score (pts)", "Rank"], ChartKind::Line)
            .with_dual_axis(true);
        let spec = ChartConfigResolver::resolve(&scores_table(), &selection).unwrap();

        assert_eq!(spec.series.len(), 2);
        assert_eq!(spec.series[0].axis, Axis::Primary);
        assert_eq!(spec.series[1].axis, Axis::Secondary);
        assert_eq!(spec.secondary_axis_label.as_deref(), Some("Rank"));
        assert_ne!(spec.series[0].color_index, spec.series[1].color_index);
    }

    #[test]
    fn single_series_stays_primary_even_with_dual_axis() {
        let selection = Selection::new("Year", &["Rank"], ChartKind::Line).with_dual_axis(true);
        let spec = ChartConfigResolver::resolve(&scores_table(), &selection).unwrap();

        assert_eq!(spec.series[0].axis, Axis::Primary);
        assert!(!spec.has_secondary_axis());
    }

    #[test]
    fn two_series_without_dual_axis_share_primary() {
        let selection = Selection::new("Year", &["Score (pts)", "Rank"], ChartKind::Bar);
        let spec = ChartConfigResolver::resolve(&scores_table(), &selection).unwrap();

        assert!(spec.series.iter().all(|s| s.axis == Axis::Primary));
        assert_eq!(spec.secondary_axis_label, None);
        assert_eq!(
            spec.series[1].style,
            SeriesStyle::Bars {
                offset_group: 1,
                group_count: 2
            }
        );
    }

    #[test]
    fn trend_is_skipped_for_two_series() {
        let selection = Selection::new("Year", &["Score (pts)", "Rank"], ChartKind::Scatter)
            .with_trend(true);
        let spec = ChartConfigResolver::resolve(&scores_table(), &selection).unwrap();

        assert!(spec.trend().is_none());
        assert!(spec.annotations.is_empty());
    }

    #[test]
    fn trend_is_ignored_outside_scatter() {
        let selection = Selection::new("Year", &["Score (pts)"], ChartKind::Line).with_trend(true);
        let spec = ChartConfigResolver::resolve(&scores_table(), &selection).unwrap();

        assert!(spec.trend().is_none());
    }

    #[test]
    fn trend_is_omitted_with_too_few_complete_rows() {
        let table = Table::new(vec![
            Column::numeric("x", &[Some(1.0), None, Some(3.0)]),
            Column::numeric("y", &[Some(2.0), Some(4.0), None]),
        ])
        .unwrap();
        let selection = Selection::new("x", &["y"], ChartKind::Scatter).with_trend(true);

        let spec = ChartConfigResolver::resolve(&table, &selection).unwrap();
        assert_eq!(spec.series.len(), 1);
        assert!(spec.trend().is_none());
    }

    #[test]
    fn trend_over_text_x_is_omitted() {
        let table = Table::new(vec![
            Column::strings(
                "Name",
                ColumnKind::Text,
                &[Some("a"), Some("b"), Some("c")],
            ),
            Column::numeric("Value", &[Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        let selection = Selection::new("Name", &["Value"], ChartKind::Scatter).with_trend(true);

        let spec = ChartConfigResolver::resolve(&table, &selection).unwrap();
        assert!(spec.trend().is_none());
    }

    #[test]
    fn trend_uses_only_complete_rows() {
        let table = Table::new(vec![
            Column::numeric("x", &[Some(1.0), Some(2.0), None, Some(4.0)]),
            Column::numeric("y", &[Some(3.0), Some(5.0), Some(100.0), Some(9.0)]),
        ])
        .unwrap();
        let selection = Selection::new("x", &["y"], ChartKind::Scatter).with_trend(true);

        let trend = ChartConfigResolver::resolve(&table, &selection)
            .unwrap()
            .series[0]
            .trend
            .clone()
            .unwrap();
        assert!(approx(trend.slope, 2.0));
        assert!(approx(trend.intercept, 1.0));
        assert_eq!(trend.pair_count, 3);
    }

    #[test]
    fn trend_over_dates_fits_per_millisecond() {
        const DAY: f64 = 86_400_000.0;
        let dates = ["1970-01-01", "1970-01-02", "1970-01-03"]
            .iter()
            .enumerate()
            .map(|(i, label)| Cell::Temporal {
                millis: i as f64 * DAY,
                label: label.to_string(),
            })
            .collect();
        let table = Table::new(vec![
            Column::new("Date", ColumnKind::Temporal, dates),
            Column::numeric("Visits", &[Some(1.0), Some(2.0), Some(3.0)]),
        ])
        .unwrap();
        let selection = Selection::new("Date", &["Visits"], ChartKind::Scatter).with_trend(true);

        let spec = ChartConfigResolver::resolve(&table, &selection).unwrap();
        let trend = spec.trend().unwrap();

        assert!(approx(trend.slope * DAY, 1.0));
        assert!(approx(trend.intercept, 1.0));
        assert!(approx(trend.r, 1.0));
        assert_eq!(trend.x_extent, (0.0, 2.0 * DAY));
        assert!(approx(trend.predict(3.0 * DAY), 4.0));
        assert_eq!(spec.annotations[0].text, "r = 1.00");
    }

    #[test]
    fn spec_serializes_for_external_renderers() {
        let selection = Selection::new("Year", &["Rank"], ChartKind::Bar);
        let spec = ChartConfigResolver::resolve(&scores_table(), &selection).unwrap();
        let json = spec.to_json().unwrap();

        assert!(json.contains("\"primary_axis_label\": \"Rank\""));
        assert!(json.contains("\"mode\": \"bars\""));
    }
}
