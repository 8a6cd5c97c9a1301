//! Table Module
//! Rectangular, typed, column-oriented data handed to the chart resolver.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Column '{name}' has {len} rows, expected {expected}")]
    RaggedColumns {
        name: String,
        len: usize,
        expected: usize,
    },
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

/// Inferred kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Temporal,
    Text,
}

impl ColumnKind {
    /// Whether values of this kind can be paired for a regression fit.
    pub fn is_quantitative(self) -> bool {
        matches!(self, ColumnKind::Numeric | ColumnKind::Temporal)
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    /// Milliseconds since the Unix epoch plus the text it was read from.
    Temporal { millis: f64, label: String },
    Text(String),
}

impl Cell {
    /// Numeric view of the cell. `NaN` counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            Cell::Temporal { millis, .. } if !millis.is_nan() => Some(*millis),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Temporal { millis, .. } => millis.is_nan(),
            Cell::Text(_) => false,
        }
    }

    /// Display text used for axis labels.
    pub fn label(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Number(v) => format!("{}", v),
            Cell::Temporal { label, .. } => label.clone(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    /// Build a numeric column; `None` becomes [`Cell::Null`].
    pub fn numeric(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        let cells = values
            .iter()
            .map(|v| v.map(Cell::Number).unwrap_or(Cell::Null))
            .collect();
        Self::new(name, ColumnKind::Numeric, cells)
    }

    /// Build a string column of the given kind; `None` becomes [`Cell::Null`].
    pub fn strings(name: impl Into<String>, kind: ColumnKind, values: &[Option<&str>]) -> Self {
        let cells = values
            .iter()
            .map(|v| v.map(|s| Cell::Text(s.to_string())).unwrap_or(Cell::Null))
            .collect();
        Self::new(name, kind, cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Positions of each row along a plot axis.
    ///
    /// Quantitative columns use their value. Categorical and text columns are
    /// laid out on integer slots in order of first appearance, and the slot
    /// labels are returned alongside.
    pub fn axis_values(&self) -> AxisValues {
        if self.kind.is_quantitative() {
            let positions = self.cells.iter().map(Cell::as_f64).collect();
            let labels = if self.kind == ColumnKind::Temporal {
                let mut marks: Vec<(f64, String)> = self
                    .cells
                    .iter()
                    .filter_map(|c| match c {
                        Cell::Temporal { millis, label } if !millis.is_nan() => {
                            Some((*millis, label.clone()))
                        }
                        _ => None,
                    })
                    .collect();
                marks.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
                marks.dedup_by(|a, b| a.0 == b.0);
                AxisLabels::Marks(marks)
            } else {
                AxisLabels::Numeric
            };
            return AxisValues { positions, labels };
        }

        let mut slots: HashMap<String, usize> = HashMap::new();
        let mut names: Vec<String> = Vec::new();
        let positions = self
            .cells
            .iter()
            .map(|cell| {
                if cell.is_missing() {
                    return None;
                }
                let key = cell.label();
                let slot = *slots.entry(key.clone()).or_insert_with(|| {
                    names.push(key);
                    names.len() - 1
                });
                Some(slot as f64)
            })
            .collect();

        AxisValues {
            positions,
            labels: AxisLabels::Slots(names),
        }
    }
}

/// How tick marks on an axis should be labelled.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisLabels {
    /// Plain numbers.
    Numeric,
    /// Integer slot `i` shows `names[i]`.
    Slots(Vec<String>),
    /// Sorted `(position, label)` samples; ticks show the nearest one.
    Marks(Vec<(f64, String)>),
}

impl AxisLabels {
    /// Text for a tick at `value`.
    pub fn format(&self, value: f64) -> String {
        match self {
            AxisLabels::Numeric => format!("{}", value),
            AxisLabels::Slots(names) => {
                let idx = value.round();
                if idx < 0.0 || (idx - value).abs() > 1e-6 {
                    return String::new();
                }
                names.get(idx as usize).cloned().unwrap_or_default()
            }
            AxisLabels::Marks(marks) => {
                let nearest = marks.iter().min_by(|a, b| {
                    (a.0 - value)
                        .abs()
                        .partial_cmp(&(b.0 - value).abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                nearest.map(|(_, label)| label.clone()).unwrap_or_default()
            }
        }
    }
}

/// Row positions along an axis plus their labelling scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisValues {
    pub positions: Vec<Option<f64>>,
    pub labels: AxisLabels,
}

/// Ordered collection of equal-length, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen: HashSet<&str> = HashSet::new();

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != row_count {
                return Err(TableError::RaggedColumns {
                    name: column.name.clone(),
                    len: column.len(),
                    expected: row_count,
                });
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Display text for the first `limit` rows, one entry per column.
    pub fn preview_rows(&self, limit: usize) -> Vec<Vec<String>> {
        (0..self.row_count.min(limit))
            .map(|row| self.columns.iter().map(|c| c.cells[row].label()).collect())
            .collect()
    }

    /// Rows where both columns hold a usable number, as parallel vectors.
    pub fn paired_values(&self, x: &str, y: &str) -> (Vec<f64>, Vec<f64>) {
        let (Some(x_col), Some(y_col)) = (self.column(x), self.column(y)) else {
            return (Vec::new(), Vec::new());
        };

        x_col
            .cells
            .iter()
            .zip(y_col.cells.iter())
            .filter_map(|(xc, yc)| Some((xc.as_f64()?, yc.as_f64()?)))
            .unzip()
    }
}
