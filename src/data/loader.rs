//! Data Loader Module
//! Reads delimited text (Polars) and spreadsheets (calamine) into a typed [`Table`].

use super::table::{Cell, Column, ColumnKind, Table, TableError};
use calamine::{open_workbook_auto, Data as SheetCell, Reader};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Rows scanned when inferring the CSV schema.
pub const SCHEMA_INFERENCE_ROWS: usize = 10_000;

/// A string column with at most this many distinct values may be categorical.
pub const MAX_CATEGORY_COUNT: usize = 20;

/// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01.
const EXCEL_UNIX_EPOCH_DAYS: f64 = 25_569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to load spreadsheet: {0}")]
    Excel(#[from] calamine::Error),
    #[error("Malformed table: {0}")]
    Table(#[from] TableError),
    #[error("File contains no columns")]
    Empty,
    #[error("Unsupported file type: .{0}")]
    UnsupportedFormat(String),
}

/// Turns uploaded files into [`Table`]s.
pub struct DataLoader;

impl DataLoader {
    /// Load a file, choosing the reader from its extension.
    pub fn load(file_path: &Path) -> Result<Table, LoaderError> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Self::load_csv(file_path),
            "xlsx" | "xls" | "xlsm" | "ods" => Self::load_excel(file_path),
            other => Err(LoaderError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Load the first worksheet of a spreadsheet. The first row holds the headers.
    pub fn load_excel(file_path: &Path) -> Result<Table, LoaderError> {
        let mut workbook = open_workbook_auto(file_path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LoaderError::Empty)??;
        let rows: Vec<Vec<SheetCell>> = range.rows().map(|row| row.to_vec()).collect();

        Self::from_sheet_rows(&rows)
    }

    /// Convert spreadsheet rows (header row first) into a table.
    pub fn from_sheet_rows(rows: &[Vec<SheetCell>]) -> Result<Table, LoaderError> {
        let Some((header, body)) = rows.split_first() else {
            return Err(LoaderError::Empty);
        };
        if header.is_empty() {
            return Err(LoaderError::Empty);
        }

        let mut seen: HashSet<String> = HashSet::new();
        let columns = header
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = Self::unique_header(Self::sheet_text(cell), i, &mut seen);
                let cells: Vec<&SheetCell> = body.iter().map(|row| &row[i]).collect();
                Self::sheet_column(name, &cells)
            })
            .collect();

        Ok(Table::new(columns)?)
    }

    /// Blank headers become `Unnamed: i`; repeats get a `.n` suffix.
    fn unique_header(raw: Option<String>, index: usize, seen: &mut HashSet<String>) -> String {
        let base = raw
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Unnamed: {}", index));

        let mut name = base.clone();
        let mut n = 1;
        while !seen.insert(name.clone()) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        name
    }

    fn sheet_column(name: String, cells: &[&SheetCell]) -> Column {
        let present: Vec<&SheetCell> = cells
            .iter()
            .copied()
            .filter(|c| !matches!(c, SheetCell::Empty | SheetCell::Error(_)))
            .collect();

        let all = |pred: fn(&SheetCell) -> bool| !present.is_empty() && present.iter().all(|c| pred(c));

        if all(|c| matches!(c, SheetCell::Int(_) | SheetCell::Float(_))) {
            let cells = cells
                .iter()
                .map(|c| match c {
                    SheetCell::Int(v) => Cell::Number(*v as f64),
                    SheetCell::Float(v) => Cell::Number(*v),
                    _ => Cell::Null,
                })
                .collect();
            return Column::new(name, ColumnKind::Numeric, cells);
        }

        if all(|c| matches!(c, SheetCell::DateTime(_))) {
            let cells = cells
                .iter()
                .map(|c| match c {
                    SheetCell::DateTime(dt) => {
                        let serial = dt.as_f64();
                        Cell::Temporal {
                            millis: excel_serial_to_millis(serial),
                            label: excel_serial_label(serial),
                        }
                    }
                    _ => Cell::Null,
                })
                .collect();
            return Column::new(name, ColumnKind::Temporal, cells);
        }

        let text: Vec<Cell> = cells
            .iter()
            .map(|c| Self::sheet_text(c).map(Cell::Text).unwrap_or(Cell::Null))
            .collect();

        let kind = if all(|c| matches!(c, SheetCell::Bool(_))) {
            ColumnKind::Categorical
        } else {
            Self::infer_string_kind(&text)
        };
        Column::new(name, kind, text)
    }

    fn sheet_text(cell: &SheetCell) -> Option<String> {
        match cell {
            SheetCell::Empty | SheetCell::Error(_) => None,
            SheetCell::String(s) | SheetCell::DateTimeIso(s) | SheetCell::DurationIso(s) => {
                Some(s.clone())
            }
            SheetCell::Int(v) => Some(v.to_string()),
            SheetCell::Float(v) => Some(v.to_string()),
            SheetCell::Bool(v) => Some(v.to_string()),
            SheetCell::DateTime(dt) => Some(excel_serial_label(dt.as_f64())),
        }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(file_path: &Path) -> Result<Table, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(SCHEMA_INFERENCE_ROWS))
            .with_ignore_errors(true)
            .with_try_parse_dates(true)
            .finish()?
            .collect()?;

        Self::from_dataframe(&df)
    }

    /// Convert every DataFrame column into a typed table column.
    pub fn from_dataframe(df: &DataFrame) -> Result<Table, LoaderError> {
        if df.width() == 0 {
            return Err(LoaderError::Empty);
        }

        let columns = df
            .get_columns()
            .iter()
            .map(Self::convert_column)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Table::new(columns)?)
    }

    fn convert_column(col: &polars::prelude::Column) -> Result<Column, LoaderError> {
        let name = col.name().to_string();

        let column = match col.dtype() {
            DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => {
                let values = col.cast(&DataType::Float64)?;
                let cells = values
                    .f64()?
                    .into_iter()
                    .map(|v| v.map(Cell::Number).unwrap_or(Cell::Null))
                    .collect();
                Column::new(name, ColumnKind::Numeric, cells)
            }
            DataType::Date | DataType::Datetime(_, _) => {
                let millis = col
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                    .cast(&DataType::Int64)?;
                let labels = col.cast(&DataType::String)?;
                let cells = millis
                    .i64()?
                    .into_iter()
                    .zip(labels.str()?.into_iter())
                    .map(|(ms, label)| match ms {
                        Some(ms) => Cell::Temporal {
                            millis: ms as f64,
                            label: label.unwrap_or_default().to_string(),
                        },
                        None => Cell::Null,
                    })
                    .collect();
                Column::new(name, ColumnKind::Temporal, cells)
            }
            DataType::Boolean | DataType::Categorical(_, _) | DataType::Enum(_, _) => {
                Column::new(name, ColumnKind::Categorical, Self::text_cells(col)?)
            }
            DataType::String => {
                let cells = Self::text_cells(col)?;
                let kind = Self::infer_string_kind(&cells);
                Column::new(name, kind, cells)
            }
            _ => Column::new(name, ColumnKind::Text, Self::text_cells(col)?),
        };

        Ok(column)
    }

    fn text_cells(col: &polars::prelude::Column) -> Result<Vec<Cell>, LoaderError> {
        let values = col.cast(&DataType::String)?;
        let cells = values
            .str()?
            .into_iter()
            .map(|v| v.map(|s| Cell::Text(s.to_string())).unwrap_or(Cell::Null))
            .collect();
        Ok(cells)
    }

    /// Low-cardinality strings are categorical, everything else is free text.
    fn infer_string_kind(cells: &[Cell]) -> ColumnKind {
        let present: Vec<&str> = cells
            .iter()
            .filter_map(|c| match c {
                Cell::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        let distinct: HashSet<&str> = present.iter().copied().collect();

        if !distinct.is_empty()
            && distinct.len() <= MAX_CATEGORY_COUNT
            && distinct.len() * 2 <= present.len()
        {
            ColumnKind::Categorical
        } else {
            ColumnKind::Text
        }
    }
}

/// Spreadsheet day serial to milliseconds since the Unix epoch.
pub fn excel_serial_to_millis(serial: f64) -> f64 {
    (serial - EXCEL_UNIX_EPOCH_DAYS) * MILLIS_PER_DAY
}

/// `YYYY-MM-DD`, with `HH:MM:SS` appended when the serial has a time part.
pub fn excel_serial_label(serial: f64) -> String {
    let total_seconds = (excel_serial_to_millis(serial) / 1000.0).round() as i64;
    let days = total_seconds.div_euclid(86_400);
    let secs = total_seconds.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);

    if secs == 0 {
        format!("{:04}-{:02}-{:02}", year, month, day)
    } else {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year,
            month,
            day,
            secs / 3600,
            secs % 3600 / 60,
            secs % 60
        )
    }
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
