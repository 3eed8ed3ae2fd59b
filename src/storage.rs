//! Tabular exports: one row per year (most recent first), one column per series.

use crate::assembler::LabeledResult;
use crate::models::Series;
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Values are rounded to this many decimals on export.
pub const DECIMALS: i32 = 3;

pub fn round3(v: f64) -> f64 {
    let f = 10f64.powi(DECIMALS);
    (v * f).round() / f
}

/// Year-indexed table combining several series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub columns: Vec<String>,
    /// year -> one cell per column
    rows: BTreeMap<i32, Vec<Option<f64>>>,
}

impl DataTable {
    /// Union of all years; a series without a value for a year leaves a blank cell.
    pub fn from_series<S: AsRef<str>>(series: &[(S, &Series)]) -> Self {
        let columns: Vec<String> = series.iter().map(|(n, _)| n.as_ref().to_string()).collect();
        let mut rows: BTreeMap<i32, Vec<Option<f64>>> = BTreeMap::new();
        for (col, (_, s)) in series.iter().enumerate() {
            for (year, v) in s.iter() {
                rows.entry(year).or_insert_with(|| vec![None; columns.len()])[col] =
                    Some(round3(v));
            }
        }
        Self { columns, rows }
    }

    /// One column per result, historical and forecast combined.
    pub fn from_results(results: &[LabeledResult]) -> Self {
        let combined: Vec<(String, Series)> = results
            .iter()
            .map(|r| (r.label.clone(), r.result.combined()))
            .collect();
        let refs: Vec<(&str, &Series)> = combined.iter().map(|(n, s)| (n.as_str(), s)).collect();
        Self::from_series(&refs)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows ordered by year, descending.
    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Option<f64>])> {
        self.rows.iter().rev().map(|(y, cells)| (*y, cells.as_slice()))
    }

    /// Cell lookup by year and column name.
    pub fn get(&self, year: i32, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(&year)?.get(col).copied().flatten()
    }

    /// The column as a series.
    pub fn column(&self, column: &str) -> Option<Series> {
        let col = self.columns.iter().position(|c| c == column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|(y, cells)| cells.get(col).copied().flatten().map(|v| (*y, v)))
                .collect(),
        )
    }
}

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn guard(cell: &str) -> String {
    if cell.starts_with(['=', '+', '-', '@']) {
        format!("'{cell}")
    } else {
        cell.to_string()
    }
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|x| round3(x).to_string()).unwrap_or_default()
}

/// Write the table as CSV: `year,<col>...`, most recent year first.
pub fn write_csv<W: Write>(table: &DataTable, out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(out);
    let mut header = vec!["year".to_string()];
    header.extend(table.columns.iter().map(|c| guard(c)));
    wtr.write_record(&header)?;
    for (year, cells) in table.rows() {
        let mut rec = vec![year.to_string()];
        rec.extend(cells.iter().map(|c| fmt_cell(*c)));
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(table: &DataTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(table, f)
}

/// Read a table written by [`write_csv`]. Blank cells are missing values;
/// a leading formula guard on column names is removed.
pub fn read_csv<R: Read>(input: R) -> Result<DataTable> {
    let mut rdr = ReaderBuilder::new().from_reader(input);
    let headers = rdr.headers().context("read csv header")?.clone();
    if headers.get(0) != Some("year") {
        bail!("first column must be `year`");
    }
    let columns: Vec<String> = headers
        .iter()
        .skip(1)
        .map(|h| match h.strip_prefix('\'') {
            Some(rest) if rest.starts_with(['=', '+', '-', '@']) => rest.to_string(),
            _ => h.to_string(),
        })
        .collect();
    let mut rows = BTreeMap::new();
    for (n, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("read csv row {}", n + 1))?;
        let year: i32 = rec
            .get(0)
            .unwrap_or_default()
            .trim()
            .parse()
            .with_context(|| format!("row {}: bad year", n + 1))?;
        let cells = (0..columns.len())
            .map(|i| {
                let raw = rec.get(i + 1).unwrap_or("").trim();
                if raw.is_empty() {
                    Ok(None)
                } else {
                    raw.parse::<f64>()
                        .map(Some)
                        .with_context(|| format!("row {}: bad value {raw:?}", n + 1))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        rows.insert(year, cells);
    }
    Ok(DataTable { columns, rows })
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<DataTable> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_csv(f)
}

/// Write the table to a single named sheet with the CSV layout.
pub fn save_xlsx<P: AsRef<Path>>(table: &DataTable, sheet: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    // Excel caps sheet names at 31 characters
    let name: String = sheet.chars().take(31).collect();
    ws.set_name(&name)?;
    ws.write_string(0, 0, "year")?;
    for (c, col) in table.columns.iter().enumerate() {
        ws.write_string(0, (c + 1) as u16, col.as_str())?;
    }
    for (r, (year, cells)) in table.rows().enumerate() {
        let row = (r + 1) as u32;
        ws.write_number(row, 0, year as f64)?;
        for (c, cell) in cells.iter().enumerate() {
            if let Some(v) = cell {
                ws.write_number(row, (c + 1) as u16, round3(*v))?;
            }
        }
    }
    wb.save(path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Save anything serializable as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
