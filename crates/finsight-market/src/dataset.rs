//! Fetched dataset files: naming, materialization, and description
//!
//! Dataset files are named deterministically from symbol, operation kind,
//! and date, so re-fetching the same data on the same day overwrites the
//! previous file instead of accumulating copies.

use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Inferred type of a CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    fn label(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
        }
    }
}

/// Schema summary of a fetched CSV payload
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    /// Column names with inferred types, in file order
    pub columns: Vec<(String, ColumnType)>,
    /// Number of data rows (excluding the header)
    pub rows: usize,
}

impl DatasetSummary {
    /// Render the summary as human-readable text for the conversation
    pub fn describe(&self) -> String {
        let mut out = format!(
            "Dataset summary: {} rows, {} columns\n",
            self.rows,
            self.columns.len()
        );
        for (name, kind) in &self.columns {
            out.push_str(&format!("  {name}: {}\n", kind.label()));
        }
        out
    }
}

/// Derive a dated file name: `{symbol}_{kind}_{YYYYMMDD}.csv`
pub fn dated_name(symbol: &str, kind: &str, now: &DateTime<Local>) -> String {
    format!(
        "{}_{kind}_{}.csv",
        symbol.to_lowercase(),
        now.format("%Y%m%d")
    )
}

/// Derive a timestamped file name: `{symbol}_{kind}_{YYYYMMDD}_{HHMMSS}.csv`
///
/// Used for realtime kinds where two fetches on the same day are distinct.
pub fn timestamped_name(symbol: &str, kind: &str, now: &DateTime<Local>) -> String {
    format!(
        "{}_{kind}_{}.csv",
        symbol.to_lowercase(),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Derive the historical-options file name: `{symbol}_historical_options_{date|all}.csv`
pub fn historical_options_name(symbol: &str, date: Option<&str>) -> String {
    format!(
        "{}_historical_options_{}.csv",
        symbol.to_lowercase(),
        date.unwrap_or("all")
    )
}

/// Summarize a CSV payload: column names, inferred types, and row count
pub fn summarize_csv(data: &str) -> Result<DatasetSummary> {
    let mut reader = csv::Reader::from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(std::string::ToString::to_string)
        .collect();

    // Start with the narrowest type per column and widen as values disagree
    let mut types = vec![ColumnType::Integer; headers.len()];
    let mut rows = 0;

    for record in reader.records() {
        let record = record?;
        rows += 1;
        for (i, value) in record.iter().enumerate() {
            if i >= types.len() {
                break;
            }
            types[i] = match types[i] {
                ColumnType::Integer if value.parse::<i64>().is_ok() => ColumnType::Integer,
                ColumnType::Integer | ColumnType::Float if value.parse::<f64>().is_ok() => {
                    ColumnType::Float
                }
                _ => ColumnType::Text,
            };
        }
    }

    Ok(DatasetSummary {
        columns: headers.into_iter().zip(types).collect(),
        rows,
    })
}

/// Write a dataset file under the fetch directory, replacing any previous
/// file with the same name
pub fn save_dataset(fetch_dir: &Path, filename: &str, data: &str) -> Result<PathBuf> {
    fs::create_dir_all(fetch_dir)?;
    let path = fetch_dir.join(filename);
    fs::write(&path, data)?;
    Ok(path)
}
