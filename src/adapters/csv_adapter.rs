//! CSV price series adapter.
//!
//! Expects a header row with a timestamp column (`Date`, `Datetime` or
//! `Timestamp`) and `Open`, `High`, `Low`, `Close`. Header matching is
//! case-insensitive and extra columns are ignored.

use crate::domain::bar::Bar;
use crate::domain::error::StraddleError;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::debug;

const TIMESTAMP_HEADERS: [&str; 3] = ["date", "datetime", "timestamp"];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub struct CsvAdapter {
    path: PathBuf,
}

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_error(&self, reason: impl std::fmt::Display) -> StraddleError {
        StraddleError::DataLoad {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn resolve_columns(&self, headers: &csv::StringRecord) -> Result<Columns, StraddleError> {
        let find = |names: &[&str]| -> Option<usize> {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        let require = |names: &[&str], label: &str| {
            find(names).ok_or_else(|| self.load_error(format!("missing {label} column")))
        };

        Ok(Columns {
            timestamp: require(&TIMESTAMP_HEADERS[..], "date")?,
            open: require(&["open"][..], "open")?,
            high: require(&["high"][..], "high")?,
            low: require(&["low"][..], "low")?,
            close: require(&["close"][..], "close")?,
        })
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_price(record: &csv::StringRecord, idx: usize, name: &str, line: u64) -> Result<f64, StraddleError> {
    let raw = record.get(idx).ok_or_else(|| StraddleError::DataInvalid {
        line,
        reason: format!("missing {name} value"),
    })?;
    raw.trim().parse().map_err(|e| StraddleError::DataInvalid {
        line,
        reason: format!("invalid {name} value '{raw}': {e}"),
    })
}

impl DataPort for CsvAdapter {
    fn source_name(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_bars(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, StraddleError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| self.load_error(e))?;
        let headers = rdr.headers().map_err(|e| self.load_error(e))?.clone();
        let cols = self.resolve_columns(&headers)?;

        // Each bar keeps its source line for duplicate reporting.
        let mut rows: Vec<(Bar, u64)> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| self.load_error(format!("CSV parse error: {e}")))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_ts = record.get(cols.timestamp).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| StraddleError::DataInvalid {
                line,
                reason: format!("invalid timestamp '{raw_ts}'"),
            })?;

            let date = timestamp.date();
            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            let bar = Bar {
                timestamp,
                open: parse_price(&record, cols.open, "open", line)?,
                high: parse_price(&record, cols.high, "high", line)?,
                low: parse_price(&record, cols.low, "low", line)?,
                close: parse_price(&record, cols.close, "close", line)?,
            };
            rows.push((bar, line));
        }

        // Stable sort: among equal timestamps the earlier line stays first.
        rows.sort_by_key(|(bar, _)| bar.timestamp);
        if let Some(dup) = rows.windows(2).find(|w| w[0].0.timestamp == w[1].0.timestamp) {
            let (first, first_line) = &dup[0];
            return Err(StraddleError::DataInvalid {
                line: dup[1].1,
                reason: format!(
                    "duplicate timestamp {} (first seen at line {first_line})",
                    first.timestamp
                ),
            });
        }

        let bars: Vec<Bar> = rows.into_iter().map(|(bar, _)| bar).collect();

        debug!("Loaded {} bars from {}", bars.len(), self.path.display());
        Ok(bars)
    }
}
