#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::io::Write;
pub use straddle::domain::bar::Bar;
use straddle::domain::error::StraddleError;
use straddle::ports::data_port::DataPort;

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn source_name(&self) -> String {
        "mock".to_string()
    }

    fn fetch_bars(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, StraddleError> {
        if let Some(reason) = &self.error {
            return Err(StraddleError::DataLoad {
                path: "mock".to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| start_date.is_none_or(|s| b.date() >= s))
            .filter(|b| end_date.is_none_or(|e| b.date() <= e))
            .cloned()
            .collect())
    }
}

pub fn ts(date: &str, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(hh, mm, 0)
        .unwrap()
}

pub fn make_bar(date: &str, hh: u32, mm: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        timestamp: ts(date, hh, mm),
        open,
        high,
        low,
        close,
    }
}

/// A quiet bar whose range never reaches a 100-point stop from `price`.
pub fn quiet_bar(date: &str, hh: u32, mm: u32, price: f64) -> Bar {
    make_bar(date, hh, mm, price, price + 10.0, price - 10.0, price)
}

/// A day entered at 09:16 at `entry`, quiet until the 15:15 close at `close`.
pub fn session_close_day(date: &str, entry: f64, close: f64) -> Vec<Bar> {
    vec![
        quiet_bar(date, 9, 15, entry),
        quiet_bar(date, 9, 16, entry),
        quiet_bar(date, 12, 0, (entry + close) / 2.0),
        make_bar(date, 15, 15, close, close + 5.0, close - 5.0, close),
        quiet_bar(date, 15, 29, close),
    ]
}

/// A day whose 10:00 bar breaks the long stop.
pub fn stop_out_day(date: &str, entry: f64) -> Vec<Bar> {
    vec![
        quiet_bar(date, 9, 16, entry),
        make_bar(date, 10, 0, entry, entry + 20.0, entry - 150.0, entry - 120.0),
        quiet_bar(date, 15, 15, entry - 120.0),
    ]
}

/// A day that never prints a 09:16 bar.
pub fn no_entry_day(date: &str, price: f64) -> Vec<Bar> {
    vec![
        quiet_bar(date, 9, 15, price),
        quiet_bar(date, 9, 17, price),
        quiet_bar(date, 15, 15, price),
    ]
}

pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},100\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close
        ));
    }
    out
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
