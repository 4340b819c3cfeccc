//! File report adapter implementing [`ReportPort`].
//!
//! Writes the augmented per-bar table and the monthly summary as CSV, and
//! optionally the four SVG charts next to them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::adapters::svg_chart;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::StraddleError;
use crate::domain::metrics::MonthlySummary;
use crate::domain::series::DailySeriesRow;
use crate::ports::report_port::ReportPort;

pub const RESULTS_FILE: &str = "strategy_results.csv";
pub const MONTHLY_FILE: &str = "monthly_returns.csv";

#[derive(Serialize)]
struct ResultRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Trade_Signal")]
    trade_signal: bool,
    #[serde(rename = "Trade_Exit")]
    trade_exit: bool,
    #[serde(rename = "Trade_PnL")]
    trade_pnl: f64,
    #[serde(rename = "Cumulative_PnL")]
    cumulative_pnl: f64,
    #[serde(rename = "Account_Balance")]
    account_balance: f64,
    #[serde(rename = "Peak")]
    peak: f64,
    #[serde(rename = "Drawdown")]
    drawdown: f64,
}

impl From<&DailySeriesRow> for ResultRecord {
    fn from(row: &DailySeriesRow) -> Self {
        ResultRecord {
            date: row.timestamp().format("%Y-%m-%d %H:%M:%S").to_string(),
            open: row.bar.open,
            high: row.bar.high,
            low: row.bar.low,
            close: row.bar.close,
            trade_signal: row.trade_signal,
            trade_exit: row.trade_exit,
            trade_pnl: row.trade_pnl,
            cumulative_pnl: row.cumulative_pnl,
            account_balance: row.account_balance,
            peak: row.peak,
            drawdown: row.drawdown,
        }
    }
}

#[derive(Serialize)]
struct MonthlyRecord {
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Trade_PnL")]
    trade_pnl: f64,
    #[serde(rename = "Account_Balance")]
    account_balance: f64,
    #[serde(rename = "Return_%")]
    return_pct: f64,
    #[serde(rename = "Cumulative_Return_%")]
    cumulative_return_pct: f64,
}

impl From<&MonthlySummary> for MonthlyRecord {
    fn from(m: &MonthlySummary) -> Self {
        MonthlyRecord {
            month: m.month.to_string(),
            trade_pnl: m.trade_pnl,
            account_balance: m.account_balance,
            return_pct: m.return_pct,
            cumulative_return_pct: m.cumulative_return_pct,
        }
    }
}

pub struct CsvReportAdapter {
    charts: bool,
}

impl CsvReportAdapter {
    pub fn new(charts: bool) -> Self {
        Self { charts }
    }

    fn write_records<T, I>(path: &Path, records: I) -> Result<(), StraddleError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let report_err = |e: csv::Error| StraddleError::Report {
            reason: format!("failed to write {}: {}", path.display(), e),
        };
        let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
        for record in records {
            wtr.serialize(record).map_err(report_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_chart(path: PathBuf, svg: String, written: &mut Vec<PathBuf>) -> Result<(), StraddleError> {
        if svg.is_empty() {
            return Ok(());
        }
        fs::write(&path, svg)?;
        written.push(path);
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, StraddleError> {
        fs::create_dir_all(output_dir)?;
        let mut written = Vec::new();

        let results_path = output_dir.join(RESULTS_FILE);
        Self::write_records(&results_path, result.rows.iter().map(ResultRecord::from))?;
        written.push(results_path);

        let monthly_path = output_dir.join(MONTHLY_FILE);
        Self::write_records(&monthly_path, result.monthly.iter().map(MonthlyRecord::from))?;
        written.push(monthly_path);

        if self.charts {
            Self::write_chart(
                output_dir.join("account_balance.svg"),
                svg_chart::balance_chart(&result.rows),
                &mut written,
            )?;
            Self::write_chart(
                output_dir.join("monthly_returns.svg"),
                svg_chart::monthly_returns_chart(&result.monthly),
                &mut written,
            )?;
            Self::write_chart(
                output_dir.join("cumulative_returns.svg"),
                svg_chart::cumulative_returns_chart(&result.monthly),
                &mut written,
            )?;
            Self::write_chart(
                output_dir.join("drawdown.svg"),
                svg_chart::drawdown_chart(&result.rows),
                &mut written,
            )?;
        }

        for path in &written {
            info!("Wrote {}", path.display());
        }
        Ok(written)
    }
}
