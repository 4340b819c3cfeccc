//! Configuration validation and conversion into a [`BacktestConfig`].
//!
//! All values are checked before a backtest runs; missing keys fall back to
//! the house defaults.

use chrono::{NaiveDate, NaiveTime};

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::StraddleError;
use crate::domain::pnl::CostModel;
use crate::domain::simulator::{EndOfDataPolicy, StrategyParams};
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StraddleError> {
    build_backtest_config(config)?;
    report_charts(config)?;
    Ok(())
}

/// Read, validate and assemble the full backtest configuration.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, StraddleError> {
    let defaults = BacktestConfig::default();

    let initial_capital =
        number_or(config, "backtest", "initial_capital", defaults.initial_capital)?;
    if initial_capital <= 0.0 {
        return Err(StraddleError::invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    let costs = build_cost_model(config, &defaults.costs)?;
    let strategy = build_strategy_params(config, &defaults.strategy)?;
    let (start_date, end_date) = build_date_range(config)?;

    Ok(BacktestConfig {
        initial_capital,
        costs,
        strategy,
        start_date,
        end_date,
    })
}

fn build_cost_model(config: &dyn ConfigPort, defaults: &CostModel) -> Result<CostModel, StraddleError> {
    let lot_size = number_or(config, "backtest", "lot_size", defaults.lot_size)?;
    if lot_size <= 0.0 {
        return Err(StraddleError::invalid(
            "backtest",
            "lot_size",
            "lot_size must be positive",
        ));
    }

    let charges_per_trade =
        number_or(config, "backtest", "charges_per_trade", defaults.charges_per_trade)?;
    if charges_per_trade < 0.0 {
        return Err(StraddleError::invalid(
            "backtest",
            "charges_per_trade",
            "charges_per_trade must be non-negative",
        ));
    }

    let slippage = number_or(config, "backtest", "slippage", defaults.slippage)?;
    if !(0.0..1.0).contains(&slippage) {
        return Err(StraddleError::invalid(
            "backtest",
            "slippage",
            "slippage must be a fraction in [0, 1)",
        ));
    }

    Ok(CostModel {
        lot_size,
        charges_per_trade,
        slippage,
    })
}

fn build_strategy_params(
    config: &dyn ConfigPort,
    defaults: &StrategyParams,
) -> Result<StrategyParams, StraddleError> {
    let entry_time = time_or(config, "entry_time", defaults.entry_time)?;
    let session_close = time_or(config, "session_close", defaults.session_close)?;
    if entry_time >= session_close {
        return Err(StraddleError::invalid(
            "strategy",
            "entry_time",
            "entry_time must be before session_close",
        ));
    }

    let stop_offset = number_or(config, "strategy", "stop_offset", defaults.stop_offset)?;
    if stop_offset <= 0.0 {
        return Err(StraddleError::invalid(
            "strategy",
            "stop_offset",
            "stop_offset must be positive",
        ));
    }

    let end_of_data = match config.get_string("strategy", "end_of_data") {
        Some(raw) => raw
            .parse::<EndOfDataPolicy>()
            .map_err(|reason| StraddleError::invalid("strategy", "end_of_data", reason))?,
        None => defaults.end_of_data,
    };

    Ok(StrategyParams {
        entry_time,
        stop_offset,
        session_close,
        end_of_data,
    })
}

/// Whether the report should include charts; `[report] charts`, default on.
pub fn report_charts(config: &dyn ConfigPort) -> Result<bool, StraddleError> {
    match config.get_bool("report", "charts") {
        None => Ok(true),
        Some(Ok(b)) => Ok(b),
        Some(Err(raw)) => Err(StraddleError::invalid(
            "report",
            "charts",
            format!("invalid boolean '{raw}', expected true or false"),
        )),
    }
}

fn number_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, StraddleError> {
    match config.get_double(section, key) {
        None => Ok(default),
        Some(Ok(v)) if v.is_finite() => Ok(v),
        Some(Ok(v)) => Err(StraddleError::invalid(
            section,
            key,
            format!("{key} must be finite, got {v}"),
        )),
        Some(Err(raw)) => Err(StraddleError::invalid(
            section,
            key,
            format!("invalid number '{raw}'"),
        )),
    }
}

fn time_or(config: &dyn ConfigPort, key: &str, default: NaiveTime) -> Result<NaiveTime, StraddleError> {
    match config.get_time("strategy", key) {
        None => Ok(default),
        Some(Ok(t)) => Ok(t),
        Some(Err(raw)) => Err(StraddleError::invalid(
            "strategy",
            key,
            format!("invalid time '{raw}', expected HH:MM or HH:MM:SS"),
        )),
    }
}

fn build_date_range(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), StraddleError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;

    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(StraddleError::invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok((start, end))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, StraddleError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                StraddleError::invalid(
                    "backtest",
                    field,
                    format!("invalid {} format, expected YYYY-MM-DD", field),
                )
            }),
    }
}
