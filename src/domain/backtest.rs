//! Backtest configuration and the end-to-end run over a loaded price series.

use chrono::NaiveDate;
use tracing::{debug, info, trace};

use super::bar::Bar;
use super::metrics::{monthly_rollup, MonthlySummary, Summary};
use super::pnl::CostModel;
use super::series::{build_series, DailySeriesRow};
use super::simulator::{simulate_days, StrategyParams, TradeOutcome};
use super::trading_day::group_by_day;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub costs: CostModel,
    pub strategy: StrategyParams,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 400_000.0,
            costs: CostModel::default(),
            strategy: StrategyParams::default(),
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub rows: Vec<DailySeriesRow>,
    pub outcomes: Vec<TradeOutcome>,
    pub monthly: Vec<MonthlySummary>,
    pub summary: Summary,
}

/// Simulate every trading day in `bars` and aggregate the results.
///
/// `bars` must be sorted ascending by timestamp.
pub fn run_backtest(bars: &[Bar], config: &BacktestConfig) -> BacktestResult {
    let days = group_by_day(bars);
    info!("Simulating {} trading days ({} bars)", days.len(), bars.len());

    let outcomes = simulate_days(&days, &config.strategy, &config.costs);
    for outcome in &outcomes {
        trace!(
            date = %outcome.date,
            entry = outcome.entry_price,
            buy_exit = outcome.buy_exit_price,
            sell_exit = outcome.sell_exit_price,
            pnl = outcome.pnl,
            reason = %outcome.exit_reason,
            "trade closed"
        );
    }
    debug!(
        "{} trades, {} days without a {} bar",
        outcomes.len(),
        days.len() - outcomes.len(),
        config.strategy.entry_time.format("%H:%M")
    );

    let rows = build_series(bars, &outcomes, config.initial_capital);
    let monthly = monthly_rollup(&rows, config.initial_capital);
    let summary = Summary::compute(&rows, &outcomes, days.len(), config.initial_capital);

    BacktestResult {
        rows,
        outcomes,
        monthly,
        summary,
    }
}
