//! Monthly rollup and run-level performance summary.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;

use super::pnl::round2;
use super::series::{max_drawdown, DailySeriesRow};
use super::simulator::{ExitReason, TradeOutcome};

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub month: YearMonth,
    pub trade_pnl: f64,
    /// Balance on the last row of the month.
    pub account_balance: f64,
    pub return_pct: f64,
    pub cumulative_return_pct: f64,
}

/// Group rows by calendar month: summed PnL, closing balance, and returns
/// measured against the initial capital.
pub fn monthly_rollup(rows: &[DailySeriesRow], initial_capital: f64) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();

    for row in rows {
        let ts = row.timestamp();
        let key = YearMonth {
            year: ts.year(),
            month: ts.month(),
        };
        let entry = months.entry(key).or_insert((0.0, row.account_balance));
        entry.0 += row.trade_pnl;
        entry.1 = row.account_balance;
    }

    months
        .into_iter()
        .map(|(month, (pnl, balance))| MonthlySummary {
            month,
            trade_pnl: round2(pnl),
            account_balance: balance,
            return_pct: round2(pct_of(pnl, initial_capital)),
            cumulative_return_pct: round2(pct_of(balance - initial_capital, initial_capital)),
        })
        .collect()
}

fn pct_of(value: f64, base: f64) -> f64 {
    if base != 0.0 {
        value / base * 100.0
    } else {
        0.0
    }
}

/// Scalar figures for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub total_pnl: f64,
    pub final_balance: f64,
    pub overall_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: f64,
    pub average_trade_pnl: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub stop_loss_exits: usize,
    pub session_close_exits: usize,
    pub end_of_data_exits: usize,
    pub trading_days: usize,
    pub skipped_days: usize,
}

impl Summary {
    pub fn compute(
        rows: &[DailySeriesRow],
        outcomes: &[TradeOutcome],
        trading_days: usize,
        initial_capital: f64,
    ) -> Self {
        let total_trades = rows.iter().filter(|r| r.trade_signal).count();
        let total_pnl = round2(rows.iter().map(|r| r.trade_pnl).sum::<f64>());
        let final_balance = rows
            .last()
            .map(|r| r.account_balance)
            .unwrap_or(initial_capital);

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut breakeven_trades = 0usize;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut stop_loss_exits = 0usize;
        let mut session_close_exits = 0usize;
        let mut end_of_data_exits = 0usize;

        for outcome in outcomes {
            let pnl = outcome.pnl;
            if pnl > 0.0 {
                winning_trades += 1;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                losing_trades += 1;
                largest_loss = largest_loss.min(pnl);
            } else {
                breakeven_trades += 1;
            }

            match outcome.exit_reason {
                ExitReason::StopLoss => stop_loss_exits += 1,
                ExitReason::SessionClose => session_close_exits += 1,
                ExitReason::EndOfData => end_of_data_exits += 1,
            }
        }

        let closed = outcomes.len();
        let win_rate = if closed > 0 {
            winning_trades as f64 / closed as f64
        } else {
            0.0
        };
        let average_trade_pnl = if closed > 0 {
            round2(outcomes.iter().map(|o| o.pnl).sum::<f64>() / closed as f64)
        } else {
            0.0
        };

        Summary {
            total_trades,
            total_pnl,
            final_balance,
            overall_return_pct: pct_of(final_balance - initial_capital, initial_capital),
            max_drawdown_pct: max_drawdown(rows),
            winning_trades,
            losing_trades,
            breakeven_trades,
            win_rate,
            average_trade_pnl,
            largest_win,
            largest_loss,
            stop_loss_exits,
            session_close_exits,
            end_of_data_exits,
            trading_days,
            skipped_days: trading_days.saturating_sub(closed),
        }
    }
}
