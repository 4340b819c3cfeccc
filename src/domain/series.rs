//! Augmented per-bar series: trade markers, running PnL, balance and drawdown.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::bar::Bar;
use super::pnl::round2;
use super::simulator::TradeOutcome;

#[derive(Debug, Clone, PartialEq)]
pub struct DailySeriesRow {
    pub bar: Bar,
    pub trade_signal: bool,
    pub trade_exit: bool,
    pub trade_pnl: f64,
    pub cumulative_pnl: f64,
    pub account_balance: f64,
    pub peak: f64,
    pub drawdown: f64,
}

impl DailySeriesRow {
    fn from_bar(bar: &Bar) -> Self {
        DailySeriesRow {
            bar: bar.clone(),
            trade_signal: false,
            trade_exit: false,
            trade_pnl: 0.0,
            cumulative_pnl: 0.0,
            account_balance: 0.0,
            peak: 0.0,
            drawdown: 0.0,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.bar.timestamp
    }
}

/// Build the augmented series from the bars and the day outcomes.
///
/// Each outcome marks its entry row and stores its PnL on its exit row.
/// Running totals are then computed in row order.
pub fn build_series(
    bars: &[Bar],
    outcomes: &[TradeOutcome],
    initial_capital: f64,
) -> Vec<DailySeriesRow> {
    let mut rows: Vec<DailySeriesRow> = bars.iter().map(DailySeriesRow::from_bar).collect();
    let index: HashMap<NaiveDateTime, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.timestamp(), i))
        .collect();

    for outcome in outcomes {
        if let Some(&i) = index.get(&outcome.entry_time) {
            rows[i].trade_signal = true;
        }
        if let Some(&i) = index.get(&outcome.exit_time) {
            rows[i].trade_exit = true;
            rows[i].trade_pnl = outcome.pnl;
        }
    }

    accumulate(&mut rows, initial_capital);
    rows
}

/// Fill cumulative PnL, balance, running peak and drawdown in place.
pub fn accumulate(rows: &mut [DailySeriesRow], initial_capital: f64) {
    let mut cumulative = 0.0_f64;
    let mut peak = f64::NEG_INFINITY;

    for row in rows.iter_mut() {
        cumulative += row.trade_pnl;
        row.cumulative_pnl = round2(cumulative);
        row.account_balance = round2(initial_capital + row.cumulative_pnl);

        peak = peak.max(row.account_balance);
        row.peak = peak;
        row.drawdown = drawdown_pct(row.account_balance, peak);
    }
}

/// Percentage decline of `balance` from `peak`; zero or negative.
pub fn drawdown_pct(balance: f64, peak: f64) -> f64 {
    if peak > 0.0 {
        (balance - peak) / peak * 100.0
    } else {
        0.0
    }
}

/// Worst drawdown across the series, 0.0 for an empty one.
pub fn max_drawdown(rows: &[DailySeriesRow]) -> f64 {
    rows.iter().map(|r| r.drawdown).fold(0.0_f64, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::simulator::ExitReason;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn ts(day: u32, hh: u32, mm: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hh, mm, 0)
            .unwrap()
    }

    fn bar_at(t: NaiveDateTime) -> Bar {
        Bar {
            timestamp: t,
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
        }
    }

    fn outcome(entry: NaiveDateTime, exit: NaiveDateTime, pnl: f64) -> TradeOutcome {
        TradeOutcome {
            date: entry.date(),
            entry_time: entry,
            exit_time: exit,
            entry_price: 100.0,
            buy_exit_price: 100.0,
            sell_exit_price: 100.0,
            buy_pnl: pnl / 2.0,
            sell_pnl: pnl / 2.0,
            pnl,
            exit_reason: ExitReason::SessionClose,
        }
    }

    fn rows_with_pnl(pnls: &[f64]) -> Vec<DailySeriesRow> {
        let mut rows: Vec<DailySeriesRow> = pnls
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let mut row = DailySeriesRow::from_bar(&bar_at(ts(1, 9, i as u32)));
                row.trade_pnl = p;
                row
            })
            .collect();
        accumulate(&mut rows, 1000.0);
        rows
    }

    #[test]
    fn marks_entry_and_exit_rows_only() {
        let bars: Vec<Bar> = [ts(1, 9, 15), ts(1, 9, 16), ts(1, 12, 0), ts(1, 15, 15)]
            .into_iter()
            .map(bar_at)
            .collect();
        let rows = build_series(&bars, &[outcome(ts(1, 9, 16), ts(1, 15, 15), 250.0)], 1000.0);

        assert!(!rows[0].trade_signal && !rows[0].trade_exit);
        assert!(rows[1].trade_signal && !rows[1].trade_exit);
        assert!(!rows[2].trade_signal && !rows[2].trade_exit);
        assert!(rows[3].trade_exit && !rows[3].trade_signal);
        assert_abs_diff_eq!(rows[3].trade_pnl, 250.0);
        assert_abs_diff_eq!(rows[2].trade_pnl, 0.0);
    }

    #[test]
    fn same_bar_entry_and_exit() {
        let bars = vec![bar_at(ts(1, 9, 16))];
        let rows = build_series(&bars, &[outcome(ts(1, 9, 16), ts(1, 9, 16), -100.0)], 1000.0);
        assert!(rows[0].trade_signal && rows[0].trade_exit);
        assert_abs_diff_eq!(rows[0].account_balance, 900.0);
    }

    #[test]
    fn cumulative_and_balance() {
        let rows = rows_with_pnl(&[0.0, 100.0, 0.0, -50.5, 25.25]);
        let cum: Vec<f64> = rows.iter().map(|r| r.cumulative_pnl).collect();
        assert_eq!(cum, vec![0.0, 100.0, 100.0, 49.5, 74.75]);
        assert_abs_diff_eq!(rows[4].account_balance, 1074.75);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let rows = rows_with_pnl(&[100.0, -220.0, 50.0, 200.0]);
        // balances: 1100, 880, 930, 1130
        assert_abs_diff_eq!(rows[0].drawdown, 0.0);
        assert_abs_diff_eq!(rows[1].peak, 1100.0);
        assert_abs_diff_eq!(rows[1].drawdown, -20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[3].drawdown, 0.0);
        assert_abs_diff_eq!(max_drawdown(&rows), -20.0, epsilon = 1e-9);
    }

    #[test]
    fn max_drawdown_of_empty_series_is_zero() {
        assert_abs_diff_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn drawdown_pct_guards_non_positive_peak() {
        assert_abs_diff_eq!(drawdown_pct(-10.0, 0.0), 0.0);
        assert_abs_diff_eq!(drawdown_pct(90.0, 100.0), -10.0);
    }
}
