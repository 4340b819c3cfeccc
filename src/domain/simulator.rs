//! Per-day straddle simulation.
//!
//! A day is entered at the open of the bar stamped exactly at the entry time.
//! From that moment a synthetic long and a synthetic short are held at the
//! same price, each guarded by a stop `stop_offset` away. Bars are scanned
//! forward from the entry bar inclusive:
//!
//! 1. a stop breach (low at or under the long stop, or high at or over the
//!    short stop) closes both legs at their stops, clamped to the bar range;
//! 2. otherwise a bar at or after the session close closes both legs at the
//!    bar close;
//! 3. if the day runs out first, the [`EndOfDataPolicy`] decides.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::pnl::{calculate_pnl, round2, CostModel, Direction};
use super::trading_day::TradingDay;

/// What to do when a day's bars end before a stop or the session close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndOfDataPolicy {
    /// Close both legs at the close of the last available bar.
    #[default]
    CloseAtLastBar,
    /// Leave exit price and time at the entry values.
    HoldAtEntry,
}

impl fmt::Display for EndOfDataPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndOfDataPolicy::CloseAtLastBar => write!(f, "close_at_last_bar"),
            EndOfDataPolicy::HoldAtEntry => write!(f, "hold_at_entry"),
        }
    }
}

impl FromStr for EndOfDataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close_at_last_bar" => Ok(EndOfDataPolicy::CloseAtLastBar),
            "hold_at_entry" => Ok(EndOfDataPolicy::HoldAtEntry),
            other => Err(format!(
                "unknown end-of-data policy '{other}', expected close_at_last_bar or hold_at_entry"
            )),
        }
    }
}

/// Parameters of the straddle itself.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub entry_time: NaiveTime,
    pub stop_offset: f64,
    pub session_close: NaiveTime,
    pub end_of_data: EndOfDataPolicy,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            entry_time: NaiveTime::from_hms_opt(9, 16, 0).unwrap_or_default(),
            stop_offset: 100.0,
            session_close: NaiveTime::from_hms_opt(15, 15, 0).unwrap_or_default(),
            end_of_data: EndOfDataPolicy::CloseAtLastBar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    SessionClose,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::SessionClose => write!(f, "session_close"),
            ExitReason::EndOfData => write!(f, "end_of_data"),
        }
    }
}

/// Result of one simulated day.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    pub date: NaiveDate,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub buy_exit_price: f64,
    pub sell_exit_price: f64,
    pub buy_pnl: f64,
    pub sell_pnl: f64,
    pub pnl: f64,
    pub exit_reason: ExitReason,
}

/// Stop levels of the two legs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stops {
    pub buy: f64,
    pub sell: f64,
}

impl Stops {
    pub fn around(entry_price: f64, offset: f64) -> Self {
        Stops {
            buy: entry_price - offset,
            sell: entry_price + offset,
        }
    }
}

struct Exit {
    time: NaiveDateTime,
    buy_price: f64,
    sell_price: f64,
    reason: ExitReason,
}

/// Simulate one trading day. Returns `None` when the day has no bar at the
/// entry time.
pub fn simulate_day(
    day: &TradingDay<'_>,
    params: &StrategyParams,
    costs: &CostModel,
) -> Option<TradeOutcome> {
    let entry_idx = day.position_at(params.entry_time)?;
    let entry_bar = &day.bars[entry_idx];
    let entry_price = entry_bar.open;
    let stops = Stops::around(entry_price, params.stop_offset);

    let exit = scan_for_exit(day, entry_idx, &stops, params).unwrap_or_else(|| {
        match params.end_of_data {
            EndOfDataPolicy::HoldAtEntry => Exit {
                time: entry_bar.timestamp,
                buy_price: entry_price,
                sell_price: entry_price,
                reason: ExitReason::EndOfData,
            },
            EndOfDataPolicy::CloseAtLastBar => {
                // The slice is non-empty: it holds at least the entry bar.
                let last = &day.bars[day.bars.len() - 1];
                Exit {
                    time: last.timestamp,
                    buy_price: last.close,
                    sell_price: last.close,
                    reason: ExitReason::EndOfData,
                }
            }
        }
    });

    let buy_pnl = calculate_pnl(entry_price, exit.buy_price, Direction::Buy, costs);
    let sell_pnl = calculate_pnl(entry_price, exit.sell_price, Direction::Sell, costs);

    Some(TradeOutcome {
        date: day.date,
        entry_time: entry_bar.timestamp,
        exit_time: exit.time,
        entry_price,
        buy_exit_price: exit.buy_price,
        sell_exit_price: exit.sell_price,
        buy_pnl,
        sell_pnl,
        pnl: round2(buy_pnl + sell_pnl),
        exit_reason: exit.reason,
    })
}

fn scan_for_exit(
    day: &TradingDay<'_>,
    entry_idx: usize,
    stops: &Stops,
    params: &StrategyParams,
) -> Option<Exit> {
    for bar in &day.bars[entry_idx..] {
        if bar.low <= stops.buy || bar.high >= stops.sell {
            return Some(Exit {
                time: bar.timestamp,
                buy_price: bar.low.max(stops.buy),
                sell_price: bar.high.min(stops.sell),
                reason: ExitReason::StopLoss,
            });
        }
        if bar.time() >= params.session_close {
            return Some(Exit {
                time: bar.timestamp,
                buy_price: bar.close,
                sell_price: bar.close,
                reason: ExitReason::SessionClose,
            });
        }
    }
    None
}

/// Simulate every day in order. Days without an entry bar yield no outcome.
#[cfg(not(feature = "parallel"))]
pub fn simulate_days(
    days: &[TradingDay<'_>],
    params: &StrategyParams,
    costs: &CostModel,
) -> Vec<TradeOutcome> {
    days.iter()
        .filter_map(|day| simulate_day(day, params, costs))
        .collect()
}

/// Simulate every day, fanning days out across the rayon pool. The
/// collected outcomes keep chronological order.
#[cfg(feature = "parallel")]
pub fn simulate_days(
    days: &[TradingDay<'_>],
    params: &StrategyParams,
    costs: &CostModel,
) -> Vec<TradeOutcome> {
    use rayon::prelude::*;

    days.par_iter()
        .filter_map(|day| simulate_day(day, params, costs))
        .collect()
}
