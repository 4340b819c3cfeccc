//! Grouping of a price series into calendar trading days.

use chrono::{NaiveDate, NaiveTime};

use super::bar::Bar;

/// The contiguous run of bars sharing one calendar date.
#[derive(Debug, Clone, Copy)]
pub struct TradingDay<'a> {
    pub date: NaiveDate,
    pub bars: &'a [Bar],
}

impl<'a> TradingDay<'a> {
    /// Index of the bar stamped exactly at `time`, if the day has one.
    pub fn position_at(&self, time: NaiveTime) -> Option<usize> {
        self.bars.iter().position(|b| b.time() == time)
    }
}

/// Split an ascending bar series into trading days, in chronological order.
///
/// Bars are assumed sorted by timestamp; a date that reappears after another
/// date starts a new run rather than being merged.
pub fn group_by_day(bars: &[Bar]) -> Vec<TradingDay<'_>> {
    bars.chunk_by(|a, b| a.date() == b.date())
        .map(|chunk| TradingDay {
            date: chunk[0].date(),
            bars: chunk,
        })
        .collect()
}
