//! Price series access port trait.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::bar::Bar;
use crate::domain::error::StraddleError;

/// Extent of a loaded price series.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRange {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    pub bars: usize,
    pub trading_days: usize,
}

pub trait DataPort {
    /// Human-readable name of the source, used in messages.
    fn source_name(&self) -> String;

    /// Load bars sorted ascending by timestamp, keeping only calendar dates
    /// inside the optional inclusive range.
    fn fetch_bars(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, StraddleError>;

    fn get_data_range(&self) -> Result<Option<DataRange>, StraddleError> {
        let bars = self.fetch_bars(None, None)?;
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return Ok(None);
        };
        let mut trading_days = 1;
        for pair in bars.windows(2) {
            if pair[0].date() != pair[1].date() {
                trading_days += 1;
            }
        }
        Ok(Some(DataRange {
            first: first.timestamp,
            last: last.timestamp,
            bars: bars.len(),
            trading_days,
        }))
    }
}
