//! OHLCV candle representation.

use chrono::{DateTime, NaiveDateTime};

use super::error::EmacrossError;

/// One immutable OHLCV sample. `timestamp` is a millisecond UTC epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// UTC calendar time of `timestamp`.
    pub fn datetime(&self) -> Result<NaiveDateTime, EmacrossError> {
        timestamp_to_datetime(self.timestamp)
    }
}

pub fn timestamp_to_datetime(millis: i64) -> Result<NaiveDateTime, EmacrossError> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| EmacrossError::InvalidInput {
            reason: format!("timestamp {millis} is out of range"),
        })
}

pub fn datetime_to_timestamp(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}
