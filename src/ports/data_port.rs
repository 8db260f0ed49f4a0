//! Candle source port trait.

use crate::domain::candle::Candle;
use crate::domain::error::EmacrossError;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Candles for `symbol` within `[start, end]`, sorted by timestamp.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Candle>, EmacrossError>;

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, EmacrossError>;

    /// First timestamp, last timestamp and candle count, or `None` when empty.
    fn get_data_range(
        &self,
        symbol: &str,
        interval: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, EmacrossError>;
}
