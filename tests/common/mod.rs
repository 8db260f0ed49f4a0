#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use emacross::domain::backtest::BacktestConfig;
pub use emacross::domain::candle::Candle;
use emacross::domain::candle::datetime_to_timestamp;
use emacross::domain::error::EmacrossError;
use emacross::domain::trade::TradeRecord;
use emacross::ports::data_port::DataPort;
use emacross::ports::trade_log_port::TradeLogPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(
        &self,
        symbol: &str,
        _interval: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Candle>, EmacrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(EmacrossError::Data {
                reason: reason.clone(),
            });
        }
        let (start, end) = (datetime_to_timestamp(start), datetime_to_timestamp(end));
        Ok(self
            .data
            .get(symbol)
            .map(|candles| {
                candles
                    .iter()
                    .filter(|c| c.timestamp >= start && c.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, _interval: &str) -> Result<Vec<String>, EmacrossError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn get_data_range(
        &self,
        _symbol: &str,
        _interval: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, EmacrossError> {
        Ok(None)
    }
}

/// Trade log sink that keeps the written records in memory.
#[derive(Default)]
pub struct RecordingTradeLog {
    pub written: RefCell<Vec<(PathBuf, Vec<TradeRecord>)>>,
}

impl TradeLogPort for RecordingTradeLog {
    fn write(&self, trades: &[TradeRecord], output_path: &Path) -> Result<(), EmacrossError> {
        self.written
            .borrow_mut()
            .push((output_path.to_path_buf(), trades.to_vec()));
        Ok(())
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn hour(i: i64) -> NaiveDateTime {
    start() + chrono::Duration::hours(i)
}

/// Hourly candles starting at 2024-01-01 00:00 UTC.
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            timestamp: datetime_to_timestamp(hour(i as i64)),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        })
        .collect()
}

pub fn rising(count: usize, start_price: f64) -> Vec<f64> {
    (0..count).map(|i| start_price + i as f64).collect()
}

/// Triangle wave between `low` and `high`, `half` steps each way.
pub fn zigzag(cycles: usize, half: usize, low: f64, high: f64) -> Vec<f64> {
    let step = (high - low) / half as f64;
    let mut out = Vec::new();
    for _ in 0..cycles {
        for i in 0..half {
            out.push(low + step * i as f64);
        }
        for i in 0..half {
            out.push(high - step * i as f64);
        }
    }
    out
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        symbol: "ETHUSDT".into(),
        interval: "1h".into(),
        start_date: start(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        initial_cash: 1000.0,
        fee_rate: 0.001,
        fast_period: 3,
        slow_period: 8,
    }
}
