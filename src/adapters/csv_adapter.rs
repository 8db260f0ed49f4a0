//! CSV file candle adapter.
//!
//! One file per symbol and interval: `<base>/<SYMBOL>_<interval>.csv` with
//! header `timestamp,open,high,low,close,volume`.

use crate::domain::candle::{Candle, datetime_to_timestamp, timestamp_to_datetime};
use crate::domain::error::EmacrossError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }

    fn read_all(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>, EmacrossError> {
        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| EmacrossError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| EmacrossError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            // header is line 1
            candles.push(parse_record(&record, line + 2)?);
        }

        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

fn parse_record(record: &csv::StringRecord, line: usize) -> Result<Candle, EmacrossError> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| EmacrossError::Data {
                reason: format!("line {}: missing {} column", line, name),
            })
    };
    let number = |idx: usize, name: &str| -> Result<f64, EmacrossError> {
        let value: f64 = field(idx, name)?.parse().map_err(|e| EmacrossError::Data {
            reason: format!("line {}: invalid {} value: {}", line, name, e),
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(EmacrossError::Data {
                reason: format!(
                    "line {}: {} must be finite and non-negative, got {}",
                    line, name, value
                ),
            });
        }
        Ok(value)
    };

    Ok(Candle {
        timestamp: parse_timestamp(field(0, "timestamp")?, line)?,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: number(5, "volume")?,
    })
}

/// Millisecond epoch, or `YYYY-MM-DD HH:MM:SS` in UTC.
fn parse_timestamp(value: &str, line: usize) -> Result<i64, EmacrossError> {
    if let Ok(millis) = value.parse::<i64>() {
        return Ok(millis);
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(datetime_to_timestamp)
        .map_err(|e| EmacrossError::Data {
            reason: format!("line {}: invalid timestamp format: {}", line, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Candle>, EmacrossError> {
        let start_ms = datetime_to_timestamp(start);
        let end_ms = datetime_to_timestamp(end);
        let mut candles = self.read_all(symbol, interval)?;
        candles.retain(|c| c.timestamp >= start_ms && c.timestamp <= end_ms);
        Ok(candles)
    }

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, EmacrossError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| EmacrossError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", interval);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| EmacrossError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
        interval: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, EmacrossError> {
        let candles = self.read_all(symbol, interval)?;
        match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => Ok(Some((
                timestamp_to_datetime(first.timestamp)?,
                timestamp_to_datetime(last.timestamp)?,
                candles.len(),
            ))),
            _ => Ok(None),
        }
    }
}
