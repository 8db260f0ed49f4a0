//! CSV trade log adapter.
//!
//! Numeric fields are written with 8 fractional digits. Buy rows carry zero
//! profit columns.

use crate::domain::error::EmacrossError;
use crate::domain::trade::TradeRecord;
use crate::ports::trade_log_port::TradeLogPort;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 12] = [
    "Date",
    "Type",
    "Price",
    "Amount",
    "Fee",
    "USD",
    "Crypto",
    "Wallet",
    "Drawdown",
    "Reason",
    "Profit",
    "ProfitPerc",
];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvTradeLogAdapter;

impl CsvTradeLogAdapter {
    /// Write the log to any writer.
    pub fn write_to<W: Write>(trades: &[TradeRecord], writer: W) -> Result<(), EmacrossError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(HEADER).map_err(csv_error)?;

        for trade in trades {
            wtr.write_record(&[
                trade.date.format(DATE_FORMAT).to_string(),
                trade.side.to_string(),
                format_float(trade.price),
                format_float(trade.amount),
                format_float(trade.fee),
                format_float(trade.cash),
                format_float(trade.asset),
                format_float(trade.wallet),
                format_float(trade.drawdown),
                trade.reason.clone(),
                format_float(trade.profit.unwrap_or(0.0)),
                format_float(trade.profit_pct.unwrap_or(0.0)),
            ])
            .map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl TradeLogPort for CsvTradeLogAdapter {
    fn write(&self, trades: &[TradeRecord], output_path: &Path) -> Result<(), EmacrossError> {
        let file = std::fs::File::create(output_path).map_err(|e| EmacrossError::TradeLog {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        Self::write_to(trades, std::io::BufWriter::new(file))
    }
}

pub fn format_float(value: f64) -> String {
    format!("{:.8}", value)
}

fn csv_error(e: csv::Error) -> EmacrossError {
    EmacrossError::TradeLog {
        reason: format!("CSV write error: {}", e),
    }
}
