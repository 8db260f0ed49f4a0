//! Trade records and trade intents.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// Instruction emitted by a strategy. Only the ledger turns it into balances.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub side: Side,
    pub price: f64,
    pub date: NaiveDateTime,
    pub reason: String,
}

/// Read-only snapshot of ledger balances handed to a strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Holdings {
    pub cash: f64,
    pub asset: f64,
}

/// Immutable snapshot taken when a trade executes.
///
/// `cash`, `asset`, `wallet` and `drawdown` are post-trade values. `profit`
/// and `profit_pct` are set on Sell records only.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDateTime,
    pub side: Side,
    pub price: f64,
    pub amount: f64,
    pub fee: f64,
    pub cash: f64,
    pub asset: f64,
    pub wallet: f64,
    pub drawdown: f64,
    pub reason: String,
    pub profit: Option<f64>,
    pub profit_pct: Option<f64>,
}

impl TradeRecord {
    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }
}
