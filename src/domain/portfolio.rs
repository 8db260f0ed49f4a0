//! Portfolio ledger: balances, fees, drawdown and the trade log.
//!
//! All-in/all-out: a Buy converts all cash to the asset, a Sell converts all
//! of the asset back to cash. The ledger is the only owner of balances;
//! strategies talk to it through [`TradeIntent`].

use chrono::NaiveDateTime;
use tracing::debug;

use super::error::EmacrossError;
use super::trade::{Holdings, Side, TradeIntent, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub asset: f64,
    pub fee_rate: f64,
    pub initial_cash: f64,
    pub all_time_high: f64,
    pub current_value: f64,
    pub max_drawdown: f64,
    pub total_fees: f64,
    pub trades: Vec<TradeRecord>,
}

impl Portfolio {
    pub fn new(initial_cash: f64, fee_rate: f64) -> Result<Self, EmacrossError> {
        if !(initial_cash.is_finite() && initial_cash > 0.0) {
            return Err(EmacrossError::InvalidConfiguration {
                reason: format!("initial cash must be positive, got {initial_cash}"),
            });
        }
        if !(0.0..1.0).contains(&fee_rate) {
            return Err(EmacrossError::InvalidConfiguration {
                reason: format!("fee rate must be in [0, 1), got {fee_rate}"),
            });
        }
        Ok(Portfolio {
            cash: initial_cash,
            asset: 0.0,
            fee_rate,
            initial_cash,
            all_time_high: initial_cash,
            current_value: initial_cash,
            max_drawdown: 0.0,
            total_fees: 0.0,
            trades: Vec::new(),
        })
    }

    pub fn holdings(&self) -> Holdings {
        Holdings {
            cash: self.cash,
            asset: self.asset,
        }
    }

    /// Dispatch an intent to [`Portfolio::buy`] or [`Portfolio::sell`].
    pub fn execute(
        &mut self,
        intent: &TradeIntent,
    ) -> Result<Option<&TradeRecord>, EmacrossError> {
        match intent.side {
            Side::Buy => self.buy(intent.date, intent.price, &intent.reason),
            Side::Sell => self.sell(intent.date, intent.price, &intent.reason),
        }
    }

    /// Spend all cash on the asset. Returns `Ok(None)` when there is no cash.
    pub fn buy(
        &mut self,
        date: NaiveDateTime,
        price: f64,
        reason: &str,
    ) -> Result<Option<&TradeRecord>, EmacrossError> {
        validate_price(price)?;
        if self.cash <= 0.0 {
            debug!(%date, price, "buy skipped: no cash");
            return Ok(None);
        }
        if self.asset > 0.0 {
            return Err(EmacrossError::InvalidState {
                reason: format!("buy at {date} while holding {} units", self.asset),
            });
        }

        let fee = self.cash * self.fee_rate;
        let net_investment = self.cash - fee;
        let amount = net_investment / price;

        self.asset += amount;
        self.cash = 0.0;
        self.current_value = self.asset * price;
        self.total_fees += fee;
        let drawdown = self.update_drawdown();

        debug!(%date, price, amount, fee, equity = self.current_value, "buy executed");

        self.trades.push(TradeRecord {
            date,
            side: Side::Buy,
            price,
            amount,
            fee,
            cash: self.cash,
            asset: self.asset,
            wallet: self.current_value,
            drawdown,
            reason: reason.to_string(),
            profit: None,
            profit_pct: None,
        });
        Ok(self.trades.last())
    }

    /// Sell the whole asset balance. Returns `Ok(None)` when nothing is held.
    ///
    /// Profit is measured against the cost of the open position, which must
    /// be the immediately preceding Buy record.
    pub fn sell(
        &mut self,
        date: NaiveDateTime,
        price: f64,
        reason: &str,
    ) -> Result<Option<&TradeRecord>, EmacrossError> {
        validate_price(price)?;
        if self.asset <= 0.0 {
            debug!(%date, price, "sell skipped: no asset held");
            return Ok(None);
        }

        let entry_price = self.open_position_entry_price(date)?;
        let cost_basis = self.asset * entry_price;

        let amount = self.asset;
        let gross_proceeds = amount * price;
        let fee = gross_proceeds * self.fee_rate;
        let net_proceeds = gross_proceeds - fee;
        let profit = net_proceeds - cost_basis;
        let profit_pct = profit / cost_basis * 100.0;

        self.cash += net_proceeds;
        self.asset = 0.0;
        self.current_value = self.cash;
        self.total_fees += fee;
        let drawdown = self.update_drawdown();

        debug!(%date, price, amount, fee, profit, equity = self.current_value, "sell executed");

        self.trades.push(TradeRecord {
            date,
            side: Side::Sell,
            price,
            amount,
            fee,
            cash: self.cash,
            asset: self.asset,
            wallet: self.current_value,
            drawdown,
            reason: reason.to_string(),
            profit: Some(profit),
            profit_pct: Some(profit_pct),
        });
        Ok(self.trades.last())
    }

    /// cash + asset * price
    pub fn current_value(&self, price: f64) -> f64 {
        self.cash + self.asset * price
    }

    pub fn last_trade(&self) -> Option<&TradeRecord> {
        self.trades.last()
    }

    fn open_position_entry_price(&self, date: NaiveDateTime) -> Result<f64, EmacrossError> {
        let entry = match self.trades.last() {
            Some(trade) if trade.is_buy() => trade,
            Some(_) => {
                return Err(EmacrossError::InvalidState {
                    reason: format!("sell at {date}: last trade is not a buy"),
                });
            }
            None => {
                return Err(EmacrossError::InvalidState {
                    reason: format!("sell at {date} with no prior buy"),
                });
            }
        };
        // all-in/all-out: the whole balance came from the last buy
        if self.asset != entry.amount {
            return Err(EmacrossError::InvalidState {
                reason: format!(
                    "held {} units but the open buy acquired {}",
                    self.asset, entry.amount
                ),
            });
        }
        Ok(entry.price)
    }

    fn update_drawdown(&mut self) -> f64 {
        if self.current_value > self.all_time_high {
            self.all_time_high = self.current_value;
        }
        if self.all_time_high == 0.0 {
            return 0.0;
        }
        let drawdown = (self.current_value - self.all_time_high) / self.all_time_high;
        if drawdown < self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        drawdown
    }
}

fn validate_price(price: f64) -> Result<(), EmacrossError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(EmacrossError::InvalidInput {
            reason: format!("execution price must be positive, got {price}"),
        })
    }
}
