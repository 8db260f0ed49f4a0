//! EMA crossover strategy state machine.
//!
//! Each tick feeds the close to a fast and a slow EMA. Fast above slow with
//! cash available emits a Buy; fast below slow with asset held emits a Sell.
//! Two consecutive intents never share a side.

use chrono::NaiveDateTime;

use crate::domain::error::EmacrossError;
use crate::domain::indicator::Ema;
use crate::domain::trade::{Holdings, Side, TradeIntent};

pub const BUY_REASON: &str = "EMA Cross Over";
pub const SELL_REASON: &str = "EMA Cross Under";

#[derive(Debug, Clone, PartialEq)]
pub struct EmaCrossStrategy {
    fast: Ema,
    slow: Ema,
    last_side: Option<Side>,
}

impl EmaCrossStrategy {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self, EmacrossError> {
        Ok(EmaCrossStrategy {
            fast: Ema::new(fast_period)?,
            slow: Ema::new(slow_period)?,
            last_side: None,
        })
    }

    /// Consume one price sample and decide whether to trade.
    ///
    /// The caller executes the returned intent against the ledger. Samples
    /// must arrive in non-decreasing time order.
    pub fn on_tick(
        &mut self,
        price: f64,
        date: NaiveDateTime,
        holdings: Holdings,
    ) -> Option<TradeIntent> {
        let fast = self.fast.update(price);
        let slow = self.slow.update(price);

        if !self.is_ready() {
            return None;
        }

        let side = if fast > slow && holdings.cash > 0.0 && self.last_side != Some(Side::Buy) {
            Side::Buy
        } else if fast < slow && holdings.asset > 0.0 && self.last_side != Some(Side::Sell) {
            Side::Sell
        } else {
            return None;
        };

        self.last_side = Some(side);
        let reason = match side {
            Side::Buy => BUY_REASON,
            Side::Sell => SELL_REASON,
        };
        Some(TradeIntent {
            side,
            price,
            date,
            reason: reason.to_string(),
        })
    }

    pub fn is_ready(&self) -> bool {
        self.fast.is_ready() && self.slow.is_ready()
    }

    pub fn last_side(&self) -> Option<Side> {
        self.last_side
    }

    pub fn fast(&self) -> &Ema {
        &self.fast
    }

    pub fn slow(&self) -> &Ema {
        &self.slow
    }

    pub fn name(&self) -> String {
        format!(
            "{}/{} crossover",
            self.fast.indicator_type(),
            self.slow.indicator_type()
        )
    }
}
