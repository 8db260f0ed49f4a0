//! Incremental technical indicators.
//!
//! Indicators here are updated one sample at a time and keep no history:
//! - `Ema`: exponential moving average
//! - `IndicatorType`: indicator identity + parameters, used for labelling

pub mod ema;

pub use ema::Ema;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
        }
    }
}
