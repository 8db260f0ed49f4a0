//! Incremental Exponential Moving Average.
//!
//! k = 2/(n+1). The first update seeds the value with the input price, then
//! EMA[i] = (C[i] - EMA[i-1]) * k + EMA[i-1].

use crate::domain::error::EmacrossError;
use crate::domain::indicator::IndicatorType;

#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    period: usize,
    k: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, EmacrossError> {
        if period == 0 {
            return Err(EmacrossError::InvalidConfiguration {
                reason: "EMA period must be positive".into(),
            });
        }
        Ok(Ema {
            period,
            k: 2.0 / (period as f64 + 1.0),
            value: None,
        })
    }

    /// Feed one price and return the updated value.
    ///
    /// The first call returns `price` unchanged; it is a seed, not a smoothed
    /// result.
    pub fn update(&mut self, price: f64) -> f64 {
        let next = match self.value {
            None => price,
            Some(prev) => (price - prev) * self.k + prev,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn smoothing(&self) -> f64 {
        self.k
    }

    pub fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Ema(self.period)
    }
}
