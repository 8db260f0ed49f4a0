//! Backtest replay driver.
//!
//! BacktestConfig holds the run parameters; `run_backtest` replays candles
//! through a fresh strategy and ledger.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::candle::Candle;
use super::error::EmacrossError;
use super::portfolio::Portfolio;
use super::strategy::EmaCrossStrategy;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub interval: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub initial_cash: f64,
    pub fee_rate: f64,
    pub fast_period: usize,
    pub slow_period: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub final_price: f64,
    pub candles_processed: usize,
}

impl BacktestResult {
    pub fn final_value(&self) -> f64 {
        self.portfolio.current_value(self.final_price)
    }
}

/// Replay `candles` in order. Any error aborts the whole run.
pub fn run_backtest(
    candles: &[Candle],
    config: &BacktestConfig,
) -> Result<BacktestResult, EmacrossError> {
    let last = candles.last().ok_or_else(|| EmacrossError::NoData {
        symbol: config.symbol.clone(),
    })?;

    let mut portfolio = Portfolio::new(config.initial_cash, config.fee_rate)?;
    let mut strategy = EmaCrossStrategy::new(config.fast_period, config.slow_period)?;

    info!(
        symbol = %config.symbol,
        strategy = %strategy.name(),
        candles = candles.len(),
        "running backtest"
    );

    let mut prev_timestamp = i64::MIN;
    for candle in candles {
        if candle.timestamp < prev_timestamp {
            return Err(EmacrossError::InvalidInput {
                reason: format!(
                    "candle at {} precedes previous candle at {}",
                    candle.timestamp, prev_timestamp
                ),
            });
        }
        prev_timestamp = candle.timestamp;
        if !candle.close.is_finite() {
            return Err(EmacrossError::InvalidInput {
                reason: format!(
                    "candle at {} has non-finite close {}",
                    candle.timestamp, candle.close
                ),
            });
        }

        let date = candle.datetime()?;
        if let Some(intent) = strategy.on_tick(candle.close, date, portfolio.holdings()) {
            if portfolio.execute(&intent)?.is_none() {
                debug!(%date, side = %intent.side, "intent produced no trade");
            }
        }
    }

    info!(
        trades = portfolio.trades.len(),
        final_value = portfolio.current_value(last.close),
        "backtest finished"
    );

    Ok(BacktestResult {
        portfolio,
        final_price: last.close,
        candles_processed: candles.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Side;
    use chrono::NaiveDate;

    fn sample_config() -> BacktestConfig {
        BacktestConfig {
            symbol: "ETHUSDT".into(),
            interval: "1h".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            initial_cash: 1000.0,
            fee_rate: 0.001,
            fast_period: 2,
            slow_period: 5,
        }
    }

    fn candles(prices: &[f64]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                timestamp: 1_704_067_200_000 + i as i64 * 3_600_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn empty_input_is_no_data() {
        let result = run_backtest(&[], &sample_config());
        assert!(matches!(result, Err(EmacrossError::NoData { .. })));
    }

    #[test]
    fn invalid_period_aborts() {
        let config = BacktestConfig {
            fast_period: 0,
            ..sample_config()
        };
        let result = run_backtest(&candles(&[1.0, 2.0]), &config);
        assert!(matches!(
            result,
            Err(EmacrossError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn out_of_order_candles_abort() {
        let mut data = candles(&[10.0, 11.0, 12.0]);
        data.swap(1, 2);
        let result = run_backtest(&data, &sample_config());
        assert!(matches!(result, Err(EmacrossError::InvalidInput { .. })));
    }

    #[test]
    fn equal_timestamps_allowed() {
        let mut data = candles(&[10.0, 11.0, 12.0]);
        data[1].timestamp = data[0].timestamp;
        assert!(run_backtest(&data, &sample_config()).is_ok());
    }

    #[test]
    fn rising_then_falling_round_trip() {
        let data = candles(&[100.0, 110.0, 120.0, 130.0, 90.0, 80.0, 70.0]);
        let result = run_backtest(&data, &sample_config()).unwrap();
        let sides: Vec<Side> = result.portfolio.trades.iter().map(|t| t.side).collect();
        assert_eq!(sides, vec![Side::Buy, Side::Sell]);
        assert_eq!(result.candles_processed, 7);
        assert_eq!(result.final_price, 70.0);
        assert!((result.final_value() - result.portfolio.cash).abs() < f64::EPSILON);
    }

    #[test]
    fn non_positive_close_aborts_on_trade() {
        let data = candles(&[100.0, 110.0, 120.0, 130.0, -1.0]);
        let result = run_backtest(&data, &sample_config());
        assert!(matches!(result, Err(EmacrossError::InvalidInput { .. })));
    }

    #[test]
    fn non_finite_close_aborts_before_any_tick() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut prices = vec![100.0, bad];
            prices.extend([110.0, 120.0, 130.0, 90.0, 80.0, 70.0]);
            let result = run_backtest(&candles(&prices), &sample_config());
            assert!(matches!(result, Err(EmacrossError::InvalidInput { .. })));
        }
    }
}
