//! Configuration validation.
//!
//! Numeric keys are read strictly: a present value that does not parse is an
//! error, never a silent fallback to the default. Range checks run on the
//! resolved [`BacktestConfig`], after CLI overrides, and before any candle is
//! read.

use std::str::FromStr;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::EmacrossError;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveDateTime};

pub const DEFAULT_INTERVAL: &str = "1h";
pub const DEFAULT_INITIAL_CASH: f64 = 1000.0;
pub const DEFAULT_FEE_RATE: f64 = 0.001;
pub const DEFAULT_FAST_PERIOD: i64 = 13;
pub const DEFAULT_SLOW_PERIOD: i64 = 38;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<(), EmacrossError> {
    if config.symbol.trim().is_empty() {
        return Err(EmacrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        });
    }
    if !(config.initial_cash.is_finite() && config.initial_cash > 0.0) {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    if !(0.0..1.0).contains(&config.fee_rate) {
        return Err(invalid(
            "backtest",
            "fee_rate",
            "fee_rate must be a fraction in [0, 1)",
        ));
    }
    if config.start_date >= config.end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn validate_strategy_config(config: &BacktestConfig) -> Result<(), EmacrossError> {
    for (key, value) in [
        ("fast_period", config.fast_period),
        ("slow_period", config.slow_period),
    ] {
        if value == 0 {
            return Err(invalid(
                "strategy",
                key,
                &format!("{} must be a positive integer", key),
            ));
        }
    }
    if config.fast_period >= config.slow_period {
        return Err(invalid(
            "strategy",
            "fast_period",
            "fast_period must be less than slow_period",
        ));
    }
    Ok(())
}

/// `default` when the key is absent, `ConfigInvalid` when it does not parse.
pub fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, EmacrossError> {
    read_strict(config, section, key, default, "a number")
}

/// `default` when the key is absent, `ConfigInvalid` when it does not parse.
pub fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, EmacrossError> {
    read_strict(config, section, key, default, "an integer")
}

fn read_strict<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, EmacrossError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            invalid(
                section,
                key,
                &format!("expected {}, got {:?}", expected, raw.trim()),
            )
        }),
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SSZ` or a bare
/// `YYYY-MM-DD` (midnight).
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub fn require_datetime(value: Option<&str>, field: &str) -> Result<NaiveDateTime, EmacrossError> {
    match value {
        None => Err(EmacrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => parse_datetime(s).ok_or_else(|| {
            invalid(
                "backtest",
                field,
                &format!("invalid {} format, expected YYYY-MM-DD[ HH:MM:SS]", field),
            )
        }),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> EmacrossError {
    EmacrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn valid_config() -> BacktestConfig {
        BacktestConfig {
            symbol: "ETHUSDT".into(),
            interval: "1h".into(),
            start_date: date(2017, 1, 1),
            end_date: date(2024, 11, 15),
            initial_cash: DEFAULT_INITIAL_CASH,
            fee_rate: DEFAULT_FEE_RATE,
            fast_period: 13,
            slow_period: 38,
        }
    }

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_backtest_config(&valid_config()).is_ok());
        assert!(validate_strategy_config(&valid_config()).is_ok());
    }

    #[test]
    fn blank_symbol_fails() {
        let config = BacktestConfig {
            symbol: "  ".into(),
            ..valid_config()
        };
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, EmacrossError::ConfigMissing { key, .. } if key == "symbol"));
    }

    #[test]
    fn initial_cash_must_be_positive() {
        for cash in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let config = BacktestConfig {
                initial_cash: cash,
                ..valid_config()
            };
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, EmacrossError::ConfigInvalid { key, .. } if key == "initial_cash")
            );
        }
    }

    #[test]
    fn fee_rate_out_of_range_fails() {
        for fee_rate in [-0.01, 1.0, 2.5, f64::NAN] {
            let config = BacktestConfig {
                fee_rate,
                ..valid_config()
            };
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(matches!(err, EmacrossError::ConfigInvalid { key, .. } if key == "fee_rate"));
        }
    }

    #[test]
    fn start_date_not_before_end_date_fails() {
        let config = BacktestConfig {
            start_date: date(2024, 12, 31),
            end_date: date(2020, 1, 1),
            ..valid_config()
        };
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, EmacrossError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn zero_period_fails() {
        let config = BacktestConfig {
            fast_period: 0,
            ..valid_config()
        };
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, EmacrossError::ConfigInvalid { key, .. } if key == "fast_period"));

        let config = BacktestConfig {
            slow_period: 0,
            ..valid_config()
        };
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, EmacrossError::ConfigInvalid { key, .. } if key == "slow_period"));
    }

    #[test]
    fn fast_not_below_slow_fails() {
        for (fast_period, slow_period) in [(38, 13), (20, 20)] {
            let config = BacktestConfig {
                fast_period,
                slow_period,
                ..valid_config()
            };
            assert!(validate_strategy_config(&config).is_err());
        }
    }

    #[test]
    fn read_double_uses_default_only_when_absent() {
        let config = make_config("[backtest]\ninitial_cash = 2500.5\n");
        assert_eq!(
            read_double(&config, "backtest", "initial_cash", 1.0).unwrap(),
            2500.5
        );
        assert_eq!(read_double(&config, "backtest", "fee_rate", 0.25).unwrap(), 0.25);
    }

    #[test]
    fn unparsable_numbers_are_config_invalid() {
        let config = make_config(
            "[backtest]\nfee_rate = 0.5%\ninitial_cash = 5,000\n\
             [strategy]\nfast_period = 5.5\nslow_period = twenty\n",
        );
        for key in ["fee_rate", "initial_cash"] {
            let err = read_double(&config, "backtest", key, 1.0).unwrap_err();
            assert!(matches!(err, EmacrossError::ConfigInvalid { key: k, .. } if k == key));
        }
        for key in ["fast_period", "slow_period"] {
            let err = read_int(&config, "strategy", key, 1).unwrap_err();
            assert!(matches!(err, EmacrossError::ConfigInvalid { key: k, .. } if k == key));
        }
    }

    #[test]
    fn read_int_accepts_negative_values() {
        let config = make_config("[strategy]\nfast_period = -4\n");
        assert_eq!(read_int(&config, "strategy", "fast_period", 13).unwrap(), -4);
    }

    #[test]
    fn require_datetime_errors() {
        let err = require_datetime(None, "end_date").unwrap_err();
        assert!(matches!(err, EmacrossError::ConfigMissing { key, .. } if key == "end_date"));

        let err = require_datetime(Some("01/01/2020"), "start_date").unwrap_err();
        assert!(matches!(err, EmacrossError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 11, 15)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-11-15 13:30:00"), Some(expected));
        assert_eq!(parse_datetime("2024-11-15T13:30:00Z"), Some(expected));
        assert_eq!(
            parse_datetime("2024-11-15"),
            NaiveDate::from_ymd_opt(2024, 11, 15).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime("15/11/2024"), None);
    }
}
