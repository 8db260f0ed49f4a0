//! Core domain types and logic.

pub mod candle;
pub mod indicator;
pub mod trade;
pub mod portfolio;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
