//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_trade_log_adapter::CsvTradeLogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    DEFAULT_FAST_PERIOD, DEFAULT_FEE_RATE, DEFAULT_INITIAL_CASH, DEFAULT_INTERVAL,
    DEFAULT_SLOW_PERIOD, read_double, read_int, require_datetime, validate_backtest_config,
    validate_strategy_config,
};
use crate::domain::error::EmacrossError;
use crate::domain::metrics::Metrics;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::trade_log_port::TradeLogPort;

const DEFAULT_TRADES_PATH: &str = "trades.csv";

#[derive(Parser, Debug)]
#[command(name = "emacross", about = "EMA crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        fast: Option<usize>,
        #[arg(long)]
        slow: Option<usize>,
        /// Trade log destination (CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with candle files for an interval
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        interval: Option<String>,
    },
    /// Show the data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// Values that override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub fast_period: Option<usize>,
    pub slow_period: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            fast,
            slow,
            output,
            dry_run,
        } => {
            let overrides = Overrides {
                symbol,
                fast_period: fast,
                slow_period: slow,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_backtest(&config, &overrides, output.as_deref())
            }
        }
        Command::Validate { config } => run_dry_run(&config, &Overrides::default()),
        Command::ListSymbols { config, interval } => {
            run_list_symbols(&config, interval.as_deref())
        }
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &EmacrossError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_backtest(config_path: &Path, overrides: &Overrides, output: Option<&Path>) -> ExitCode {
    // Stage 1: Load config
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate and resolve run parameters
    let bt_config = match resolve_config(&adapter, overrides) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(data_directory(&adapter));
    let output_path = output
        .map(Path::to_path_buf)
        .or_else(|| trades_path(&adapter));

    // Stages 3-6: Data, replay, summary, trade log
    run_backtest_pipeline(
        &data_port,
        &CsvTradeLogAdapter,
        &bt_config,
        output_path.as_deref(),
    )
}

/// Build run parameters from the config, applying CLI overrides.
///
/// Keys supplied by an override are never read from the file. Range checks
/// are left to [`resolve_config`].
pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<BacktestConfig, EmacrossError> {
    let symbol = match &overrides.symbol {
        Some(s) => s.clone(),
        None => adapter
            .get_string("backtest", "symbol")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EmacrossError::ConfigMissing {
                section: "backtest".into(),
                key: "symbol".into(),
            })?,
    };

    let start_date = require_datetime(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = require_datetime(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    let fast_period = match overrides.fast_period {
        Some(p) => p,
        None => period(adapter, "fast_period", DEFAULT_FAST_PERIOD)?,
    };
    let slow_period = match overrides.slow_period {
        Some(p) => p,
        None => period(adapter, "slow_period", DEFAULT_SLOW_PERIOD)?,
    };

    Ok(BacktestConfig {
        symbol,
        interval: adapter
            .get_string("backtest", "interval")
            .unwrap_or_else(|| DEFAULT_INTERVAL.to_string()),
        start_date,
        end_date,
        initial_cash: read_double(adapter, "backtest", "initial_cash", DEFAULT_INITIAL_CASH)?,
        fee_rate: read_double(adapter, "backtest", "fee_rate", DEFAULT_FEE_RATE)?,
        fast_period,
        slow_period,
    })
}

/// Build the run parameters, then validate the result.
pub fn resolve_config(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<BacktestConfig, EmacrossError> {
    let bt_config = build_backtest_config(adapter, overrides)?;
    validate_backtest_config(&bt_config)?;
    validate_strategy_config(&bt_config)?;
    Ok(bt_config)
}

fn period(adapter: &dyn ConfigPort, key: &str, default: i64) -> Result<usize, EmacrossError> {
    let value = read_int(adapter, "strategy", key, default)?;
    usize::try_from(value)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| EmacrossError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: format!("{} must be a positive integer", key),
        })
}

fn data_directory(adapter: &dyn ConfigPort) -> PathBuf {
    adapter
        .get_string("data", "directory")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `None` when `[output] write_trades` is false.
fn trades_path(adapter: &dyn ConfigPort) -> Option<PathBuf> {
    if !adapter.get_bool("output", "write_trades", true) {
        return None;
    }
    Some(PathBuf::from(
        adapter
            .get_string("output", "trades_path")
            .unwrap_or_else(|| DEFAULT_TRADES_PATH.to_string()),
    ))
}

/// Load candles, replay them, print the summary and write the trade log.
///
/// Any error aborts before the trade log is written.
pub fn backtest_pipeline(
    data_port: &dyn DataPort,
    trade_log: &dyn TradeLogPort,
    bt_config: &BacktestConfig,
    output_path: Option<&Path>,
) -> Result<(BacktestResult, Metrics), EmacrossError> {
    // Stage 3: Fetch candles
    let candles = data_port.fetch_candles(
        &bt_config.symbol,
        &bt_config.interval,
        bt_config.start_date,
        bt_config.end_date,
    )?;
    info!(
        symbol = %bt_config.symbol,
        candles = candles.len(),
        "candles loaded"
    );

    // Stage 4: Replay
    let result = backtest_engine::run_backtest(&candles, bt_config)?;

    // Stage 5: Summary
    let metrics = Metrics::compute(&result.portfolio, result.final_price);
    print_summary(bt_config, &result, &metrics);

    // Stage 6: Trade log
    if let Some(path) = output_path {
        trade_log.write(&result.portfolio.trades, path)?;
        info!(path = %path.display(), trades = result.portfolio.trades.len(), "trade log written");
    }

    Ok((result, metrics))
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    trade_log: &dyn TradeLogPort,
    bt_config: &BacktestConfig,
    output_path: Option<&Path>,
) -> ExitCode {
    match backtest_pipeline(data_port, trade_log, bt_config, output_path) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn print_summary(bt_config: &BacktestConfig, result: &BacktestResult, metrics: &Metrics) {
    eprintln!("\n=== Results: {} ({}) ===", bt_config.symbol, bt_config.interval);
    eprintln!("Candles:          {}", result.candles_processed);
    eprintln!("Final Balance:    {:.2} USD", metrics.final_value);
    eprintln!("Performance:      {:.2}%", metrics.total_return * 100.0);
    eprintln!("Max Drawdown:     {:.2}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Fees:       {:.2} USD", metrics.total_fees);
    eprintln!("Trades:           {}", metrics.total_trades);
    eprintln!("Round Trips:      {}", metrics.round_trips);
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Avg Profit:       {:.2}%", metrics.avg_profit_pct);
}

/// Load, validate and resolve a config file without touching any data.
pub fn check_config(
    config_path: &Path,
    overrides: &Overrides,
) -> Result<BacktestConfig, EmacrossError> {
    info!(path = %config_path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(config_path)?;
    resolve_config(&adapter, overrides)
}

pub fn run_dry_run(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let bt_config = match check_config(config_path, overrides) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    eprintln!("Config validated successfully");
    eprintln!("  Symbol:    {} ({})", bt_config.symbol, bt_config.interval);
    eprintln!(
        "  Range:     {} to {}",
        bt_config.start_date, bt_config.end_date
    );
    eprintln!(
        "  Capital:   {:.2} USD, fee rate {}",
        bt_config.initial_cash, bt_config.fee_rate
    );
    eprintln!(
        "  Strategy:  EMA({}) / EMA({})",
        bt_config.fast_period, bt_config.slow_period
    );
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path, interval: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let interval = interval
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "interval"))
        .unwrap_or_else(|| DEFAULT_INTERVAL.to_string());

    let data_port = CsvAdapter::new(data_directory(&adapter));
    match data_port.list_symbols(&interval) {
        Ok(symbols) => {
            if symbols.is_empty() {
                warn!(%interval, "no symbols found");
            }
            for symbol in symbols {
                println!("{symbol}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let Some(symbol) = symbol
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "symbol"))
    else {
        let err = EmacrossError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        };
        return fail(&err);
    };
    let interval = adapter
        .get_string("backtest", "interval")
        .unwrap_or_else(|| DEFAULT_INTERVAL.to_string());

    let data_port = CsvAdapter::new(data_directory(&adapter));
    match data_port.get_data_range(&symbol, &interval) {
        Ok(Some((first, last, count))) => {
            println!("{symbol} ({interval}): {count} candles, {first} to {last}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            warn!(%symbol, %interval, "no candles available");
            println!("{symbol} ({interval}): no data");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
