//! Domain error types.

/// Top-level error type for emacross.
#[derive(Debug, thiserror::Error)]
pub enum EmacrossError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid ledger state: {reason}")]
    InvalidState { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no candles for {symbol} in the requested range")]
    NoData { symbol: String },

    #[error("trade log error: {reason}")]
    TradeLog { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EmacrossError> for std::process::ExitCode {
    fn from(err: &EmacrossError) -> Self {
        let code: u8 = match err {
            EmacrossError::Io(_) => 1,
            EmacrossError::ConfigParse { .. }
            | EmacrossError::ConfigMissing { .. }
            | EmacrossError::ConfigInvalid { .. } => 2,
            EmacrossError::Data { .. } => 3,
            EmacrossError::InvalidConfiguration { .. }
            | EmacrossError::InvalidInput { .. }
            | EmacrossError::InvalidState { .. } => 4,
            EmacrossError::NoData { .. } => 5,
            EmacrossError::TradeLog { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
