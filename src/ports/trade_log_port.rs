//! Trade log sink port trait.

use crate::domain::error::EmacrossError;
use crate::domain::trade::TradeRecord;
use std::path::Path;

/// Port for persisting the trade records of a finished run.
pub trait TradeLogPort {
    fn write(&self, trades: &[TradeRecord], output_path: &Path) -> Result<(), EmacrossError>;
}
