//! Report generation port trait.

use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StraddleError;

/// Port for persisting backtest results.
pub trait ReportPort {
    /// Write all artifacts into `output_dir`, returning the paths written.
    fn write(
        &self,
        result: &BacktestResult,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, StraddleError>;
}
