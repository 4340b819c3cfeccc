//! Error types for loading, configuration and reporting.
//!
//! The simulation core never fails; everything here originates at the edges.

/// Top-level error type for the straddle backtester.
#[derive(Debug, thiserror::Error)]
pub enum StraddleError {
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

    #[error("failed to load price data from {path}: {reason}")]
    DataLoad { path: String, reason: String },

    #[error("invalid price data at line {line}: {reason}")]
    DataInvalid { line: u64, reason: String },

    #[error("no price bars found in {path}")]
    NoData { path: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StraddleError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        StraddleError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&StraddleError> for std::process::ExitCode {
    fn from(err: &StraddleError) -> Self {
        let code: u8 = match err {
            StraddleError::Io(_) | StraddleError::Report { .. } => 1,
            StraddleError::ConfigParse { .. }
            | StraddleError::ConfigMissing { .. }
            | StraddleError::ConfigInvalid { .. } => 2,
            StraddleError::DataLoad { .. }
            | StraddleError::DataInvalid { .. }
            | StraddleError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
