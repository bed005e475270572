//! Domain error types.
//!
//! Only conditions that abort a run live here. A series too short for an
//! indicator is a column status (`ColumnStatus::InsufficientHistory`), and
//! zero-denominator cases resolve to documented fallback values inside the
//! indicator that hits them.

/// Top-level error type for marketlens.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no data available for {symbol}")]
    DataUnavailable { symbol: String },

    #[error("malformed input at bar {position}: {reason}")]
    MalformedInput { position: usize, reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

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

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        AnalysisError::MalformedInput {
            position,
            reason: reason.into(),
        }
    }
}

impl From<&AnalysisError> for std::process::ExitCode {
    fn from(err: &AnalysisError) -> Self {
        let code: u8 = match err {
            AnalysisError::Io(_) => 1,
            AnalysisError::ConfigParse { .. }
            | AnalysisError::ConfigMissing { .. }
            | AnalysisError::ConfigInvalid { .. } => 2,
            AnalysisError::DataSource { .. } => 3,
            AnalysisError::DataUnavailable { .. } | AnalysisError::MalformedInput { .. } => 5,
            AnalysisError::Export { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
