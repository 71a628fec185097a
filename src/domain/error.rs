//! Domain error types.

/// Top-level error type for quantsig.
#[derive(Debug, thiserror::Error)]
pub enum QuantsigError {
    #[error("data fetch failed for {symbol}: {reason}")]
    DataFetch { symbol: String, reason: String },

    #[error("no price data returned for {symbol}")]
    EmptySeries { symbol: String },

    #[error("commentary generation failed: {reason}")]
    Commentary { reason: String },

    #[error("history store error: {reason}")]
    History { reason: String },

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

    #[error("analysis of {symbol} timed out after {seconds}s")]
    Timeout { symbol: String, seconds: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<&QuantsigError> for std::process::ExitCode {
    fn from(err: &QuantsigError) -> Self {
        let code: u8 = match err {
            QuantsigError::Io(_) | QuantsigError::Json(_) => 1,
            QuantsigError::ConfigParse { .. }
            | QuantsigError::ConfigMissing { .. }
            | QuantsigError::ConfigInvalid { .. } => 2,
            QuantsigError::History { .. } => 3,
            QuantsigError::DataFetch { .. } | QuantsigError::EmptySeries { .. } => 4,
            QuantsigError::Commentary { .. } => 5,
            QuantsigError::Timeout { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
