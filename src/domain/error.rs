//! Domain error types.

/// Top-level error type for fibext.
#[derive(Debug, thiserror::Error)]
pub enum FibextError {
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

    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("no trading data for {code} on any of [{markets}]")]
    NoData { code: String, markets: String },

    #[error("invalid price summary: {reason}")]
    InvalidInput { reason: String },

    #[error("report rendering failed: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FibextError> for std::process::ExitCode {
    fn from(err: &FibextError) -> Self {
        let code: u8 = match err {
            FibextError::Io(_) => 1,
            FibextError::ConfigParse { .. }
            | FibextError::ConfigMissing { .. }
            | FibextError::ConfigInvalid { .. } => 2,
            FibextError::DataSource { .. } => 3,
            FibextError::InvalidQuery { .. } => 4,
            FibextError::NoData { .. } => 5,
            FibextError::InvalidInput { .. } => 6,
            FibextError::Render { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
