use thiserror::Error;

/// Failures outside the scoring path: configuration, payload I/O and
/// decoding. Aggregation itself never fails.
#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("weight for layer '{layer}' must be within 0..=100, got {weight}")]
    InvalidWeight { layer: String, weight: u32 },

    #[error("invalid engine setting: {0}")]
    InvalidSetting(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed analysis payload for {symbol}: {source}")]
    Payload {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no analysis payload available for {0}")]
    SymbolNotFound(String),

    #[error("evaluation task for {symbol} failed: {reason}")]
    Task { symbol: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
