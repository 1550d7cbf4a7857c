use thiserror::Error;

/// Result type for stat engine operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Errors raised by the stat engine. None of them is fatal: callers degrade
/// by skipping injection, extraction or comparison.
#[derive(Error, Debug)]
pub enum StatsError {
    /// Request or response body was not the expected JSON
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// Normalized length was zero, negative or not finite
    #[error("Invalid magnitude: {0}")]
    InvalidMagnitude(f64),

    /// Reading or writing a storage partition failed
    #[error("Persistence failure on '{partition}': {reason}")]
    PersistenceFailure { partition: String, reason: String },

    /// Growth percentage was empty, zero or not a number
    #[error("Invalid growth percentage: {0:?}")]
    InvalidGrowth(String),

    /// Structured input without a required field
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The active scope has no positive numeric stat
    #[error("No numeric stats to compare")]
    NoNumericStats,

    #[error("Unknown stat: {0}")]
    UnknownStat(String),
}

impl StatsError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }

    pub fn persistence(partition: impl Into<String>, reason: impl ToString) -> Self {
        Self::PersistenceFailure {
            partition: partition.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseFailure(err.to_string())
    }
}
