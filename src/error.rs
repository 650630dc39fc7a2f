//! Error types for the rating ledger
//!
//! Every failure the core can produce is a `LedgerError` variant so the
//! calling client can report it to the user. Nothing is retried here.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by the rating engine, the ledger and its storage
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Unknown player: {name}")]
    UnknownPlayer { name: String },

    #[error("Player already exists: {name}")]
    DuplicatePlayer { name: String },

    #[error("Invalid score: {input:?} is not an integer")]
    InvalidScore { input: String },

    #[error("Invalid player name: {reason}")]
    InvalidPlayerName { reason: String },

    #[error("Invalid match name: {reason}")]
    InvalidMatchName { reason: String },

    #[error("Player cannot play against themselves: {name}")]
    SelfMatch { name: String },

    #[error("Invalid weightage: {value} is not a finite number")]
    InvalidWeightage { value: f64 },

    #[error("Unknown match: {match_id}")]
    UnknownMatch { match_id: i64 },

    #[error("Storage failure: {message}")]
    StorageFailure { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl LedgerError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageFailure {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageFailure {
            message: err.to_string(),
        }
    }
}
