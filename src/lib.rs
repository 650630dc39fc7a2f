//! Rating Ledger - match results and Elo ratings for head-to-head players
//!
//! This crate provides the rating engine, the match ledger that records
//! results against a storage backend, and the configuration to wire them up.

pub mod config;
pub mod error;
pub mod ledger;
pub mod rating;
pub mod storage;
pub mod types;

// Re-export commonly used types and traits
pub use error::{LedgerError, Result};
pub use types::*;

// Re-export key components
pub use ledger::MatchLedger;
pub use rating::{expected_score, update_pair, EloRatingCalculator, RatingCalculator};
pub use storage::{InMemoryLedgerStorage, LedgerStorage, SqliteLedgerStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
