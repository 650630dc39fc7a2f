//! Match ledger: player, match and score records plus the rating cache
//!
//! This module ties storage and the rating engine together behind the
//! operations a client calls.

pub mod cache;
pub mod manager;

// Re-export commonly used types
pub use cache::{CacheLookup, RatingCache};
pub use manager::{normalize_name, MatchLedger};
