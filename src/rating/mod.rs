//! Rating engine using the Elo expected-score model
//!
//! This module provides the pure two-player update rule and the
//! `RatingCalculator` seam the ledger calls through.

pub mod calculator;
pub mod elo;

// Re-export commonly used types
pub use calculator::{MockRatingCalculator, RatingCalculator};
pub use elo::{expected_score, update_pair, EloRatingCalculator, EloSettings, INITIAL_RATING, K_FACTOR};
