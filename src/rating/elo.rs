//! Elo rating engine
//!
//! Expected scores follow the logistic model
//! `1 / (1 + 10^((opponent - rating) / 400))` and a contest moves each
//! rating by `K * (actual - expected)`, truncated toward zero. The math
//! is delegated to the Elo module of the skillratings crate.

use crate::error::{LedgerError, Result};
use crate::rating::calculator::RatingCalculator;
use crate::types::{Outcome, Rating};
use serde::{Deserialize, Serialize};
use skillratings::elo::{EloConfig, EloRating};
use skillratings::Outcomes;

/// Fixed K-factor shared by every player and match
pub const K_FACTOR: f64 = 32.0;

/// Rating of a newly added player
pub const INITIAL_RATING: Rating = 1000;

/// Expected score of a player rated `rating` against one rated `opponent`
pub fn expected_score(rating: Rating, opponent: Rating) -> f64 {
    let (expected, _) =
        skillratings::elo::expected_score(&elo_rating(rating), &elo_rating(opponent));
    expected
}

/// New ratings for both players with the default K-factor
pub fn update_pair(rating1: Rating, rating2: Rating, outcome: Outcome) -> (Rating, Rating) {
    update_pair_with_k(rating1, rating2, outcome, K_FACTOR)
}

fn update_pair_with_k(rating1: Rating, rating2: Rating, outcome: Outcome, k: f64) -> (Rating, Rating) {
    let outcome = match outcome {
        Outcome::Player1Won => Outcomes::WIN,
        Outcome::Player2Won => Outcomes::LOSS,
    };

    let (new1, new2) = skillratings::elo::elo(
        &elo_rating(rating1),
        &elo_rating(rating2),
        &outcome,
        &EloConfig { k },
    );

    (truncate(new1.rating), truncate(new2.rating))
}

fn elo_rating(rating: Rating) -> EloRating {
    EloRating {
        rating: f64::from(rating),
    }
}

// Ratings are stored as integers; the fractional part is dropped, not rounded.
fn truncate(rating: f64) -> Rating {
    rating.trunc() as Rating
}

/// Global settings of the Elo engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloSettings {
    pub k_factor: f64,
    pub initial_rating: Rating,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            k_factor: K_FACTOR,
            initial_rating: INITIAL_RATING,
        }
    }
}

impl EloSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(LedgerError::ConfigurationError {
                message: "K-factor must be a positive finite number".to_string(),
            });
        }

        Ok(())
    }
}

/// Elo rating calculator implementation
#[derive(Debug, Clone, Default)]
pub struct EloRatingCalculator {
    settings: EloSettings,
}

impl EloRatingCalculator {
    pub fn new(settings: EloSettings) -> Result<Self> {
        settings.validate()?;

        Ok(Self { settings })
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn expected_score(&self, rating: Rating, opponent: Rating) -> f64 {
        expected_score(rating, opponent)
    }

    fn update_pair(&self, rating1: Rating, rating2: Rating, outcome: Outcome) -> (Rating, Rating) {
        update_pair_with_k(rating1, rating2, outcome, self.settings.k_factor)
    }

    fn initial_rating(&self) -> Rating {
        self.settings.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.settings).unwrap_or(serde_json::Value::Null)
    }
}
