//! Rating calculator trait and a recording mock
//!
//! The ledger only talks to the rating engine through `RatingCalculator`,
//! so the update rule can be swapped in tests without touching storage.

use crate::types::{Outcome, Rating};

/// Pure two-player rating update rule
pub trait RatingCalculator: Send + Sync {
    /// Probability that a player rated `rating` beats one rated `opponent`
    fn expected_score(&self, rating: Rating, opponent: Rating) -> f64;

    /// Compute both players' new ratings after a contest
    ///
    /// # Arguments
    /// * `rating1` - Current rating of player 1
    /// * `rating2` - Current rating of player 2
    /// * `outcome` - Which of the two won
    ///
    /// # Returns
    /// `(new_rating1, new_rating2)`
    fn update_pair(&self, rating1: Rating, rating2: Rating, outcome: Outcome) -> (Rating, Rating);

    /// Rating assigned to newly added players
    fn initial_rating(&self) -> Rating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Mock rating calculator for testing
#[derive(Debug)]
pub struct MockRatingCalculator {
    calls: std::sync::Mutex<Vec<(Rating, Rating, Outcome)>>,
    fixed_delta: Rating,
    initial_rating: Rating,
}

impl MockRatingCalculator {
    /// Winner gains and loser drops by `fixed_delta` on every update
    pub fn new(fixed_delta: Rating) -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            fixed_delta,
            initial_rating: 1000,
        }
    }

    /// Get all update calls made (for testing)
    pub fn get_calls(&self) -> Vec<(Rating, Rating, Outcome)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockRatingCalculator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl RatingCalculator for MockRatingCalculator {
    fn expected_score(&self, _rating: Rating, _opponent: Rating) -> f64 {
        0.5
    }

    fn update_pair(&self, rating1: Rating, rating2: Rating, outcome: Outcome) -> (Rating, Rating) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((rating1, rating2, outcome));
        }

        match outcome {
            Outcome::Player1Won => (rating1 + self.fixed_delta, rating2 - self.fixed_delta),
            Outcome::Player2Won => (rating1 - self.fixed_delta, rating2 + self.fixed_delta),
        }
    }

    fn initial_rating(&self) -> Rating {
        self.initial_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "mock",
            "fixed_delta": self.fixed_delta,
            "initial_rating": self.initial_rating
        })
    }
}
