//! Rating engine configuration

use crate::rating::{EloRatingCalculator, EloSettings, RatingCalculator, INITIAL_RATING, K_FACTOR};
use crate::types::Rating;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Elo parameters shared by every player and match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    pub k_factor: f64,
    pub initial_rating: Rating,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: K_FACTOR,
            initial_rating: INITIAL_RATING,
        }
    }
}

impl RatingSettings {
    pub fn to_elo_settings(&self) -> EloSettings {
        EloSettings {
            k_factor: self.k_factor,
            initial_rating: self.initial_rating,
        }
    }

    pub fn calculator(&self) -> crate::error::Result<Arc<dyn RatingCalculator>> {
        Ok(Arc::new(EloRatingCalculator::new(self.to_elo_settings())?))
    }
}
