//! Current-rating cache owned by the match ledger
//!
//! Keyed by stable player id with the name as a secondary index. It is
//! rebuilt in full from storage and written through on every ledger write;
//! there is no independent eviction.

use crate::types::{Player, PlayerId, Rating};
use std::collections::{HashMap, HashSet};

/// Result of a name lookup against the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(PlayerId, Rating),
    /// More than one legacy row carries this name
    Ambiguous,
    Miss,
}

#[derive(Debug, Default)]
pub struct RatingCache {
    loaded: bool,
    ratings: HashMap<PlayerId, Rating>,
    ids_by_name: HashMap<String, PlayerId>,
    ambiguous: HashSet<String>,
}

impl RatingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// False until the first `rebuild`
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace the whole cache with the given storage snapshot
    pub fn rebuild(&mut self, players: &[Player]) {
        self.ratings.clear();
        self.ids_by_name.clear();
        self.ambiguous.clear();
        for player in players {
            self.ratings.insert(player.id, player.rating);
            match self.ids_by_name.get(&player.name) {
                Some(id) if *id != player.id => {
                    self.ambiguous.insert(player.name.clone());
                }
                _ => {
                    self.ids_by_name.insert(player.name.clone(), player.id);
                }
            }
        }
        self.loaded = true;
    }

    /// Add a player storage has just confirmed as the only holder of its name
    pub fn insert(&mut self, player: &Player) {
        self.ratings.insert(player.id, player.rating);
        self.ambiguous.remove(&player.name);
        self.ids_by_name.insert(player.name.clone(), player.id);
    }

    /// Id and current rating of the player with this name
    pub fn lookup(&self, name: &str) -> CacheLookup {
        if self.ambiguous.contains(name) {
            return CacheLookup::Ambiguous;
        }
        let hit = self
            .ids_by_name
            .get(name)
            .and_then(|id| self.ratings.get(id).map(|rating| (*id, *rating)));
        match hit {
            Some((id, rating)) => CacheLookup::Hit(id, rating),
            None => CacheLookup::Miss,
        }
    }

    pub fn set_rating(&mut self, id: PlayerId, rating: Rating) {
        self.ratings.insert(id, rating);
    }

    /// Move the name index entry; the id and rating stay put
    pub fn rename(&mut self, id: PlayerId, old_name: &str, new_name: &str) {
        if self.ids_by_name.get(old_name) == Some(&id) {
            self.ids_by_name.remove(old_name);
        }
        self.ids_by_name.insert(new_name.to_string(), id);
    }
}
