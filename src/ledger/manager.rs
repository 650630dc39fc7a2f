//! Match ledger implementation
//!
//! The `MatchLedger` owns player, match and score records through a
//! `LedgerStorage` backend, feeds current ratings to the rating engine and
//! keeps its rating cache consistent with storage after every write.

use crate::error::{LedgerError, Result};
use crate::ledger::cache::{CacheLookup, RatingCache};
use crate::rating::calculator::RatingCalculator;
use crate::rating::elo::EloRatingCalculator;
use crate::storage::{LedgerStorage, ResultCommit};
use crate::types::{
    MatchRecord, NewScore, Outcome, Player, PlayerId, PlayerOrder, Rating, RatingChange,
    RecordedResult, ResultSubmission, ScoreRecord,
};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// The match ledger
pub struct MatchLedger {
    /// Backend holding players, matches and scores
    storage: Arc<dyn LedgerStorage>,
    /// Rating engine used for every result
    rating_calculator: Arc<dyn RatingCalculator>,
    /// Current rating per player, kept in step with storage
    cache: RwLock<RatingCache>,
    /// Serializes all write operations
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for MatchLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchLedger")
            .field("rating_calculator", &self.rating_calculator.config())
            .finish_non_exhaustive()
    }
}

impl MatchLedger {
    /// Open a ledger with the default Elo engine
    pub fn open(storage: Arc<dyn LedgerStorage>) -> Result<Self> {
        Self::with_calculator(storage, Arc::new(EloRatingCalculator::default()))
    }

    /// Open a ledger with a custom rating engine.
    ///
    /// Initializes the schema and loads the rating cache in full.
    pub fn with_calculator(
        storage: Arc<dyn LedgerStorage>,
        rating_calculator: Arc<dyn RatingCalculator>,
    ) -> Result<Self> {
        storage.initialize()?;

        let ledger = Self {
            storage,
            rating_calculator,
            cache: RwLock::new(RatingCache::new()),
            write_lock: Mutex::new(()),
        };
        ledger.reload()?;

        Ok(ledger)
    }

    /// Rebuild the rating cache from storage, returning the player count
    pub fn reload(&self) -> Result<usize> {
        let players = self.storage.list_players(PlayerOrder::default())?;
        let mut cache = self.cache_write()?;
        cache.rebuild(&players);

        debug!("Rating cache rebuilt with {} players", players.len());
        Ok(players.len())
    }

    /// Register a new player with zeroed counters and the initial rating
    pub fn add_player(&self, name: &str) -> Result<Player> {
        let name = normalize_name(name)?;
        let _guard = self.lock_writes()?;

        let player = self
            .storage
            .insert_player(&name, self.rating_calculator.initial_rating())?;
        self.cache_write()?.insert(&player);

        info!("Added player {} (id {}, rating {})", player.name, player.id, player.rating);
        Ok(player)
    }

    /// Rename a player in place.
    ///
    /// Counters and rating follow the stable id. Score records keep the
    /// name the player had when the result was recorded.
    pub fn rename_player(&self, old_name: &str, new_name: &str) -> Result<Player> {
        let new_name = normalize_name(new_name)?;
        let _guard = self.lock_writes()?;

        let (old_name, id, _) = self.resolve_name(old_name)?;
        if old_name == new_name {
            return self.player_by_id(id, &old_name);
        }

        let player = self.storage.rename_player(id, &new_name)?;
        self.cache_write()?.rename(id, &old_name, &new_name);

        info!("Renamed player {} to {} (id {})", old_name, new_name, id);
        Ok(player)
    }

    /// Look up a player record by name
    pub fn get_player(&self, name: &str) -> Result<Player> {
        let (name, id, _) = self.resolve_name(name)?;
        self.player_by_id(id, &name)
    }

    /// Current rating of a player, served from the cache
    pub fn rating_of(&self, name: &str) -> Result<Rating> {
        let (_, _, rating) = self.resolve_name(name)?;
        Ok(rating)
    }

    /// Record a completed contest between two registered players.
    ///
    /// Player 1 wins only when `score1 > score2`; a tie is credited to
    /// player 2.
    pub fn record_result(
        &self,
        player1: &str,
        player2: &str,
        score1: i64,
        score2: i64,
    ) -> Result<RecordedResult> {
        self.record_submission(ResultSubmission::new(player1, player2, score1, score2))
    }

    /// Record a result with optional match reference and weightages.
    ///
    /// Ratings, counters and the score record are written in a single
    /// storage commit. The cache is only updated once that commit succeeds.
    pub fn record_submission(&self, submission: ResultSubmission) -> Result<RecordedResult> {
        for weightage in [submission.player1_weightage, submission.player2_weightage]
            .into_iter()
            .flatten()
        {
            check_weightage(weightage)?;
        }

        let _guard = self.lock_writes()?;

        if let Some(match_id) = submission.match_id {
            if self.storage.find_match(match_id)?.is_none() {
                return Err(LedgerError::UnknownMatch { match_id });
            }
        }

        let (name1, id1, rating1) = self.resolve_name(&submission.player1)?;
        let (name2, id2, rating2) = self.resolve_name(&submission.player2)?;
        if id1 == id2 {
            return Err(LedgerError::SelfMatch { name: name1 });
        }

        let outcome = submission.outcome();
        if submission.player1_score == submission.player2_score {
            warn!(
                "Tied score {}-{} between {} and {}; crediting {} as winner",
                submission.player1_score, submission.player2_score, name1, name2, name2
            );
        }

        let (new_rating1, new_rating2) =
            self.rating_calculator.update_pair(rating1, rating2, outcome);

        let ((winner, winner_rating), (loser, loser_rating)) = match outcome {
            Outcome::Player1Won => ((id1, new_rating1), (id2, new_rating2)),
            Outcome::Player2Won => ((id2, new_rating2), (id1, new_rating1)),
        };

        let commit = ResultCommit {
            winner,
            winner_rating,
            loser,
            loser_rating,
            score: NewScore {
                player1: name1.clone(),
                player2: name2.clone(),
                player1_score: submission.player1_score,
                player2_score: submission.player2_score,
                player1_weightage: submission.player1_weightage,
                player2_weightage: submission.player2_weightage,
                match_id: submission.match_id,
            },
        };
        let score = self.storage.commit_result(&commit)?;

        {
            let mut cache = self.cache_write()?;
            cache.set_rating(id1, new_rating1);
            cache.set_rating(id2, new_rating2);
        }

        let result = RecordedResult {
            outcome,
            player1: RatingChange {
                player_id: id1,
                name: name1,
                old_rating: rating1,
                new_rating: new_rating1,
            },
            player2: RatingChange {
                player_id: id2,
                name: name2,
                old_rating: rating2,
                new_rating: new_rating2,
            },
            score,
        };

        info!(
            "Recorded {} {}-{} {}: {} {:+} -> {}, {} {:+} -> {}",
            result.player1.name,
            result.score.player1_score,
            result.score.player2_score,
            result.player2.name,
            result.player1.name,
            result.player1.delta(),
            result.player1.new_rating,
            result.player2.name,
            result.player2.delta(),
            result.player2.new_rating
        );
        Ok(result)
    }

    /// Create a match grouping record
    pub fn add_match(&self, name: &str, weightage: f64) -> Result<MatchRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidMatchName {
                reason: "name cannot be empty".to_string(),
            });
        }
        check_weightage(weightage)?;
        let _guard = self.lock_writes()?;

        let record = self.storage.insert_match(name, weightage)?;
        info!("Added match {} (id {}, weightage {})", record.name, record.id, record.weightage);
        Ok(record)
    }

    /// All players in the requested order, read fresh from storage
    pub fn list_players(&self, order: PlayerOrder) -> Result<Vec<Player>> {
        self.storage.list_players(order)
    }

    /// All players by rating, highest first
    pub fn leaderboard(&self) -> Result<Vec<Player>> {
        self.list_players(PlayerOrder::default())
    }

    /// Score records in insertion order
    pub fn list_scores(&self) -> Result<Vec<ScoreRecord>> {
        self.storage.list_scores()
    }

    /// Match records in insertion order
    pub fn list_matches(&self) -> Result<Vec<MatchRecord>> {
        self.storage.list_matches()
    }

    /// Stored name, id and rating for a name as the client typed it.
    ///
    /// The exact text is tried first so padded legacy names stay reachable;
    /// otherwise the trimmed name is used.
    fn resolve_name(&self, typed: &str) -> Result<(String, PlayerId, Rating)> {
        let trimmed = typed.trim();
        if trimmed != typed {
            match self.resolve(typed) {
                Ok((id, rating)) => return Ok((typed.to_string(), id, rating)),
                Err(LedgerError::UnknownPlayer { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        let name = normalize_name(typed)?;
        let (id, rating) = self.resolve(&name)?;
        Ok((name, id, rating))
    }

    /// Id and rating for an exact name: cache first, then storage
    fn resolve(&self, name: &str) -> Result<(PlayerId, Rating)> {
        if !self.cache_read()?.is_loaded() {
            self.reload()?;
        }

        let cached = self.cache_read()?.lookup(name);
        match cached {
            CacheLookup::Hit(id, rating) => return Ok((id, rating)),
            CacheLookup::Ambiguous => {
                return Err(LedgerError::DuplicatePlayer {
                    name: name.to_string(),
                })
            }
            CacheLookup::Miss => {}
        }

        match self.storage.find_player_by_name(name)? {
            Some(player) => {
                debug!("Rating cache miss for {}, loaded from storage", name);
                self.cache_write()?.insert(&player);
                Ok((player.id, player.rating))
            }
            None => Err(LedgerError::UnknownPlayer {
                name: name.to_string(),
            }),
        }
    }

    fn player_by_id(&self, id: PlayerId, name: &str) -> Result<Player> {
        self.storage
            .find_player(id)?
            .ok_or_else(|| LedgerError::UnknownPlayer {
                name: name.to_string(),
            })
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| LedgerError::storage("Failed to acquire ledger write lock"))
    }

    fn cache_read(&self) -> Result<RwLockReadGuard<'_, RatingCache>> {
        self.cache
            .read()
            .map_err(|_| LedgerError::storage("Failed to acquire rating cache read lock"))
    }

    fn cache_write(&self) -> Result<RwLockWriteGuard<'_, RatingCache>> {
        self.cache
            .write()
            .map_err(|_| LedgerError::storage("Failed to acquire rating cache write lock"))
    }
}

/// Trim a new player name and reject empty ones
pub fn normalize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidPlayerName {
            reason: "name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn check_weightage(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LedgerError::InvalidWeightage { value })
    }
}
