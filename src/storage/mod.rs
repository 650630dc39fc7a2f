//! Ledger storage interface and implementations
//!
//! This module defines the interface the match ledger reads from and writes
//! to, with a SQLite backend for persisted files and an in-memory backend.

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::types::{
    MatchId, MatchRecord, NewScore, Player, PlayerId, PlayerOrder, Rating, ScoreRecord,
};

pub use memory::InMemoryLedgerStorage;
pub use sqlite::SqliteLedgerStorage;

/// Every write belonging to one recorded result.
///
/// Backends apply it all or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCommit {
    pub winner: PlayerId,
    pub winner_rating: Rating,
    pub loser: PlayerId,
    pub loser_rating: Rating,
    pub score: NewScore,
}

/// Trait for ledger storage operations
pub trait LedgerStorage: Send + Sync {
    /// Create the player, score and match tables if they are absent
    fn initialize(&self) -> Result<()>;

    /// Insert a player with zeroed counters; fails if the name is taken
    fn insert_player(&self, name: &str, rating: Rating) -> Result<Player>;

    /// Get a player by its stable id
    fn find_player(&self, id: PlayerId) -> Result<Option<Player>>;

    /// Get a player by name; more than one row with the name is an error
    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>>;

    /// Change a player's name, keeping id, counters and rating
    fn rename_player(&self, id: PlayerId, new_name: &str) -> Result<Player>;

    /// All players in the requested order
    fn list_players(&self, order: PlayerOrder) -> Result<Vec<Player>>;

    /// Insert a match grouping record
    fn insert_match(&self, name: &str, weightage: f64) -> Result<MatchRecord>;

    /// Get a match record by id
    fn find_match(&self, id: MatchId) -> Result<Option<MatchRecord>>;

    /// All match records in insertion order
    fn list_matches(&self) -> Result<Vec<MatchRecord>>;

    /// All score records in insertion order
    fn list_scores(&self) -> Result<Vec<ScoreRecord>>;

    /// Apply counters, ratings and the score record as one transaction
    fn commit_result(&self, commit: &ResultCommit) -> Result<ScoreRecord>;
}
