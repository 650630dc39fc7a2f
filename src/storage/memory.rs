//! In-memory ledger storage
//!
//! Holds the three tables behind one `RwLock`; a result commit validates both
//! players before touching anything so a failure leaves no partial writes.

use crate::error::{LedgerError, Result};
use crate::storage::{LedgerStorage, ResultCommit};
use crate::types::{MatchId, MatchRecord, Player, PlayerId, PlayerOrder, Rating, ScoreRecord};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    players: Vec<Player>,
    matches: Vec<MatchRecord>,
    scores: Vec<ScoreRecord>,
    next_player_id: PlayerId,
    next_match_id: MatchId,
    next_score_id: i64,
}

impl Tables {
    fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }
}

/// In-memory ledger storage implementation
#[derive(Debug, Default)]
pub struct InMemoryLedgerStorage {
    tables: RwLock<Tables>,
}

impl InMemoryLedgerStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| LedgerError::storage("Failed to acquire tables read lock"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| LedgerError::storage("Failed to acquire tables write lock"))
    }
}

impl LedgerStorage for InMemoryLedgerStorage {
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn insert_player(&self, name: &str, rating: Rating) -> Result<Player> {
        let mut tables = self.write()?;

        if tables.players.iter().any(|p| p.name == name) {
            return Err(LedgerError::DuplicatePlayer {
                name: name.to_string(),
            });
        }

        tables.next_player_id += 1;
        let player = Player {
            id: tables.next_player_id,
            name: name.to_string(),
            matches_played: 0,
            wins: 0,
            losses: 0,
            rating,
        };
        tables.players.push(player.clone());

        Ok(player)
    }

    fn find_player(&self, id: PlayerId) -> Result<Option<Player>> {
        let tables = self.read()?;
        Ok(tables.players.iter().find(|p| p.id == id).cloned())
    }

    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>> {
        let tables = self.read()?;
        Ok(tables.players.iter().find(|p| p.name == name).cloned())
    }

    fn rename_player(&self, id: PlayerId, new_name: &str) -> Result<Player> {
        let mut tables = self.write()?;

        if tables
            .players
            .iter()
            .any(|p| p.name == new_name && p.id != id)
        {
            return Err(LedgerError::DuplicatePlayer {
                name: new_name.to_string(),
            });
        }

        let index = tables
            .player_index(id)
            .ok_or_else(|| LedgerError::UnknownPlayer {
                name: format!("#{}", id),
            })?;
        let player = &mut tables.players[index];
        player.name = new_name.to_string();

        Ok(player.clone())
    }

    fn list_players(&self, order: PlayerOrder) -> Result<Vec<Player>> {
        let tables = self.read()?;
        let mut players = tables.players.clone();
        players.sort_by(|a, b| order.compare(a, b));
        Ok(players)
    }

    fn insert_match(&self, name: &str, weightage: f64) -> Result<MatchRecord> {
        let mut tables = self.write()?;

        tables.next_match_id += 1;
        let record = MatchRecord {
            id: tables.next_match_id,
            name: name.to_string(),
            weightage,
        };
        tables.matches.push(record.clone());

        Ok(record)
    }

    fn find_match(&self, id: MatchId) -> Result<Option<MatchRecord>> {
        let tables = self.read()?;
        Ok(tables.matches.iter().find(|m| m.id == id).cloned())
    }

    fn list_matches(&self) -> Result<Vec<MatchRecord>> {
        Ok(self.read()?.matches.clone())
    }

    fn list_scores(&self) -> Result<Vec<ScoreRecord>> {
        Ok(self.read()?.scores.clone())
    }

    fn commit_result(&self, commit: &ResultCommit) -> Result<ScoreRecord> {
        let mut tables = self.write()?;

        let winner = tables
            .player_index(commit.winner)
            .ok_or_else(|| LedgerError::UnknownPlayer {
                name: format!("#{}", commit.winner),
            })?;
        let loser = tables
            .player_index(commit.loser)
            .ok_or_else(|| LedgerError::UnknownPlayer {
                name: format!("#{}", commit.loser),
            })?;

        let winner = &mut tables.players[winner];
        winner.matches_played += 1;
        winner.wins += 1;
        winner.rating = commit.winner_rating;

        let loser = &mut tables.players[loser];
        loser.matches_played += 1;
        loser.losses += 1;
        loser.rating = commit.loser_rating;

        tables.next_score_id += 1;
        let record = commit.score.clone().into_record(tables.next_score_id);
        tables.scores.push(record.clone());

        Ok(record)
    }
}
