//! SQLite ledger storage
//!
//! Tables and columns match the legacy `rating_system.db` layout exactly, so
//! existing files open without migration. Name uniqueness is enforced here
//! rather than by a schema constraint for the same reason.

use crate::error::{LedgerError, Result};
use crate::rating::INITIAL_RATING;
use crate::storage::{LedgerStorage, ResultCommit};
use crate::types::{
    MatchId, MatchRecord, Player, PlayerId, PlayerOrder, Rating, ScoreRecord,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA_SQL: &str = include_str!("schema.sql");

const PLAYER_COLUMNS: &str = "id, name, matches_played, wins, losses, rating";
const SCORE_COLUMNS: &str = "id, player1, player2, player1_score, player2_score, player1_weightage, player2_weightage, match_id";

/// Ledger storage backed by a single SQLite connection
#[derive(Debug)]
pub struct SqliteLedgerStorage {
    conn: Mutex<Connection>,
}

impl SqliteLedgerStorage {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening ledger database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Fresh private database that lives as long as this value
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::storage("Failed to acquire database connection lock"))
    }
}

fn unknown_player_id(id: PlayerId) -> LedgerError {
    LedgerError::UnknownPlayer {
        name: format!("#{}", id),
    }
}

// Legacy rows may carry NULL counters; they read as zero.
fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        matches_played: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
        wins: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        losses: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
        rating: row.get::<_, Option<Rating>>(5)?.unwrap_or(INITIAL_RATING),
    })
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<MatchRecord> {
    Ok(MatchRecord {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        weightage: row.get::<_, Option<f64>>(2)?.unwrap_or(1.0),
    })
}

fn parse_score_row(row: &rusqlite::Row) -> rusqlite::Result<ScoreRecord> {
    Ok(ScoreRecord {
        id: row.get(0)?,
        player1: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        player2: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        player1_score: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
        player2_score: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
        player1_weightage: row.get(5)?,
        player2_weightage: row.get(6)?,
        match_id: row.get(7)?,
    })
}

impl LedgerStorage for SqliteLedgerStorage {
    fn initialize(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn insert_player(&self, name: &str, rating: Rating) -> Result<Player> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let existing: Option<PlayerId> = tx
            .query_row(
                "SELECT id FROM player WHERE name = ?1 LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(LedgerError::DuplicatePlayer {
                name: name.to_string(),
            });
        }

        tx.execute(
            "INSERT INTO player (name, matches_played, wins, losses, rating) VALUES (?1, 0, 0, 0, ?2)",
            params![name, rating],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Player {
            id,
            name: name.to_string(),
            matches_played: 0,
            wins: 0,
            losses: 0,
            rating,
        })
    }

    fn find_player(&self, id: PlayerId) -> Result<Option<Player>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM player WHERE id = ?1", PLAYER_COLUMNS);
        let player = conn
            .query_row(&sql, params![id], parse_player_row)
            .optional()?;
        Ok(player)
    }

    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM player WHERE name = ?1 ORDER BY id LIMIT 2",
            PLAYER_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt
            .query_map(params![name], parse_player_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if rows.len() > 1 {
            return Err(LedgerError::DuplicatePlayer {
                name: name.to_string(),
            });
        }
        Ok(rows.pop())
    }

    fn rename_player(&self, id: PlayerId, new_name: &str) -> Result<Player> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let taken: Option<PlayerId> = tx
            .query_row(
                "SELECT id FROM player WHERE name = ?1 AND id != ?2 LIMIT 1",
                params![new_name, id],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(LedgerError::DuplicatePlayer {
                name: new_name.to_string(),
            });
        }

        let updated = tx.execute(
            "UPDATE player SET name = ?1 WHERE id = ?2",
            params![new_name, id],
        )?;
        if updated != 1 {
            return Err(unknown_player_id(id));
        }

        let sql = format!("SELECT {} FROM player WHERE id = ?1", PLAYER_COLUMNS);
        let player = tx.query_row(&sql, params![id], parse_player_row)?;
        tx.commit()?;

        Ok(player)
    }

    fn list_players(&self, order: PlayerOrder) -> Result<Vec<Player>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM player {}",
            PLAYER_COLUMNS,
            order.order_by_clause()
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], parse_player_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn insert_match(&self, name: &str, weightage: f64) -> Result<MatchRecord> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO \"match\" (name, weightage) VALUES (?1, ?2)",
            params![name, weightage],
        )?;

        Ok(MatchRecord {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            weightage,
        })
    }

    fn find_match(&self, id: MatchId) -> Result<Option<MatchRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT id, name, weightage FROM \"match\" WHERE id = ?1",
                params![id],
                parse_match_row,
            )
            .optional()?;
        Ok(record)
    }

    fn list_matches(&self) -> Result<Vec<MatchRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, weightage FROM \"match\" ORDER BY id")?;
        let rows = stmt
            .query_map([], parse_match_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn list_scores(&self) -> Result<Vec<ScoreRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM score ORDER BY id", SCORE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], parse_score_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn commit_result(&self, commit: &ResultCommit) -> Result<ScoreRecord> {
        let mut conn = self.lock()?;
        // Dropping the transaction on any early return rolls it back.
        let tx = conn.transaction()?;

        let won = tx.execute(
            "UPDATE player SET matches_played = COALESCE(matches_played, 0) + 1, wins = COALESCE(wins, 0) + 1, rating = ?1 WHERE id = ?2",
            params![commit.winner_rating, commit.winner],
        )?;
        if won != 1 {
            return Err(unknown_player_id(commit.winner));
        }

        let lost = tx.execute(
            "UPDATE player SET matches_played = COALESCE(matches_played, 0) + 1, losses = COALESCE(losses, 0) + 1, rating = ?1 WHERE id = ?2",
            params![commit.loser_rating, commit.loser],
        )?;
        if lost != 1 {
            return Err(unknown_player_id(commit.loser));
        }

        let score = &commit.score;
        tx.execute(
            "INSERT INTO score (player1, player2, player1_score, player2_score, player1_weightage, player2_weightage, match_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                score.player1,
                score.player2,
                score.player1_score,
                score.player2_score,
                score.player1_weightage,
                score.player2_weightage,
                score.match_id
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!("Committed score record {}", id);
        Ok(score.clone().into_record(id))
    }
}
