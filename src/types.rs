//! Common types used throughout the rating ledger

use crate::error::{LedgerError, Result};
use crate::rating::INITIAL_RATING;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Stable internal identifier of a player (the `player.id` column)
pub type PlayerId = i64;

/// Identifier of a match grouping record
pub type MatchId = i64;

/// Identifier of a score record
pub type ScoreId = i64;

/// Integer skill rating
pub type Rating = i32;

/// A registered player with cumulative counters and current rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub matches_played: i64,
    pub wins: i64,
    pub losses: i64,
    pub rating: Rating,
}

/// Optional grouping construct for score records.
///
/// `weightage` is persisted but does not take part in rating updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub name: String,
    pub weightage: f64,
}

/// Immutable log entry of one completed contest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: ScoreId,
    pub player1: String,
    pub player2: String,
    pub player1_score: i64,
    pub player2_score: i64,
    pub player1_weightage: Option<f64>,
    pub player2_weightage: Option<f64>,
    pub match_id: Option<MatchId>,
}

/// Score record content before storage assigns it an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScore {
    pub player1: String,
    pub player2: String,
    pub player1_score: i64,
    pub player2_score: i64,
    pub player1_weightage: Option<f64>,
    pub player2_weightage: Option<f64>,
    pub match_id: Option<MatchId>,
}

impl NewScore {
    pub fn into_record(self, id: ScoreId) -> ScoreRecord {
        ScoreRecord {
            id,
            player1: self.player1,
            player2: self.player2,
            player1_score: self.player1_score,
            player2_score: self.player2_score,
            player1_weightage: self.player1_weightage,
            player2_weightage: self.player2_weightage,
            match_id: self.match_id,
        }
    }
}

/// Binary result of a contest. There is no draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Player1Won,
    Player2Won,
}

impl Outcome {
    /// Player 1 wins only with a strictly greater score; a tie goes to player 2.
    pub fn from_scores(player1_score: i64, player2_score: i64) -> Self {
        if player1_score > player2_score {
            Outcome::Player1Won
        } else {
            Outcome::Player2Won
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Player1Won => write!(f, "player1"),
            Outcome::Player2Won => write!(f, "player2"),
        }
    }
}

/// Rating change information for a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player_id: PlayerId,
    pub name: String,
    pub old_rating: Rating,
    pub new_rating: Rating,
}

impl RatingChange {
    pub fn delta(&self) -> Rating {
        self.new_rating - self.old_rating
    }
}

/// Everything a successful `record_result` produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedResult {
    pub outcome: Outcome,
    pub player1: RatingChange,
    pub player2: RatingChange,
    pub score: ScoreRecord,
}

impl RecordedResult {
    pub fn winner(&self) -> &RatingChange {
        match self.outcome {
            Outcome::Player1Won => &self.player1,
            Outcome::Player2Won => &self.player2,
        }
    }

    pub fn loser(&self) -> &RatingChange {
        match self.outcome {
            Outcome::Player1Won => &self.player2,
            Outcome::Player2Won => &self.player1,
        }
    }
}

/// Column a player listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSortKey {
    Id,
    Name,
    MatchesPlayed,
    Wins,
    Losses,
    Rating,
}

impl PlayerSortKey {
    /// Column name in the `player` table
    pub fn column(self) -> &'static str {
        match self {
            PlayerSortKey::Id => "id",
            PlayerSortKey::Name => "name",
            PlayerSortKey::MatchesPlayed => "matches_played",
            PlayerSortKey::Wins => "wins",
            PlayerSortKey::Losses => "losses",
            PlayerSortKey::Rating => "rating",
        }
    }

    /// SQL sort expression; NULL legacy values sort as the value they read back as
    pub fn sort_expression(self) -> String {
        match self {
            PlayerSortKey::Id => self.column().to_string(),
            PlayerSortKey::Name => format!("COALESCE({}, '')", self.column()),
            PlayerSortKey::Rating => format!("COALESCE({}, {})", self.column(), INITIAL_RATING),
            PlayerSortKey::MatchesPlayed | PlayerSortKey::Wins | PlayerSortKey::Losses => {
                format!("COALESCE({}, 0)", self.column())
            }
        }
    }
}

impl FromStr for PlayerSortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "id" => Ok(PlayerSortKey::Id),
            "name" => Ok(PlayerSortKey::Name),
            "matches_played" | "matches" => Ok(PlayerSortKey::MatchesPlayed),
            "wins" => Ok(PlayerSortKey::Wins),
            "losses" => Ok(PlayerSortKey::Losses),
            "rating" => Ok(PlayerSortKey::Rating),
            other => Err(format!("unknown sort column: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// Ordering of a player listing. Defaults to rating, highest first.
///
/// Rows that compare equal on the key fall back to ascending id so every
/// backend produces the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOrder {
    pub key: PlayerSortKey,
    pub direction: SortDirection,
}

impl Default for PlayerOrder {
    fn default() -> Self {
        Self {
            key: PlayerSortKey::Rating,
            direction: SortDirection::Descending,
        }
    }
}

impl PlayerOrder {
    pub fn new(key: PlayerSortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Compare two players the way the SQL `ORDER BY` clause does
    pub fn compare(&self, a: &Player, b: &Player) -> Ordering {
        let by_key = match self.key {
            PlayerSortKey::Id => a.id.cmp(&b.id),
            PlayerSortKey::Name => a.name.cmp(&b.name),
            PlayerSortKey::MatchesPlayed => a.matches_played.cmp(&b.matches_played),
            PlayerSortKey::Wins => a.wins.cmp(&b.wins),
            PlayerSortKey::Losses => a.losses.cmp(&b.losses),
            PlayerSortKey::Rating => a.rating.cmp(&b.rating),
        };
        let by_key = match self.direction {
            SortDirection::Ascending => by_key,
            SortDirection::Descending => by_key.reverse(),
        };
        by_key.then_with(|| a.id.cmp(&b.id))
    }

    pub fn order_by_clause(&self) -> String {
        format!(
            "ORDER BY {} {}, id ASC",
            self.key.sort_expression(),
            self.direction.sql()
        )
    }
}

/// A completed contest as submitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub player1: String,
    pub player2: String,
    pub player1_score: i64,
    pub player2_score: i64,
    pub match_id: Option<MatchId>,
    pub player1_weightage: Option<f64>,
    pub player2_weightage: Option<f64>,
}

impl ResultSubmission {
    pub fn new(
        player1: impl Into<String>,
        player2: impl Into<String>,
        player1_score: i64,
        player2_score: i64,
    ) -> Self {
        Self {
            player1: player1.into(),
            player2: player2.into(),
            player1_score,
            player2_score,
            match_id: None,
            player1_weightage: None,
            player2_weightage: None,
        }
    }

    /// Build a submission from raw user text, rejecting non-integer scores
    pub fn parse(player1: &str, player2: &str, score1: &str, score2: &str) -> Result<Self> {
        Ok(Self::new(
            player1,
            player2,
            parse_score(score1)?,
            parse_score(score2)?,
        ))
    }

    pub fn in_match(mut self, match_id: MatchId) -> Self {
        self.match_id = Some(match_id);
        self
    }

    pub fn with_weightages(mut self, player1: f64, player2: f64) -> Self {
        self.player1_weightage = Some(player1);
        self.player2_weightage = Some(player2);
        self
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_scores(self.player1_score, self.player2_score)
    }
}

/// Parse a user-supplied score, failing fast on anything but an integer
pub fn parse_score(input: &str) -> Result<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| LedgerError::InvalidScore {
            input: input.to_string(),
        })
}
