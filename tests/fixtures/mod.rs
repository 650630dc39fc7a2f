//! Test fixtures and storage wrappers for integration testing

#![allow(dead_code)]

use rating_ledger::error::{LedgerError, Result};
use rating_ledger::storage::{LedgerStorage, ResultCommit};
use rating_ledger::{
    InMemoryLedgerStorage, MatchId, MatchLedger, MatchRecord, Player, PlayerId, PlayerOrder,
    Rating, ScoreRecord, SqliteLedgerStorage,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Storage wrapper whose result commits can be switched to fail
#[derive(Debug)]
pub struct FlakyStorage<S: LedgerStorage> {
    inner: S,
    fail_commits: AtomicBool,
    commit_calls: AtomicUsize,
}

impl<S: LedgerStorage> FlakyStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_commits: AtomicBool::new(false),
            commit_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_commits.store(failing, Ordering::SeqCst);
    }

    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }
}

impl<S: LedgerStorage> LedgerStorage for FlakyStorage<S> {
    fn initialize(&self) -> Result<()> {
        self.inner.initialize()
    }

    fn insert_player(&self, name: &str, rating: Rating) -> Result<Player> {
        self.inner.insert_player(name, rating)
    }

    fn find_player(&self, id: PlayerId) -> Result<Option<Player>> {
        self.inner.find_player(id)
    }

    fn find_player_by_name(&self, name: &str) -> Result<Option<Player>> {
        self.inner.find_player_by_name(name)
    }

    fn rename_player(&self, id: PlayerId, new_name: &str) -> Result<Player> {
        self.inner.rename_player(id, new_name)
    }

    fn list_players(&self, order: PlayerOrder) -> Result<Vec<Player>> {
        self.inner.list_players(order)
    }

    fn insert_match(&self, name: &str, weightage: f64) -> Result<MatchRecord> {
        self.inner.insert_match(name, weightage)
    }

    fn find_match(&self, id: MatchId) -> Result<Option<MatchRecord>> {
        self.inner.find_match(id)
    }

    fn list_matches(&self) -> Result<Vec<MatchRecord>> {
        self.inner.list_matches()
    }

    fn list_scores(&self) -> Result<Vec<ScoreRecord>> {
        self.inner.list_scores()
    }

    fn commit_result(&self, commit: &ResultCommit) -> Result<ScoreRecord> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(LedgerError::storage("disk full"));
        }
        self.inner.commit_result(commit)
    }
}

/// Ledger over a private in-memory SQLite database
pub fn sqlite_ledger() -> MatchLedger {
    MatchLedger::open(Arc::new(SqliteLedgerStorage::open_in_memory().unwrap())).unwrap()
}

pub fn memory_ledger() -> MatchLedger {
    MatchLedger::open(Arc::new(InMemoryLedgerStorage::new())).unwrap()
}

/// Both backends, labelled for assertion messages
pub fn all_ledgers() -> Vec<(&'static str, MatchLedger)> {
    vec![("sqlite", sqlite_ledger()), ("memory", memory_ledger())]
}

/// Ledger with the given players already registered
pub fn ledger_with_players(ledger: MatchLedger, names: &[&str]) -> MatchLedger {
    for name in names {
        ledger.add_player(name).unwrap();
    }
    ledger
}

/// Database file path unique to one test, removed on drop
pub struct TempDatabase {
    pub path: PathBuf,
}

impl TempDatabase {
    pub fn new(test_name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "rating-ledger-{}-{}.db",
            test_name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Self { path }
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Check the counter invariant for every player
pub fn assert_counters_consistent(players: &[Player]) {
    for player in players {
        assert_eq!(
            player.matches_played,
            player.wins + player.losses,
            "counters out of step for {}",
            player.name
        );
    }
}
