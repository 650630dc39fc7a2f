//! Integration tests for the match ledger
//!
//! These tests run the ledger end to end against both storage backends:
//! - Recording results and the resulting rating exchange
//! - Tie handling and the counter invariant
//! - Unknown players, failed commits and rollback
//! - Renames, listings and persistence across reopen

mod fixtures;

use fixtures::{
    all_ledgers, assert_counters_consistent, ledger_with_players, sqlite_ledger, FlakyStorage,
    TempDatabase,
};
use rating_ledger::{
    InMemoryLedgerStorage, LedgerError, MatchLedger, Outcome, PlayerOrder, PlayerSortKey,
    ResultSubmission, SortDirection, SqliteLedgerStorage,
};
use std::sync::Arc;

#[test]
fn test_alex_beats_troy_scenario() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex", "Troy"]);

        let result = ledger.record_result("Alex", "Troy", 21, 15).unwrap();

        assert_eq!(result.player1.new_rating, 1016, "{}", backend);
        assert_eq!(result.player2.new_rating, 984, "{}", backend);

        let alex = ledger.get_player("Alex").unwrap();
        let troy = ledger.get_player("Troy").unwrap();
        assert_eq!((alex.rating, alex.wins, alex.losses, alex.matches_played), (1016, 1, 0, 1));
        assert_eq!((troy.rating, troy.wins, troy.losses, troy.matches_played), (984, 0, 1, 1));
    }
}

#[test]
fn test_winner_gains_what_loser_drops() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["P1", "P2"]);

        let result = ledger.record_result("P1", "P2", 11, 5).unwrap();
        let winner_delta = result.winner().delta();
        let loser_delta = result.loser().delta();

        assert!(result.winner().new_rating > 1000, "{}", backend);
        assert!(result.loser().new_rating < 1000, "{}", backend);
        assert_eq!(winner_delta, -loser_delta, "{}", backend);
    }
}

#[test]
fn test_tie_credits_player2() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Jeff", "Jack"]);

        let result = ledger.record_result("Jeff", "Jack", 5, 5).unwrap();

        assert_eq!(result.outcome, Outcome::Player2Won, "{}", backend);
        assert_eq!(ledger.rating_of("Jeff").unwrap(), 984, "{}", backend);
        assert_eq!(ledger.rating_of("Jack").unwrap(), 1016, "{}", backend);

        let jack = ledger.get_player("Jack").unwrap();
        assert_eq!(jack.wins, 1, "{}", backend);
        let scores = ledger.list_scores().unwrap();
        assert_eq!((scores[0].player1_score, scores[0].player2_score), (5, 5));
    }
}

#[test]
fn test_repeated_results_are_not_idempotent() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex", "Troy"]);

        let first = ledger.record_result("Alex", "Troy", 11, 5).unwrap();
        let second = ledger.record_result("Alex", "Troy", 11, 5).unwrap();

        assert_ne!(first.score.id, second.score.id, "{}", backend);
        assert_eq!(second.player1.old_rating, first.player1.new_rating, "{}", backend);
        assert!(second.player1.new_rating > first.player1.new_rating, "{}", backend);
        assert_eq!(ledger.list_scores().unwrap().len(), 2, "{}", backend);
        assert_eq!(ledger.get_player("Alex").unwrap().wins, 2, "{}", backend);
    }
}

#[test]
fn test_unknown_player_leaves_storage_unchanged() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex"]);
        let before = ledger.leaderboard().unwrap();

        for (p1, p2) in [("Alex", "Ghost"), ("Ghost", "Alex")] {
            match ledger.record_result(p1, p2, 11, 5) {
                Err(LedgerError::UnknownPlayer { name }) => assert_eq!(name, "Ghost"),
                other => panic!("{}: expected UnknownPlayer, got {:?}", backend, other),
            }
        }

        assert_eq!(ledger.leaderboard().unwrap(), before, "{}", backend);
        assert!(ledger.list_scores().unwrap().is_empty(), "{}", backend);
    }
}

#[test]
fn test_invalid_score_text_fails_fast() {
    let ledger = ledger_with_players(sqlite_ledger(), &["Alex", "Troy"]);

    let parsed = ResultSubmission::parse("Alex", "Troy", "21", "1O");
    assert!(matches!(parsed, Err(LedgerError::InvalidScore { .. })));

    assert!(ledger.list_scores().unwrap().is_empty());
    assert_eq!(ledger.rating_of("Alex").unwrap(), 1000);
}

#[test]
fn test_counters_consistent_after_mixed_results() {
    for (_, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex", "Troy", "Jeff", "Jack", "Qadeer"]);
        let games = [
            ("Alex", "Troy", 11, 9),
            ("Jeff", "Alex", 4, 11),
            ("Jack", "Qadeer", 7, 7),
            ("Troy", "Jeff", 11, 2),
            ("Qadeer", "Alex", 12, 10),
            ("Jack", "Troy", 0, 11),
        ];
        for (p1, p2, s1, s2) in games {
            ledger.record_result(p1, p2, s1, s2).unwrap();
        }

        let players = ledger.leaderboard().unwrap();
        assert_counters_consistent(&players);
        let total: i64 = players.iter().map(|p| p.matches_played).sum();
        assert_eq!(total, 2 * games.len() as i64);
    }
}

#[test]
fn test_failed_commit_keeps_cache_and_storage_in_step() {
    let storage = Arc::new(FlakyStorage::new(InMemoryLedgerStorage::new()));
    let ledger = MatchLedger::open(storage.clone()).unwrap();
    ledger.add_player("Alex").unwrap();
    ledger.add_player("Troy").unwrap();

    storage.set_failing(true);
    let result = ledger.record_result("Alex", "Troy", 21, 15);
    assert!(matches!(result, Err(LedgerError::StorageFailure { .. })));
    assert_eq!(storage.commit_calls(), 1);

    assert_eq!(ledger.rating_of("Alex").unwrap(), 1000);
    assert_eq!(ledger.get_player("Alex").unwrap().matches_played, 0);
    assert!(ledger.list_scores().unwrap().is_empty());

    // Nothing is retried automatically; the caller tries again
    storage.set_failing(false);
    let result = ledger.record_result("Alex", "Troy", 21, 15).unwrap();
    assert_eq!(result.player1.old_rating, 1000);
    assert_eq!(result.player1.new_rating, 1016);
}

#[test]
fn test_rename_preserves_history_and_counters() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex", "Troy"]);
        ledger.record_result("Alex", "Troy", 21, 15).unwrap();

        let renamed = ledger.rename_player("Alex", "Alexander").unwrap();
        assert_eq!((renamed.wins, renamed.rating), (1, 1016), "{}", backend);

        assert!(matches!(
            ledger.get_player("Alex"),
            Err(LedgerError::UnknownPlayer { .. })
        ));

        // Score records keep the name used at the time
        assert_eq!(ledger.list_scores().unwrap()[0].player1, "Alex", "{}", backend);

        // The renamed player keeps playing from the same rating
        let result = ledger.record_result("Alexander", "Troy", 3, 11).unwrap();
        assert_eq!(result.player1.old_rating, 1016, "{}", backend);
        assert_eq!(result.player1.player_id, renamed.id, "{}", backend);
    }
}

#[test]
fn test_rename_errors() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex", "Troy"]);

        assert!(
            matches!(
                ledger.rename_player("Ghost", "Casper"),
                Err(LedgerError::UnknownPlayer { .. })
            ),
            "{}",
            backend
        );
        assert!(
            matches!(
                ledger.rename_player("Alex", "Troy"),
                Err(LedgerError::DuplicatePlayer { .. })
            ),
            "{}",
            backend
        );
        assert!(
            matches!(
                ledger.rename_player("Alex", ""),
                Err(LedgerError::InvalidPlayerName { .. })
            ),
            "{}",
            backend
        );
        assert_eq!(ledger.rating_of("Alex").unwrap(), 1000);
    }
}

#[test]
fn test_list_players_orders_and_restarts() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex", "Troy", "Jeff"]);

        let names = |order: PlayerOrder| -> Vec<String> {
            ledger
                .list_players(order)
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect()
        };

        assert_eq!(names(PlayerOrder::default()), vec!["Alex", "Troy", "Jeff"], "{}", backend);

        ledger.record_result("Alex", "Jeff", 1, 11).unwrap();
        assert_eq!(names(PlayerOrder::default()), vec!["Jeff", "Troy", "Alex"], "{}", backend);
        assert_eq!(
            names(PlayerOrder::new(PlayerSortKey::Rating, SortDirection::Ascending)),
            vec!["Alex", "Troy", "Jeff"],
            "{}",
            backend
        );
        assert_eq!(
            names(PlayerOrder::new(PlayerSortKey::Losses, SortDirection::Descending)),
            vec!["Alex", "Troy", "Jeff"],
            "{}",
            backend
        );
    }
}

#[test]
fn test_matches_and_weighted_submissions() {
    for (backend, ledger) in all_ledgers() {
        let ledger = ledger_with_players(ledger, &["Alex", "Troy"]);
        let league = ledger.add_match("League night", 1.0).unwrap();
        let cup = ledger.add_match("Cup final", 2.5).unwrap();

        let weighted = ResultSubmission::new("Alex", "Troy", 21, 19)
            .in_match(cup.id)
            .with_weightages(2.0, 0.5);
        let result = ledger.record_submission(weighted).unwrap();

        // Weightages are stored but leave the rating exchange untouched
        assert_eq!(result.player1.new_rating, 1016, "{}", backend);
        assert_eq!(result.score.match_id, Some(cup.id), "{}", backend);

        let matches = ledger.list_matches().unwrap();
        assert_eq!(matches, vec![league, cup], "{}", backend);

        let scores = ledger.list_scores().unwrap();
        assert_eq!(scores[0].player1_weightage, Some(2.0), "{}", backend);
        assert_eq!(scores[0].player2_weightage, Some(0.5), "{}", backend);
    }
}

#[test]
fn test_sqlite_file_survives_reopen() {
    let db = TempDatabase::new("reopen");

    {
        let ledger = MatchLedger::open(Arc::new(SqliteLedgerStorage::open(&db.path).unwrap())).unwrap();
        ledger.add_player("Alex").unwrap();
        ledger.add_player("Troy").unwrap();
        ledger.record_result("Alex", "Troy", 21, 15).unwrap();
    }

    let ledger = MatchLedger::open(Arc::new(SqliteLedgerStorage::open(&db.path).unwrap())).unwrap();
    assert_eq!(ledger.rating_of("Alex").unwrap(), 1016);
    assert_eq!(ledger.rating_of("Troy").unwrap(), 984);
    assert_eq!(ledger.list_scores().unwrap().len(), 1);

    // The rebuilt cache feeds the next update
    let result = ledger.record_result("Troy", "Alex", 21, 15).unwrap();
    assert_eq!(result.player1.old_rating, 984);
    assert_eq!(result.player2.old_rating, 1016);
}

#[test]
fn test_duplicate_player_rejected_across_backends() {
    for (backend, ledger) in all_ledgers() {
        ledger.add_player("Alex").unwrap();
        match ledger.add_player(" Alex ") {
            Err(LedgerError::DuplicatePlayer { name }) => assert_eq!(name, "Alex"),
            other => panic!("{}: expected DuplicatePlayer, got {:?}", backend, other),
        }
        assert_eq!(ledger.leaderboard().unwrap().len(), 1);
    }
}

#[test]
fn test_legacy_file_with_padded_names_opens_unchanged() {
    let db = TempDatabase::new("padded-names");
    drop(SqliteLedgerStorage::open(&db.path).unwrap());
    {
        let conn = rusqlite::Connection::open(&db.path).unwrap();
        conn.execute_batch(
            "INSERT INTO player (name, matches_played, wins, losses, rating) VALUES
                ('Alex ', 2, 1, 1, 1000), ('Troy', 2, 1, 1, 1000);",
        )
        .unwrap();
    }

    let ledger = MatchLedger::open(Arc::new(SqliteLedgerStorage::open(&db.path).unwrap())).unwrap();
    let result = ledger.record_result("Alex ", "Troy", 21, 15).unwrap();
    assert_eq!(result.player1.new_rating, 1016);
    assert_eq!(ledger.list_scores().unwrap()[0].player1, "Alex ");

    let alex = ledger.get_player("Alex ").unwrap();
    assert_eq!((alex.matches_played, alex.wins, alex.losses), (3, 2, 1));

    // Renaming to the trimmed form makes the player reachable as typed
    let renamed = ledger.rename_player("Alex ", "Alex").unwrap();
    assert_eq!(renamed.id, alex.id);
    assert_eq!(ledger.rating_of("Alex").unwrap(), 1016);
    assert_counters_consistent(&ledger.leaderboard().unwrap());
}
