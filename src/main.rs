//! Command-line client for the rating ledger
//!
//! Each invocation opens the configured ledger, performs one operation and
//! prints the resulting listing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rating_ledger::config::{AppConfig, StorageBackend};
use rating_ledger::{
    MatchLedger, MatchRecord, Player, PlayerOrder, PlayerSortKey, RecordedResult,
    ResultSubmission, ScoreRecord, SortDirection,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// Rating Ledger - record head-to-head results and track Elo ratings
#[derive(Parser)]
#[command(
    name = "rating-ledger",
    version,
    about = "Record match results and maintain Elo ratings for players",
    long_about = "Rating Ledger keeps players, match groupings and score records in a SQLite \
                 file and updates both players' Elo ratings (K = 32, initial 1000) every time \
                 a result is recorded."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Database path override
    #[arg(long, value_name = "FILE", help = "Override the SQLite database file")]
    database: Option<PathBuf>,

    /// Use a throwaway in-memory ledger
    #[arg(long, help = "Use in-memory storage instead of SQLite")]
    memory: bool,

    /// Print JSON instead of tables
    #[arg(long, help = "Print results as JSON")]
    json: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new player at the initial rating
    AddPlayer { name: String },

    /// Rename an existing player, keeping counters and rating
    RenamePlayer { old_name: String, new_name: String },

    /// Record a completed contest; player 1 wins only with a higher score
    Record {
        player1: String,
        player2: String,
        score1: String,
        score2: String,

        /// Match grouping this result belongs to
        #[arg(long, value_name = "ID")]
        match_id: Option<i64>,

        /// Per-player weightages, stored with the score record
        #[arg(long, num_args = 2, value_names = ["P1", "P2"])]
        weightages: Option<Vec<f64>>,
    },

    /// Create a match grouping record
    AddMatch {
        name: String,
        #[arg(default_value_t = 1.0)]
        weightage: f64,
    },

    /// Show a single player
    Show { name: String },

    /// List players
    Players {
        #[arg(long, default_value = "rating")]
        order_by: PlayerSortKey,
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
    },

    /// List score records in the order they were recorded
    Scores,

    /// List match records in the order they were created
    Matches,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(database) = &args.database {
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.database_path = database.clone();
    }

    if args.memory {
        config.storage.backend = StorageBackend::Memory;
    }

    rating_ledger::config::validate_config(&config)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_players(players: &[Player], json: bool) -> Result<()> {
    if json {
        return print_json(&players);
    }

    println!(
        "{:>4}  {:<20} {:>14} {:>6} {:>6} {:>7}",
        "ID", "Name", "Matches_played", "Wins", "Losses", "Rating"
    );
    for p in players {
        println!(
            "{:>4}  {:<20} {:>14} {:>6} {:>6} {:>7}",
            p.id, p.name, p.matches_played, p.wins, p.losses, p.rating
        );
    }
    Ok(())
}

fn print_scores(scores: &[ScoreRecord], json: bool) -> Result<()> {
    if json {
        return print_json(&scores);
    }

    let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    println!(
        "{:>4}  {:<16} {:<16} {:>6} {:>6} {:>8} {:>6} {:>6}",
        "ID", "Player 1", "Player 2", "P1", "P2", "Match ID", "P1 W", "P2 W"
    );
    for s in scores {
        println!(
            "{:>4}  {:<16} {:<16} {:>6} {:>6} {:>8} {:>6} {:>6}",
            s.id,
            s.player1,
            s.player2,
            s.player1_score,
            s.player2_score,
            optional(s.match_id.map(|id| id.to_string())),
            optional(s.player1_weightage.map(|w| w.to_string())),
            optional(s.player2_weightage.map(|w| w.to_string())),
        );
    }
    Ok(())
}

fn print_matches(matches: &[MatchRecord], json: bool) -> Result<()> {
    if json {
        return print_json(&matches);
    }

    println!("{:>4}  {:<24} {:>9}", "ID", "Name", "Weightage");
    for m in matches {
        println!("{:>4}  {:<24} {:>9}", m.id, m.name, m.weightage);
    }
    Ok(())
}

fn print_result(result: &RecordedResult, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }

    println!(
        "{} {} - {} {}  (winner: {})",
        result.player1.name,
        result.score.player1_score,
        result.score.player2_score,
        result.player2.name,
        result.winner().name
    );
    for change in [&result.player1, &result.player2] {
        println!(
            "  {:<20} {} -> {} ({:+})",
            change.name,
            change.old_rating,
            change.new_rating,
            change.delta()
        );
    }
    Ok(())
}

fn run(ledger: &MatchLedger, command: Command, json: bool) -> Result<()> {
    match command {
        Command::AddPlayer { name } => {
            ledger.add_player(&name)?;
            print_players(&ledger.leaderboard()?, json)
        }
        Command::RenamePlayer { old_name, new_name } => {
            ledger.rename_player(&old_name, &new_name)?;
            print_players(&ledger.leaderboard()?, json)
        }
        Command::Record {
            player1,
            player2,
            score1,
            score2,
            match_id,
            weightages,
        } => {
            let mut submission = ResultSubmission::parse(&player1, &player2, &score1, &score2)?;
            if let Some(match_id) = match_id {
                submission = submission.in_match(match_id);
            }
            if let Some([w1, w2]) = weightages.as_deref() {
                submission = submission.with_weightages(*w1, *w2);
            }
            let result = ledger.record_submission(submission)?;
            print_result(&result, json)
        }
        Command::AddMatch { name, weightage } => {
            ledger.add_match(&name, weightage)?;
            print_matches(&ledger.list_matches()?, json)
        }
        Command::Show { name } => {
            let player = ledger.get_player(&name)?;
            print_players(std::slice::from_ref(&player), json)
        }
        Command::Players {
            order_by,
            direction,
        } => print_players(
            &ledger.list_players(PlayerOrder::new(order_by, direction))?,
            json,
        ),
        Command::Scores => print_scores(&ledger.list_scores()?, json),
        Command::Matches => print_matches(&ledger.list_matches()?, json),
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("{} v{}", config.service.name, rating_ledger::VERSION);

    let ledger = match config.open_ledger() {
        Ok(ledger) => ledger,
        Err(e) => {
            error!("Failed to open ledger: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&ledger, args.command, args.json) {
        error!("{:#}", e);
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    Ok(())
}
