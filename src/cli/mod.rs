//! CLI interface for nba-value
//!
//! Provides subcommands for:
//! - `prepare`: Build feature and team-long tables from game results
//! - `train`: Train the win-probability model
//! - `score`: Score odds and list value bets
//! - `fetch`: Pull game results from balldontlie
//! - `config`: Show configuration

mod fetch;
mod prepare;
mod score;
mod train;

pub use fetch::FetchArgs;
pub use prepare::PrepareArgs;
pub use score::ScoreArgs;
pub use train::TrainArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "nba-value")]
#[command(about = "NBA win-probability features and value bet scanner")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build features from game results
    Prepare(PrepareArgs),
    /// Train win-probability model
    Train(TrainArgs),
    /// Score odds and show positive-EV bets
    Score(ScoreArgs),
    /// Fetch game results from the balldontlie API
    Fetch(FetchArgs),
    /// Show configuration
    Config,
}
