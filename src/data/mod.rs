//! Data acquisition and persistence
//!
//! CSV and API loaders for games and odds, and Parquet tables for everything
//! the pipeline produces.

mod api;
mod csv;
mod parquet;
mod types;

pub use api::BallDontLieClient;
pub use csv::{load_games_csv, load_odds_csv, CsvGameSource, GAME_CSV_COLUMNS, ODDS_CSV_COLUMNS};
pub use self::parquet::{
    feature_schema, games_schema, scored_quote_schema, team_long_schema, ParquetReader,
    ParquetWriter,
};
pub use types::{parse_date, DataError, GameResult, Venue};

use async_trait::async_trait;
use std::path::Path;

/// Trait for sources of historical game results
#[async_trait]
pub trait GameSource: Send + Sync {
    /// Load every available game
    async fn load_games(&self) -> Result<Vec<GameResult>, DataError>;
}

/// Load games from a `.parquet` table or a CSV file
pub fn load_games(path: impl AsRef<Path>) -> anyhow::Result<Vec<GameResult>> {
    let path = path.as_ref();
    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        ParquetReader::new(path).read_games()
    } else {
        Ok(load_games_csv(path)?)
    }
}
