//! Prepare command implementation

use crate::config::Config;
use crate::data::{load_games, ParquetWriter};
use crate::features::build_game_features;
use crate::telemetry::{record_duration, Stage};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Games file (CSV, or Parquet from `fetch`); defaults to the configured path
    #[arg(short, long)]
    pub games: Option<PathBuf>,

    /// Rolling window for form features
    #[arg(short, long)]
    pub window: Option<usize>,
}

impl PrepareArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let games_path = self
            .games
            .clone()
            .unwrap_or_else(|| config.data.games_path.clone());
        let feature_config = match self.window {
            Some(window) => config.features.with_window(window),
            None => config.features,
        };

        let games = load_games(&games_path)
            .with_context(|| format!("Failed to load games from {}", games_path.display()))?;
        if games.is_empty() {
            anyhow::bail!("No games in {}; nothing to prepare", games_path.display());
        }
        tracing::info!(path = ?games_path, games = games.len(), "Loaded games");

        let started = Instant::now();
        let (features, team_long) = build_game_features(&games, &feature_config)?;
        record_duration(Stage::Features, started.elapsed());

        let writer = ParquetWriter::new();
        writer
            .write_features(&config.data.features_path, &features)
            .context("Failed to write feature table")?;
        writer
            .write_team_long(&config.data.team_long_path, &team_long)
            .context("Failed to write team-long table")?;

        println!("Prepared features -> {}", config.data.features_path.display());
        println!("Saved team-long stats -> {}", config.data.team_long_path.display());
        Ok(())
    }
}
