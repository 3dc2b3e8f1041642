//! Fetch command implementation

use crate::config::Config;
use crate::data::{BallDontLieClient, ParquetWriter};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// balldontlie team id (repeatable; Lakers = 14)
    #[arg(long = "team-id", required = true)]
    pub team_ids: Vec<u32>,

    /// Season start year (repeatable)
    #[arg(long = "season", required = true)]
    pub seasons: Vec<u32>,

    /// Output games table
    #[arg(short, long, default_value = "data/raw/games.parquet")]
    pub output: PathBuf,
}

impl FetchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = BallDontLieClient::new(
            config.ingest.clone(),
            self.team_ids.clone(),
            self.seasons.clone(),
        )?;
        let games = client.fetch_games().await.context("Failed to fetch games")?;

        if games.is_empty() {
            println!("No finished games returned; nothing written.");
            return Ok(());
        }

        ParquetWriter::new()
            .write_games(&self.output, &games)
            .context("Failed to write games table")?;
        println!("Fetched {} games -> {}", games.len(), self.output.display());
        Ok(())
    }
}
