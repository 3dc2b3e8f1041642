//! Score command implementation

use crate::config::Config;
use crate::data::{load_odds_csv, ParquetReader, ParquetWriter};
use crate::ev::{rank_value_bets, score_quotes, ScoredQuote};
use crate::model::LogisticModel;
use anyhow::Context;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Odds CSV; defaults to the configured path
    #[arg(long)]
    pub odds: Option<PathBuf>,

    /// Show top-N bets
    #[arg(long)]
    pub top: Option<usize>,

    /// Only show bets with EV above this value
    #[arg(long)]
    pub min_ev: Option<Decimal>,

    /// Write every scored quote to this Parquet file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ScoreArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let odds_path = self.odds.clone().unwrap_or_else(|| config.data.odds_path.clone());
        let top = self.top.unwrap_or(config.scoring.top);
        let min_ev = self.min_ev.unwrap_or(config.scoring.min_ev);

        let model = LogisticModel::load(&config.data.model_path).with_context(|| {
            format!(
                "Failed to load model from {}; run `train` first",
                config.data.model_path.display()
            )
        })?;
        let team_long = ParquetReader::new(&config.data.team_long_path)
            .read_team_long()
            .context("Failed to read team-long table; run `prepare` first")?;
        let quotes = load_odds_csv(&odds_path)
            .with_context(|| format!("Failed to load odds from {}", odds_path.display()))?;

        let scored = score_quotes(&model, &team_long, &quotes)?;

        if let Some(output) = &self.output {
            ParquetWriter::new()
                .write_scored_quotes(output, &scored)
                .context("Failed to write scored quotes")?;
            tracing::info!(path = ?output, rows = scored.len(), "Saved scored quotes");
        }

        let ranked = rank_value_bets(scored, min_ev);
        if ranked.is_empty() {
            println!("No positive-EV bets found.");
            return Ok(());
        }

        println!("Top value bets:");
        println!("{}", format_bets(&ranked[..top.min(ranked.len())]));
        Ok(())
    }
}

/// Format ranked bets as a fixed-width table
fn format_bets(bets: &[ScoredQuote]) -> String {
    let mut out = format!(
        "{:<10}  {:<24}  {:<24}  {:<4}  {:<10}  {:>6}  {:>6}  {:>7}  {:>9}\n",
        "date", "team", "opponent", "side", "book", "odds", "p_hat", "ev", "deviation"
    );
    for bet in bets {
        out.push_str(&format!(
            "{:<10}  {:<24}  {:<24}  {:<4}  {:<10}  {:>6}  {:>6}  {:>7}  {:>9}\n",
            bet.date.to_string(),
            bet.team,
            bet.opponent,
            bet.home_away.as_str(),
            bet.book,
            bet.decimal_odds.round_dp(3),
            bet.p_hat.round_dp(3),
            bet.ev.round_dp(3),
            bet.deviation.round_dp(3),
        ));
    }
    out
}
