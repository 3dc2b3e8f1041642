//! Train command implementation

use crate::config::Config;
use crate::data::ParquetReader;
use crate::model::train_model;
use crate::telemetry::{record_duration, record_rows, Stage};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Feature table; defaults to the configured path
    #[arg(short, long)]
    pub features: Option<PathBuf>,

    /// Where to save the model; defaults to the configured path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl TrainArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let features_path = self
            .features
            .clone()
            .unwrap_or_else(|| config.data.features_path.clone());
        let model_path = self.output.clone().unwrap_or_else(|| config.data.model_path.clone());

        let rows = ParquetReader::new(&features_path)
            .read_features()
            .with_context(|| {
                format!(
                    "Failed to read features from {}; run `prepare` first",
                    features_path.display()
                )
            })?;

        let started = Instant::now();
        let (model, report) = train_model(&rows, &config.model)?;
        record_duration(Stage::Training, started.elapsed());
        record_rows(Stage::Training, report.n_train);

        model
            .save(&model_path)
            .with_context(|| format!("Failed to save model to {}", model_path.display()))?;

        println!("Trained model saved to {}", model_path.display());
        println!("{}", report.format_table());
        Ok(())
    }
}
