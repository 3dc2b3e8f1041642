//! Configuration types for nba-value

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Rolling-form feature configuration
///
/// The neutral priors are applied to a team with no prior events, both when
/// the team-long table is built and when a single matchup is featurised.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FeatureConfig {
    /// Number of preceding events averaged into the rolling stats
    #[serde(default = "default_window")]
    pub window: usize,

    /// `win_rolling` for a team without history
    #[serde(default = "default_neutral_win_rate")]
    pub neutral_win_rate: f64,

    /// `pd_rolling` for a team without history
    #[serde(default)]
    pub neutral_point_diff: f64,

    /// `rest_days` for a team's first event. Tunable prior, not a fitted value.
    #[serde(default = "default_debut_rest_days")]
    pub debut_rest_days: i64,
}

fn default_window() -> usize {
    5
}
fn default_neutral_win_rate() -> f64 {
    0.5
}
fn default_debut_rest_days() -> i64 {
    3
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window: 5,
            neutral_win_rate: 0.5,
            neutral_point_diff: 0.0,
            debut_rest_days: 3,
        }
    }
}

impl FeatureConfig {
    /// Same config with a different rolling window
    pub fn with_window(self, window: usize) -> Self {
        Self { window, ..self }
    }

    /// Reject settings that would yield meaningless features
    pub fn validate(&self) -> Result<(), String> {
        if self.window == 0 {
            return Err("window must be at least 1".to_string());
        }
        if !self.neutral_win_rate.is_finite() || !(0.0..=1.0).contains(&self.neutral_win_rate) {
            return Err(format!(
                "neutral_win_rate must be within [0, 1], got {}",
                self.neutral_win_rate
            ));
        }
        if !self.neutral_point_diff.is_finite() {
            return Err("neutral_point_diff must be finite".to_string());
        }
        if self.debut_rest_days < 0 {
            return Err(format!(
                "debut_rest_days must be non-negative, got {}",
                self.debut_rest_days
            ));
        }
        Ok(())
    }
}

/// Win-probability classifier training configuration
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Fraction of the most recent games held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Gradient descent step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Gradient descent iterations
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// L2 regularisation strength (inverse of sklearn's C)
    #[serde(default = "default_l2_penalty")]
    pub l2_penalty: f64,
}

fn default_test_fraction() -> f64 {
    0.2
}
fn default_learning_rate() -> f64 {
    0.1
}
fn default_max_iter() -> usize {
    500
}
fn default_l2_penalty() -> f64 {
    1.0
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            learning_rate: 0.1,
            max_iter: 500,
            l2_penalty: 1.0,
        }
    }
}

/// Value-bet reporting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Number of bets shown by `score`
    #[serde(default = "default_top")]
    pub top: usize,

    /// Bets must have strictly greater EV than this
    #[serde(default)]
    pub min_ev: Decimal,
}

fn default_top() -> usize {
    5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top: 5,
            min_ev: Decimal::ZERO,
        }
    }
}

/// Input and artifact locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_games_path")]
    pub games_path: PathBuf,
    #[serde(default = "default_odds_path")]
    pub odds_path: PathBuf,
    #[serde(default = "default_features_path")]
    pub features_path: PathBuf,
    #[serde(default = "default_team_long_path")]
    pub team_long_path: PathBuf,
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

fn default_games_path() -> PathBuf {
    PathBuf::from("data/sample/games_sample.csv")
}
fn default_odds_path() -> PathBuf {
    PathBuf::from("data/sample/odds_sample.csv")
}
fn default_features_path() -> PathBuf {
    PathBuf::from("data/processed/games_features.parquet")
}
fn default_team_long_path() -> PathBuf {
    PathBuf::from("data/processed/team_long.parquet")
}
fn default_model_path() -> PathBuf {
    PathBuf::from("models/winprob_logreg.json")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            games_path: default_games_path(),
            odds_path: default_odds_path(),
            features_path: default_features_path(),
            team_long_path: default_team_long_path(),
            model_path: default_model_path(),
        }
    }
}

/// balldontlie API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as the `Authorization` header when present
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    "https://api.balldontlie.io/v1/games".to_string()
}
fn default_per_page() -> u32 {
    100
}
fn default_max_pages() -> u32 {
    50
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            per_page: 100,
            max_pages: 50,
            timeout_secs: 10,
            api_key: None,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config
            .features
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid [features] section: {}", e))?;
        Ok(config)
    }

    /// Load configuration, or `None` when the file does not exist
    ///
    /// Unreadable files, malformed TOML and invalid sections are errors.
    pub fn load_optional(path: impl AsRef<std::path::Path>) -> anyhow::Result<Option<Self>> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(e) => match e.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => Ok(None),
                _ => Err(e),
            },
        }
    }
}
