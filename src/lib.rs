//! nba-value: NBA win-probability features and value bet scanning
//!
//! This library provides the core components for:
//! - Loading game results and odds from CSV, Parquet and the balldontlie API
//! - Leakage-free rolling team form (win rate, point differential, rest)
//! - Matchup feature vectors for bulk training and single-matchup scoring
//! - A logistic win-probability model with holdout evaluation
//! - Market consensus, deviation and expected value per odds quote
//! - Logging and pipeline metrics

pub mod cli;
pub mod config;
pub mod data;
pub mod ev;
pub mod features;
pub mod model;
pub mod telemetry;
