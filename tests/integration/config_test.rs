//! Configuration file tests

use nba_value::config::{Config, FeatureConfig, LogFormat};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.features, FeatureConfig::default());
    assert_eq!(config.model.test_fraction, 0.2);
    assert_eq!(config.scoring.min_ev, Decimal::ZERO);
    assert_eq!(
        config.data.games_path,
        PathBuf::from("data/sample/games_sample.csv")
    );
    assert!(config.ingest.api_key.is_none());
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
}

#[test]
fn test_load_rejects_invalid_window() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[features]\nwindow = 0\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("window"));
}

#[test]
fn test_load_missing_file() {
    assert!(Config::load("/nonexistent/config.toml").is_err());
}

#[test]
fn test_load_optional_missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    let loaded = Config::load_optional(dir.path().join("absent.toml")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_load_optional_reads_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[features]\nwindow = 7\n").unwrap();

    let config = Config::load_optional(&path).unwrap().unwrap();
    assert_eq!(config.features.window, 7);
}

#[test]
fn test_load_optional_propagates_invalid_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[features]\nwindow = 0\n").unwrap();

    let err = Config::load_optional(&path).unwrap_err();
    assert!(err.to_string().contains("window"));
}

#[test]
fn test_load_optional_propagates_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[features\nwindow = ").unwrap();

    assert!(Config::load_optional(&path).is_err());
}

#[test]
fn test_effective_config_serializes() {
    let rendered = toml::to_string_pretty(&Config::default()).unwrap();
    let reparsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(reparsed.features, FeatureConfig::default());
    assert_eq!(reparsed.scoring.top, 5);
}
