//! Parquet persistence round trips

use nba_value::config::FeatureConfig;
use nba_value::data::{load_games_csv, load_games, DataError, ParquetReader, ParquetWriter, Venue};
use nba_value::ev::ScoredQuote;
use nba_value::features::{build_game_features, features_for_matchup};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use tempfile::TempDir;

fn sample_games_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample/games_sample.csv")
}

#[test]
fn test_games_table_loads_like_csv() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("games.parquet");
    let games = load_games_csv(sample_games_path()).unwrap();

    ParquetWriter::new().write_games(&path, &games).unwrap();

    assert_eq!(load_games(&path).unwrap(), games);
    assert_eq!(load_games(sample_games_path()).unwrap(), games);
}

#[test]
fn test_feature_table_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("processed").join("games_features.parquet");
    let games = load_games_csv(sample_games_path()).unwrap();
    let (rows, _) = build_game_features(&games, &FeatureConfig::default()).unwrap();

    ParquetWriter::new().write_features(&path, &rows).unwrap();
    let reader = ParquetReader::new(&path);
    assert_eq!(reader.num_rows().unwrap(), rows.len() as i64);
    assert_eq!(reader.read_features().unwrap(), rows);
}

#[test]
fn test_feature_table_keeps_unlabelled_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("upcoming.parquet");
    let games = load_games_csv(sample_games_path()).unwrap();
    let (_, team_long) = build_game_features(&games, &FeatureConfig::default()).unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 1, 27).unwrap();
    let upcoming =
        features_for_matchup(&team_long, date, "Los Angeles Lakers", "Boston Celtics").unwrap();

    ParquetWriter::new()
        .write_features(&path, std::slice::from_ref(&upcoming))
        .unwrap();
    let read = ParquetReader::new(&path).read_features().unwrap();
    assert_eq!(read, vec![upcoming]);
    assert_eq!(read[0].game_id, None);
    assert_eq!(read[0].target_home_win, None);
}

#[test]
fn test_team_long_restores_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("team_long.parquet");
    let games = load_games_csv(sample_games_path()).unwrap();
    let config = FeatureConfig {
        window: 8,
        neutral_win_rate: 0.45,
        neutral_point_diff: -1.5,
        debut_rest_days: 2,
    };
    let (_, team_long) = build_game_features(&games, &config).unwrap();

    ParquetWriter::new().write_team_long(&path, &team_long).unwrap();
    let read = ParquetReader::new(&path).read_team_long().unwrap();

    assert_eq!(read.config(), &config);
    assert_eq!(read, team_long);

    // Unseen team still gets the stored priors
    let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let row = features_for_matchup(&read, date, "Los Angeles Lakers", "Utah Jazz").unwrap();
    assert_eq!(row.away_win_rolling, 0.45);
    assert_eq!(row.away_pd_rolling, -1.5);
    assert_eq!(row.away_rest_days, 2);
}

#[test]
fn test_team_long_without_metadata_fails() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("games.parquet");
    let games = load_games_csv(sample_games_path()).unwrap();
    ParquetWriter::new().write_games(&path, &games).unwrap();

    let err = ParquetReader::new(&path).read_team_long().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DataError>(),
        Some(DataError::MissingMetadata(_))
    ));
}

#[test]
fn test_scored_quotes_written() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("scored.parquet");
    let quote = ScoredQuote {
        date: NaiveDate::from_ymd_opt(2024, 1, 27).unwrap(),
        team: "Los Angeles Lakers".to_string(),
        opponent: "Boston Celtics".to_string(),
        home_away: Venue::Home,
        book: "FanDuel".to_string(),
        decimal_odds: dec!(2.24),
        p_hat: dec!(0.48),
        market_avg_odds: dec!(2.1833),
        deviation: dec!(0.026),
        ev: dec!(0.0752),
    };

    ParquetWriter::new()
        .write_scored_quotes(&path, &[quote.clone(), quote])
        .unwrap();
    assert_eq!(ParquetReader::new(&path).num_rows().unwrap(), 2);
}

#[test]
fn test_empty_tables_write_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.parquet");
    let writer = ParquetWriter::new();

    writer.write_games(&path, &[]).unwrap();
    writer.write_scored_quotes(&path, &[]).unwrap();
    assert!(!path.exists());
}
