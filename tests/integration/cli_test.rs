//! Subcommand execution against temporary data directories

use nba_value::cli::PrepareArgs;
use nba_value::config::Config;
use nba_value::data::ParquetReader;
use std::path::PathBuf;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.data.features_path = dir.path().join("games_features.parquet");
    config.data.team_long_path = dir.path().join("team_long.parquet");
    config
}

#[tokio::test]
async fn test_prepare_fails_on_empty_games() {
    let dir = TempDir::new().unwrap();
    let games = dir.path().join("games.csv");
    std::fs::write(&games, "date,home_team,away_team,home_score,away_score\n").unwrap();
    let config = config_in(&dir);

    let args = PrepareArgs {
        games: Some(games),
        window: None,
    };
    let err = args.execute(&config).await.unwrap_err();

    assert!(err.to_string().contains("No games"));
    assert!(!config.data.features_path.exists());
    assert!(!config.data.team_long_path.exists());
}

#[tokio::test]
async fn test_prepare_empty_games_keeps_existing_tables() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    std::fs::write(&config.data.features_path, b"previous").unwrap();

    let games = dir.path().join("games.csv");
    std::fs::write(&games, "date,home_team,away_team,home_score,away_score\n").unwrap();
    let args = PrepareArgs {
        games: Some(games),
        window: None,
    };
    assert!(args.execute(&config).await.is_err());

    assert_eq!(std::fs::read(&config.data.features_path).unwrap(), b"previous");
}

#[tokio::test]
async fn test_prepare_writes_both_tables() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let games = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("sample")
        .join("games_sample.csv");

    let args = PrepareArgs {
        games: Some(games),
        window: Some(3),
    };
    args.execute(&config).await.unwrap();

    let features = ParquetReader::new(&config.data.features_path);
    assert_eq!(features.num_rows().unwrap(), 80);
    let team_long = ParquetReader::new(&config.data.team_long_path)
        .read_team_long()
        .unwrap();
    assert_eq!(team_long.config().window, 3);
}
