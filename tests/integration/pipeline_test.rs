//! End-to-end pipeline tests over the bundled sample data

use nba_value::config::{FeatureConfig, ModelConfig};
use nba_value::data::{load_games_csv, load_odds_csv, CsvGameSource, GameResult, GameSource, Venue};
use nba_value::ev::{rank_value_bets, score_quotes};
use nba_value::features::{build_game_features, features_for_matchup, make_team_long};
use nba_value::model::{train_model, WinProbabilityModel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::path::PathBuf;

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("sample")
        .join(name)
}

fn sample_games() -> Vec<GameResult> {
    load_games_csv(sample("games_sample.csv")).unwrap()
}

#[test]
fn test_sample_games_load() {
    let games = sample_games();
    assert_eq!(games.len(), 80);

    let ids: Vec<u64> = games.iter().map(|g| g.game_id).collect();
    assert_eq!(ids, (0..80).collect::<Vec<u64>>());

    assert_eq!(games[0].home_team, "Los Angeles Lakers");
    assert_eq!(games[0].away_team, "Boston Celtics");
    for game in &games {
        assert_eq!(game.home_team_won, game.home_score > game.away_score);
    }
}

#[tokio::test]
async fn test_csv_game_source() {
    let source: Box<dyn GameSource> = Box::new(CsvGameSource::new(sample("games_sample.csv")));
    let games = source.load_games().await.unwrap();
    assert_eq!(games, sample_games());
}

#[test]
fn test_round_trip_preserves_games() {
    let games = sample_games();
    let (rows, team_long) = build_game_features(&games, &FeatureConfig::default()).unwrap();

    assert_eq!(rows.len(), games.len());
    assert_eq!(team_long.len(), 2 * games.len());
    for (row, game) in rows.iter().zip(&games) {
        assert_eq!(row.game_id, Some(game.game_id));
        assert_eq!(row.date, game.date);
        assert_eq!(row.home_team, game.home_team);
        assert_eq!(row.away_team, game.away_team);
        assert_eq!(row.target_home_win, Some(game.home_team_won));
    }
}

#[test]
fn test_first_event_gets_neutral_priors() {
    let team_long = make_team_long(&sample_games(), &FeatureConfig::default()).unwrap();

    for team in team_long.teams() {
        let first = &team_long.history(team)[0];
        assert_eq!(first.win_rolling, 0.5, "{}", team);
        assert_eq!(first.pd_rolling, 0.0, "{}", team);
        assert_eq!(first.rest_days, 3, "{}", team);
    }
}

#[test]
fn test_rolling_stats_ignore_later_games() {
    let games = sample_games();
    let config = FeatureConfig::default();
    let full = make_team_long(&games, &config).unwrap();
    let truncated = make_team_long(&games[..50], &config).unwrap();

    let full_events: HashMap<(u64, &str), _> = full
        .events()
        .map(|e| ((e.game_id, e.team.as_str()), e))
        .collect();
    for event in truncated.events() {
        let later = full_events[&(event.game_id, event.team.as_str())];
        assert_eq!(event, later);
    }
}

#[test]
fn test_single_matchup_matches_bulk() {
    let games = sample_games();
    for window in [1, 3, 5, 10] {
        let config = FeatureConfig::default().with_window(window);
        let (rows, team_long) = build_game_features(&games, &config).unwrap();

        for row in &rows {
            let single =
                features_for_matchup(&team_long, row.date, &row.home_team, &row.away_team).unwrap();
            assert_eq!(single.features(), row.features(), "game {:?}", row.game_id);
            assert_eq!(single.game_id, None);
            assert_eq!(single.target_home_win, None);
        }
    }
}

#[test]
fn test_train_and_score_sample() {
    let games = sample_games();
    let (rows, team_long) = build_game_features(&games, &FeatureConfig::default()).unwrap();

    let (model, report) = train_model(&rows, &ModelConfig::default()).unwrap();
    assert_eq!(report.n_train, 64);
    assert_eq!(report.n_test, 16);
    assert!(!report.is_degenerate());
    assert!(report.brier.unwrap() < 0.5);

    let quotes = load_odds_csv(sample("odds_sample.csv")).unwrap();
    let scored = score_quotes(&model, &team_long, &quotes).unwrap();
    assert_eq!(scored.len(), quotes.len());

    for (quote, row) in quotes.iter().zip(&scored) {
        assert_eq!(row.team, quote.team);
        assert_eq!(row.book, quote.book);
        assert!(row.p_hat >= Decimal::ZERO && row.p_hat <= Decimal::ONE);
        assert_eq!(row.ev, row.p_hat * row.decimal_odds - Decimal::ONE);
    }

    // Both sides of a matchup at the same book split the probability
    for pair in scored.chunks(2) {
        assert_eq!(pair[0].home_away, Venue::Home);
        assert_eq!(pair[1].home_away, Venue::Away);
        let total = pair[0].p_hat + pair[1].p_hat;
        assert!((total - Decimal::ONE).abs() < dec!(0.000000001));
    }

    let ranked = rank_value_bets(scored, Decimal::ZERO);
    assert!(ranked.iter().all(|q| q.ev > Decimal::ZERO));
    assert!(ranked.windows(2).all(|w| w[0].ev >= w[1].ev));
}

#[test]
fn test_stub_classifier_scores_sample() {
    let games = sample_games();
    let (_, team_long) = build_game_features(&games, &FeatureConfig::default()).unwrap();
    let quotes = load_odds_csv(sample("odds_sample.csv")).unwrap();

    let coin_flip = |_: &[f64; 6]| 0.5;
    assert_eq!(coin_flip.predict_home_win(&[0.0; 6]), 0.5);

    let scored = score_quotes(&coin_flip, &team_long, &quotes).unwrap();
    for row in &scored {
        assert_eq!(row.p_hat, dec!(0.5));
        assert_eq!(row.ev, dec!(0.5) * row.decimal_odds - Decimal::ONE);
    }
}
