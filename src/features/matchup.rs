//! Matchup feature rows
//!
//! Bulk rows for training and single rows for upcoming games share
//! [`trailing_form`](super::team_form::trailing_form), so a classifier fitted
//! on one scores the other on identical inputs.

use super::team_form::{make_team_long, TeamLong};
use super::types::{FeatureError, MatchupFeatureRow, TeamGameEvent};
use crate::config::FeatureConfig;
use crate::data::{GameResult, Venue};
use crate::telemetry::{record_rows, Stage};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Build one feature row per game, plus the team-long table behind them
pub fn build_game_features(
    games: &[GameResult],
    config: &FeatureConfig,
) -> Result<(Vec<MatchupFeatureRow>, TeamLong), FeatureError> {
    let team_long = make_team_long(games, config)?;
    let features = join_game_features(games, &team_long)?;

    record_rows(Stage::TeamLong, team_long.len());
    record_rows(Stage::Features, features.len());
    tracing::info!(
        games = games.len(),
        events = team_long.len(),
        window = config.window,
        "Built game features"
    );

    Ok((features, team_long))
}

/// Join each game's home and away events into a feature row
///
/// Rows come out in the order of `games`.
pub fn join_game_features(
    games: &[GameResult],
    team_long: &TeamLong,
) -> Result<Vec<MatchupFeatureRow>, FeatureError> {
    let by_side: HashMap<(u64, Venue), &TeamGameEvent> = team_long
        .events()
        .map(|e| ((e.game_id, e.role), e))
        .collect();

    games
        .iter()
        .map(|game| {
            let side = |role: Venue, team: &str| {
                by_side
                    .get(&(game.game_id, role))
                    .copied()
                    .filter(|e| e.team == team)
                    .ok_or(FeatureError::MissingSide {
                        game_id: game.game_id,
                        role,
                    })
            };
            let home = side(Venue::Home, &game.home_team)?;
            let away = side(Venue::Away, &game.away_team)?;

            Ok(MatchupFeatureRow {
                game_id: Some(game.game_id),
                date: game.date,
                home_team: game.home_team.clone(),
                away_team: game.away_team.clone(),
                home_win_rolling: home.win_rolling,
                away_win_rolling: away.win_rolling,
                home_pd_rolling: home.pd_rolling,
                away_pd_rolling: away.pd_rolling,
                home_rest_days: home.rest_days,
                away_rest_days: away.rest_days,
                target_home_win: Some(game.home_team_won),
            })
        })
        .collect()
}

/// Feature row for a game that has not been played
///
/// Each team's form comes from its events strictly before `date`; a team
/// without any gets the neutral priors the table was built with.
///
/// This equals the bulk row of a stored game unless the team has another
/// event on that same date. The bulk row counts an earlier same-date event
/// (by table order) as prior history with 0 rest days; this lookup ignores
/// every same-date event.
pub fn features_for_matchup(
    team_long: &TeamLong,
    date: NaiveDate,
    home_team: &str,
    away_team: &str,
) -> Result<MatchupFeatureRow, FeatureError> {
    let invalid = |reason: &str| FeatureError::InvalidMatchup {
        date,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        reason: reason.to_string(),
    };
    if home_team.trim().is_empty() || away_team.trim().is_empty() {
        return Err(invalid("empty team name"));
    }
    if home_team == away_team {
        return Err(invalid("home and away team are the same"));
    }

    let home = team_long.form_on(home_team, date);
    let away = team_long.form_on(away_team, date);

    tracing::trace!(
        %date,
        home_team,
        away_team,
        home_prior_events = team_long.latest_before(home_team, date).is_some(),
        away_prior_events = team_long.latest_before(away_team, date).is_some(),
        "Built matchup features"
    );

    Ok(MatchupFeatureRow::from_forms(date, home_team, away_team, home, away))
}
