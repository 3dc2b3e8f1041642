//! Team-form aggregation
//!
//! Expands game results into one event per team per game and attaches the
//! rolling form each team carried into that game.

use super::types::{FeatureError, TeamForm, TeamGameEvent};
use crate::config::FeatureConfig;
use crate::data::{GameResult, Venue};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Per-team chronological event history
#[derive(Debug, Clone, PartialEq)]
pub struct TeamLong {
    config: FeatureConfig,
    teams: BTreeMap<String, Vec<TeamGameEvent>>,
}

impl TeamLong {
    /// Group events by team, ordering each team's events by date
    ///
    /// Events sharing a date keep their input order. Rolling stats already on
    /// the events are kept as they are.
    pub fn from_events(
        events: Vec<TeamGameEvent>,
        config: FeatureConfig,
    ) -> Result<Self, FeatureError> {
        config.validate().map_err(FeatureError::InvalidConfig)?;

        let mut teams: BTreeMap<String, Vec<TeamGameEvent>> = BTreeMap::new();
        for event in events {
            teams.entry(event.team.clone()).or_default().push(event);
        }
        for history in teams.values_mut() {
            history.sort_by_key(|e| e.date);
        }

        Ok(Self { config, teams })
    }

    /// Config the rolling stats were computed with
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// All events, grouped by team name then ordered by date
    pub fn events(&self) -> impl Iterator<Item = &TeamGameEvent> {
        self.teams.values().flatten()
    }

    /// Team names in sorted order
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.teams.keys().map(String::as_str)
    }

    /// A team's events in chronological order
    pub fn history(&self, team: &str) -> &[TeamGameEvent] {
        self.teams.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.teams.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// The team's most recent event strictly before `date`
    pub fn latest_before(&self, team: &str, date: NaiveDate) -> Option<&TeamGameEvent> {
        let history = self.history(team);
        let end = history.partition_point(|e| e.date < date);
        end.checked_sub(1).map(|i| &history[i])
    }

    /// Form a new event for `team` on `date` would be assigned
    pub fn form_on(&self, team: &str, date: NaiveDate) -> TeamForm {
        let history = self.history(team);
        let end = history.partition_point(|e| e.date < date);
        trailing_form(&history[..end], date, &self.config)
    }
}

/// Form entering a game on `date`, given every earlier event in order
///
/// Averages `won` and `point_diff` over the last `window` entries of `prior`.
/// An empty `prior` yields the configured neutral priors.
pub fn trailing_form(prior: &[TeamGameEvent], date: NaiveDate, config: &FeatureConfig) -> TeamForm {
    let Some(last) = prior.last() else {
        return TeamForm {
            win_rolling: config.neutral_win_rate,
            pd_rolling: config.neutral_point_diff,
            rest_days: config.debut_rest_days,
        };
    };

    let window = &prior[prior.len().saturating_sub(config.window)..];
    let n = window.len() as f64;
    let wins: f64 = window.iter().map(|e| if e.won { 1.0 } else { 0.0 }).sum();
    let point_diff: f64 = window.iter().map(|e| e.point_diff as f64).sum();

    TeamForm {
        win_rolling: wins / n,
        pd_rolling: point_diff / n,
        rest_days: (date - last.date).num_days().max(0),
    }
}

/// Build the per-team event table with rolling form
pub fn make_team_long(
    games: &[GameResult],
    config: &FeatureConfig,
) -> Result<TeamLong, FeatureError> {
    config.validate().map_err(FeatureError::InvalidConfig)?;
    validate_games(games)?;

    let home = games.iter().map(|g| base_event(g, Venue::Home));
    let away = games.iter().map(|g| base_event(g, Venue::Away));
    let mut team_long = TeamLong::from_events(home.chain(away).collect(), *config)?;

    for history in team_long.teams.values_mut() {
        for i in 0..history.len() {
            let form = trailing_form(&history[..i], history[i].date, config);
            let event = &mut history[i];
            event.win_rolling = form.win_rolling;
            event.pd_rolling = form.pd_rolling;
            event.rest_days = form.rest_days;
        }
    }

    tracing::debug!(
        games = games.len(),
        teams = team_long.teams.len(),
        window = config.window,
        "Built team-long table"
    );

    Ok(team_long)
}

/// One side of a game, before rolling stats are known
fn base_event(game: &GameResult, role: Venue) -> TeamGameEvent {
    let margin = game.home_score as i64 - game.away_score as i64;
    let (team, opponent, won, point_diff) = match role {
        Venue::Home => (&game.home_team, &game.away_team, game.home_team_won, margin),
        Venue::Away => (&game.away_team, &game.home_team, !game.home_team_won, -margin),
    };

    TeamGameEvent {
        game_id: game.game_id,
        team: team.clone(),
        opponent: opponent.clone(),
        date: game.date,
        won,
        point_diff,
        role,
        rest_days: 0,
        win_rolling: 0.0,
        pd_rolling: 0.0,
    }
}

fn validate_games(games: &[GameResult]) -> Result<(), FeatureError> {
    let mut seen = HashSet::with_capacity(games.len());
    for game in games {
        if !seen.insert(game.game_id) {
            return Err(FeatureError::DuplicateGameId(game.game_id));
        }

        let invalid = |reason: &str| FeatureError::InvalidGame {
            game_id: game.game_id,
            reason: reason.to_string(),
        };
        if game.home_team.trim().is_empty() || game.away_team.trim().is_empty() {
            return Err(invalid("empty team name"));
        }
        if game.home_team == game.away_team {
            return Err(invalid("home and away team are the same"));
        }
        if game.home_team_won != (game.home_score > game.away_score) {
            return Err(invalid("home_team_won disagrees with the scores"));
        }
    }
    Ok(())
}
