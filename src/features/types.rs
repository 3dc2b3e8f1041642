//! Feature types

use crate::data::Venue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of classifier inputs per matchup
pub const N_FEATURES: usize = 6;

/// Classifier input columns, in the order produced by [`MatchupFeatureRow::features`]
pub const FEATURE_COLUMNS: [&str; N_FEATURES] = [
    "home_win_rolling",
    "away_win_rolling",
    "home_pd_rolling",
    "away_pd_rolling",
    "home_rest_days",
    "away_rest_days",
];

/// Fixed-width classifier input
pub type FeatureVector = [f64; N_FEATURES];

/// One team's view of one game, with form going into that game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameEvent {
    pub game_id: u64,
    pub team: String,
    pub opponent: String,
    pub date: NaiveDate,
    pub won: bool,
    /// Points scored minus points conceded
    pub point_diff: i64,
    pub role: Venue,
    /// Days since the team's previous event
    pub rest_days: i64,
    /// Mean of `won` over the preceding window, this event excluded
    pub win_rolling: f64,
    /// Mean of `point_diff` over the preceding window, this event excluded
    pub pd_rolling: f64,
}

/// A team's form entering a game
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamForm {
    pub win_rolling: f64,
    pub pd_rolling: f64,
    pub rest_days: i64,
}

/// Home/away form for one game
///
/// `game_id` and `target_home_win` are only set for rows built from played
/// games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupFeatureRow {
    pub game_id: Option<u64>,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_win_rolling: f64,
    pub away_win_rolling: f64,
    pub home_pd_rolling: f64,
    pub away_pd_rolling: f64,
    pub home_rest_days: i64,
    pub away_rest_days: i64,
    pub target_home_win: Option<bool>,
}

impl MatchupFeatureRow {
    /// Assemble a row from each side's form
    pub fn from_forms(
        date: NaiveDate,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home: TeamForm,
        away: TeamForm,
    ) -> Self {
        Self {
            game_id: None,
            date,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_win_rolling: home.win_rolling,
            away_win_rolling: away.win_rolling,
            home_pd_rolling: home.pd_rolling,
            away_pd_rolling: away.pd_rolling,
            home_rest_days: home.rest_days,
            away_rest_days: away.rest_days,
            target_home_win: None,
        }
    }

    /// Classifier inputs in [`FEATURE_COLUMNS`] order
    pub fn features(&self) -> FeatureVector {
        [
            self.home_win_rolling,
            self.away_win_rolling,
            self.home_pd_rolling,
            self.away_pd_rolling,
            self.home_rest_days as f64,
            self.away_rest_days as f64,
        ]
    }
}

/// Feature building errors
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Invalid feature config: {0}")]
    InvalidConfig(String),
    #[error("Game {game_id}: {reason}")]
    InvalidGame { game_id: u64, reason: String },
    #[error("Duplicate game_id {0}")]
    DuplicateGameId(u64),
    #[error("Game {game_id}: no {role} team event")]
    MissingSide { game_id: u64, role: Venue },
    #[error("Invalid matchup {home_team} vs {away_team} on {date}: {reason}")]
    InvalidMatchup {
        date: NaiveDate,
        home_team: String,
        away_team: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_order() {
        let row = MatchupFeatureRow {
            game_id: Some(7),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
            home_win_rolling: 0.6,
            away_win_rolling: 0.4,
            home_pd_rolling: 3.5,
            away_pd_rolling: -2.0,
            home_rest_days: 2,
            away_rest_days: 1,
            target_home_win: Some(true),
        };

        assert_eq!(row.features(), [0.6, 0.4, 3.5, -2.0, 2.0, 1.0]);
        assert_eq!(FEATURE_COLUMNS[0], "home_win_rolling");
        assert_eq!(FEATURE_COLUMNS[5], "away_rest_days");
    }

    #[test]
    fn test_missing_side_display() {
        let err = FeatureError::MissingSide {
            game_id: 12,
            role: Venue::Away,
        };
        assert_eq!(err.to_string(), "Game 12: no away team event");
    }
}
