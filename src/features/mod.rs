//! Feature engineering module
//!
//! Rolling team form (win rate, point differential, rest days) and the
//! fixed-width home/away feature rows built from it.

mod matchup;
mod team_form;
mod types;

pub use matchup::{build_game_features, features_for_matchup, join_game_features};
pub use team_form::{make_team_long, trailing_form, TeamLong};
pub use types::{
    FeatureError, FeatureVector, MatchupFeatureRow, TeamForm, TeamGameEvent, FEATURE_COLUMNS,
    N_FEATURES,
};
