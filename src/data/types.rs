//! Game result types and loader errors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which side of a matchup a team played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Home => "home",
            Venue::Away => "away",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Venue {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Venue::Home),
            "away" => Ok(Venue::Away),
            other => Err(DataError::InvalidVenue(other.to_string())),
        }
    }
}

/// A played game, one row per game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: u64,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub home_team_won: bool,
}

impl GameResult {
    /// Create a game result, deriving `home_team_won` from the scores
    pub fn new(
        game_id: u64,
        date: NaiveDate,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_score: u32,
        away_score: u32,
    ) -> Self {
        Self {
            game_id,
            date,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score,
            away_score,
            home_team_won: home_score > away_score,
        }
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or a string that starts with one
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let head = trimmed.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Input loading and validation errors
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: missing value for {column}")]
    MissingField { row: usize, column: String },
    #[error("Row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },
    #[error("Row {row}: invalid number {value:?} in {column}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Invalid venue {0:?}, expected home or away")]
    InvalidVenue(String),
    #[error("Missing table metadata: {0}")]
    MissingMetadata(String),
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_derives_winner() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let home_win = GameResult::new(0, date, "Lakers", "Celtics", 110, 102);
        assert!(home_win.home_team_won);

        let away_win = GameResult::new(1, date, "Lakers", "Celtics", 99, 104);
        assert!(!away_win.home_team_won);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("2024-03-09T00:00:00.000Z"), expected);
        assert_eq!(parse_date(" 2024-03-09 "), expected);
        assert_eq!(parse_date("03/09/2024"), None);
        assert_eq!(parse_date("2024-3-9"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_venue_parse_and_display() {
        assert_eq!("home".parse::<Venue>().unwrap(), Venue::Home);
        assert_eq!("AWAY".parse::<Venue>().unwrap(), Venue::Away);
        assert!("neutral".parse::<Venue>().is_err());
        assert_eq!(Venue::Away.to_string(), "away");
    }

    #[test]
    fn test_error_display() {
        let err = DataError::InvalidDate {
            row: 4,
            value: "yesterday".to_string(),
        };
        assert_eq!(err.to_string(), "Row 4: invalid date \"yesterday\"");

        let err = DataError::MissingField {
            row: 2,
            column: "home_score".to_string(),
        };
        assert_eq!(err.to_string(), "Row 2: missing value for home_score");
    }
}
