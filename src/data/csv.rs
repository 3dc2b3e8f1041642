//! CSV loaders for game results and odds quotes
//!
//! Files are read through arrow's CSV reader with every column typed as text,
//! so that each value is validated here with its row number attached.

use super::types::{parse_date, DataError, GameResult, Venue};
use super::GameSource;
use crate::ev::OddsQuote;
use arrow::array::{Array, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Columns required in a games CSV
pub const GAME_CSV_COLUMNS: [&str; 5] =
    ["date", "home_team", "away_team", "home_score", "away_score"];

/// Columns required in an odds CSV
pub const ODDS_CSV_COLUMNS: [&str; 6] = [
    "date",
    "team",
    "opponent",
    "home_away",
    "book",
    "decimal_odds",
];

/// Load game results from CSV
///
/// `game_id` is assigned from the row position and `home_team_won` is derived
/// from the scores.
pub fn load_games_csv(path: impl AsRef<Path>) -> Result<Vec<GameResult>, DataError> {
    let path = path.as_ref();
    let batches = read_text_batches(path, &GAME_CSV_COLUMNS)?;

    let mut games = Vec::new();
    let mut row = 0usize;
    for batch in &batches {
        let dates = text_column(batch, "date")?;
        let home_teams = text_column(batch, "home_team")?;
        let away_teams = text_column(batch, "away_team")?;
        let home_scores = text_column(batch, "home_score")?;
        let away_scores = text_column(batch, "away_score")?;

        for i in 0..batch.num_rows() {
            let date = date_value(dates, i, row)?;
            let home_team = text_value(home_teams, i, row, "home_team")?;
            let away_team = text_value(away_teams, i, row, "away_team")?;
            let home_score = score_value(home_scores, i, row, "home_score")?;
            let away_score = score_value(away_scores, i, row, "away_score")?;

            games.push(GameResult::new(
                row as u64, date, home_team, away_team, home_score, away_score,
            ));
            row += 1;
        }
    }

    tracing::info!(path = ?path, games = games.len(), "Loaded games from CSV");
    Ok(games)
}

/// Load posted odds from CSV
pub fn load_odds_csv(path: impl AsRef<Path>) -> Result<Vec<OddsQuote>, DataError> {
    let path = path.as_ref();
    let batches = read_text_batches(path, &ODDS_CSV_COLUMNS)?;

    let mut quotes = Vec::new();
    let mut row = 0usize;
    for batch in &batches {
        let dates = text_column(batch, "date")?;
        let teams = text_column(batch, "team")?;
        let opponents = text_column(batch, "opponent")?;
        let venues = text_column(batch, "home_away")?;
        let books = text_column(batch, "book")?;
        let odds = text_column(batch, "decimal_odds")?;

        for i in 0..batch.num_rows() {
            let raw_odds = text_value(odds, i, row, "decimal_odds")?;
            let decimal_odds =
                Decimal::from_str(raw_odds).map_err(|_| DataError::InvalidNumber {
                    row,
                    column: "decimal_odds".to_string(),
                    value: raw_odds.to_string(),
                })?;

            quotes.push(OddsQuote {
                date: date_value(dates, i, row)?,
                team: text_value(teams, i, row, "team")?.to_string(),
                opponent: text_value(opponents, i, row, "opponent")?.to_string(),
                home_away: text_value(venues, i, row, "home_away")?.parse::<Venue>()?,
                book: text_value(books, i, row, "book")?.to_string(),
                decimal_odds,
            });
            row += 1;
        }
    }

    tracing::info!(path = ?path, quotes = quotes.len(), "Loaded odds from CSV");
    Ok(quotes)
}

/// Games read from a CSV file
pub struct CsvGameSource {
    path: PathBuf,
}

impl CsvGameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GameSource for CsvGameSource {
    async fn load_games(&self) -> Result<Vec<GameResult>, DataError> {
        load_games_csv(&self.path)
    }
}

/// Read a headed CSV with every column as nullable text
fn read_text_batches(path: &Path, required: &[&str]) -> Result<Vec<RecordBatch>, DataError> {
    let mut file = File::open(path)?;

    let format = Format::default().with_header(true);
    let (inferred, _) = format.infer_schema(&mut file, Some(1))?;
    file.rewind()?;

    let names: Vec<String> = inferred
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    for name in required {
        if !names.iter().any(|n| n == name) {
            return Err(DataError::MissingColumn((*name).to_string()));
        }
    }

    let fields: Vec<Field> = names
        .iter()
        .map(|name| Field::new(name.as_str(), DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema).with_header(true).build(file)?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(batches)
}

fn text_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, DataError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}

fn text_value<'a>(
    column: &'a StringArray,
    i: usize,
    row: usize,
    name: &str,
) -> Result<&'a str, DataError> {
    let value = if column.is_null(i) {
        ""
    } else {
        column.value(i).trim()
    };
    if value.is_empty() {
        return Err(DataError::MissingField {
            row,
            column: name.to_string(),
        });
    }
    Ok(value)
}

fn date_value(column: &StringArray, i: usize, row: usize) -> Result<chrono::NaiveDate, DataError> {
    let raw = text_value(column, i, row, "date")?;
    parse_date(raw).ok_or_else(|| DataError::InvalidDate {
        row,
        value: raw.to_string(),
    })
}

fn score_value(column: &StringArray, i: usize, row: usize, name: &str) -> Result<u32, DataError> {
    let raw = text_value(column, i, row, name)?;
    raw.parse::<u32>().map_err(|_| DataError::InvalidNumber {
        row,
        column: name.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_games_csv() {
        let file = write_csv(
            "date,home_team,away_team,home_score,away_score\n\
             2024-01-02,Lakers,Celtics,110,102\n\
             2024-01-04,Warriors,Lakers,120,121\n",
        );

        let games = load_games_csv(file.path()).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id, 0);
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(games[0].home_team, "Lakers");
        assert!(games[0].home_team_won);
        assert_eq!(games[1].game_id, 1);
        assert_eq!(games[1].away_team, "Lakers");
        assert!(!games[1].home_team_won);
    }

    #[test]
    fn test_load_games_csv_any_column_order() {
        let file = write_csv(
            "home_score,away_score,date,away_team,home_team\n\
             99,101,2024-02-01,Suns,Lakers\n",
        );

        let games = load_games_csv(file.path()).unwrap();
        assert_eq!(games[0].home_team, "Lakers");
        assert_eq!(games[0].away_team, "Suns");
        assert_eq!(games[0].home_score, 99);
        assert_eq!(games[0].away_score, 101);
    }

    #[test]
    fn test_load_games_csv_missing_score() {
        let file = write_csv(
            "date,home_team,away_team,home_score,away_score\n\
             2024-01-02,Lakers,Celtics,110,102\n\
             2024-01-04,Warriors,Lakers,,121\n",
        );

        let err = load_games_csv(file.path()).unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingField { row: 1, ref column } if column == "home_score"
        ));
    }

    #[test]
    fn test_load_games_csv_bad_date() {
        let file = write_csv(
            "date,home_team,away_team,home_score,away_score\n\
             not-a-date,Lakers,Celtics,110,102\n",
        );

        let err = load_games_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::InvalidDate { row: 0, .. }));
    }

    #[test]
    fn test_load_games_csv_bad_score() {
        let file = write_csv(
            "date,home_team,away_team,home_score,away_score\n\
             2024-01-02,Lakers,Celtics,-4,102\n",
        );

        let err = load_games_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::InvalidNumber { row: 0, .. }));
    }

    #[test]
    fn test_load_games_csv_missing_column() {
        let file = write_csv("date,home_team,away_team,home_score\n2024-01-02,A,B,1\n");

        let err = load_games_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "away_score"));
    }

    #[test]
    fn test_load_odds_csv() {
        let file = write_csv(
            "date,team,opponent,home_away,book,decimal_odds\n\
             2024-01-10,Lakers,Celtics,home,BookA,2.05\n\
             2024-01-10,Celtics,Lakers,away,BookA,1.80\n",
        );

        let quotes = load_odds_csv(file.path()).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].home_away, Venue::Home);
        assert_eq!(quotes[0].decimal_odds, dec!(2.05));
        assert_eq!(quotes[1].home_away, Venue::Away);
        assert_eq!(quotes[1].book, "BookA");
    }

    #[test]
    fn test_load_odds_csv_bad_venue() {
        let file = write_csv(
            "date,team,opponent,home_away,book,decimal_odds\n\
             2024-01-10,Lakers,Celtics,neutral,BookA,2.05\n",
        );

        let err = load_odds_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::InvalidVenue(_)));
    }

    #[test]
    fn test_load_odds_csv_bad_odds() {
        let file = write_csv(
            "date,team,opponent,home_away,book,decimal_odds\n\
             2024-01-10,Lakers,Celtics,home,BookA,evens\n",
        );

        let err = load_odds_csv(file.path()).unwrap_err();
        assert!(matches!(err, DataError::InvalidNumber { row: 0, .. }));
    }

    #[test]
    fn test_csv_game_source() {
        let file = write_csv(
            "date,home_team,away_team,home_score,away_score\n\
             2024-01-02,Lakers,Celtics,110,102\n",
        );

        let source = CsvGameSource::new(file.path());
        let games = tokio_test::block_on(source.load_games()).unwrap();
        assert_eq!(games.len(), 1);
    }
}
