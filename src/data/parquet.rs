//! Parquet persistence for games, features, team-long and scored tables

use super::types::{DataError, GameResult, Venue};
use crate::config::FeatureConfig;
use crate::ev::ScoredQuote;
use crate::features::{MatchupFeatureRow, TeamGameEvent, TeamLong, FEATURE_COLUMNS};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const META_WINDOW: &str = "nbaev.window";
const META_NEUTRAL_WIN_RATE: &str = "nbaev.neutral_win_rate";
const META_NEUTRAL_POINT_DIFF: &str = "nbaev.neutral_point_diff";
const META_DEBUT_REST_DAYS: &str = "nbaev.debut_rest_days";

/// Game results schema
pub fn games_schema() -> Schema {
    Schema::new(vec![
        Field::new("game_id", DataType::UInt64, false),
        Field::new("date", DataType::Date32, false),
        Field::new("home_team", DataType::Utf8, false),
        Field::new("away_team", DataType::Utf8, false),
        Field::new("home_score", DataType::UInt32, false),
        Field::new("away_score", DataType::UInt32, false),
        Field::new("home_team_won", DataType::Boolean, false),
    ])
}

/// Matchup feature schema; classifier inputs follow [`FEATURE_COLUMNS`]
pub fn feature_schema() -> Schema {
    let mut fields = vec![
        Field::new("game_id", DataType::UInt64, true),
        Field::new("date", DataType::Date32, false),
        Field::new("home_team", DataType::Utf8, false),
        Field::new("away_team", DataType::Utf8, false),
    ];
    for name in FEATURE_COLUMNS {
        let data_type = if name.ends_with("rest_days") {
            DataType::Int64
        } else {
            DataType::Float64
        };
        fields.push(Field::new(name, data_type, false));
    }
    fields.push(Field::new("target_home_win", DataType::Boolean, true));
    Schema::new(fields)
}

/// Team-long schema, with the feature config stored as schema metadata
pub fn team_long_schema(config: &FeatureConfig) -> Schema {
    let metadata = HashMap::from([
        (META_WINDOW.to_string(), config.window.to_string()),
        (
            META_NEUTRAL_WIN_RATE.to_string(),
            config.neutral_win_rate.to_string(),
        ),
        (
            META_NEUTRAL_POINT_DIFF.to_string(),
            config.neutral_point_diff.to_string(),
        ),
        (
            META_DEBUT_REST_DAYS.to_string(),
            config.debut_rest_days.to_string(),
        ),
    ]);

    Schema::new_with_metadata(
        vec![
            Field::new("game_id", DataType::UInt64, false),
            Field::new("team", DataType::Utf8, false),
            Field::new("opponent", DataType::Utf8, false),
            Field::new("date", DataType::Date32, false),
            Field::new("won", DataType::Boolean, false),
            Field::new("point_diff", DataType::Int64, false),
            Field::new("role", DataType::Utf8, false),
            Field::new("rest_days", DataType::Int64, false),
            Field::new("win_rolling", DataType::Float64, false),
            Field::new("pd_rolling", DataType::Float64, false),
        ],
        metadata,
    )
}

/// Scored quote schema
pub fn scored_quote_schema() -> Schema {
    Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("team", DataType::Utf8, false),
        Field::new("opponent", DataType::Utf8, false),
        Field::new("home_away", DataType::Utf8, false),
        Field::new("book", DataType::Utf8, false),
        // Decimals stored as strings for precision
        Field::new("decimal_odds", DataType::Utf8, false),
        Field::new("p_hat", DataType::Utf8, false),
        Field::new("market_avg_odds", DataType::Utf8, false),
        Field::new("deviation", DataType::Utf8, false),
        Field::new("ev", DataType::Utf8, false),
    ])
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn date_to_days(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

fn days_to_date(days: i32) -> anyhow::Result<NaiveDate> {
    epoch()
        .checked_add_signed(chrono::Duration::days(days as i64))
        .ok_or_else(|| anyhow::anyhow!("Invalid date32 value {}", days))
}

/// Parquet table writer
pub struct ParquetWriter {
    compression: Compression,
}

impl ParquetWriter {
    /// Create a new Parquet writer using SNAPPY compression
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
        }
    }

    /// Write one record batch, creating parent directories
    fn write_batch(
        &self,
        path: &Path,
        schema: Arc<Schema>,
        columns: Vec<ArrayRef>,
    ) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .build();
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let batch = RecordBatch::try_new(schema, columns)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    /// Write game results to a Parquet file
    pub fn write_games(&self, path: impl AsRef<Path>, games: &[GameResult]) -> anyhow::Result<()> {
        let path = path.as_ref();
        if games.is_empty() {
            return Ok(());
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt64Array::from_iter_values(games.iter().map(|g| g.game_id))),
            Arc::new(Date32Array::from_iter_values(games.iter().map(|g| date_to_days(g.date)))),
            Arc::new(StringArray::from_iter_values(games.iter().map(|g| g.home_team.as_str()))),
            Arc::new(StringArray::from_iter_values(games.iter().map(|g| g.away_team.as_str()))),
            Arc::new(UInt32Array::from_iter_values(games.iter().map(|g| g.home_score))),
            Arc::new(UInt32Array::from_iter_values(games.iter().map(|g| g.away_score))),
            Arc::new(BooleanArray::from(
                games.iter().map(|g| g.home_team_won).collect::<Vec<_>>(),
            )),
        ];
        self.write_batch(path, Arc::new(games_schema()), columns)?;

        tracing::debug!(path = ?path, count = games.len(), "Wrote games to Parquet");
        Ok(())
    }

    /// Write matchup feature rows to a Parquet file
    pub fn write_features(
        &self,
        path: impl AsRef<Path>,
        rows: &[MatchupFeatureRow],
    ) -> anyhow::Result<()> {
        let path = path.as_ref();
        if rows.is_empty() {
            return Ok(());
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt64Array::from(rows.iter().map(|r| r.game_id).collect::<Vec<_>>())),
            Arc::new(Date32Array::from_iter_values(rows.iter().map(|r| date_to_days(r.date)))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.home_team.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.away_team.as_str()))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.home_win_rolling))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.away_win_rolling))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.home_pd_rolling))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.away_pd_rolling))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.home_rest_days))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.away_rest_days))),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.target_home_win).collect::<Vec<_>>(),
            )),
        ];
        self.write_batch(path, Arc::new(feature_schema()), columns)?;

        tracing::debug!(path = ?path, count = rows.len(), "Wrote features to Parquet");
        Ok(())
    }

    /// Write the team-long table to a Parquet file
    pub fn write_team_long(
        &self,
        path: impl AsRef<Path>,
        team_long: &TeamLong,
    ) -> anyhow::Result<()> {
        let path = path.as_ref();
        if team_long.is_empty() {
            return Ok(());
        }

        let events: Vec<&TeamGameEvent> = team_long.events().collect();
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt64Array::from_iter_values(events.iter().map(|e| e.game_id))),
            Arc::new(StringArray::from_iter_values(events.iter().map(|e| e.team.as_str()))),
            Arc::new(StringArray::from_iter_values(events.iter().map(|e| e.opponent.as_str()))),
            Arc::new(Date32Array::from_iter_values(events.iter().map(|e| date_to_days(e.date)))),
            Arc::new(BooleanArray::from(events.iter().map(|e| e.won).collect::<Vec<_>>())),
            Arc::new(Int64Array::from_iter_values(events.iter().map(|e| e.point_diff))),
            Arc::new(StringArray::from_iter_values(events.iter().map(|e| e.role.as_str()))),
            Arc::new(Int64Array::from_iter_values(events.iter().map(|e| e.rest_days))),
            Arc::new(Float64Array::from_iter_values(events.iter().map(|e| e.win_rolling))),
            Arc::new(Float64Array::from_iter_values(events.iter().map(|e| e.pd_rolling))),
        ];
        self.write_batch(path, Arc::new(team_long_schema(team_long.config())), columns)?;

        tracing::debug!(path = ?path, count = events.len(), "Wrote team-long table to Parquet");
        Ok(())
    }

    /// Write scored quotes to a Parquet file
    pub fn write_scored_quotes(
        &self,
        path: impl AsRef<Path>,
        quotes: &[ScoredQuote],
    ) -> anyhow::Result<()> {
        let path = path.as_ref();
        if quotes.is_empty() {
            return Ok(());
        }

        let text = |f: fn(&ScoredQuote) -> String| -> ArrayRef {
            Arc::new(StringArray::from_iter_values(quotes.iter().map(f)))
        };
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from_iter_values(quotes.iter().map(|q| date_to_days(q.date)))),
            text(|q| q.team.clone()),
            text(|q| q.opponent.clone()),
            text(|q| q.home_away.to_string()),
            text(|q| q.book.clone()),
            text(|q| q.decimal_odds.to_string()),
            text(|q| q.p_hat.to_string()),
            text(|q| q.market_avg_odds.to_string()),
            text(|q| q.deviation.to_string()),
            text(|q| q.ev.to_string()),
        ];
        self.write_batch(path, Arc::new(scored_quote_schema()), columns)?;

        tracing::debug!(path = ?path, count = quotes.len(), "Wrote scored quotes to Parquet");
        Ok(())
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader for Parquet files
pub struct ParquetReader {
    path: PathBuf,
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> anyhow::Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| anyhow::anyhow!("Invalid {} column", name))
}

impl ParquetReader {
    /// Create a new reader for a Parquet file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> anyhow::Result<ParquetRecordBatchReaderBuilder<File>> {
        let file = File::open(&self.path)?;
        Ok(ParquetRecordBatchReaderBuilder::try_new(file)?)
    }

    /// Read game results from a Parquet file
    pub fn read_games(&self) -> anyhow::Result<Vec<GameResult>> {
        let mut games = Vec::new();
        for batch_result in self.open()?.build()? {
            let batch = batch_result?;
            let game_ids = column::<UInt64Array>(&batch, "game_id")?;
            let dates = column::<Date32Array>(&batch, "date")?;
            let home_teams = column::<StringArray>(&batch, "home_team")?;
            let away_teams = column::<StringArray>(&batch, "away_team")?;
            let home_scores = column::<UInt32Array>(&batch, "home_score")?;
            let away_scores = column::<UInt32Array>(&batch, "away_score")?;
            let home_won = column::<BooleanArray>(&batch, "home_team_won")?;

            for i in 0..batch.num_rows() {
                games.push(GameResult {
                    game_id: game_ids.value(i),
                    date: days_to_date(dates.value(i))?,
                    home_team: home_teams.value(i).to_string(),
                    away_team: away_teams.value(i).to_string(),
                    home_score: home_scores.value(i),
                    away_score: away_scores.value(i),
                    home_team_won: home_won.value(i),
                });
            }
        }
        Ok(games)
    }

    /// Read matchup feature rows from a Parquet file
    pub fn read_features(&self) -> anyhow::Result<Vec<MatchupFeatureRow>> {
        let mut rows = Vec::new();
        for batch_result in self.open()?.build()? {
            let batch = batch_result?;
            let game_ids = column::<UInt64Array>(&batch, "game_id")?;
            let dates = column::<Date32Array>(&batch, "date")?;
            let home_teams = column::<StringArray>(&batch, "home_team")?;
            let away_teams = column::<StringArray>(&batch, "away_team")?;
            let home_win = column::<Float64Array>(&batch, "home_win_rolling")?;
            let away_win = column::<Float64Array>(&batch, "away_win_rolling")?;
            let home_pd = column::<Float64Array>(&batch, "home_pd_rolling")?;
            let away_pd = column::<Float64Array>(&batch, "away_pd_rolling")?;
            let home_rest = column::<Int64Array>(&batch, "home_rest_days")?;
            let away_rest = column::<Int64Array>(&batch, "away_rest_days")?;
            let targets = column::<BooleanArray>(&batch, "target_home_win")?;

            for i in 0..batch.num_rows() {
                rows.push(MatchupFeatureRow {
                    game_id: (!game_ids.is_null(i)).then(|| game_ids.value(i)),
                    date: days_to_date(dates.value(i))?,
                    home_team: home_teams.value(i).to_string(),
                    away_team: away_teams.value(i).to_string(),
                    home_win_rolling: home_win.value(i),
                    away_win_rolling: away_win.value(i),
                    home_pd_rolling: home_pd.value(i),
                    away_pd_rolling: away_pd.value(i),
                    home_rest_days: home_rest.value(i),
                    away_rest_days: away_rest.value(i),
                    target_home_win: (!targets.is_null(i)).then(|| targets.value(i)),
                });
            }
        }
        Ok(rows)
    }

    /// Read a team-long table, restoring the feature config it was built with
    pub fn read_team_long(&self) -> anyhow::Result<TeamLong> {
        let builder = self.open()?;
        let config = config_from_metadata(builder.schema().metadata())?;

        let mut events = Vec::new();
        for batch_result in builder.build()? {
            let batch = batch_result?;
            let game_ids = column::<UInt64Array>(&batch, "game_id")?;
            let teams = column::<StringArray>(&batch, "team")?;
            let opponents = column::<StringArray>(&batch, "opponent")?;
            let dates = column::<Date32Array>(&batch, "date")?;
            let won = column::<BooleanArray>(&batch, "won")?;
            let point_diff = column::<Int64Array>(&batch, "point_diff")?;
            let roles = column::<StringArray>(&batch, "role")?;
            let rest_days = column::<Int64Array>(&batch, "rest_days")?;
            let win_rolling = column::<Float64Array>(&batch, "win_rolling")?;
            let pd_rolling = column::<Float64Array>(&batch, "pd_rolling")?;

            for i in 0..batch.num_rows() {
                events.push(TeamGameEvent {
                    game_id: game_ids.value(i),
                    team: teams.value(i).to_string(),
                    opponent: opponents.value(i).to_string(),
                    date: days_to_date(dates.value(i))?,
                    won: won.value(i),
                    point_diff: point_diff.value(i),
                    role: roles.value(i).parse::<Venue>()?,
                    rest_days: rest_days.value(i),
                    win_rolling: win_rolling.value(i),
                    pd_rolling: pd_rolling.value(i),
                });
            }
        }

        Ok(TeamLong::from_events(events, config)?)
    }

    /// Number of rows in the file, from its footer
    pub fn num_rows(&self) -> anyhow::Result<i64> {
        Ok(self.open()?.metadata().file_metadata().num_rows())
    }
}

fn config_from_metadata(metadata: &HashMap<String, String>) -> Result<FeatureConfig, DataError> {
    fn get<T: std::str::FromStr>(
        metadata: &HashMap<String, String>,
        key: &str,
    ) -> Result<T, DataError> {
        metadata
            .get(key)
            .and_then(|v| v.parse::<T>().ok())
            .ok_or_else(|| DataError::MissingMetadata(key.to_string()))
    }

    Ok(FeatureConfig {
        window: get(metadata, META_WINDOW)?,
        neutral_win_rate: get(metadata, META_NEUTRAL_WIN_RATE)?,
        neutral_point_diff: get(metadata, META_NEUTRAL_POINT_DIFF)?,
        debut_rest_days: get(metadata, META_DEBUT_REST_DAYS)?,
    })
}
