//! balldontlie API client for historical game results
//!
//! Pages through the `/v1/games` endpoint per team and season and maps
//! finished games onto [`GameResult`].

use super::types::{parse_date, DataError, GameResult};
use super::GameSource;
use crate::config::IngestConfig;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Client for the balldontlie games endpoint
pub struct BallDontLieClient {
    config: IngestConfig,
    client: Client,
    team_ids: Vec<u32>,
    seasons: Vec<u32>,
}

impl BallDontLieClient {
    /// Create a client for the given teams and seasons
    pub fn new(
        config: IngestConfig,
        team_ids: Vec<u32>,
        seasons: Vec<u32>,
    ) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            client,
            team_ids,
            seasons,
        })
    }

    /// Fetch all finished games for the configured teams and seasons
    ///
    /// A game between two requested teams comes back in both team queries
    /// and is kept once. Game ids are assigned sequentially in fetch order.
    pub async fn fetch_games(&self) -> Result<Vec<GameResult>, DataError> {
        let mut games = Vec::new();
        let mut seen = HashSet::new();

        for &season in &self.seasons {
            for &team_id in &self.team_ids {
                let mut cursor = None;
                for page in 1..=self.config.max_pages {
                    let payload = self.fetch_page(team_id, season, cursor).await?;
                    if payload.data.is_empty() {
                        break;
                    }

                    let before = games.len();
                    append_games(&mut games, &mut seen, payload.data);

                    tracing::debug!(
                        team_id,
                        season,
                        page,
                        added = games.len() - before,
                        "Fetched games page"
                    );

                    cursor = payload.meta.and_then(|m| m.next_cursor);
                    if cursor.is_none() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            teams = self.team_ids.len(),
            seasons = self.seasons.len(),
            games = games.len(),
            "Fetched games from balldontlie"
        );

        Ok(games)
    }

    async fn fetch_page(
        &self,
        team_id: u32,
        season: u32,
        cursor: Option<u64>,
    ) -> Result<GamesPage, DataError> {
        let mut request = self.client.get(&self.config.base_url).query(&[
            ("team_ids[]", team_id),
            ("seasons[]", season),
            ("per_page", self.config.per_page),
        ]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::Api { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GameSource for BallDontLieClient {
    async fn load_games(&self) -> Result<Vec<GameResult>, DataError> {
        self.fetch_games().await
    }
}

/// Map API games onto results, skipping repeats and unfinished or malformed games
fn append_games(games: &mut Vec<GameResult>, seen: &mut HashSet<u64>, data: Vec<ApiGame>) {
    for game in data {
        if seen.contains(&game.id) {
            continue;
        }
        let (Some(home_score), Some(away_score)) = (game.home_team_score, game.visitor_team_score)
        else {
            continue;
        };
        // Scheduled games come back with 0-0 scores
        if home_score == 0 && away_score == 0 {
            continue;
        }
        let Some(date) = parse_date(&game.date) else {
            tracing::warn!(id = game.id, date = %game.date, "Skipping game with unparseable date");
            continue;
        };

        seen.insert(game.id);
        let game_id = games.len() as u64;
        games.push(GameResult::new(
            game_id,
            date,
            game.home_team.full_name,
            game.visitor_team.full_name,
            home_score,
            away_score,
        ));
    }
}

/// One page of the games endpoint
#[derive(Debug, Deserialize)]
struct GamesPage {
    #[serde(default)]
    data: Vec<ApiGame>,
    meta: Option<PageMeta>,
}

/// Cursor pagination; `next_cursor` is absent on the last page
#[derive(Debug, Deserialize)]
struct PageMeta {
    next_cursor: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiGame {
    id: u64,
    date: String,
    home_team: ApiTeam,
    visitor_team: ApiTeam,
    home_team_score: Option<u32>,
    visitor_team_score: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    full_name: String,
}
