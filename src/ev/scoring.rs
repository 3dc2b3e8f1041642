//! Quote scoring: model probability, market deviation and EV per quote

use super::market::add_market_deviation;
use super::types::{EvError, OddsQuote, PricedQuote, ScoredQuote};
use super::value::add_ev;
use crate::data::Venue;
use crate::features::{features_for_matchup, FeatureError, TeamLong};
use crate::model::WinProbabilityModel;
use crate::telemetry::{record_rows, Stage};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from scoring a batch of quotes
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error(transparent)]
    Ev(#[from] EvError),
}

/// Model win probability for each quote's `team`
///
/// An away quote is featurised with the opponent at home and takes the
/// complement of the home-win probability.
pub fn predict_quotes<M: WinProbabilityModel + ?Sized>(
    model: &M,
    team_long: &TeamLong,
    quotes: &[OddsQuote],
) -> Result<Vec<Decimal>, ScoringError> {
    quotes
        .iter()
        .map(|quote| -> Result<Decimal, ScoringError> {
            let (home, away) = match quote.home_away {
                Venue::Home => (&quote.team, &quote.opponent),
                Venue::Away => (&quote.opponent, &quote.team),
            };
            let row = features_for_matchup(team_long, quote.date, home, away)?;
            let p_home = model.predict_home_win(&row.features());
            let p_team = match quote.home_away {
                Venue::Home => p_home,
                Venue::Away => 1.0 - p_home,
            };
            Decimal::try_from(p_team)
                .map_err(|_| ScoringError::Ev(EvError::InvalidProbability(p_team)))
        })
        .collect()
}

/// Score every quote, keeping input order
pub fn score_quotes<M: WinProbabilityModel + ?Sized>(
    model: &M,
    team_long: &TeamLong,
    quotes: &[OddsQuote],
) -> Result<Vec<ScoredQuote>, ScoringError> {
    let probabilities = predict_quotes(model, team_long, quotes)?;
    let market = add_market_deviation(quotes)?;

    let priced: Vec<PricedQuote> = market
        .into_iter()
        .zip(probabilities)
        .map(|(market, p_hat)| PricedQuote { market, p_hat })
        .collect();
    let valued = add_ev(priced, |q| q.p_hat, |q| q.market.quote.decimal_odds)?;
    let scored: Vec<ScoredQuote> = valued.into_iter().map(ScoredQuote::from).collect();

    record_rows(Stage::Scoring, scored.len());
    tracing::info!(
        quotes = scored.len(),
        positive_ev = scored.iter().filter(|q| q.ev > Decimal::ZERO).count(),
        "Scored odds quotes"
    );

    Ok(scored)
}
