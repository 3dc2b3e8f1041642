//! Odds and value-bet types

use crate::data::Venue;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bookmaker's decimal price on one side of a matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub date: NaiveDate,
    /// Side the price pays out on
    pub team: String,
    pub opponent: String,
    /// Whether `team` is at home
    pub home_away: Venue,
    pub book: String,
    pub decimal_odds: Decimal,
}

impl OddsQuote {
    /// Quotes are compared against others sharing this key
    pub fn market_key(&self) -> (NaiveDate, &str, &str) {
        (self.date, self.team.as_str(), self.opponent.as_str())
    }
}

/// A quote priced against the other books on the same matchup side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub quote: OddsQuote,
    /// Mean decimal odds across books for the same date, team and opponent
    pub market_avg_odds: Decimal,
    /// `(decimal_odds - market_avg_odds) / market_avg_odds`
    pub deviation: Decimal,
}

/// A market quote with the model's win probability for `quote.team`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub market: MarketQuote,
    pub p_hat: Decimal,
}

/// A row with its expected value per unit staked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valued<T> {
    pub row: T,
    pub ev: Decimal,
}

/// Fully scored quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredQuote {
    pub date: NaiveDate,
    pub team: String,
    pub opponent: String,
    pub home_away: Venue,
    pub book: String,
    pub decimal_odds: Decimal,
    pub p_hat: Decimal,
    pub market_avg_odds: Decimal,
    pub deviation: Decimal,
    pub ev: Decimal,
}

impl From<Valued<PricedQuote>> for ScoredQuote {
    fn from(valued: Valued<PricedQuote>) -> Self {
        let PricedQuote { market, p_hat } = valued.row;
        let MarketQuote {
            quote,
            market_avg_odds,
            deviation,
        } = market;

        Self {
            date: quote.date,
            team: quote.team,
            opponent: quote.opponent,
            home_away: quote.home_away,
            book: quote.book,
            decimal_odds: quote.decimal_odds,
            p_hat,
            market_avg_odds,
            deviation,
            ev: valued.ev,
        }
    }
}

/// Odds and EV errors
#[derive(Debug, Error)]
pub enum EvError {
    #[error("Non-positive odds {odds} from {book} for {team} on {date}")]
    NonPositiveOdds {
        date: NaiveDate,
        team: String,
        book: String,
        odds: Decimal,
    },
    #[error("Zero market average odds for {team} vs {opponent} on {date}")]
    ZeroMarketAverage {
        date: NaiveDate,
        team: String,
        opponent: String,
    },
    #[error("Row {row}: probability {value} outside [0, 1]")]
    ProbabilityOutOfRange { row: usize, value: Decimal },
    #[error("Row {row}: odds {value} must be positive")]
    InvalidOdds { row: usize, value: Decimal },
    #[error("Cannot convert probability {0} to decimal")]
    InvalidProbability(f64),
}
