//! Expected-value module
//!
//! Market consensus, expected value per quote and the scoring pipeline that
//! joins model probabilities to posted odds.

mod market;
mod scoring;
mod types;
mod value;

pub use market::add_market_deviation;
pub use scoring::{predict_quotes, score_quotes, ScoringError};
pub use types::{EvError, MarketQuote, OddsQuote, PricedQuote, ScoredQuote, Valued};
pub use value::{add_ev, expected_value, rank_value_bets};
