//! Market consensus and deviation

use super::types::{EvError, MarketQuote, OddsQuote};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Price every quote against the mean across books for its matchup side
///
/// Quotes are grouped by date, team and opponent. Output keeps input order.
pub fn add_market_deviation(quotes: &[OddsQuote]) -> Result<Vec<MarketQuote>, EvError> {
    let mut groups: HashMap<_, (Decimal, u32)> = HashMap::new();
    for quote in quotes {
        if quote.decimal_odds <= Decimal::ZERO {
            return Err(EvError::NonPositiveOdds {
                date: quote.date,
                team: quote.team.clone(),
                book: quote.book.clone(),
                odds: quote.decimal_odds,
            });
        }
        let entry = groups.entry(quote.market_key()).or_insert((Decimal::ZERO, 0));
        entry.0 += quote.decimal_odds;
        entry.1 += 1;
    }

    let mut priced = Vec::with_capacity(quotes.len());
    for quote in quotes {
        let (sum, count) = groups[&quote.market_key()];
        let market_avg_odds = sum / Decimal::from(count);
        if market_avg_odds.is_zero() {
            return Err(EvError::ZeroMarketAverage {
                date: quote.date,
                team: quote.team.clone(),
                opponent: quote.opponent.clone(),
            });
        }

        priced.push(MarketQuote {
            quote: quote.clone(),
            market_avg_odds,
            deviation: (quote.decimal_odds - market_avg_odds) / market_avg_odds,
        });
    }

    tracing::debug!(
        quotes = quotes.len(),
        markets = groups.len(),
        "Computed market deviation"
    );

    Ok(priced)
}
