//! Expected value and value-bet ranking

use super::types::{EvError, ScoredQuote, Valued};
use rust_decimal::Decimal;

/// Expected return per unit staked at decimal odds
///
/// EV = p * odds - 1, assuming `probability` is calibrated.
pub fn expected_value(probability: Decimal, decimal_odds: Decimal) -> Decimal {
    probability * decimal_odds - Decimal::ONE
}

/// Attach expected value to each row
///
/// `probability` and `odds` select the columns to combine, e.g. the model's
/// `p_hat` with either the posted or the market-average odds.
pub fn add_ev<T, P, O>(rows: Vec<T>, probability: P, odds: O) -> Result<Vec<Valued<T>>, EvError>
where
    P: Fn(&T) -> Decimal,
    O: Fn(&T) -> Decimal,
{
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let p = probability(&row);
            if p < Decimal::ZERO || p > Decimal::ONE {
                return Err(EvError::ProbabilityOutOfRange { row: i, value: p });
            }
            let price = odds(&row);
            if price <= Decimal::ZERO {
                return Err(EvError::InvalidOdds { row: i, value: price });
            }

            Ok(Valued {
                ev: expected_value(p, price),
                row,
            })
        })
        .collect()
}

/// Bets with EV above `min_ev`, best first
///
/// Equal EVs keep their input order.
pub fn rank_value_bets(scored: Vec<ScoredQuote>, min_ev: Decimal) -> Vec<ScoredQuote> {
    let mut bets: Vec<ScoredQuote> = scored.into_iter().filter(|q| q.ev > min_ev).collect();
    bets.sort_by(|a, b| b.ev.cmp(&a.ev));
    bets
}
