//! Wager aggregation.
//!
//! Pure arithmetic over resolved balls; the ledger side effects live in
//! [`super::WagerRound`].

use rust_decimal::Decimal;

use crate::types::{BallResult, Outcome, Settlement, Wager};

/// Payout for one ball: stake × multiplier, exact.
pub fn ball_payout(amount_per_unit: Decimal, multiplier: Decimal) -> Decimal {
    amount_per_unit * multiplier
}

/// Aggregate resolved balls into a settlement.
///
/// Stake covers the resolved balls only; any balls of the wager that never
/// dropped are reported as refunded.
pub fn aggregate(wager: Wager, balls: Vec<BallResult>) -> Settlement {
    let resolved = Decimal::from(balls.len() as u64);
    let total_stake = wager.amount_per_unit * resolved;
    let total_payout: Decimal = balls.iter().map(|b| b.payout).sum();
    let net_result = total_payout - total_stake;
    let outcome = if net_result > Decimal::ZERO {
        Outcome::Win
    } else {
        Outcome::Loss
    };

    let unresolved = wager.units.saturating_sub(balls.len() as u32);
    let refunded_stake = wager.amount_per_unit * Decimal::from(unresolved);

    Settlement {
        wager,
        balls,
        total_stake,
        total_payout,
        net_result,
        outcome,
        refunded_stake,
        cancelled: unresolved > 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
