//! Outcome engine: multiplier tables, biased drop paths, bucket
//! resolution and wager settlement.
//!
//! A wager is validated in full before any randomness is drawn. Balls then
//! drop one at a time in index order; each one adjusts the ledger balance by
//! its own net result as soon as it lands. Once every ball has landed a
//! single Win/Loss transaction for the whole wager is appended.

pub mod path;
pub mod resolver;
pub mod rng;
pub mod settlement;
pub mod table;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::ledger::Ledger;
use crate::types::{BallResult, PlinkoError, Settlement, Transaction, Wager, WagerRejection};
use path::{BiasConfig, PathGenerator};
use rng::RandomSource;
use table::MultiplierTable;

pub use table::build_multiplier_table;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct OutcomeEngine {
    generator: PathGenerator,
}

impl OutcomeEngine {
    pub fn new(bias: BiasConfig) -> Self {
        Self {
            generator: PathGenerator::new(bias),
        }
    }

    pub fn bias(&self) -> &BiasConfig {
        self.generator.bias()
    }

    /// Check a wager against the board and the ledger. Returns the total
    /// stake.
    ///
    /// The best case (every ball in the top bucket) must still fit in a
    /// `Decimal` once credited, so the round itself never overflows.
    pub fn validate<L: Ledger + ?Sized>(
        &self,
        table: &MultiplierTable,
        wager: &Wager,
        ledger: &L,
    ) -> Result<Decimal, PlinkoError> {
        if wager.amount_per_unit <= Decimal::ZERO {
            return Err(WagerRejection::NonPositiveStake(wager.amount_per_unit).into());
        }
        if wager.units < 1 {
            return Err(WagerRejection::NoUnits.into());
        }
        let stake = wager.total_stake().ok_or(WagerRejection::StakeOverflow)?;
        let available = ledger.balance();
        if stake > available {
            return Err(WagerRejection::InsufficientBalance {
                needed: stake,
                available,
            }
            .into());
        }
        wager
            .amount_per_unit
            .checked_mul(table.max_multiplier())
            .and_then(|best| best.checked_mul(Decimal::from(wager.units)))
            .and_then(|best| best.checked_add(available))
            .ok_or(WagerRejection::PayoutOverflow)?;
        Ok(stake)
    }

    /// Validate and open a round that drops balls one at a time.
    pub fn begin<'a, L: Ledger + ?Sized>(
        &'a self,
        table: &'a MultiplierTable,
        wager: Wager,
        ledger: &L,
    ) -> Result<WagerRound<'a>, PlinkoError> {
        let stake = match self.validate(table, &wager, ledger) {
            Ok(stake) => stake,
            Err(e) => {
                warn!(wager = %wager, error = %e, "Wager rejected");
                return Err(e);
            }
        };

        debug!(
            wager = %wager,
            stake = %stake,
            board = %table.board(),
            "Wager accepted"
        );

        Ok(WagerRound {
            engine: self,
            table,
            wager,
            balls: Vec::with_capacity(wager.units as usize),
        })
    }

    /// Drop and resolve a single ball. No ledger side effects.
    pub fn drop_ball<R: RandomSource + ?Sized>(
        &self,
        table: &MultiplierTable,
        index: u32,
        amount_per_unit: Decimal,
        rng: &mut R,
    ) -> BallResult {
        let generated = self.generator.generate(table, rng);
        let resolution = resolver::resolve(table, &generated.path);
        BallResult {
            index,
            path: generated.path,
            target: generated.target,
            bucket: resolution.bucket,
            multiplier: resolution.multiplier,
            payout: settlement::ball_payout(amount_per_unit, resolution.multiplier),
            outcome: resolution.outcome,
        }
    }

    /// Drop every ball of `wager` and settle it against `ledger`.
    pub fn resolve_wager<R, L>(
        &self,
        table: &MultiplierTable,
        wager: Wager,
        rng: &mut R,
        ledger: &mut L,
    ) -> Result<Settlement, PlinkoError>
    where
        R: RandomSource + ?Sized,
        L: Ledger + ?Sized,
    {
        let mut round = self.begin(table, wager, &*ledger)?;
        while round.drop_next(rng, ledger).is_some() {}
        Ok(round.settle(ledger))
    }
}

/// Resolve a wager with the default bias.
pub fn resolve_wager<R, L>(
    table: &MultiplierTable,
    wager: Wager,
    rng: &mut R,
    ledger: &mut L,
) -> Result<Settlement, PlinkoError>
where
    R: RandomSource + ?Sized,
    L: Ledger + ?Sized,
{
    OutcomeEngine::default().resolve_wager(table, wager, rng, ledger)
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// A validated wager whose balls are dropped one at a time.
///
/// Settling before every ball has dropped cancels the remainder: only the
/// resolved balls are settled and the rest of the stake, never debited, is
/// reported as refunded.
pub struct WagerRound<'a> {
    engine: &'a OutcomeEngine,
    table: &'a MultiplierTable,
    wager: Wager,
    balls: Vec<BallResult>,
}

impl<'a> WagerRound<'a> {
    pub fn wager(&self) -> Wager {
        self.wager
    }

    pub fn table(&self) -> &MultiplierTable {
        self.table
    }

    pub fn resolved(&self) -> &[BallResult] {
        &self.balls
    }

    pub fn remaining(&self) -> u32 {
        self.wager.units - self.balls.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Drop the next ball and apply its net result to the ledger.
    /// Returns `None` once every ball has dropped.
    pub fn drop_next<R, L>(&mut self, rng: &mut R, ledger: &mut L) -> Option<&BallResult>
    where
        R: RandomSource + ?Sized,
        L: Ledger + ?Sized,
    {
        if self.is_complete() {
            return None;
        }

        let index = self.balls.len() as u32;
        let ball = self
            .engine
            .drop_ball(self.table, index, self.wager.amount_per_unit, rng);
        ledger.apply_delta(ball.net(self.wager.amount_per_unit));

        debug!(
            ball = index,
            bucket = ball.bucket,
            multiplier = %ball.multiplier,
            payout = %ball.payout,
            aimed_at = ?ball.target,
            outcome = %ball.outcome,
            "Ball landed"
        );

        self.balls.push(ball);
        self.balls.last()
    }

    /// Settle the resolved balls and append the wager's transaction.
    ///
    /// A round settled before any ball dropped appends nothing.
    pub fn settle<L: Ledger + ?Sized>(self, ledger: &mut L) -> Settlement {
        let settlement = settlement::aggregate(self.wager, self.balls);

        if settlement.balls.is_empty() {
            warn!(wager = %settlement.wager, "Wager cancelled before any ball dropped");
            return settlement;
        }

        ledger.append_transaction(Transaction::game_result(
            settlement.outcome,
            settlement.net_result,
        ));

        if settlement.cancelled {
            warn!(
                resolved = settlement.units_resolved(),
                refunded = %settlement.refunded_stake,
                net = %settlement.net_result,
                "Wager cancelled, settled resolved balls only"
            );
        } else {
            info!(
                outcome = %settlement.outcome,
                balls = settlement.units_resolved(),
                stake = %settlement.total_stake,
                payout = %settlement.total_payout,
                net = %settlement.net_result,
                balance = %ledger.balance(),
                "Wager settled"
            );
        }

        settlement
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
