//! Monte Carlo runner.
//!
//! Plays the same wager repeatedly against a ledger and reports how the
//! biased board actually paid out: bucket histogram, share of balls landing
//! on sub-1× buckets, RTP, balance path and max drawdown.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::engine::rng::RandomSource;
use crate::engine::table::MultiplierTable;
use crate::engine::OutcomeEngine;
use crate::ledger::Ledger;
use crate::types::{BoardConfig, Outcome, PlinkoError, Wager, WagerRejection};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub board: BoardConfig,
    pub wager: Wager,
    pub rounds_requested: u32,
    pub rounds_played: u32,
    pub balls_dropped: u64,
    /// Landing count per bucket, indexed like the multiplier table.
    pub bucket_hits: Vec<u64>,
    /// Balls that landed on a multiplier below 1×.
    pub sub_one_balls: u64,
    /// Balls the path generator steered toward a target.
    pub targeted_balls: u64,
    pub wins: u32,
    pub losses: u32,
    pub total_staked: Decimal,
    pub total_paid: Decimal,
    pub initial_balance: Decimal,
    pub final_balance: Decimal,
    pub peak_balance: Decimal,
    pub max_drawdown_pct: f64,
    /// The balance ran out before `rounds_requested` wagers were played.
    pub stopped_early: bool,
}

impl SimulationReport {
    pub fn net_result(&self) -> Decimal {
        self.total_paid - self.total_staked
    }

    /// Return to player, as a fraction of the total staked.
    pub fn rtp(&self) -> f64 {
        if self.total_staked > Decimal::ZERO {
            (self.total_paid / self.total_staked).to_f64().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    pub fn sub_one_fraction(&self) -> f64 {
        ratio(self.sub_one_balls, self.balls_dropped)
    }

    pub fn targeted_fraction(&self) -> f64 {
        ratio(self.targeted_balls, self.balls_dropped)
    }

    pub fn win_rate(&self) -> f64 {
        ratio(self.wins as u64, self.rounds_played as u64)
    }

    /// Landing frequency per bucket.
    pub fn bucket_frequencies(&self) -> Vec<f64> {
        self.bucket_hits
            .iter()
            .map(|&hits| ratio(hits, self.balls_dropped))
            .collect()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "board:        {}", self.board)?;
        writeln!(f, "wager:        {}", self.wager)?;
        writeln!(
            f,
            "rounds:       {}/{}{}",
            self.rounds_played,
            self.rounds_requested,
            if self.stopped_early { " (balance exhausted)" } else { "" }
        )?;
        writeln!(f, "balls:        {}", self.balls_dropped)?;
        writeln!(f, "wins/losses:  {}/{} ({:.1}%)", self.wins, self.losses, self.win_rate() * 100.0)?;
        writeln!(f, "sub-1x balls: {:.1}%", self.sub_one_fraction() * 100.0)?;
        writeln!(f, "targeted:     {:.1}%", self.targeted_fraction() * 100.0)?;
        writeln!(
            f,
            "staked/paid:  ${:.2} / ${:.2} (RTP {:.2}%)",
            self.total_staked,
            self.total_paid,
            self.rtp() * 100.0
        )?;
        writeln!(
            f,
            "balance:      ${:.2} -> ${:.2} (peak ${:.2}, max drawdown {:.1}%)",
            self.initial_balance, self.final_balance, self.peak_balance, self.max_drawdown_pct
        )?;
        write!(f, "buckets:     ")?;
        for freq in self.bucket_frequencies() {
            write!(f, " {:.3}", freq)?;
        }
        Ok(())
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Simulator {
    engine: OutcomeEngine,
}

impl Simulator {
    pub fn new(engine: OutcomeEngine) -> Self {
        Self { engine }
    }

    /// Play up to `rounds` wagers of `wager` against `ledger`.
    ///
    /// Stops early once the balance can no longer cover the stake. Any other
    /// wager rejection is returned as an error.
    pub fn run<R, L>(
        &self,
        table: &MultiplierTable,
        wager: Wager,
        rounds: u32,
        rng: &mut R,
        ledger: &mut L,
    ) -> Result<SimulationReport, PlinkoError>
    where
        R: RandomSource + ?Sized,
        L: Ledger + ?Sized,
    {
        let initial_balance = ledger.balance();
        let mut report = SimulationReport {
            board: table.board(),
            wager,
            rounds_requested: rounds,
            rounds_played: 0,
            balls_dropped: 0,
            bucket_hits: vec![0; table.len()],
            sub_one_balls: 0,
            targeted_balls: 0,
            wins: 0,
            losses: 0,
            total_staked: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            initial_balance,
            final_balance: initial_balance,
            peak_balance: initial_balance,
            max_drawdown_pct: 0.0,
            stopped_early: false,
        };

        info!(
            board = %table.board(),
            wager = %wager,
            rounds,
            balance = %initial_balance,
            "Simulation starting"
        );

        for round in 0..rounds {
            let settlement = match self.engine.resolve_wager(table, wager, rng, ledger) {
                Ok(s) => s,
                Err(PlinkoError::InvalidWager(WagerRejection::InsufficientBalance { .. })) => {
                    debug!(round, balance = %ledger.balance(), "Balance exhausted");
                    report.stopped_early = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            report.rounds_played += 1;
            report.total_staked += settlement.total_stake;
            report.total_paid += settlement.total_payout;
            match settlement.outcome {
                Outcome::Win => report.wins += 1,
                Outcome::Loss => report.losses += 1,
            }

            for ball in &settlement.balls {
                report.balls_dropped += 1;
                report.bucket_hits[ball.bucket] += 1;
                if ball.multiplier < Decimal::ONE {
                    report.sub_one_balls += 1;
                }
                if ball.target.is_some() {
                    report.targeted_balls += 1;
                }
            }

            let balance = ledger.balance();
            if balance > report.peak_balance {
                report.peak_balance = balance;
            }
            if report.peak_balance > Decimal::ZERO {
                let dd = (Decimal::ONE - balance / report.peak_balance) * dec!(100);
                report.max_drawdown_pct = report.max_drawdown_pct.max(dd.to_f64().unwrap_or(0.0));
            }
        }

        report.final_balance = ledger.balance();

        info!(
            rounds = report.rounds_played,
            balls = report.balls_dropped,
            rtp = format!("{:.4}", report.rtp()),
            sub_one = format!("{:.4}", report.sub_one_fraction()),
            final_balance = %report.final_balance,
            stopped_early = report.stopped_early,
            "Simulation complete"
        );

        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
