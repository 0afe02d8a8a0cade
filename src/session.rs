//! Autoplay runner.
//!
//! Plays a configured wager round after round against a wallet, dropping one
//! ball per tick so multi-ball wagers resolve over time. A shutdown signal
//! arriving mid-round cancels that round: the balls already dropped are
//! settled and the rest of the stake is never taken. The wallet is persisted
//! after every round.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::engine::rng::RandomSource;
use crate::engine::table::MultiplierTable;
use crate::engine::OutcomeEngine;
use crate::ledger::{Ledger, Wallet};
use crate::storage;
use crate::types::{Outcome, PlinkoError, Settlement, Wager, WagerRejection};

/// Shortest pause between balls; tokio intervals reject a zero period.
const MIN_BALL_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    RoundsComplete,
    InsufficientBalance,
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub rounds_played: u32,
    pub balls_dropped: u64,
    pub wins: u32,
    pub losses: u32,
    pub starting_balance: Decimal,
    pub final_balance: Decimal,
    pub stop_reason: StopReason,
    /// Partially settled round interrupted by shutdown, if any.
    pub cancelled: Option<Settlement>,
}

impl SessionReport {
    pub fn net_result(&self) -> Decimal {
        self.final_balance - self.starting_balance
    }
}

pub struct AutoplaySession {
    engine: OutcomeEngine,
    table: MultiplierTable,
    wager: Wager,
    /// 0 plays until shutdown or the balance runs out.
    rounds: u32,
    ball_delay: Duration,
    state_file: Option<String>,
}

impl AutoplaySession {
    pub fn new(engine: OutcomeEngine, table: MultiplierTable, wager: Wager) -> Self {
        Self {
            engine,
            table,
            wager,
            rounds: 0,
            ball_delay: Duration::from_millis(300),
            state_file: None,
        }
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_ball_delay(mut self, delay: Duration) -> Self {
        self.ball_delay = delay;
        self
    }

    /// Save the wallet to `path` after every round.
    pub fn with_state_file(mut self, path: impl Into<String>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    pub fn table(&self) -> &MultiplierTable {
        &self.table
    }

    pub fn wager(&self) -> Wager {
        self.wager
    }

    /// Run until the round budget is spent, the wallet cannot cover the
    /// stake, or `shutdown` completes.
    pub async fn run<R, F>(&self, wallet: &mut Wallet, rng: &mut R, shutdown: F) -> Result<SessionReport>
    where
        R: RandomSource + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut interval = tokio::time::interval(self.ball_delay.max(MIN_BALL_DELAY));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut report = SessionReport {
            rounds_played: 0,
            balls_dropped: 0,
            wins: 0,
            losses: 0,
            starting_balance: wallet.balance(),
            final_balance: wallet.balance(),
            stop_reason: StopReason::RoundsComplete,
            cancelled: None,
        };

        info!(
            board = %self.table.board(),
            wager = %self.wager,
            rounds = self.rounds,
            delay_ms = self.ball_delay.as_millis() as u64,
            balance = %wallet.balance(),
            "Autoplay starting"
        );

        loop {
            if self.rounds > 0 && report.rounds_played >= self.rounds {
                report.stop_reason = StopReason::RoundsComplete;
                break;
            }

            let mut round = match self.engine.begin(&self.table, self.wager, &*wallet) {
                Ok(round) => round,
                Err(PlinkoError::InvalidWager(WagerRejection::InsufficientBalance { .. })) => {
                    info!(balance = %wallet.balance(), "Balance cannot cover the stake, stopping");
                    report.stop_reason = StopReason::InsufficientBalance;
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            let mut interrupted = false;
            while !round.is_complete() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        interrupted = true;
                        break;
                    }
                    _ = interval.tick() => {
                        round.drop_next(rng, wallet);
                    }
                }
            }

            let settlement = round.settle(wallet);
            if !settlement.balls.is_empty() {
                report.rounds_played += 1;
                report.balls_dropped += settlement.balls.len() as u64;
                match settlement.outcome {
                    Outcome::Win => report.wins += 1,
                    Outcome::Loss => report.losses += 1,
                }
                self.persist(wallet);
            }

            if interrupted {
                warn!(
                    resolved = settlement.units_resolved(),
                    refunded = %settlement.refunded_stake,
                    "Shutdown signal received mid-round"
                );
                if !settlement.balls.is_empty() {
                    report.cancelled = Some(settlement);
                }
                report.stop_reason = StopReason::Shutdown;
                break;
            }
        }

        report.final_balance = wallet.balance();
        info!(
            rounds = report.rounds_played,
            balls = report.balls_dropped,
            wins = report.wins,
            losses = report.losses,
            net = %report.net_result(),
            balance = %report.final_balance,
            reason = ?report.stop_reason,
            "Autoplay finished"
        );

        Ok(report)
    }

    fn persist(&self, wallet: &Wallet) {
        if let Some(path) = &self.state_file {
            if let Err(e) = storage::save_wallet(wallet.state(), Some(path)) {
                error!(error = %e, path = %path, "Failed to save wallet");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
