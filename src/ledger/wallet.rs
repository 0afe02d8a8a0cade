//! In-memory wallet ledger.
//!
//! Game settlements move the balance directly. Deposits wait for approval
//! before crediting; withdrawals debit on request and are refunded if the
//! request is denied.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::Ledger;
use crate::types::{
    PlinkoError, Transaction, TransactionKind, TransactionStatus, WalletState,
};

/// Totals derived from the transaction log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WalletStats {
    pub wins: u64,
    pub losses: u64,
    pub total_won: Decimal,
    pub total_lost: Decimal,
    pub deposited: Decimal,
    pub withdrawn: Decimal,
    pub pending_requests: usize,
}

impl WalletStats {
    /// Net result of all settled wagers.
    pub fn net_game_result(&self) -> Decimal {
        self.total_won - self.total_lost
    }

    /// Share of settled wagers that were wins, as a percentage.
    pub fn win_rate(&self) -> f64 {
        let games = self.wins + self.losses;
        if games == 0 {
            0.0
        } else {
            self.wins as f64 / games as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wallet {
    state: WalletState,
}

impl Wallet {
    pub fn new(balance: Decimal) -> Self {
        Self {
            state: WalletState::new(balance),
        }
    }

    /// Wrap a previously persisted state.
    pub fn from_state(state: WalletState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn into_state(self) -> WalletState {
        self.state
    }

    pub fn game_count(&self) -> u64 {
        self.state.game_count
    }

    pub fn initial_deposit(&self) -> Option<Decimal> {
        self.state.initial_deposit
    }

    // -- Deposit / withdrawal lifecycle ------------------------------------

    /// Submit a deposit request. The balance is credited on approval.
    pub fn request_deposit(&mut self, amount: Decimal) -> Result<Transaction, PlinkoError> {
        if amount <= Decimal::ZERO {
            return Err(PlinkoError::InvalidAmount(format!(
                "deposit must be positive, got ${amount}"
            )));
        }

        let tx = Self::request(TransactionKind::Deposit, amount, "DEP");
        self.state.transactions.push(tx.clone());
        info!(id = %tx.id, amount = %amount, reference = ?tx.reference, "Deposit requested");
        Ok(tx)
    }

    /// Submit a withdrawal request. The amount leaves the balance at once.
    pub fn request_withdrawal(&mut self, amount: Decimal) -> Result<Transaction, PlinkoError> {
        if amount <= Decimal::ZERO {
            return Err(PlinkoError::InvalidAmount(format!(
                "withdrawal must be positive, got ${amount}"
            )));
        }
        if amount > self.state.balance {
            return Err(PlinkoError::InvalidAmount(format!(
                "withdrawal of ${amount:.2} exceeds balance ${:.2}",
                self.state.balance
            )));
        }

        let tx = Self::request(TransactionKind::Withdrawal, amount, "WD");
        self.state.balance -= amount;
        self.state.transactions.push(tx.clone());
        info!(
            id = %tx.id,
            amount = %amount,
            balance = %self.state.balance,
            "Withdrawal requested"
        );
        Ok(tx)
    }

    /// Approve a pending request. Deposits credit the balance.
    pub fn approve(&mut self, id: Uuid) -> Result<Transaction, PlinkoError> {
        let idx = self.pending_index(id)?;
        let request = &self.state.transactions[idx];
        let balance = if request.kind == TransactionKind::Deposit {
            self.state.balance.checked_add(request.amount).ok_or_else(|| {
                PlinkoError::InvalidAmount(format!(
                    "deposit of ${} would overflow the balance",
                    request.amount
                ))
            })?
        } else {
            self.state.balance
        };

        let tx = &mut self.state.transactions[idx];
        tx.status = TransactionStatus::Completed;
        let tx = tx.clone();
        self.state.balance = balance;

        info!(id = %id, kind = %tx.kind, amount = %tx.amount, balance = %self.state.balance, "Request approved");
        Ok(tx)
    }

    /// Deny a pending request. Withdrawals are refunded.
    pub fn deny(&mut self, id: Uuid) -> Result<Transaction, PlinkoError> {
        let idx = self.pending_index(id)?;
        let tx = &mut self.state.transactions[idx];
        tx.status = TransactionStatus::Failed;
        let tx = tx.clone();

        if tx.kind == TransactionKind::Withdrawal {
            self.state.balance += tx.amount;
        }

        warn!(id = %id, kind = %tx.kind, amount = %tx.amount, balance = %self.state.balance, "Request denied");
        Ok(tx)
    }

    /// Requests awaiting approval, oldest first.
    pub fn pending(&self) -> Vec<&Transaction> {
        self.state.transactions.iter().filter(|t| t.is_pending()).collect()
    }

    /// Full log, newest first.
    pub fn history(&self) -> Vec<&Transaction> {
        self.state.transactions.iter().rev().collect()
    }

    pub fn stats(&self) -> WalletStats {
        let mut stats = WalletStats::default();
        for tx in &self.state.transactions {
            match (tx.kind, tx.status) {
                (TransactionKind::Win, _) => {
                    stats.wins += 1;
                    stats.total_won += tx.amount;
                }
                (TransactionKind::Loss, _) => {
                    stats.losses += 1;
                    stats.total_lost += tx.amount;
                }
                (TransactionKind::Deposit, TransactionStatus::Completed) => {
                    stats.deposited += tx.amount;
                }
                (TransactionKind::Withdrawal, TransactionStatus::Completed) => {
                    stats.withdrawn += tx.amount;
                }
                (_, TransactionStatus::Pending) => stats.pending_requests += 1,
                _ => {}
            }
        }
        stats
    }

    fn pending_index(&self, id: Uuid) -> Result<usize, PlinkoError> {
        let idx = self
            .state
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or(PlinkoError::TransactionNotFound(id))?;

        let status = self.state.transactions[idx].status;
        if status != TransactionStatus::Pending {
            return Err(PlinkoError::TransactionNotPending { id, status });
        }
        Ok(idx)
    }

    fn request(kind: TransactionKind, amount: Decimal, prefix: &str) -> Transaction {
        let now = Utc::now();
        let reference = format!(
            "{prefix}-{:06}-{:03}",
            now.timestamp_millis().rem_euclid(1_000_000),
            rand::random::<u16>() % 1000
        );
        Transaction {
            id: Uuid::new_v4(),
            kind,
            amount,
            timestamp: now,
            status: TransactionStatus::Pending,
            reference: Some(reference),
        }
    }
}

impl Ledger for Wallet {
    fn balance(&self) -> Decimal {
        self.state.balance
    }

    fn apply_delta(&mut self, amount: Decimal) {
        // First ball of the first game pins the reference balance.
        if self.state.game_count == 0 {
            self.state.initial_deposit.get_or_insert(self.state.balance);
        }
        self.state.balance += amount;
    }

    fn append_transaction(&mut self, record: Transaction) {
        if matches!(record.kind, TransactionKind::Win | TransactionKind::Loss) {
            self.state.game_count += 1;
        }
        self.state.transactions.push(record);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
