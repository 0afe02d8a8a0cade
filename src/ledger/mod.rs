//! Wallet ledger.
//!
//! Defines the `Ledger` contract the outcome engine settles against and
//! provides [`wallet::Wallet`], the in-memory implementation with the
//! deposit/withdrawal approval lifecycle.

pub mod wallet;

use rust_decimal::Decimal;

use crate::types::Transaction;

/// Balance and audit log consumed by the outcome engine.
///
/// The engine calls `apply_delta` once per resolved ball, in drop order,
/// and `append_transaction` once per settled wager.
#[cfg_attr(test, mockall::automock)]
pub trait Ledger {
    /// Current spendable balance.
    fn balance(&self) -> Decimal;

    /// Add `amount` (may be negative) to the balance.
    fn apply_delta(&mut self, amount: Decimal);

    /// Append a record to the transaction log.
    fn append_transaction(&mut self, record: Transaction);
}

pub use wallet::Wallet;
