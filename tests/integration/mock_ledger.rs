//! Recording ledger for integration testing.
//!
//! Implements `Ledger` in memory and keeps every call the engine makes, in
//! order, so tests can check the per-ball deltas and the single settlement
//! record without a real wallet.

use rust_decimal::Decimal;

use plinko::ledger::Ledger;
use plinko::types::Transaction;

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    Delta(Decimal),
    Append(Transaction),
}

pub struct RecordingLedger {
    balance: Decimal,
    events: Vec<LedgerEvent>,
}

impl RecordingLedger {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn deltas(&self) -> Vec<Decimal> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LedgerEvent::Delta(d) => Some(*d),
                LedgerEvent::Append(_) => None,
            })
            .collect()
    }

    pub fn transactions(&self) -> Vec<&Transaction> {
        self.events
            .iter()
            .filter_map(|e| match e {
                LedgerEvent::Append(tx) => Some(tx),
                LedgerEvent::Delta(_) => None,
            })
            .collect()
    }
}

impl Ledger for RecordingLedger {
    fn balance(&self) -> Decimal {
        self.balance
    }

    fn apply_delta(&mut self, amount: Decimal) {
        self.balance += amount;
        self.events.push(LedgerEvent::Delta(amount));
    }

    fn append_transaction(&mut self, record: Transaction) {
        self.events.push(LedgerEvent::Append(record));
    }
}
