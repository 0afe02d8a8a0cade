//! Integration test suite.

mod autoplay;
mod mock_ledger;
mod simulation;
mod wallet_lifecycle;
