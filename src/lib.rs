//! PLINKO: biased-walk Plinko outcome engine
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod engine;
pub mod ledger;
pub mod storage;
pub mod simulation;
pub mod session;
