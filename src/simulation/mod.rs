//! Monte Carlo evaluation of a board and bias configuration.

pub mod runner;

pub use runner::{SimulationReport, Simulator};
