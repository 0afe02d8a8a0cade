//! Configuration loading from TOML.
//!
//! Reads `plinko.toml` (or the file named by `PLINKO_CONFIG`) and
//! deserializes it into strongly-typed structs. Every section and field is
//! optional; missing values fall back to the defaults below.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::engine::path::BiasConfig;
use crate::storage::DEFAULT_WALLET_FILE;
use crate::types::{BoardConfig, RiskTier, Wager};

/// Default config file path.
pub const DEFAULT_CONFIG_FILE: &str = "plinko.toml";

/// Largest ball count a single wager may request.
pub const MAX_BALLS_PER_WAGER: u32 = 50;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub mode: RunMode,
    pub game: GameConfig,
    pub bias: BiasConfig,
    pub wallet: WalletConfig,
    pub autoplay: AutoplayConfig,
    pub simulation: SimulationConfig,
}

/// What the binary does after start-up.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Paced rounds against the persisted wallet.
    #[default]
    Autoplay,
    /// Fast Monte Carlo run against a throwaway wallet.
    Simulate,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub rows: u32,
    pub risk_tier: RiskTier,
    pub amount_per_unit: Decimal,
    pub units: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 12,
            risk_tier: RiskTier::Medium,
            amount_per_unit: dec!(1),
            units: 1,
        }
    }
}

impl GameConfig {
    pub fn board(&self) -> BoardConfig {
        BoardConfig::new(self.rows, self.risk_tier)
    }

    pub fn wager(&self) -> Wager {
        Wager::new(self.amount_per_unit, self.units)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WalletConfig {
    /// Balance for a fresh wallet when no state file exists.
    pub initial_balance: Decimal,
    pub state_file: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            initial_balance: dec!(1000),
            state_file: DEFAULT_WALLET_FILE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Number of wagers to play; 0 means until stopped or broke.
    pub rounds: u32,
    /// Pause between consecutive balls of a wager.
    pub ball_delay_ms: u64,
    /// Seed for a reproducible session. Entropy when absent.
    pub seed: Option<u64>,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            ball_delay_ms: 300,
            seed: None,
        }
    }
}

impl AutoplayConfig {
    pub fn ball_delay(&self) -> Duration {
        Duration::from_millis(self.ball_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub rounds: u32,
    pub initial_balance: Decimal,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 10_000,
            initial_balance: dec!(10000),
            seed: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config file: {path}"))
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicitly requested file, or the default file if present.
    ///
    /// Only the default path may be missing; a file the caller named must
    /// exist.
    pub fn load_selected(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load_or_default(DEFAULT_CONFIG_FILE),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.game.rows < 1 {
            bail!("game.rows must be at least 1, got {}", self.game.rows);
        }
        if self.game.amount_per_unit <= Decimal::ZERO {
            bail!(
                "game.amount_per_unit must be positive, got {}",
                self.game.amount_per_unit
            );
        }
        if !(1..=MAX_BALLS_PER_WAGER).contains(&self.game.units) {
            bail!(
                "game.units must be between 1 and {MAX_BALLS_PER_WAGER}, got {}",
                self.game.units
            );
        }
        for (name, p) in [
            ("bias.decimal_target_probability", self.bias.decimal_target_probability),
            ("bias.toward_target_probability", self.bias.toward_target_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                bail!("{name} must be within [0, 1], got {p}");
            }
        }
        if self.wallet.initial_balance < Decimal::ZERO {
            bail!("wallet.initial_balance cannot be negative");
        }
        if self.simulation.initial_balance < Decimal::ZERO {
            bail!("simulation.initial_balance cannot be negative");
        }
        Ok(())
    }
}
