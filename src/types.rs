//! Shared types for the PLINKO engine.
//!
//! These types form the data model used across all modules.
//! They are kept free of engine logic so that the ledger, storage,
//! simulation and session modules can depend on them without
//! circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Named volatility profile selecting a base multiplier distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// All tiers (useful for iteration).
    pub const ALL: &'static [RiskTier] = &[RiskTier::Low, RiskTier::Medium, RiskTier::High];
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low Risk"),
            RiskTier::Medium => write!(f, "Medium Risk"),
            RiskTier::High => write!(f, "High Risk"),
        }
    }
}

/// Parse a tier name (case-insensitive). Accepts the 0/1/2 slider indices too.
impl std::str::FromStr for RiskTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "0" => Ok(RiskTier::Low),
            "medium" | "med" | "1" => Ok(RiskTier::Medium),
            "high" | "2" => Ok(RiskTier::High),
            _ => Err(anyhow::anyhow!("Unknown risk tier: {s}")),
        }
    }
}

/// Board geometry: number of pin rows and the risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: u32,
    pub risk_tier: RiskTier,
}

impl BoardConfig {
    pub fn new(rows: u32, risk_tier: RiskTier) -> Self {
        Self { rows, risk_tier }
    }

    /// Number of terminal buckets (`rows + 1`).
    pub fn bucket_count(&self) -> usize {
        self.rows as usize + 1
    }
}

impl fmt::Display for BoardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows / {}", self.rows, self.risk_tier)
    }
}

// ---------------------------------------------------------------------------
// Drop path
// ---------------------------------------------------------------------------

/// A single bounce off a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Signed bucket offset for this step (-1 or +1).
    pub fn offset(&self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// Sequence of left/right bounces, one per pin row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DropPath(Vec<Direction>);

impl DropPath {
    pub fn new(steps: Vec<Direction>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[Direction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, step: Direction) {
        self.0.push(step);
    }

    /// Net horizontal displacement (rights minus lefts).
    pub fn displacement(&self) -> i64 {
        self.0.iter().map(Direction::offset).sum()
    }
}

impl From<Vec<Direction>> for DropPath {
    fn from(steps: Vec<Direction>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for DropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wager & settlement
// ---------------------------------------------------------------------------

/// A stake per ball and the number of balls dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wager {
    pub amount_per_unit: Decimal,
    pub units: u32,
}

impl Wager {
    pub fn new(amount_per_unit: Decimal, units: u32) -> Self {
        Self {
            amount_per_unit,
            units,
        }
    }

    /// Total stake (`amount_per_unit × units`), `None` on overflow.
    pub fn total_stake(&self) -> Option<Decimal> {
        self.amount_per_unit.checked_mul(Decimal::from(self.units))
    }
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × ${:.2}", self.units, self.amount_per_unit)
    }
}

/// Win/loss classification of a ball or a whole wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// Resolution of a single ball.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallResult {
    /// Position of the ball within its wager (0-based, drop order).
    pub index: u32,
    pub path: DropPath,
    /// Bucket the bias walk was steered toward, if any.
    pub target: Option<usize>,
    pub bucket: usize,
    pub multiplier: Decimal,
    pub payout: Decimal,
    pub outcome: Outcome,
}

impl BallResult {
    /// Payout minus the stake for this ball.
    pub fn net(&self, amount_per_unit: Decimal) -> Decimal {
        self.payout - amount_per_unit
    }
}

/// Aggregate result of a wager, produced once every ball has resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub wager: Wager,
    pub balls: Vec<BallResult>,
    /// Stake covering the resolved balls only.
    pub total_stake: Decimal,
    pub total_payout: Decimal,
    pub net_result: Decimal,
    pub outcome: Outcome,
    /// Stake of balls discarded by a cancellation (never debited).
    pub refunded_stake: Decimal,
    pub cancelled: bool,
}

impl Settlement {
    /// Multipliers in drop order.
    pub fn multipliers(&self) -> Vec<Decimal> {
        self.balls.iter().map(|b| b.multiplier).collect()
    }

    /// Payouts in drop order.
    pub fn payouts(&self) -> Vec<Decimal> {
        self.balls.iter().map(|b| b.payout).collect()
    }

    pub fn winning_balls(&self) -> usize {
        self.balls.iter().filter(|b| b.outcome == Outcome::Win).count()
    }

    pub fn units_resolved(&self) -> u32 {
        self.balls.len() as u32
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | balls={}/{} (winning {}) | stake=${:.2} | payout=${:.2} | net=${:.2}",
            self.outcome,
            self.units_resolved(),
            self.wager.units,
            self.winning_balls(),
            self.total_stake,
            self.total_payout,
            self.net_result,
        )?;
        if self.cancelled {
            write!(f, " | cancelled, refunded=${:.2}", self.refunded_stake)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Win,
    Loss,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdrawal => write!(f, "withdrawal"),
            TransactionKind::Win => write!(f, "win"),
            TransactionKind::Loss => write!(f, "loss"),
        }
    }
}

impl From<Outcome> for TransactionKind {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => TransactionKind::Win,
            Outcome::Loss => TransactionKind::Loss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// An entry in the wallet's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    /// Always non-negative; the kind carries the sign.
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    /// Human-facing reference for deposit/withdrawal requests (`DEP-…`, `WD-…`).
    #[serde(default)]
    pub reference: Option<String>,
}

impl Transaction {
    /// A completed game-result record for a settled wager.
    pub fn game_result(outcome: Outcome, net_result: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: outcome.into(),
            amount: net_result.abs(),
            timestamp: Utc::now(),
            status: TransactionStatus::Completed,
            reference: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ${:.2} ({}) {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.amount,
            self.status,
            self.id,
        )
    }
}

// ---------------------------------------------------------------------------
// Wallet state
// ---------------------------------------------------------------------------

/// Persistent wallet state, saved to JSON after each wager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletState {
    pub balance: Decimal,
    /// Oldest first.
    pub transactions: Vec<Transaction>,
    /// Balance captured when the first wager was placed.
    #[serde(default)]
    pub initial_deposit: Option<Decimal>,
    #[serde(default)]
    pub game_count: u64,
    pub created_at: DateTime<Utc>,
}

impl WalletState {
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance,
            transactions: Vec::new(),
            initial_deposit: None,
            game_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Balance relative to the first-game balance (zero before any game).
    pub fn profit_since_first_game(&self) -> Decimal {
        match self.initial_deposit {
            Some(initial) => self.balance - initial,
            None => Decimal::ZERO,
        }
    }
}

impl fmt::Display for WalletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "balance=${:.2} | games={} | transactions={}",
            self.balance,
            self.game_count,
            self.transactions.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a wager was rejected before any ball was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WagerRejection {
    #[error("stake per ball must be positive, got ${0}")]
    NonPositiveStake(Decimal),

    #[error("at least one ball is required")]
    NoUnits,

    #[error("total stake overflows")]
    StakeOverflow,

    #[error("best-case payout exceeds the representable balance")]
    PayoutOverflow,

    #[error("insufficient balance: need ${needed:.2}, have ${available:.2}")]
    InsufficientBalance { needed: Decimal, available: Decimal },
}

/// Domain-specific error types for PLINKO.
#[derive(Debug, thiserror::Error)]
pub enum PlinkoError {
    #[error("Invalid wager: {0}")]
    InvalidWager(#[from] WagerRejection),

    #[error("Invalid board config: {0}")]
    InvalidBoardConfig(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Transaction {id} is {status}, expected pending")]
    TransactionNotPending { id: Uuid, status: TransactionStatus },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
