//! Multiplier table construction.
//!
//! Each risk tier owns an edge sequence running from its extreme payout
//! down toward the center. The canonical base board for a tier is that
//! sequence, the lowest multiplier (0.1×), then the sequence mirrored.
//! Boards no wider than the base take a centered slice of it; wider boards
//! are filled with the lowest multiplier and get the edge sequence laid
//! over both ends.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::debug;

use crate::types::{BoardConfig, PlinkoError, RiskTier};

/// Lowest multiplier on any board; fills the center of wide boards.
pub const LOWEST_MULTIPLIER: Decimal = dec!(0.1);

const LOW_EDGES: [Decimal; 5] = [dec!(10), dec!(5), dec!(2), dec!(0.5), dec!(0.3)];

const MEDIUM_EDGES: [Decimal; 7] = [
    dec!(50),
    dec!(20),
    dec!(10),
    dec!(5),
    dec!(2),
    dec!(0.5),
    dec!(0.3),
];

const HIGH_EDGES: [Decimal; 8] = [
    dec!(1500),
    dec!(1000),
    dec!(50),
    dec!(7),
    dec!(5),
    dec!(2),
    dec!(0.5),
    dec!(0.3),
];

/// Edge-to-center multiplier sequence for a tier.
pub fn edge_values(tier: RiskTier) -> &'static [Decimal] {
    match tier {
        RiskTier::Low => &LOW_EDGES,
        RiskTier::Medium => &MEDIUM_EDGES,
        RiskTier::High => &HIGH_EDGES,
    }
}

/// The tier's canonical board: edges, lowest multiplier, mirrored edges.
pub fn base_sequence(tier: RiskTier) -> Vec<Decimal> {
    let edges = edge_values(tier);
    let mut base = Vec::with_capacity(edges.len() * 2 + 1);
    base.extend_from_slice(edges);
    base.push(LOWEST_MULTIPLIER);
    base.extend(edges.iter().rev());
    base
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Payout multiplier per bucket, indexed `0..=rows`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplierTable {
    board: BoardConfig,
    values: Vec<Decimal>,
}

impl MultiplierTable {
    /// Build the table for a board. Rejects boards with no rows.
    pub fn build(board: BoardConfig) -> Result<Self, PlinkoError> {
        if board.rows < 1 {
            return Err(PlinkoError::InvalidBoardConfig(format!(
                "rows must be at least 1, got {}",
                board.rows
            )));
        }

        let len = board.bucket_count();
        let base = base_sequence(board.risk_tier);

        let values = if len <= base.len() {
            // Centered slice of the base board.
            let half = len / 2;
            let mut values = Vec::with_capacity(len);
            values.extend_from_slice(&base[..half]);
            if len % 2 == 1 {
                values.push(base[base.len() / 2]);
            }
            values.extend_from_slice(&base[base.len() - half..]);
            values
        } else {
            let mut values = vec![LOWEST_MULTIPLIER; len];
            let middle = len / 2;
            for (i, &m) in edge_values(board.risk_tier).iter().take(middle).enumerate() {
                values[i] = m;
                values[len - 1 - i] = m;
            }
            values
        };

        debug!(
            rows = board.rows,
            tier = ?board.risk_tier,
            buckets = values.len(),
            "Multiplier table built"
        );

        Ok(Self { board, values })
    }

    pub fn board(&self) -> BoardConfig {
        self.board
    }

    pub fn rows(&self) -> u32 {
        self.board.rows
    }

    pub fn values(&self) -> &[Decimal] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Starting bucket of every walk: `floor(len / 2)`.
    pub fn middle(&self) -> usize {
        self.values.len() / 2
    }

    pub fn get(&self, bucket: usize) -> Option<Decimal> {
        self.values.get(bucket).copied()
    }

    /// Buckets paying less than the stake (multiplier < 1).
    pub fn decimal_positions(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, m)| **m < Decimal::ONE)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn max_multiplier(&self) -> Decimal {
        self.values.iter().copied().max().unwrap_or(Decimal::ZERO)
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.values.len();
        (0..n / 2).all(|i| self.values[i] == self.values[n - 1 - i])
    }
}

/// Build the multiplier table for `tier` and `rows`.
pub fn build_multiplier_table(tier: RiskTier, rows: u32) -> Result<MultiplierTable, PlinkoError> {
    MultiplierTable::build(BoardConfig::new(rows, tier))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
