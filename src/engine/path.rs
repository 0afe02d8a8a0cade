//! Biased drop-path generation.
//!
//! Most balls are steered toward a bucket paying under 1×: a coin flip
//! picks a target among those buckets, then each bounce leans toward the
//! target. The walk position used for steering is never clamped to the
//! board; the resolver recomputes the landing bucket from the raw path.

use serde::Deserialize;
use tracing::trace;

use super::rng::RandomSource;
use super::table::MultiplierTable;
use crate::types::{Direction, DropPath};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Steering probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BiasConfig {
    /// Chance a ball gets a sub-1× target bucket.
    pub decimal_target_probability: f64,
    /// Chance each bounce moves toward the target.
    pub toward_target_probability: f64,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            decimal_target_probability: 0.90,
            toward_target_probability: 0.75,
        }
    }
}

impl BiasConfig {
    /// A fair board: no targets, every bounce 50/50.
    pub fn unbiased() -> Self {
        Self {
            decimal_target_probability: 0.0,
            toward_target_probability: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// A generated path plus the bucket it was steered toward.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPath {
    pub path: DropPath,
    pub target: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct PathGenerator {
    bias: BiasConfig,
}

impl PathGenerator {
    pub fn new(bias: BiasConfig) -> Self {
        Self { bias }
    }

    pub fn bias(&self) -> &BiasConfig {
        &self.bias
    }

    /// Generate one path of `table.rows()` bounces.
    ///
    /// Draw order: target coin, target pick (only when targeting), then one
    /// draw per bounce.
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        table: &MultiplierTable,
        rng: &mut R,
    ) -> GeneratedPath {
        let decimal_positions = table.decimal_positions();
        let wants_decimal = rng.chance(self.bias.decimal_target_probability);

        let target = if wants_decimal && !decimal_positions.is_empty() {
            Some(decimal_positions[rng.pick_index(decimal_positions.len())])
        } else {
            None
        };

        let rows = table.rows() as usize;
        let mut path = DropPath::new(Vec::with_capacity(rows));
        let mut current = table.middle() as i64;

        for _ in 0..rows {
            let direction = match target {
                Some(t) => {
                    let diff = t as i64 - current;
                    if diff == 0 {
                        Self::coin(rng)
                    } else {
                        let toward = if diff > 0 { Direction::Right } else { Direction::Left };
                        if rng.chance(self.bias.toward_target_probability) {
                            toward
                        } else {
                            toward.opposite()
                        }
                    }
                }
                None => Self::coin(rng),
            };

            path.push(direction);
            current += direction.offset();
        }

        trace!(aimed_at = ?target, path = %path, walk_end = current, "Path generated");

        GeneratedPath { path, target }
    }

    fn coin<R: RandomSource + ?Sized>(rng: &mut R) -> Direction {
        if rng.chance(0.5) {
            Direction::Left
        } else {
            Direction::Right
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
