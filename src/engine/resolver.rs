//! Bucket resolution: raw path → clamped bucket → multiplier.

use rust_decimal::Decimal;

use super::table::MultiplierTable;
use crate::types::{DropPath, Outcome};

/// Where a path lands and what it pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketResolution {
    pub bucket: usize,
    pub multiplier: Decimal,
    pub outcome: Outcome,
}

/// Landing bucket for `path` on a board with `bucket_count` buckets.
///
/// Starts at `floor(bucket_count / 2)`, applies every bounce, then clamps
/// to `[0, bucket_count - 1]`.
pub fn resolve_bucket(path: &DropPath, bucket_count: usize) -> usize {
    if bucket_count == 0 {
        return 0;
    }
    let end = (bucket_count / 2) as i64 + path.displacement();
    end.clamp(0, bucket_count as i64 - 1) as usize
}

/// Only multipliers strictly above 1× count as a win; break-even is a loss.
pub fn classify(multiplier: Decimal) -> Outcome {
    if multiplier > Decimal::ONE {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

/// Resolve a path against a table.
pub fn resolve(table: &MultiplierTable, path: &DropPath) -> BucketResolution {
    let bucket = resolve_bucket(path, table.len());
    let multiplier = table.get(bucket).unwrap_or(Decimal::ZERO);
    BucketResolution {
        bucket,
        multiplier,
        outcome: classify(multiplier),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::seeded;
    use crate::engine::table::build_multiplier_table;
    use crate::engine::path::PathGenerator;
    use crate::types::{Direction, RiskTier};
    use rust_decimal_macros::dec;

    fn path_of(lefts: usize, rights: usize) -> DropPath {
        let mut steps = vec![Direction::Left; lefts];
        steps.extend(vec![Direction::Right; rights]);
        DropPath::new(steps)
    }

    #[test]
    fn test_all_left_clamps_to_zero() {
        let table = build_multiplier_table(RiskTier::Medium, 12).unwrap();
        let res = resolve(&table, &path_of(12, 0));
        assert_eq!(res.bucket, 0);
        assert_eq!(res.multiplier, dec!(50));
        assert_eq!(res.outcome, Outcome::Win);
    }

    #[test]
    fn test_all_right_clamps_to_last() {
        let table = build_multiplier_table(RiskTier::Medium, 12).unwrap();
        let res = resolve(&table, &path_of(0, 12));
        assert_eq!(res.bucket, 12);
    }

    #[test]
    fn test_balanced_path_lands_in_middle() {
        let table = build_multiplier_table(RiskTier::Medium, 12).unwrap();
        let res = resolve(&table, &path_of(6, 6));
        assert_eq!(res.bucket, 6);
        assert_eq!(res.multiplier, dec!(0.1));
        assert_eq!(res.outcome, Outcome::Loss);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = DropPath::new(vec![Direction::Left, Direction::Right, Direction::Right]);
        let b = DropPath::new(vec![Direction::Right, Direction::Right, Direction::Left]);
        assert_eq!(resolve_bucket(&a, 4), resolve_bucket(&b, 4));
        assert_eq!(resolve_bucket(&a, 4), 3);
    }

    #[test]
    fn test_break_even_is_not_a_win() {
        assert_eq!(classify(dec!(1)), Outcome::Loss);
        assert_eq!(classify(dec!(1.01)), Outcome::Win);
        assert_eq!(classify(dec!(0.5)), Outcome::Loss);
    }

    #[test]
    fn test_bucket_always_in_bounds() {
        let generator = PathGenerator::default();
        let mut rng = seeded(11);
        for &tier in RiskTier::ALL {
            for rows in 1..=20 {
                let table = build_multiplier_table(tier, rows).unwrap();
                for _ in 0..50 {
                    let generated = generator.generate(&table, &mut rng);
                    let bucket = resolve_bucket(&generated.path, table.len());
                    assert!(bucket <= rows as usize);
                }
            }
        }
    }
}
