//! FILENAME: pivot-engine/src/aggregate.rs
//! Aggregators - stateful numeric reducers attached to pivot nodes.
//!
//! One accumulator tracks sum, count, min, and max together, so a parent
//! node can recombine child accumulators for any aggregation kind, and
//! the kind of an already-built tree can be switched without refolding
//! the source rows.

use serde::{Deserialize, Serialize};

use crate::definition::AggregationType;

/// A stateful reducer: identity, fold, and combine.
///
/// `add` folds scalars in one at a time; `merge` folds in another
/// accumulator's whole state, which is equivalent to having added the
/// other accumulator's inputs directly. Fold order never affects the
/// result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregator {
    kind: AggregationType,
    sum: f64,
    count: u64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Aggregator {
    /// Creates an accumulator at its identity.
    pub fn new(kind: AggregationType) -> Self {
        Aggregator {
            kind,
            sum: 0.0,
            count: 0,
            min: None,
            max: None,
        }
    }

    pub fn kind(&self) -> AggregationType {
        self.kind
    }

    /// Switches the aggregation kind, keeping accumulated state. The
    /// next `result` call reinterprets the same data under the new kind.
    pub fn set_kind(&mut self, kind: AggregationType) {
        self.kind = kind;
    }

    /// Resets the accumulator to its identity. Idempotent.
    pub fn init(&mut self) {
        self.sum = 0.0;
        self.count = 0;
        self.min = None;
        self.max = None;
    }

    /// Folds a scalar into the accumulator. `None` is a no-op.
    pub fn add(&mut self, value: Option<f64>) {
        let value = match value {
            Some(value) => value,
            None => return,
        };

        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Folds another accumulator into this one.
    pub fn merge(&mut self, other: &Aggregator) {
        self.sum += other.sum;
        self.count += other.count;
        if let Some(other_min) = other.min {
            self.min = Some(self.min.map_or(other_min, |m| m.min(other_min)));
        }
        if let Some(other_max) = other.max {
            self.max = Some(self.max.map_or(other_max, |m| m.max(other_max)));
        }
    }

    /// The raw aggregate value for this accumulator's kind. An empty
    /// accumulator yields 0 for every kind.
    pub fn result(&self) -> f64 {
        match self.kind {
            AggregationType::Sum => self.sum,
            AggregationType::Count => self.count as f64,
            AggregationType::Average => {
                if self.count > 0 {
                    self.sum / self.count as f64
                } else {
                    0.0
                }
            }
            AggregationType::Min => self.min.unwrap_or(0.0),
            AggregationType::Max => self.max.unwrap_or(0.0),
        }
    }

    /// The presentation value: `result` rounded to two decimal places.
    /// Internal precision stays untouched.
    pub fn formatted_result(&self) -> f64 {
        (self.result() * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_after_init() {
        let mut agg = Aggregator::new(AggregationType::Sum);
        agg.add(Some(42.0));
        agg.init();
        agg.init(); // idempotent

        assert_eq!(agg.result(), 0.0);
    }

    #[test]
    fn test_sum() {
        let mut agg = Aggregator::new(AggregationType::Sum);
        agg.add(Some(100.0));
        agg.add(Some(50.0));
        agg.add(Some(0.25));

        assert_eq!(agg.result(), 150.25);
    }

    #[test]
    fn test_none_is_a_no_op() {
        let mut agg = Aggregator::new(AggregationType::Count);
        agg.add(None);
        agg.add(Some(1.0));
        agg.add(None);

        assert_eq!(agg.result(), 1.0);
    }

    #[test]
    fn test_result_is_order_independent() {
        let values = [3.5, -2.0, 10.0, 0.5, 7.25];
        let reversed: Vec<f64> = values.iter().rev().copied().collect();

        for kind in [
            AggregationType::Sum,
            AggregationType::Count,
            AggregationType::Average,
            AggregationType::Min,
            AggregationType::Max,
        ] {
            let mut forward = Aggregator::new(kind);
            let mut backward = Aggregator::new(kind);
            for v in values {
                forward.add(Some(v));
            }
            for v in reversed.iter().copied() {
                backward.add(Some(v));
            }
            assert_eq!(forward.result(), backward.result(), "{:?}", kind);
        }
    }

    #[test]
    fn test_merge_matches_direct_fold() {
        let left = [1.0, 2.0, 3.0];
        let right = [10.0, -5.0];

        for kind in [
            AggregationType::Sum,
            AggregationType::Count,
            AggregationType::Average,
            AggregationType::Min,
            AggregationType::Max,
        ] {
            let mut a = Aggregator::new(kind);
            let mut b = Aggregator::new(kind);
            let mut direct = Aggregator::new(kind);

            for v in left {
                a.add(Some(v));
                direct.add(Some(v));
            }
            for v in right {
                b.add(Some(v));
                direct.add(Some(v));
            }

            a.merge(&b);
            assert_eq!(a.result(), direct.result(), "{:?}", kind);
        }
    }

    #[test]
    fn test_empty_accumulator_yields_zero() {
        for kind in [
            AggregationType::Sum,
            AggregationType::Count,
            AggregationType::Average,
            AggregationType::Min,
            AggregationType::Max,
        ] {
            assert_eq!(Aggregator::new(kind).result(), 0.0, "{:?}", kind);
        }
    }

    #[test]
    fn test_formatted_result_rounds_to_two_decimals() {
        let mut agg = Aggregator::new(AggregationType::Sum);
        agg.add(Some(10.005));
        agg.add(Some(0.001));

        assert_eq!(agg.formatted_result(), 10.01);
        assert!(agg.result() > 10.005); // raw precision preserved
    }

    #[test]
    fn test_average() {
        let mut agg = Aggregator::new(AggregationType::Average);
        agg.add(Some(10.0));
        agg.add(Some(20.0));
        agg.add(Some(60.0));

        assert_eq!(agg.result(), 30.0);
    }

    #[test]
    fn test_set_kind_reinterprets_state() {
        let mut agg = Aggregator::new(AggregationType::Sum);
        agg.add(Some(10.0));
        agg.add(Some(30.0));
        assert_eq!(agg.result(), 40.0);

        agg.set_kind(AggregationType::Count);
        assert_eq!(agg.result(), 2.0);

        agg.set_kind(AggregationType::Max);
        assert_eq!(agg.result(), 30.0);
    }
}
