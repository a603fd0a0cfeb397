use std::collections::BTreeMap;

use serde::Serialize;

use crate::lns::destroy::RemovalSet;
use crate::problem::ProblemContext;

/// Aggregated statistics over the removal sets and orderings of one or
/// more trajectories.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct RemovalStats {
    pub iterations: usize,
    pub removed: usize,
    /// Removal sets that fell short of their target.
    pub degraded: usize,
    /// Sum over all sets of the mean seed distance relative to the
    /// largest distance of the instance.
    spread_ratio_sum: f64,
    pub orderings: usize,
    /// Number of removal sets per size.
    pub size_histogram: BTreeMap<usize, usize>,
}

impl RemovalStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_removal(&mut self, set: &RemovalSet, context: &ProblemContext) {
        self.iterations += 1;
        self.removed += set.len();
        if set.is_degraded() {
            self.degraded += 1;
        }
        self.spread_ratio_sum += spread_ratio(set, context);
        *self.size_histogram.entry(set.len()).or_insert(0) += 1;
    }

    pub fn record_ordering(&mut self) {
        self.orderings += 1;
    }

    pub fn mean_size(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.removed as f64 / self.iterations as f64
        }
    }

    pub fn mean_spread_ratio(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.spread_ratio_sum / self.iterations as f64
        }
    }

    pub fn merge(&mut self, other: &RemovalStats) {
        self.iterations += other.iterations;
        self.removed += other.removed;
        self.degraded += other.degraded;
        self.spread_ratio_sum += other.spread_ratio_sum;
        self.orderings += other.orderings;
        for (&size, &count) in other.size_histogram.iter() {
            *self.size_histogram.entry(size).or_insert(0) += count;
        }
    }
}

/// Mean distance from the first selected customer to the others, divided
/// by the largest distance of the instance. Small values mean the set is
/// spatially related.
pub fn spread_ratio(set: &RemovalSet, context: &ProblemContext) -> f64 {
    let max_distance = context.max_distance();
    if set.len() < 2 || max_distance <= 0.0 {
        return 0.0;
    }
    let seed = set.as_slice()[0];
    let total: f64 = set
        .iter()
        .skip(1)
        .map(|c| context.distance(seed, c))
        .sum();
    total / (set.len() - 1) as f64 / max_distance
}

#[cfg(test)]
mod tests {
    use crate::problem::context::tests::line_context;

    use super::*;

    fn set_of(customers: &[usize], n: usize, target: usize) -> RemovalSet {
        let mut set = RemovalSet::new(n, target);
        for &c in customers {
            set.insert(c);
        }
        set
    }

    #[test]
    fn records_sizes_and_degradation() {
        let context = line_context(10);
        let mut stats = RemovalStats::new();
        stats.record_removal(&set_of(&[1, 2, 3], 10, 3), &context);
        stats.record_removal(&set_of(&[5], 10, 2), &context);
        stats.record_ordering();
        assert_eq!(2, stats.iterations);
        assert_eq!(1, stats.degraded);
        assert_eq!(2.0, stats.mean_size());
        assert_eq!(Some(&1), stats.size_histogram.get(&3));
        assert_eq!(Some(&1), stats.size_histogram.get(&1));
    }

    #[test]
    fn spread_is_relative_to_max_distance() {
        let context = line_context(10);
        // distances from 2: 1 and 3, max distance 10
        let set = set_of(&[2, 3, 5], 10, 3);
        assert!((spread_ratio(&set, &context) - 0.2).abs() < 1e-9);
        assert_eq!(0.0, spread_ratio(&set_of(&[4], 10, 1), &context));
    }

    #[test]
    fn merge_adds_up() {
        let context = line_context(10);
        let mut a = RemovalStats::new();
        a.record_removal(&set_of(&[1, 2], 10, 2), &context);
        let mut b = RemovalStats::new();
        b.record_removal(&set_of(&[7, 8], 10, 2), &context);
        b.record_ordering();
        a.merge(&b);
        assert_eq!(2, a.iterations);
        assert_eq!(4, a.removed);
        assert_eq!(1, a.orderings);
        assert_eq!(Some(&2), a.size_histogram.get(&2));
        assert!((a.mean_spread_ratio() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn serializes_to_json() -> anyhow::Result<()> {
        let stats = RemovalStats::new();
        let json = serde_json::to_string(&stats)?;
        assert!(json.contains("\"degraded\":0"));
        assert!(json.contains("\"size_histogram\":{}"));
        Ok(())
    }
}
