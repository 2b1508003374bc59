//! Segment distribution counts and segment filters, both driven by the shared
//! classifier.

use std::collections::{BTreeMap, HashSet};

use matrix_core::numeric::round2;
use matrix_core::types::{DataPoint, Segment};
use serde::Serialize;

use crate::classifier::Classify;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentDistribution {
    pub counts: BTreeMap<Segment, usize>,
    /// Share of the included points, 0–100, two decimals.
    pub percentages: BTreeMap<Segment, f64>,
    pub total: usize,
    pub excluded: usize,
}

impl SegmentDistribution {
    pub fn count(&self, segment: Segment) -> usize {
        self.counts.get(&segment).copied().unwrap_or(0)
    }
}

pub fn segment_distribution(
    points: &[DataPoint],
    classifier: &dyn Classify,
) -> SegmentDistribution {
    let mut distribution = SegmentDistribution::default();

    for point in points {
        if point.excluded {
            distribution.excluded += 1;
            continue;
        }
        *distribution
            .counts
            .entry(classifier.classify(point))
            .or_insert(0) += 1;
        distribution.total += 1;
    }

    if distribution.total > 0 {
        let total = distribution.total as f64;
        distribution.percentages = distribution
            .counts
            .iter()
            .map(|(segment, count)| (*segment, round2(*count as f64 / total * 100.0)))
            .collect();
    }

    distribution
}

/// Non-excluded points whose segment is in `segments`, in input order.
pub fn filter_by_segments<'p>(
    points: &'p [DataPoint],
    classifier: &dyn Classify,
    segments: &[Segment],
) -> Vec<&'p DataPoint> {
    let wanted: HashSet<Segment> = segments.iter().copied().collect();
    points
        .iter()
        .filter(|p| !p.excluded && wanted.contains(&classifier.classify(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::QuadrantClassifier;
    use matrix_core::config::MatrixConfig;

    fn sample() -> Vec<DataPoint> {
        vec![
            DataPoint::new("a", 4.0, 4.0),
            DataPoint::new("b", 2.0, 2.0),
            DataPoint::new("c", 4.0, 2.0),
            DataPoint::new("d", 2.0, 4.0),
            DataPoint::new("e", 3.0, 3.0),
            DataPoint::new("f", 5.0, 5.0).excluded(),
        ]
    }

    #[test]
    fn test_distribution_counts_each_segment_once() {
        let classifier = QuadrantClassifier::new(&MatrixConfig::default());
        let distribution = segment_distribution(&sample(), &classifier);
        assert_eq!(distribution.total, 5);
        assert_eq!(distribution.excluded, 1);
        assert_eq!(distribution.count(Segment::Loyalists), 1);
        assert_eq!(distribution.count(Segment::Neutral), 1);
        assert_eq!(distribution.percentages[&Segment::Hostages], 20.0);
        assert_eq!(distribution.counts.values().sum::<usize>(), distribution.total);
    }

    #[test]
    fn test_distribution_respects_overrides() {
        let config = MatrixConfig::default().with_assignment("b", Segment::Loyalists);
        let classifier = QuadrantClassifier::new(&config);
        let distribution = segment_distribution(&sample(), &classifier);
        assert_eq!(distribution.count(Segment::Loyalists), 2);
        assert_eq!(distribution.count(Segment::Defectors), 0);
    }

    #[test]
    fn test_empty_input() {
        let classifier = QuadrantClassifier::new(&MatrixConfig::default());
        let distribution = segment_distribution(&[], &classifier);
        assert_eq!(distribution.total, 0);
        assert!(distribution.percentages.is_empty());
    }

    #[test]
    fn test_filter_uses_same_classification() {
        let mut config = MatrixConfig::default();
        config.zones.enabled = true;
        let classifier = QuadrantClassifier::new(&config);
        let points = sample();
        let apostles = filter_by_segments(&points, &classifier, &[Segment::Apostles]);
        // "f" would be an apostle but is excluded.
        let ids: Vec<&str> = apostles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        let wanted = [Segment::Terrorists, Segment::Hostages];
        let low = filter_by_segments(&points, &classifier, &wanted);
        assert_eq!(low.len(), 2);
    }
}
