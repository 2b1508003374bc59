//! Historical segment transitions between consecutive survey entries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use matrix_core::types::Segment;
use matrix_segmentation::Classify;
use serde::Serialize;
use tracing::debug;

use crate::timeline::CustomerTimeline;

/// Fixed desirability ranking used to tell improving moves from worsening ones.
pub fn desirability_rank(segment: Segment) -> u8 {
    match segment {
        Segment::Apostles => 8,
        Segment::NearApostles => 7,
        Segment::Loyalists => 6,
        Segment::Mercenaries => 5,
        Segment::Hostages => 4,
        Segment::Neutral => 3,
        Segment::Defectors => 2,
        Segment::Terrorists => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    Positive,
    Negative,
    Neutral,
}

impl MovementDirection {
    pub fn between(from: Segment, to: Segment) -> Self {
        let (from_rank, to_rank) = (desirability_rank(from), desirability_rank(to));
        if to_rank > from_rank {
            MovementDirection::Positive
        } else if to_rank < from_rank {
            MovementDirection::Negative
        } else {
            MovementDirection::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementCustomer {
    pub identifier: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuadrantMovement {
    pub from: Segment,
    pub to: Segment,
    pub direction: MovementDirection,
    pub count: usize,
    pub customers: Vec<MovementCustomer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovementStats {
    /// Descending by count.
    pub movements: Vec<QuadrantMovement>,
    pub total_movements: usize,
    pub positive_movements: usize,
    pub negative_movements: usize,
    /// Pairs that stayed in the same segment or moved between equal ranks.
    pub neutral_movements: usize,
}

/// Walk consecutive dated entries of every timeline through the shared
/// classifier and tally the transitions.
pub fn calculate_quadrant_movements(
    timelines: &[CustomerTimeline],
    classifier: &dyn Classify,
) -> MovementStats {
    let mut stats = MovementStats::default();
    let mut buckets: BTreeMap<(Segment, Segment), QuadrantMovement> = BTreeMap::new();

    for timeline in timelines.iter().filter(|t| t.points.len() >= 2) {
        let dated: Vec<_> = timeline.dated_points(None).collect();
        for pair in dated.windows(2) {
            let (from_date, prev) = pair[0];
            let (to_date, next) = pair[1];
            let from = classifier.classify(prev);
            let to = classifier.classify(next);

            if from == to {
                stats.neutral_movements += 1;
                continue;
            }

            let direction = MovementDirection::between(from, to);
            match direction {
                MovementDirection::Positive => stats.positive_movements += 1,
                MovementDirection::Negative => stats.negative_movements += 1,
                MovementDirection::Neutral => stats.neutral_movements += 1,
            }

            let movement = buckets.entry((from, to)).or_insert_with(|| QuadrantMovement {
                from,
                to,
                direction,
                count: 0,
                customers: Vec::new(),
            });
            movement.customers.push(MovementCustomer {
                identifier: timeline.identifier.clone(),
                from_date,
                to_date,
            });
            movement.count += 1;
        }
    }

    let mut movements: Vec<QuadrantMovement> = buckets.into_values().collect();
    // Stable: equal counts keep segment-pair order.
    movements.sort_by(|a, b| b.count.cmp(&a.count));

    stats.movements = movements;
    stats.total_movements =
        stats.positive_movements + stats.negative_movements + stats.neutral_movements;

    debug!(
        timelines = timelines.len(),
        total = stats.total_movements,
        positive = stats.positive_movements,
        negative = stats.negative_movements,
        neutral = stats.neutral_movements,
        "Quadrant movements calculated"
    );
    stats
}
