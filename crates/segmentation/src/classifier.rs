//! Quadrant assignment — the one classifier every other component uses.

use matrix_core::config::MatrixConfig;
use matrix_core::types::{DataPoint, ManualAssignments, Midpoint, Segment};
use tracing::info;

use crate::zones::ZoneGeometry;

/// Assigns a data point to a segment. Filters, distribution counts, proximity
/// and movement analysis all take one of these instead of re-deriving segments.
pub trait Classify {
    fn classify(&self, point: &DataPoint) -> Segment;
}

impl<F> Classify for F
where
    F: Fn(&DataPoint) -> Segment,
{
    fn classify(&self, point: &DataPoint) -> Segment {
        self(point)
    }
}

/// Geometric classifier with manual overrides. Immutable once built.
#[derive(Debug, Clone)]
pub struct QuadrantClassifier {
    midpoint: Midpoint,
    zones: ZoneGeometry,
    overrides: ManualAssignments,
}

impl QuadrantClassifier {
    pub fn new(config: &MatrixConfig) -> Self {
        let midpoint = config.midpoint();
        let zones = ZoneGeometry::from_config(config);
        info!(
            mid_sat = midpoint.sat,
            mid_loy = midpoint.loy,
            zones = zones.any_enabled(),
            apostles = zones.apostles.is_some(),
            near_apostles = zones.near_apostles.is_some(),
            terrorists = zones.terrorists.is_some(),
            overrides = config.manual_assignments.len(),
            "Quadrant classifier initialized"
        );
        Self {
            midpoint,
            zones,
            overrides: config.manual_assignments.clone(),
        }
    }

    pub fn midpoint(&self) -> Midpoint {
        self.midpoint
    }

    pub fn zones(&self) -> &ZoneGeometry {
        &self.zones
    }

    pub fn manual_assignment(&self, id: &str) -> Option<Segment> {
        self.overrides.get(id).copied()
    }

    /// Main quadrant for a coordinate, ignoring special zones and overrides.
    pub fn main_quadrant(&self, sat: f64, loy: f64) -> Segment {
        let mid = self.midpoint;
        if sat == mid.sat && loy == mid.loy {
            return Segment::Neutral;
        }
        match (sat >= mid.sat, loy >= mid.loy) {
            (true, true) => Segment::Loyalists,
            (true, false) => Segment::Mercenaries,
            (false, true) => Segment::Hostages,
            (false, false) => Segment::Defectors,
        }
    }

    /// Segment for a coordinate, special zones included, overrides ignored.
    pub fn classify_position(&self, sat: f64, loy: f64) -> Segment {
        match self.main_quadrant(sat, loy) {
            Segment::Loyalists => {
                if self.zones.apostles.is_some_and(|z| z.contains(sat, loy)) {
                    Segment::Apostles
                } else if self.zones.near_apostles.is_some_and(|z| z.contains(sat, loy)) {
                    Segment::NearApostles
                } else {
                    Segment::Loyalists
                }
            }
            Segment::Defectors => {
                if self.zones.terrorists.is_some_and(|z| z.contains(sat, loy)) {
                    Segment::Terrorists
                } else {
                    Segment::Defectors
                }
            }
            other => other,
        }
    }
}

impl Classify for QuadrantClassifier {
    fn classify(&self, point: &DataPoint) -> Segment {
        if let Some(segment) = self.manual_assignment(&point.id) {
            return segment;
        }
        self.classify_position(point.satisfaction, point.loyalty)
    }
}
