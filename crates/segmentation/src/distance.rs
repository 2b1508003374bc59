//! Distance from a coordinate to the boundary of any segment.
//!
//! Main quadrants are unions of half-planes around the midpoint; special
//! zones are corner rectangles. All distances are Chebyshev (largest per-axis
//! gap), so entering a region along either axis or diagonally at the same
//! radius counts the same.

use matrix_core::types::{Midpoint, Segment};

use crate::classifier::QuadrantClassifier;
use crate::zones::ZoneGeometry;

#[derive(Debug, Clone, Copy)]
pub struct DistanceCalculator<'a> {
    midpoint: Midpoint,
    zones: &'a ZoneGeometry,
}

impl<'a> DistanceCalculator<'a> {
    pub fn new(classifier: &'a QuadrantClassifier) -> Self {
        Self {
            midpoint: classifier.midpoint(),
            zones: classifier.zones(),
        }
    }

    /// Whether `segment` exists under the current zone configuration.
    pub fn supports(&self, segment: Segment) -> bool {
        match segment {
            Segment::Apostles => self.zones.apostles.is_some(),
            Segment::NearApostles => self.zones.near_apostles.is_some(),
            Segment::Terrorists => self.zones.terrorists.is_some(),
            _ => true,
        }
    }

    /// Distance from `(sat, loy)` to `segment`; 0 when already inside.
    /// `None` when the segment is a special zone that is not enabled.
    pub fn distance_to_segment(&self, sat: f64, loy: f64, segment: Segment) -> Option<f64> {
        match segment {
            Segment::Loyalists
            | Segment::Mercenaries
            | Segment::Hostages
            | Segment::Defectors => Some(self.quadrant_distance(sat, loy, segment)),
            Segment::Apostles => self.zones.apostles.map(|z| z.distance(sat, loy)),
            Segment::Terrorists => self.zones.terrorists.map(|z| z.distance(sat, loy)),
            Segment::NearApostles => {
                let outer = self.zones.near_apostles?;
                let inner = self.zones.apostles;
                Some(match inner {
                    Some(inner) if inner.contains(sat, loy) => inner.exit_distance(sat, loy),
                    _ => outer.distance(sat, loy),
                })
            }
            Segment::Neutral => {
                let ds = (sat - self.midpoint.sat).abs();
                let dl = (loy - self.midpoint.loy).abs();
                Some(ds.max(dl))
            }
        }
    }

    fn quadrant_distance(&self, sat: f64, loy: f64, quadrant: Segment) -> f64 {
        let Some((sat_high, loy_high)) = quadrant.axis_sides() else {
            return 0.0;
        };
        let sat_gap = side_gap(sat, self.midpoint.sat, sat_high);
        let loy_gap = side_gap(loy, self.midpoint.loy, loy_high);
        let distance = sat_gap.max(loy_gap);
        if distance > 0.0 {
            return distance;
        }

        // Geometrically inside the quadrant, but a carved-out special zone
        // still has to be left before the plain quadrant is reached.
        let carve_out = match quadrant {
            Segment::Loyalists => self.zones.loyalists_carve_out(),
            Segment::Defectors => self.zones.terrorists,
            _ => None,
        };
        carve_out
            .map(|zone| zone.exit_distance(sat, loy))
            .unwrap_or(0.0)
    }
}

/// Gap between a coordinate and one side of the midpoint on a single axis.
/// The midpoint line itself counts as touching both sides.
fn side_gap(value: f64, mid: f64, high_side: bool) -> f64 {
    if high_side {
        (mid - value).max(0.0)
    } else {
        (value - mid).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_core::config::MatrixConfig;

    fn zoned(near_apostles: bool) -> QuadrantClassifier {
        let mut config = MatrixConfig::default();
        config.zones.enabled = true;
        config.zones.near_apostles_enabled = near_apostles;
        QuadrantClassifier::new(&config)
    }

    #[test]
    fn test_distance_inside_quadrant_is_zero() {
        let c = zoned(false);
        let d = DistanceCalculator::new(&c);
        assert_eq!(d.distance_to_segment(3.5, 3.5, Segment::Loyalists), Some(0.0));
        assert_eq!(d.distance_to_segment(1.5, 2.5, Segment::Defectors), Some(0.0));
    }

    #[test]
    fn test_lateral_and_diagonal_quadrant_distances() {
        let c = zoned(false);
        let d = DistanceCalculator::new(&c);
        // Loyalist at (3.5, 4): one unit above the loyalty line, half a unit
        // right of the satisfaction line.
        assert_eq!(d.distance_to_segment(3.5, 4.0, Segment::Mercenaries), Some(1.0));
        assert_eq!(d.distance_to_segment(3.5, 4.0, Segment::Hostages), Some(0.5));
        assert_eq!(d.distance_to_segment(3.5, 4.0, Segment::Defectors), Some(1.0));
    }

    #[test]
    fn test_midpoint_line_touches_both_sides() {
        let c = zoned(false);
        let d = DistanceCalculator::new(&c);
        assert_eq!(d.distance_to_segment(3.0, 4.0, Segment::Hostages), Some(0.0));
        assert_eq!(d.distance_to_segment(3.0, 3.0, Segment::Defectors), Some(0.0));
        assert_eq!(d.distance_to_segment(3.0, 3.0, Segment::Neutral), Some(0.0));
    }

    #[test]
    fn test_special_zone_distances() {
        let c = zoned(false);
        let d = DistanceCalculator::new(&c);
        assert_eq!(d.distance_to_segment(3.5, 4.5, Segment::Apostles), Some(0.5));
        assert_eq!(d.distance_to_segment(3.5, 3.5, Segment::Apostles), Some(0.5));
        assert_eq!(d.distance_to_segment(2.5, 1.5, Segment::Terrorists), Some(0.5));
        assert_eq!(d.distance_to_segment(3.5, 3.5, Segment::NearApostles), None);
    }

    #[test]
    fn test_zone_member_must_exit_to_reach_parent() {
        let c = zoned(false);
        let d = DistanceCalculator::new(&c);
        assert_eq!(d.distance_to_segment(4.25, 4.75, Segment::Loyalists), Some(0.25));
        assert_eq!(d.distance_to_segment(1.5, 1.0, Segment::Defectors), Some(0.5));
    }

    #[test]
    fn test_near_apostles_band_distances() {
        let c = zoned(true);
        let d = DistanceCalculator::new(&c);
        // Inside apostles: distance is the way out into the band.
        assert_eq!(d.distance_to_segment(4.5, 4.25, Segment::NearApostles), Some(0.25));
        // Inside the band itself.
        assert_eq!(d.distance_to_segment(3.75, 4.5, Segment::NearApostles), Some(0.0));
        // Outside both: distance to the outer rectangle.
        assert_eq!(d.distance_to_segment(3.0, 4.5, Segment::NearApostles), Some(0.5));
        // Leaving the whole carve-out to reach plain loyalists.
        assert_eq!(d.distance_to_segment(3.75, 4.5, Segment::Loyalists), Some(0.25));
    }

    #[test]
    fn test_distance_shrinks_monotonically_toward_segment() {
        let c = zoned(false);
        let d = DistanceCalculator::new(&c);
        let paths = [
            (Segment::Loyalists, (1.0, 1.5), (3.5, 3.5)),
            (Segment::Apostles, (1.0, 1.5), (4.5, 4.5)),
            (Segment::Terrorists, (4.0, 3.5), (1.5, 1.5)),
        ];
        for (target, start, end) in paths {
            let mut previous = f64::INFINITY;
            let mut step = 0;
            while step <= 16 {
                let t = step as f64 / 16.0;
                let sat = start.0 + (end.0 - start.0) * t;
                let loy = start.1 + (end.1 - start.1) * t;
                let distance = d.distance_to_segment(sat, loy, target).unwrap();
                assert!(distance <= previous, "{target}: {distance} > {previous}");
                previous = distance;
                step += 1;
            }
            assert_eq!(previous, 0.0);
        }
    }
}
