//! Special-zone geometry — rectangles anchored at the extreme corners of the
//! loyalists and defectors quadrants.

use matrix_core::config::MatrixConfig;
use serde::Serialize;

/// Corner of the plane a zone grows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    /// Highest satisfaction, highest loyalty.
    High,
    /// Lowest satisfaction, lowest loyalty.
    Low,
}

/// Axis-aligned rectangle on the plane. Edges are inclusive except a
/// low-corner inner edge lying on the midpoint line, which belongs to the
/// quadrant above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneRect {
    pub sat_min: f64,
    pub sat_max: f64,
    pub loy_min: f64,
    pub loy_max: f64,
    pub anchor: Corner,
    /// `sat_max` is exclusive. Only set on low-corner zones.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sat_edge_open: bool,
    /// `loy_max` is exclusive. Only set on low-corner zones.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub loy_edge_open: bool,
}

impl ZoneRect {
    pub fn contains(&self, sat: f64, loy: f64) -> bool {
        let sat_in = if self.sat_edge_open {
            sat < self.sat_max
        } else {
            sat <= self.sat_max
        };
        let loy_in = if self.loy_edge_open {
            loy < self.loy_max
        } else {
            loy <= self.loy_max
        };
        sat_in && loy_in && sat >= self.sat_min && loy >= self.loy_min
    }

    /// Chebyshev distance to the rectangle; 0 inside.
    pub fn distance(&self, sat: f64, loy: f64) -> f64 {
        let sat_gap = axis_gap(sat, self.sat_min, self.sat_max);
        let loy_gap = axis_gap(loy, self.loy_min, self.loy_max);
        sat_gap.max(loy_gap)
    }

    /// Distance a contained point must travel to leave the rectangle through
    /// one of its inner edges (the edges facing the midpoint). 0 outside.
    pub fn exit_distance(&self, sat: f64, loy: f64) -> f64 {
        if !self.contains(sat, loy) {
            return 0.0;
        }
        match self.anchor {
            Corner::High => (sat - self.sat_min).min(loy - self.loy_min),
            Corner::Low => (self.sat_max - sat).min(self.loy_max - loy),
        }
    }
}

fn axis_gap(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

/// Resolved zone rectangles for one configuration. Absent rectangles are
/// disabled or have no room between the corner and the midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ZoneGeometry {
    pub apostles: Option<ZoneRect>,
    /// Outer rectangle of the near-apostles band; the band is this rectangle
    /// minus `apostles`.
    pub near_apostles: Option<ZoneRect>,
    pub terrorists: Option<ZoneRect>,
}

impl ZoneGeometry {
    pub fn from_config(config: &MatrixConfig) -> Self {
        if !config.zones.enabled {
            return Self::default();
        }

        let mid = config.midpoint();
        let sat = config.scale.satisfaction;
        let loy = config.scale.loyalty;

        // Room on each axis between the corner and the midpoint; zones never
        // extend past it so they stay inside their parent quadrant.
        let high_room = (sat.max() - mid.sat, loy.max() - mid.loy);
        let low_room = (mid.sat - sat.min(), mid.loy - loy.min());

        let high_rect = |fraction: f64| -> Option<ZoneRect> {
            let ds = (fraction * sat.span()).min(high_room.0);
            let dl = (fraction * loy.span()).min(high_room.1);
            (ds > 0.0 && dl > 0.0).then(|| ZoneRect {
                sat_min: sat.max() - ds,
                sat_max: sat.max(),
                loy_min: loy.max() - dl,
                loy_max: loy.max(),
                anchor: Corner::High,
                sat_edge_open: false,
                loy_edge_open: false,
            })
        };

        let apostles = high_rect(config.zones.apostles_size);
        let near_apostles = if config.zones.near_apostles_enabled && apostles.is_some() {
            high_rect(config.zones.apostles_size + config.zones.near_apostles_size)
                .filter(|outer| Some(*outer) != apostles)
        } else {
            None
        };

        // Midpoint ties go to the high side, so a low zone clamped to the
        // midpoint must stop just short of it.
        let ds = config.zones.terrorists_size * sat.span();
        let dl = config.zones.terrorists_size * loy.span();
        let sat_clamped = ds >= low_room.0;
        let loy_clamped = dl >= low_room.1;
        let terrorists = (ds.min(low_room.0) > 0.0 && dl.min(low_room.1) > 0.0).then(|| ZoneRect {
            sat_min: sat.min(),
            sat_max: if sat_clamped { mid.sat } else { sat.min() + ds },
            loy_min: loy.min(),
            loy_max: if loy_clamped { mid.loy } else { loy.min() + dl },
            anchor: Corner::Low,
            sat_edge_open: sat_clamped,
            loy_edge_open: loy_clamped,
        });

        Self {
            apostles,
            near_apostles,
            terrorists,
        }
    }

    /// Region carved out of the loyalists quadrant by its special zones.
    pub fn loyalists_carve_out(&self) -> Option<ZoneRect> {
        self.near_apostles.or(self.apostles)
    }

    pub fn any_enabled(&self) -> bool {
        self.apostles.is_some() || self.near_apostles.is_some() || self.terrorists.is_some()
    }
}
