use std::path::Path;

use serde::Deserialize;

use crate::error::{MatrixError, MatrixResult};
use crate::scale::ScaleFormat;
use crate::types::{ManualAssignments, Midpoint, Segment};

/// Root engine configuration. Loaded from environment variables with the
/// prefix `LOYALTY_MATRIX__` and optional TOML/JSON config files.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixConfig {
    #[serde(default)]
    pub scale: ScaleConfig,
    /// Explicit midpoint. When absent the centre of each scale is used.
    #[serde(default)]
    pub midpoint: Option<Midpoint>,
    #[serde(default)]
    pub zones: ZoneConfig,
    #[serde(default)]
    pub proximity: ProximityConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub manual_assignments: ManualAssignments,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScaleConfig {
    #[serde(default)]
    pub satisfaction: ScaleFormat,
    #[serde(default)]
    pub loyalty: ScaleFormat,
}

/// Special-zone sizes, each a fraction of the scale's span measured from the
/// anchoring corner.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ZoneConfig {
    #[serde(default = "default_zones_enabled")]
    pub enabled: bool,
    #[serde(default = "default_apostles_size")]
    pub apostles_size: f64,
    #[serde(default = "default_near_apostles_enabled")]
    pub near_apostles_enabled: bool,
    #[serde(default = "default_near_apostles_size")]
    pub near_apostles_size: f64,
    #[serde(default = "default_terrorists_size")]
    pub terrorists_size: f64,
}

/// How points sitting exactly on the midpoint are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeutralProximityMode {
    /// Report relationships from neutral to every main quadrant and listed
    /// as crossroads.
    AllQuadrants,
    /// Only list neutral points in the crossroads view.
    CrossroadsOnly,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProximityConfig {
    /// Scale units within which a main quadrant counts as close.
    #[serde(default = "default_main_threshold")]
    pub main_threshold: f64,
    /// Scale units within which a special zone counts as close.
    #[serde(default = "default_zone_threshold")]
    pub special_zone_threshold: f64,
    #[serde(default = "default_neutral_mode")]
    pub neutral_mode: NeutralProximityMode,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_months_ahead")]
    pub months_ahead: u32,
}

// Default functions
fn default_zones_enabled() -> bool {
    false
}

fn default_apostles_size() -> f64 {
    0.25
}

fn default_near_apostles_enabled() -> bool {
    false
}

fn default_near_apostles_size() -> f64 {
    0.125
}

fn default_terrorists_size() -> f64 {
    0.25
}

fn default_main_threshold() -> f64 {
    2.0
}

fn default_zone_threshold() -> f64 {
    1.0
}

fn default_neutral_mode() -> NeutralProximityMode {
    NeutralProximityMode::AllQuadrants
}

fn default_months_ahead() -> u32 {
    6
}

/// Largest zone fraction accepted; a zone can never reach past half the span.
pub const MAX_ZONE_FRACTION: f64 = 0.5;

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            satisfaction: ScaleFormat::default(),
            loyalty: ScaleFormat::default(),
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            enabled: default_zones_enabled(),
            apostles_size: default_apostles_size(),
            near_apostles_enabled: default_near_apostles_enabled(),
            near_apostles_size: default_near_apostles_size(),
            terrorists_size: default_terrorists_size(),
        }
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            main_threshold: default_main_threshold(),
            special_zone_threshold: default_zone_threshold(),
            neutral_mode: default_neutral_mode(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            months_ahead: default_months_ahead(),
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            scale: ScaleConfig::default(),
            midpoint: None,
            zones: ZoneConfig::default(),
            proximity: ProximityConfig::default(),
            forecast: ForecastConfig::default(),
            manual_assignments: ManualAssignments::new(),
        }
    }
}

impl MatrixConfig {
    /// Load configuration from environment variables.
    pub fn load() -> MatrixResult<Self> {
        let config = config::Config::builder()
            .add_source(Self::environment())
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Load configuration from a file, with environment variables layered on top.
    pub fn load_from(path: &Path) -> MatrixResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(Self::environment())
            .build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("LOYALTY_MATRIX")
            .separator("__")
            .try_parsing(true)
    }

    /// Configured midpoint, or the centre of both scales.
    pub fn midpoint(&self) -> Midpoint {
        self.midpoint.unwrap_or_else(|| {
            Midpoint::new(self.scale.satisfaction.centre(), self.scale.loyalty.centre())
        })
    }

    pub fn with_midpoint(mut self, midpoint: Midpoint) -> Self {
        self.midpoint = Some(midpoint);
        self
    }

    pub fn with_assignment(mut self, id: impl Into<String>, segment: Segment) -> Self {
        self.manual_assignments.insert(id.into(), segment);
        self
    }

    pub fn validate(&self) -> MatrixResult<()> {
        let mid = self.midpoint();
        if !self.scale.satisfaction.contains(mid.sat) || !self.scale.loyalty.contains(mid.loy) {
            return Err(MatrixError::MidpointOutOfScale {
                sat: mid.sat,
                loy: mid.loy,
            });
        }

        let zone_sizes = [
            ("apostles_size", self.zones.apostles_size),
            ("near_apostles_size", self.zones.near_apostles_size),
            ("terrorists_size", self.zones.terrorists_size),
        ];
        for (name, size) in zone_sizes {
            if !(0.0..=MAX_ZONE_FRACTION).contains(&size) {
                return Err(MatrixError::Config(format!(
                    "zones.{name} must be within [0, {MAX_ZONE_FRACTION}], got {size}"
                )));
            }
        }

        let thresholds = [
            ("main_threshold", self.proximity.main_threshold),
            ("special_zone_threshold", self.proximity.special_zone_threshold),
        ];
        for (name, threshold) in thresholds {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(MatrixError::Config(format!(
                    "proximity.{name} must be a non-negative number, got {threshold}"
                )));
            }
        }

        if self.forecast.months_ahead == 0 {
            return Err(MatrixError::Config(
                "forecast.months_ahead must be at least 1".to_string(),
            ));
        }

        if let Some((id, segment)) = self
            .manual_assignments
            .iter()
            .find(|(_, segment)| **segment == Segment::Neutral)
        {
            return Err(MatrixError::InvalidAssignment {
                id: id.clone(),
                segment: *segment,
            });
        }

        Ok(())
    }
}
