use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

// ─── Segments ───────────────────────────────────────────────────────────────

/// Behavioural segment a respondent falls into on the satisfaction/loyalty plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// High satisfaction, high loyalty.
    Loyalists,
    /// High satisfaction, low loyalty.
    Mercenaries,
    /// Low satisfaction, high loyalty.
    Hostages,
    /// Low satisfaction, low loyalty.
    Defectors,
    /// Extreme corner of the loyalists quadrant.
    Apostles,
    /// Band surrounding the apostles corner.
    NearApostles,
    /// Extreme corner of the defectors quadrant.
    Terrorists,
    /// Exactly on the midpoint.
    Neutral,
}

impl Segment {
    pub const MAIN_QUADRANTS: [Segment; 4] = [
        Segment::Loyalists,
        Segment::Mercenaries,
        Segment::Hostages,
        Segment::Defectors,
    ];

    pub const SPECIAL_ZONES: [Segment; 3] =
        [Segment::Apostles, Segment::NearApostles, Segment::Terrorists];

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Loyalists => "loyalists",
            Segment::Mercenaries => "mercenaries",
            Segment::Hostages => "hostages",
            Segment::Defectors => "defectors",
            Segment::Apostles => "apostles",
            Segment::NearApostles => "near_apostles",
            Segment::Terrorists => "terrorists",
            Segment::Neutral => "neutral",
        }
    }

    pub fn is_main_quadrant(&self) -> bool {
        Self::MAIN_QUADRANTS.contains(self)
    }

    pub fn is_special_zone(&self) -> bool {
        Self::SPECIAL_ZONES.contains(self)
    }

    /// Main quadrant a segment lives in. Neutral has none.
    pub fn parent_quadrant(&self) -> Option<Segment> {
        match self {
            Segment::Apostles | Segment::NearApostles | Segment::Loyalists => {
                Some(Segment::Loyalists)
            }
            Segment::Terrorists | Segment::Defectors => Some(Segment::Defectors),
            Segment::Mercenaries => Some(Segment::Mercenaries),
            Segment::Hostages => Some(Segment::Hostages),
            Segment::Neutral => None,
        }
    }

    /// Which side of the midpoint the parent quadrant occupies on each axis,
    /// as `(satisfaction_high, loyalty_high)`.
    pub fn axis_sides(&self) -> Option<(bool, bool)> {
        match self.parent_quadrant()? {
            Segment::Loyalists => Some((true, true)),
            Segment::Mercenaries => Some((true, false)),
            Segment::Hostages => Some((false, true)),
            _ => Some((false, false)),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "loyalists" => Ok(Segment::Loyalists),
            "mercenaries" => Ok(Segment::Mercenaries),
            "hostages" => Ok(Segment::Hostages),
            "defectors" => Ok(Segment::Defectors),
            "apostles" => Ok(Segment::Apostles),
            "near_apostles" => Ok(Segment::NearApostles),
            "terrorists" => Ok(Segment::Terrorists),
            "neutral" => Ok(Segment::Neutral),
            _ => Err(MatrixError::UnknownSegment(s.to_string())),
        }
    }
}

// ─── Plane Geometry ─────────────────────────────────────────────────────────

/// Coordinate splitting the plane into the four main quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Midpoint {
    pub sat: f64,
    pub loy: f64,
}

impl Midpoint {
    pub fn new(sat: f64, loy: f64) -> Self {
        Self { sat, loy }
    }
}

/// Explicit per-id segment overrides.
pub type ManualAssignments = HashMap<String, Segment>;

// ─── Survey Data ────────────────────────────────────────────────────────────

/// One survey response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub satisfaction: f64,
    pub loyalty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Hint for reading `date`, e.g. `dd/MM/yyyy`.
    #[serde(default, alias = "dateFormat", skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    /// Excluded points stay in the data set but are skipped by aggregates.
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub group: String,
    #[serde(flatten)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl DataPoint {
    pub fn new(id: impl Into<String>, satisfaction: f64, loyalty: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: None,
            satisfaction,
            loyalty,
            date: None,
            date_format: None,
            excluded: false,
            group: String::new(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// Trimmed, lower-cased email when one is present and non-empty.
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }
}
