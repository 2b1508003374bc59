//! Rating scale model — the numeric bounds a satisfaction or loyalty answer
//! can take.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;

/// Supported survey rating scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleFormat {
    #[serde(rename = "1-5")]
    OneToFive,
    #[serde(rename = "1-7")]
    OneToSeven,
    #[serde(rename = "1-10")]
    OneToTen,
    #[serde(rename = "0-10")]
    ZeroToTen,
}

impl ScaleFormat {
    pub const ALL: [ScaleFormat; 4] = [
        ScaleFormat::OneToFive,
        ScaleFormat::OneToSeven,
        ScaleFormat::OneToTen,
        ScaleFormat::ZeroToTen,
    ];

    pub fn min(&self) -> f64 {
        match self {
            ScaleFormat::ZeroToTen => 0.0,
            _ => 1.0,
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            ScaleFormat::OneToFive => 5.0,
            ScaleFormat::OneToSeven => 7.0,
            ScaleFormat::OneToTen | ScaleFormat::ZeroToTen => 10.0,
        }
    }

    /// Distance between the lowest and highest answer.
    pub fn span(&self) -> f64 {
        self.max() - self.min()
    }

    /// Centre of the scale, used as the default midpoint.
    pub fn centre(&self) -> f64 {
        (self.min() + self.max()) / 2.0
    }

    /// Inclusive bounds check.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min() && value <= self.max()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleFormat::OneToFive => "1-5",
            ScaleFormat::OneToSeven => "1-7",
            ScaleFormat::OneToTen => "1-10",
            ScaleFormat::ZeroToTen => "0-10",
        }
    }
}

impl Default for ScaleFormat {
    fn default() -> Self {
        ScaleFormat::OneToFive
    }
}

impl fmt::Display for ScaleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleFormat {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        ScaleFormat::ALL
            .iter()
            .copied()
            .find(|format| format.as_str() == compact)
            .ok_or_else(|| MatrixError::ScaleFormat(s.to_string()))
    }
}
