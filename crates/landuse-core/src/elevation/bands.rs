//! Fixed absolute elevation bands.
//!
//! Five left-closed / right-open ranges in metres:
//!   - Very Low   (< 50)
//!   - Low        [50, 100)
//!   - Medium     [100, 200)
//!   - High       [200, 700)
//!   - Very High  (≥ 700)
//!
//! Unrelated to the relative zones in `zones`, which are recomputed per query.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElevationBand {
    #[serde(rename = "Very Low <50")]
    VeryLow,
    #[serde(rename = "Low 50-100")]
    Low,
    #[serde(rename = "Medium 100-200")]
    Medium,
    #[serde(rename = "High 200-700")]
    High,
    #[serde(rename = "Very High <700")]
    VeryHigh,
    Unknown,
}

/// `(band, lower, upper)` in ascending bound order.
const BANDS: [(ElevationBand, f64, f64); 5] = [
    (ElevationBand::VeryLow, f64::NEG_INFINITY, 50.0),
    (ElevationBand::Low, 50.0, 100.0),
    (ElevationBand::Medium, 100.0, 200.0),
    (ElevationBand::High, 200.0, 700.0),
    (ElevationBand::VeryHigh, 700.0, f64::INFINITY),
];

impl ElevationBand {
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low <50",
            Self::Low => "Low 50-100",
            Self::Medium => "Medium 100-200",
            Self::High => "High 200-700",
            Self::VeryHigh => "Very High <700",
            Self::Unknown => "Unknown",
        }
    }

    /// The five measurable bands, lowest first.
    pub fn all() -> [ElevationBand; 5] {
        BANDS.map(|(band, _, _)| band)
    }

    /// `[lower, upper)` in metres; `None` for `Unknown`.
    pub fn bounds(self) -> Option<(f64, f64)> {
        BANDS.iter().find(|(b, _, _)| *b == self).map(|&(_, lo, hi)| (lo, hi))
    }
}

impl fmt::Display for ElevationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an elevation in metres. First matching band wins; non-finite
/// input is `Unknown`.
pub fn classify_elevation(elevation: f64) -> ElevationBand {
    if !elevation.is_finite() {
        return ElevationBand::Unknown;
    }
    BANDS
        .iter()
        .find(|&&(_, lo, hi)| lo <= elevation && elevation < hi)
        .map(|&(band, _, _)| band)
        .unwrap_or(ElevationBand::Unknown)
}
