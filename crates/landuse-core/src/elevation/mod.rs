//! Point elevation lookup against a DEM.
//!
//! Lookups never fail: a coordinate off the raster or on a nodata cell yields
//! the `(0, Unknown)` sentinel so a batch over many places keeps going.
pub mod bands;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::raster::DemRaster;
use bands::{classify_elevation, ElevationBand};

/// Elevation reading for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    pub elevation: f64,
    pub classification: ElevationBand,
}

impl ElevationSample {
    /// Returned for out-of-raster, nodata and unreadable lookups.
    pub const UNKNOWN: ElevationSample = ElevationSample {
        elevation: 0.0,
        classification: ElevationBand::Unknown,
    };

    pub fn is_unknown(&self) -> bool {
        self.classification == ElevationBand::Unknown
    }
}

/// What a single pixel lookup found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    Sample(f64),
    OutOfBounds,
    NoData,
}

impl From<SampleOutcome> for ElevationSample {
    fn from(outcome: SampleOutcome) -> Self {
        match outcome {
            SampleOutcome::Sample(elevation) => ElevationSample {
                elevation,
                classification: classify_elevation(elevation),
            },
            SampleOutcome::OutOfBounds | SampleOutcome::NoData => ElevationSample::UNKNOWN,
        }
    }
}

/// Look up the pixel containing `(lat, lng)`.
pub fn sample_outcome(raster: &DemRaster, lat: f64, lng: f64) -> SampleOutcome {
    let Some((row, col)) = raster.index(lat, lng) else {
        debug!(lat, lng, "coordinate does not map to a pixel");
        return SampleOutcome::OutOfBounds;
    };
    match raster.value_at(row, col) {
        None => {
            debug!(lat, lng, row, col, "coordinate outside raster");
            SampleOutcome::OutOfBounds
        }
        Some(v) if raster.is_nodata(v) => {
            debug!(lat, lng, row, col, "nodata cell");
            SampleOutcome::NoData
        }
        Some(v) => SampleOutcome::Sample(f64::from(v)),
    }
}

/// Elevation and absolute band at `(lat, lng)`, or the sentinel.
pub fn sample_elevation(raster: &DemRaster, lat: f64, lng: f64) -> ElevationSample {
    sample_outcome(raster, lat, lng).into()
}

/// Open the DEM at `path` and sample one coordinate. Open or decode failures
/// are logged and degrade to the sentinel.
pub fn sample_elevation_at_path(path: impl AsRef<Path>, lat: f64, lng: f64) -> ElevationSample {
    let path = path.as_ref();
    match DemRaster::open(path) {
        Ok(raster) => sample_elevation(&raster, lat, lng),
        Err(e) => {
            warn!(path = %path.display(), lat, lng, error = %e, "error reading elevation");
            ElevationSample::UNKNOWN
        }
    }
}
