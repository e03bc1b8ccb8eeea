//! Place records inside a search circle: distance filter, land-use
//! classification and elevation lookup for each survivor.
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coords::{geodesic_km, LatLon};
use crate::elevation::bands::ElevationBand;
use crate::elevation::{sample_elevation, ElevationSample};
use crate::error::PlaceError;
use crate::landuse::model::LandUseModel;
use crate::landuse::{classify_place, PredictionSource};
use crate::raster::DemRaster;

/// Output name for places whose entry carries none.
pub const UNNAMED: &str = "Unnamed";

/// Search radius used when none is given, in metres.
pub const DEFAULT_RADIUS_M: f64 = 1000.0;

// ── Input ──

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct RawLocation {
    lat: f64,
    lng: f64,
}

/// On-disk shape of one place entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    place_type: Option<String>,
    location: RawLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    land_use: Option<String>,
}

/// One input place. A missing type reads as `""`. A missing name stays
/// `None`: classifiers see `""`, output records show `"Unnamed"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPlace", into = "RawPlace")]
pub struct PlaceRecord {
    pub name: Option<String>,
    pub place_type: String,
    pub lat: f64,
    pub lng: f64,
    /// Label carried by the source file, if any. Not used for classification.
    pub land_use: Option<String>,
}

impl From<RawPlace> for PlaceRecord {
    fn from(raw: RawPlace) -> Self {
        Self {
            name: raw.name,
            place_type: raw.place_type.unwrap_or_default(),
            lat: raw.location.lat,
            lng: raw.location.lng,
            land_use: raw.land_use,
        }
    }
}

impl From<PlaceRecord> for RawPlace {
    fn from(p: PlaceRecord) -> Self {
        Self {
            name: p.name,
            place_type: Some(p.place_type),
            location: RawLocation { lat: p.lat, lng: p.lng },
            land_use: p.land_use,
        }
    }
}

impl PlaceRecord {
    pub fn new(name: &str, place_type: &str, lat: f64, lng: f64) -> Self {
        Self { name: Some(name.to_string()), place_type: place_type.to_string(), lat, lng, land_use: None }
    }

    /// Name as shown in output.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }

    /// Name as fed to the classifiers.
    pub fn classification_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn location(&self) -> LatLon {
        LatLon::new(self.lat, self.lng)
    }
}

/// Read a place file (a JSON array). Entries that do not parse are skipped
/// with a warning; only an unreadable file or a non-array document fails.
pub fn load_places(path: impl AsRef<Path>) -> Result<Vec<PlaceRecord>, PlaceError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&text)?;
    let total = entries.len();
    let places: Vec<PlaceRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value(v) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(entry = i, error = %e, "skipping malformed place");
                None
            }
        })
        .collect();
    debug!(path = %path.display(), loaded = places.len(), total, "loaded places");
    Ok(places)
}

// ── Output ──

/// Centre and radius of one survey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyRequest {
    pub center: LatLon,
    pub radius_m: f64,
}

impl SurveyRequest {
    pub fn new(lat: f64, lng: f64, radius_m: f64) -> Self {
        Self { center: LatLon::new(lat, lng), radius_m }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_m / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPlace {
    /// 1-based position in the output.
    pub id: usize,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub place_type: String,
    pub land_use: String,
    pub prediction_source: PredictionSource,
    /// Distance from the survey centre, rounded to two decimals.
    pub distance_km: f64,
    pub elevation: f64,
    pub elevation_class: ElevationBand,
}

/// How many places each classifier decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionTally {
    pub model: usize,
    #[serde(rename = "rule-based")]
    pub rule_based: usize,
}

impl PredictionTally {
    pub fn record(&mut self, source: PredictionSource) {
        match source {
            PredictionSource::Model => self.model += 1,
            PredictionSource::RuleBased => self.rule_based += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.model + self.rule_based
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResult {
    pub places: Vec<AnalyzedPlace>,
    pub tally: PredictionTally,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Per-place work, independent of every other place. `None` when the place
/// lies outside the circle or has unusable coordinates.
fn evaluate(
    place: &PlaceRecord,
    request: &SurveyRequest,
    dem: Option<&DemRaster>,
    model: Option<&dyn LandUseModel>,
) -> Option<AnalyzedPlace> {
    if !place.lat.is_finite() || !place.lng.is_finite() {
        debug!(name = place.display_name(), "skipping place with non-finite coordinates");
        return None;
    }
    let distance = geodesic_km(request.center, place.location());
    let within = distance <= request.radius_km();
    if !within {
        return None;
    }

    let class = classify_place(place.classification_name(), &place.place_type, model);
    let sample = dem.map_or(ElevationSample::UNKNOWN, |d| sample_elevation(d, place.lat, place.lng));

    Some(AnalyzedPlace {
        id: 0,
        name: place.display_name().to_string(),
        lat: place.lat,
        lng: place.lng,
        place_type: place.place_type.clone(),
        land_use: class.category,
        prediction_source: class.source,
        distance_km: round2(distance),
        elevation: sample.elevation,
        elevation_class: sample.classification,
    })
}

/// Classify and sample every place within `request.radius_m` of the centre.
///
/// Output keeps input order and numbers survivors from 1. Without a DEM every
/// place gets the `(0, Unknown)` elevation.
pub fn analyze_places(
    places: &[PlaceRecord],
    request: &SurveyRequest,
    dem: Option<&DemRaster>,
    model: Option<&dyn LandUseModel>,
) -> SurveyResult {
    #[cfg(feature = "threading")]
    let evaluated: Vec<Option<AnalyzedPlace>> = {
        use rayon::prelude::*;
        places.par_iter().map(|p| evaluate(p, request, dem, model)).collect()
    };
    #[cfg(not(feature = "threading"))]
    let evaluated: Vec<Option<AnalyzedPlace>> = places.iter().map(|p| evaluate(p, request, dem, model)).collect();

    let mut tally = PredictionTally::default();
    let mut out = Vec::new();
    for mut place in evaluated.into_iter().flatten() {
        place.id = out.len() + 1;
        tally.record(place.prediction_source);
        out.push(place);
    }
    debug!(input = places.len(), kept = out.len(), model = tally.model, rules = tally.rule_based, "survey done");
    SurveyResult { places: out, tally }
}

// ── Filtering ──

/// Post-analysis narrowing. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceFilter {
    pub land_use: Option<String>,
    pub max_distance_km: Option<f64>,
}

impl PlaceFilter {
    pub fn is_empty(&self) -> bool {
        self.land_use.is_none() && self.max_distance_km.is_none()
    }

    pub fn matches(&self, place: &AnalyzedPlace) -> bool {
        let land_use_ok = self.land_use.as_deref().map_or(true, |lu| place.land_use == lu);
        let distance_ok = self.max_distance_km.map_or(true, |d| place.distance_km <= d);
        land_use_ok && distance_ok
    }

    /// Matching places, ids untouched.
    pub fn apply(&self, places: &[AnalyzedPlace]) -> Vec<AnalyzedPlace> {
        places.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// Sorted distinct land-use categories present in `places`.
pub fn land_use_values(places: &[AnalyzedPlace]) -> Vec<String> {
    places
        .iter()
        .map(|p| p.land_use.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
