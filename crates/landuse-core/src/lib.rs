//! Elevation raster engine and hybrid land-use classifier for places
//! inside a search radius.

pub mod coords;
pub mod elevation;
pub mod error;
pub mod landuse;
pub mod places;
pub mod raster;
pub mod zones;

pub use coords::LatLon;
pub use elevation::{
    bands::{classify_elevation, ElevationBand},
    sample_elevation, ElevationSample, SampleOutcome,
};
pub use error::{ModelError, PlaceError, RasterError, ZoneError};
pub use landuse::{
    classify_place, hybrid::HybridClassifier, model::BagOfWordsModel, model::LandUseModel,
    model::Prediction, rules::classify_land_use, ClassificationResult, PredictionSource,
};
pub use places::{
    analyze_places, land_use_values, load_places, AnalyzedPlace, PlaceFilter, PlaceRecord, PredictionTally,
    SurveyRequest, SurveyResult,
};
pub use raster::{transform::GeoTransform, DemRaster};
pub use zones::{partition, Zone, ZoneAssignment, ZoneMap, ZoneStatistics};
