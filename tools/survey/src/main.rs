/// Land-use survey tool: loads a place list, keeps places inside a search
/// circle, classifies each one (model when confident, keyword rules
/// otherwise), samples its elevation from a DEM and prints the result as JSON.
///
/// Settings come from an optional `--config` JSON file; explicit flags win.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use landuse_core::places::DEFAULT_RADIUS_M;
use landuse_core::{
    analyze_places, land_use_values, load_places, AnalyzedPlace, BagOfWordsModel, DemRaster, LandUseModel, LatLon,
    PlaceFilter, PredictionTally, SurveyRequest,
};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "survey", about = "Classify and elevation-tag places inside a search radius")]
struct Args {
    /// JSON settings file (SurveyConfig); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Place list (JSON array of {name, place_type, location: {lat, lng}})
    #[arg(long)]
    places: Option<PathBuf>,

    /// GeoTIFF DEM; without it every elevation is (0, Unknown)
    #[arg(long)]
    dem: Option<PathBuf>,

    /// Exported land-use model weights (JSON); without it only rules are used
    #[arg(long)]
    model: Option<PathBuf>,

    /// Search centre latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Search centre longitude
    #[arg(long, allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Search radius in metres [default: 1000]
    #[arg(long)]
    radius_m: Option<f64>,

    /// Keep only this land-use category
    #[arg(long)]
    land_use: Option<String>,

    /// Keep only places at most this far from the centre
    #[arg(long)]
    max_distance_km: Option<f64>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
}

// ── Config file ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct SurveyConfig {
    dem: Option<PathBuf>,
    places: Option<PathBuf>,
    model: Option<PathBuf>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_m: Option<f64>,
    land_use: Option<String>,
    max_distance_km: Option<f64>,
}

impl SurveyConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Flags and file merged; every required value present.
#[derive(Debug, PartialEq)]
struct Settings {
    places: PathBuf,
    dem: Option<PathBuf>,
    model: Option<PathBuf>,
    request: SurveyRequest,
    filter: PlaceFilter,
}

fn resolve(args: &Args, cfg: SurveyConfig) -> Result<Settings> {
    let places = args.places.clone().or(cfg.places).context("no place file given (--places or config \"places\")")?;
    let lat = args.lat.or(cfg.lat).context("no centre latitude given (--lat or config \"lat\")")?;
    let lng = args.lng.or(cfg.lng).context("no centre longitude given (--lng or config \"lng\")")?;
    let radius_m = args.radius_m.or(cfg.radius_m).unwrap_or(DEFAULT_RADIUS_M);

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        bail!("centre ({lat}, {lng}) is not a valid coordinate");
    }
    if !radius_m.is_finite() || radius_m < 0.0 {
        bail!("radius must be a non-negative number of metres, got {radius_m}");
    }

    Ok(Settings {
        places,
        dem: args.dem.clone().or(cfg.dem),
        model: args.model.clone().or(cfg.model),
        request: SurveyRequest::new(lat, lng, radius_m),
        filter: PlaceFilter {
            land_use: args.land_use.clone().or(cfg.land_use),
            max_distance_km: args.max_distance_km.or(cfg.max_distance_km),
        },
    })
}

// ── Output ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report {
    center: LatLon,
    radius_m: f64,
    total: usize,
    prediction_sources: PredictionTally,
    land_use_values: Vec<String>,
    places: Vec<AnalyzedPlace>,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let cfg = match &args.config {
        Some(path) => SurveyConfig::load(path)?,
        None => SurveyConfig::default(),
    };
    let settings = resolve(&args, cfg)?;

    let dem = match &settings.dem {
        Some(path) => match DemRaster::open(path) {
            Ok(dem) => {
                info!(path = %path.display(), width = dem.width(), height = dem.height(), "loaded DEM");
                Some(dem)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "DEM unavailable, elevations will be Unknown");
                None
            }
        },
        None => None,
    };

    let model: Option<BagOfWordsModel> = settings
        .model
        .as_ref()
        .map(|path| {
            BagOfWordsModel::load(path).with_context(|| format!("Failed to load model {}", path.display()))
        })
        .transpose()?;
    if let Some(m) = &model {
        info!(classes = m.num_classes(), "loaded land-use model");
    }

    let places = load_places(&settings.places)
        .with_context(|| format!("Failed to load places from {}", settings.places.display()))?;
    info!(count = places.len(), "loaded places");

    let result = analyze_places(
        &places,
        &settings.request,
        dem.as_ref(),
        model.as_ref().map(|m| m as &dyn LandUseModel),
    );
    info!(
        in_radius = result.places.len(),
        model = result.tally.model,
        rule_based = result.tally.rule_based,
        "survey complete"
    );

    let land_uses = land_use_values(&result.places);
    let places = if settings.filter.is_empty() {
        result.places
    } else {
        let kept = settings.filter.apply(&result.places);
        if kept.is_empty() {
            warn!("no places match the selected filters");
        }
        kept
    };

    let report = Report {
        center: settings.request.center,
        radius_m: settings.request.radius_m,
        total: result.tally.total(),
        prediction_sources: result.tally,
        land_use_values: land_uses,
        places,
    };
    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;
            info!(path = %path.display(), "wrote report");
        }
        None => println!("{json}"),
    }
    Ok(())
}
