/// Relative elevation zones: partitions the circle around a point into five
/// zones at the 20/40/60/80th percentiles of the valid DEM cells under it and
/// prints the zone map as JSON.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use landuse_core::places::DEFAULT_RADIUS_M;
use landuse_core::{partition, DemRaster, ZoneMap};

#[derive(Parser, Debug)]
#[command(name = "zones", about = "Split a search circle into five relative elevation zones")]
struct Args {
    /// GeoTIFF DEM
    #[arg(long)]
    dem: PathBuf,

    /// Centre latitude
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Centre longitude
    #[arg(long, allow_negative_numbers = true)]
    lng: f64,

    /// Radius in metres
    #[arg(long, default_value_t = DEFAULT_RADIUS_M)]
    radius_m: f64,

    /// Omit per-pixel assignments, keep zones and statistics
    #[arg(long)]
    summary: bool,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn run(args: &Args) -> Result<ZoneMap> {
    let dem = DemRaster::open(&args.dem).with_context(|| format!("Cannot open DEM {}", args.dem.display()))?;
    info!(width = dem.width(), height = dem.height(), res = ?dem.res(), "loaded DEM");

    let mut map = partition(&dem, args.lat, args.lng, args.radius_m)
        .with_context(|| format!("Cannot divide zones around ({}, {}) r={} m", args.lat, args.lng, args.radius_m))?;
    info!(radius_px = map.radius_px, valid = map.valid_pixel_count(), "zones ready");
    for s in &map.statistics {
        info!(zone = s.zone_id, count = s.count, min = s.min, max = s.max, mean = s.mean, "zone");
    }

    if args.summary {
        map.assignments.clear();
    }
    Ok(map)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let map = run(&args)?;
    let json = serde_json::to_string_pretty(&map)?;
    match &args.output {
        Some(path) => fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
