//! Relative elevation zones inside a circular search region.
//!
//! The valid DEM cells under a circular pixel mask are split at their 20th,
//! 40th, 60th and 80th percentiles into five zones, lowest first. Adjacent
//! zones share an endpoint; a cell on a shared endpoint belongs to the lower
//! zone because zones are tested in ascending order.
pub mod percentile;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coords::{meters_to_degrees, LatLon};
use crate::error::ZoneError;
use crate::raster::DemRaster;
use percentile::percentile_sorted;

pub const ZONE_COUNT: usize = 5;

/// Cut points between zones, in percent.
const CUT_PERCENTILES: [f64; ZONE_COUNT - 1] = [20.0, 40.0, 60.0, 80.0];

const ZONE_NAMES: [&str; ZONE_COUNT] = ["Zone 1 (Lowest)", "Zone 2", "Zone 3", "Zone 4", "Zone 5 (Highest)"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// 1 (lowest) ..= 5 (highest).
    pub id: u8,
    pub name: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Zone {
    /// Closed-interval membership.
    #[inline]
    pub fn contains(&self, elevation: f64) -> bool {
        self.lower_bound <= elevation && elevation <= self.upper_bound
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneAssignment {
    pub lat: f64,
    pub lng: f64,
    pub elevation: f64,
    pub zone_id: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatistics {
    pub zone_id: u8,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

/// Result of one partition query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMap {
    pub center: LatLon,
    pub radius_m: f64,
    /// Mask radius in pixels after truncation.
    pub radius_px: i64,
    /// Ascending by elevation.
    pub zones: [Zone; ZONE_COUNT],
    /// One entry per valid masked pixel, in row-major pixel order.
    pub assignments: Vec<ZoneAssignment>,
    /// Non-empty zones only, ascending by zone id.
    pub statistics: Vec<ZoneStatistics>,
}

impl ZoneMap {
    /// First zone (ascending) whose closed interval holds `elevation`.
    pub fn zone_for(&self, elevation: f64) -> Option<&Zone> {
        self.zones.iter().find(|z| z.contains(elevation))
    }

    pub fn assignments_in(&self, zone_id: u8) -> impl Iterator<Item = &ZoneAssignment> + '_ {
        self.assignments.iter().filter(move |a| a.zone_id == zone_id)
    }

    pub fn statistics_for(&self, zone_id: u8) -> Option<&ZoneStatistics> {
        self.statistics.iter().find(|s| s.zone_id == zone_id)
    }

    pub fn valid_pixel_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Mask radius in pixels: metres → degrees (1° ≈ 111 320 m) → pixels using
/// the first-axis resolution only, truncated toward zero.
pub fn radius_in_pixels(raster: &DemRaster, radius_m: f64) -> i64 {
    (meters_to_degrees(radius_m) / raster.res().0) as i64
}

/// Masked pixels as `(row, col)` in row-major order. The centre pixel may
/// lie outside the grid; only in-grid pixels are produced.
fn masked_pixels(raster: &DemRaster, center: (i64, i64), radius_px: i64) -> impl Iterator<Item = (usize, usize)> {
    let (cr, cc) = center;
    let r2 = i128::from(radius_px) * i128::from(radius_px);
    let height = raster.height() as i64;
    let width = raster.width() as i64;
    let row_lo = cr.saturating_sub(radius_px).clamp(0, height);
    let row_hi = cr.saturating_add(radius_px).saturating_add(1).clamp(0, height);
    let col_lo = cc.saturating_sub(radius_px).clamp(0, width);
    let col_hi = cc.saturating_add(radius_px).saturating_add(1).clamp(0, width);

    (row_lo..row_hi).flat_map(move |r| {
        (col_lo..col_hi).filter_map(move |c| {
            let dr = i128::from(r) - i128::from(cr);
            let dc = i128::from(c) - i128::from(cc);
            (dr * dr + dc * dc <= r2).then_some((r as usize, c as usize))
        })
    })
}

fn build_zones(sorted: &[f64]) -> [Zone; ZONE_COUNT] {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let mut edges = [0.0f64; ZONE_COUNT + 1];
    edges[0] = min;
    for (k, &q) in CUT_PERCENTILES.iter().enumerate() {
        edges[k + 1] = percentile_sorted(sorted, q);
    }
    edges[ZONE_COUNT] = max;

    std::array::from_fn(|i| Zone {
        id: (i + 1) as u8,
        name: ZONE_NAMES[i].to_string(),
        lower_bound: edges[i],
        upper_bound: edges[i + 1],
    })
}

fn zone_statistics(zones: &[Zone; ZONE_COUNT], assignments: &[ZoneAssignment]) -> Vec<ZoneStatistics> {
    zones
        .iter()
        .filter_map(|zone| {
            let mut count = 0usize;
            let mut sum = 0.0f64;
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for a in assignments.iter().filter(|a| a.zone_id == zone.id) {
                count += 1;
                sum += a.elevation;
                min = min.min(a.elevation);
                max = max.max(a.elevation);
            }
            (count > 0).then(|| ZoneStatistics {
                zone_id: zone.id,
                min,
                max,
                mean: sum / count as f64,
                count,
            })
        })
        .collect()
}

/// Partition the circle of `radius_m` metres around the centre into five
/// relative elevation zones.
///
/// Fails with [`ZoneError::NoValidData`] when the mask holds no valid cell,
/// including when the centre does not project or the radius is negative or
/// non-finite. Never returns a partial map.
pub fn partition(raster: &DemRaster, center_lat: f64, center_lng: f64, radius_m: f64) -> Result<ZoneMap, ZoneError> {
    if !radius_m.is_finite() || radius_m < 0.0 {
        debug!(radius_m, "rejecting search radius");
        return Err(ZoneError::NoValidData);
    }
    let center_px = raster.index(center_lat, center_lng).ok_or(ZoneError::NoValidData)?;
    let radius_px = radius_in_pixels(raster, radius_m);

    // Pass 1: valid values under the mask.
    let mut valid: Vec<f64> = masked_pixels(raster, center_px, radius_px)
        .map(|(r, c)| raster.get(r, c))
        .filter(|&v| !raster.is_nodata(v))
        .map(f64::from)
        .collect();
    if valid.is_empty() {
        debug!(center_lat, center_lng, radius_m, radius_px, "no valid elevation under mask");
        return Err(ZoneError::NoValidData);
    }
    valid.sort_by(f64::total_cmp);
    let zones = build_zones(&valid);

    // Pass 2: assign each valid pixel to the first zone that holds it.
    let mut assignments = Vec::with_capacity(valid.len());
    for (r, c) in masked_pixels(raster, center_px, radius_px) {
        let v = raster.get(r, c);
        if raster.is_nodata(v) {
            continue;
        }
        let elevation = f64::from(v);
        if let Some(zone) = zones.iter().find(|z| z.contains(elevation)) {
            let (lat, lng) = raster.latlng(r as i64, c as i64);
            assignments.push(ZoneAssignment { lat, lng, elevation, zone_id: zone.id });
        }
    }

    let statistics = zone_statistics(&zones, &assignments);
    debug!(
        center_lat,
        center_lng,
        radius_px,
        valid = valid.len(),
        zones_populated = statistics.len(),
        "partitioned elevation zones"
    );

    Ok(ZoneMap {
        center: LatLon::new(center_lat, center_lng),
        radius_m,
        radius_px,
        zones,
        assignments,
        statistics,
    })
}

/// Open the DEM at `path` and partition. An open failure is logged and
/// reported as [`ZoneError::NoValidData`].
pub fn partition_at_path(
    path: impl AsRef<Path>,
    center_lat: f64,
    center_lng: f64,
    radius_m: f64,
) -> Result<ZoneMap, ZoneError> {
    let path = path.as_ref();
    let raster = DemRaster::open(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "error dividing elevation zones");
        ZoneError::NoValidData
    })?;
    partition(&raster, center_lat, center_lng, radius_m)
}
