//! End-to-end checks against GeoTIFFs written to a temp directory.
use std::fs::File;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use landuse_core::elevation::sample_elevation_at_path;
use landuse_core::zones::partition_at_path;
use landuse_core::{
    analyze_places, land_use_values, load_places, partition, sample_elevation, DemRaster, ElevationBand,
    ElevationSample, PlaceFilter, PredictionSource, RasterError, SurveyRequest, ZoneError,
};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const NODATA: f32 = -9999.0;
const SIZE: u32 = 20;
const PIXEL: f64 = 0.001;
const ORIGIN_LNG: f64 = 80.0;
const ORIGIN_LAT: f64 = 7.0;

/// Write a SIZE×SIZE float DEM. Cell (r, c) holds `10 * r + c`; `holes`
/// are set to the nodata value. `raster_type` 1 = PixelIsArea, 2 = PixelIsPoint.
fn write_dem(path: &Path, holes: &[(u32, u32)], raster_type: u16) {
    let mut data: Vec<f32> = (0..SIZE * SIZE).map(|i| (10 * (i / SIZE) + i % SIZE) as f32).collect();
    for &(r, c) in holes {
        data[(r * SIZE + c) as usize] = NODATA;
    }

    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    let mut image = encoder.new_image::<Gray32Float>(SIZE, SIZE).unwrap();
    let scale = [PIXEL, PIXEL, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, ORIGIN_LNG, ORIGIN_LAT, 0.0];
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 2, 1025, 0, 1, raster_type];
    image.encoder().write_tag(Tag::ModelPixelScaleTag, &scale[..]).unwrap();
    image.encoder().write_tag(Tag::ModelTiepointTag, &tiepoint[..]).unwrap();
    image.encoder().write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..]).unwrap();
    image.encoder().write_tag(Tag::GdalNodata, "-9999").unwrap();
    image.write_data(&data).unwrap();
}

/// Pixel-centre coordinate of (row, col) for the PixelIsArea layout.
fn centre(row: u32, col: u32) -> (f64, f64) {
    (
        ORIGIN_LAT - (f64::from(row) + 0.5) * PIXEL,
        ORIGIN_LNG + (f64::from(col) + 0.5) * PIXEL,
    )
}

fn dem_file(dir: &tempfile::TempDir, holes: &[(u32, u32)]) -> PathBuf {
    let path = dir.path().join("dem.tif");
    write_dem(&path, holes, 1);
    path
}

#[test]
fn opens_geotiff_with_georeference_and_nodata() {
    let dir = tempfile::tempdir().unwrap();
    let dem = DemRaster::open(dem_file(&dir, &[])).unwrap();
    assert_eq!((dem.width(), dem.height()), (20, 20));
    assert_eq!(dem.nodata(), Some(-9999.0));
    let (rx, ry) = dem.res();
    assert_relative_eq!(rx, PIXEL, epsilon = 1e-12);
    assert_relative_eq!(ry, PIXEL, epsilon = 1e-12);
    assert_eq!(dem.get(3, 4), 34.0);
}

#[test]
fn samples_known_cells() {
    let dir = tempfile::tempdir().unwrap();
    let dem = DemRaster::open(dem_file(&dir, &[(1, 1)])).unwrap();

    let (lat, lng) = centre(7, 5);
    let s = sample_elevation(&dem, lat, lng);
    assert_eq!(s.elevation, 75.0);
    assert_eq!(s.classification, ElevationBand::Low);

    let (lat, lng) = centre(15, 9);
    assert_eq!(sample_elevation(&dem, lat, lng).classification, ElevationBand::Medium);

    let (lat, lng) = centre(1, 1);
    assert_eq!(sample_elevation(&dem, lat, lng), ElevationSample::UNKNOWN);

    // One pixel past the bottom edge.
    let (lat, lng) = centre(SIZE, 0);
    assert_eq!(sample_elevation(&dem, lat, lng), ElevationSample::UNKNOWN);
}

#[test]
fn path_helpers_degrade_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.tif");
    assert!(matches!(DemRaster::open(&missing), Err(RasterError::Io(_))));
    assert_eq!(sample_elevation_at_path(&missing, 6.99, 80.01), ElevationSample::UNKNOWN);
    assert_eq!(partition_at_path(&missing, 6.99, 80.01, 500.0).unwrap_err(), ZoneError::NoValidData);

    let garbage = dir.path().join("garbage.tif");
    std::fs::write(&garbage, b"not a tiff").unwrap();
    assert!(DemRaster::open(&garbage).is_err());
    assert_eq!(sample_elevation_at_path(&garbage, 6.99, 80.01), ElevationSample::UNKNOWN);
}

#[test]
fn pixel_is_point_shifts_half_a_pixel() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("point.tif");
    write_dem(&path, &[], 2);
    let dem = DemRaster::open(&path).unwrap();
    // The tie point is now the centre of (0, 0).
    let s = sample_elevation(&dem, ORIGIN_LAT, ORIGIN_LNG);
    assert_eq!(s.elevation, 0.0);
    assert_eq!(s.classification, ElevationBand::VeryLow);
    let (lat, lng) = dem.latlng(0, 0);
    assert_relative_eq!(lat, ORIGIN_LAT, epsilon = 1e-9);
    assert_relative_eq!(lng, ORIGIN_LNG, epsilon = 1e-9);
}

#[test]
fn partitions_opened_dem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dem_file(&dir, &[(10, 10)]);
    let dem = DemRaster::open(&path).unwrap();
    let (lat, lng) = centre(10, 10);

    // 500 m ≈ 4.49 px → 4 px disc of 49 cells, one of them nodata.
    let map = partition(&dem, lat, lng, 500.0).unwrap();
    assert_eq!(map.radius_px, 4);
    assert_eq!(map.valid_pixel_count(), 48);
    assert_eq!(map.statistics.iter().map(|s| s.count).sum::<usize>(), 48);
    for pair in map.zones.windows(2) {
        assert_eq!(pair[0].upper_bound, pair[1].lower_bound);
    }
    assert_eq!(map.zones[0].lower_bound, 70.0);
    assert_eq!(map.zones[4].upper_bound, 150.0);
    for a in &map.assignments {
        let z = &map.zones[usize::from(a.zone_id) - 1];
        assert!(z.contains(a.elevation));
    }

    let again = partition_at_path(&path, lat, lng, 500.0).unwrap();
    assert_eq!(again, map);
}

#[test]
fn all_nodata_region_reports_no_valid_data() {
    let dir = tempfile::tempdir().unwrap();
    let holes: Vec<(u32, u32)> = (0..3).flat_map(|r| (0..3).map(move |c| (r, c))).collect();
    let dem = DemRaster::open(dem_file(&dir, &holes)).unwrap();
    let (lat, lng) = centre(1, 1);
    assert_eq!(partition(&dem, lat, lng, 100.0).unwrap_err(), ZoneError::NoValidData);
}

#[test]
fn survey_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let dem = DemRaster::open(dem_file(&dir, &[(2, 2)])).unwrap();

    let (c_lat, c_lng) = centre(10, 10);
    let (h_lat, h_lng) = centre(2, 2);
    let (s_lat, s_lng) = centre(14, 12);
    let places_json = serde_json::json!([
        {"name": "Base Hospital", "place_type": "hospital",
         "location": {"lat": h_lat, "lng": h_lng}, "land_use": "Healthcare"},
        {"name": "Temple Road Market", "place_type": "marketplace",
         "location": {"lat": s_lat, "lng": s_lng}},
        {"place_type": "bus_station", "location": {"lat": c_lat, "lng": c_lng}},
        {"name": "Far Away School", "place_type": "school",
         "location": {"lat": c_lat + 1.0, "lng": c_lng}},
        {"name": "Broken", "place_type": "school"}
    ]);
    let places_path = dir.path().join("places.json");
    std::fs::write(&places_path, places_json.to_string()).unwrap();

    let places = load_places(&places_path).unwrap();
    assert_eq!(places.len(), 4);

    let request = SurveyRequest::new(c_lat, c_lng, 1500.0);
    let result = analyze_places(&places, &request, Some(&dem), None);
    let summary: Vec<(usize, &str, &str)> =
        result.places.iter().map(|p| (p.id, p.name.as_str(), p.land_use.as_str())).collect();
    assert_eq!(
        summary,
        [(1, "Base Hospital", "Healthcare"), (2, "Temple Road Market", "Commercial"), (3, "Unnamed", "Transport")]
    );
    assert!(result.places.iter().all(|p| p.prediction_source == PredictionSource::RuleBased));
    assert_eq!(result.tally.rule_based, 3);

    // Hospital sits on the nodata hole.
    assert_eq!(result.places[0].elevation_class, ElevationBand::Unknown);
    assert_eq!(result.places[1].elevation, 152.0);
    assert_eq!(result.places[2].distance_km, 0.0);

    let filter = PlaceFilter { land_use: Some("Commercial".into()), max_distance_km: None };
    let kept = filter.apply(&result.places);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, 2);
    assert_eq!(land_use_values(&result.places), ["Commercial", "Healthcare", "Transport"]);
}
