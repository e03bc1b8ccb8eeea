pub mod geotiff;
pub mod transform;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RasterError;
use transform::GeoTransform;

/// An opened digital elevation model: band 1 of the source raster in metres,
/// row-major with row 0 at the top of the image (north for north-up DEMs).
/// Coordinate math uses f64; elevation values use f32.
///
/// Immutable once built, so one handle can be shared across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemRaster {
    data: Vec<f32>,
    width: usize,
    height: usize,
    /// Nodata sentinel declared by the source, if any.
    nodata: Option<f64>,
    transform: GeoTransform,
}

impl DemRaster {
    /// Build a raster from an in-memory grid.
    pub fn from_parts(
        data: Vec<f32>,
        width: usize,
        height: usize,
        nodata: Option<f64>,
        transform: GeoTransform,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(RasterError::InvalidDimensions { width, height, len: data.len() });
        }
        if transform.is_degenerate() {
            return Err(RasterError::DegenerateTransform);
        }
        Ok(Self { data, width, height, nodata, transform })
    }

    /// Open a GeoTIFF DEM from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RasterError> {
        geotiff::read_dem(path.as_ref())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    #[inline]
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Per-axis resolution (degrees per pixel for geographic DEMs).
    pub fn res(&self) -> (f64, f64) {
        self.transform.res()
    }

    /// Raw value at `(row, col)`. Caller guarantees the index is in range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Raw value at a signed pixel index, `None` outside the grid.
    pub fn value_at(&self, row: i64, col: i64) -> Option<f32> {
        if row < 0 || col < 0 || row as u64 >= self.height as u64 || col as u64 >= self.width as u64 {
            return None;
        }
        Some(self.get(row as usize, col as usize))
    }

    /// True when `value` is the nodata sentinel. NaN is always nodata.
    /// The sentinel is narrowed to the grid's `f32` before comparing.
    #[inline]
    pub fn is_nodata(&self, value: f32) -> bool {
        value.is_nan() || self.nodata.is_some_and(|nd| value == nd as f32)
    }

    /// Pixel `(row, col)` containing `(lat, lng)`; see [`GeoTransform::index`].
    pub fn index(&self, lat: f64, lng: f64) -> Option<(i64, i64)> {
        self.transform.index(lng, lat)
    }

    /// `(lat, lng)` of the centre of pixel `(row, col)`.
    pub fn latlng(&self, row: i64, col: i64) -> (f64, f64) {
        let (lng, lat) = self.transform.xy(row, col);
        (lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> DemRaster {
        let data = (0..width * height).map(|i| i as f32).collect();
        DemRaster::from_parts(data, width, height, Some(-9999.0), GeoTransform::north_up(80.0, 7.0, 0.001, -0.001))
            .unwrap()
    }

    #[test]
    fn from_parts_rejects_bad_shapes() {
        let t = GeoTransform::default();
        assert!(matches!(
            DemRaster::from_parts(vec![0.0; 5], 2, 3, None, t),
            Err(RasterError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            DemRaster::from_parts(vec![], 0, 0, None, t),
            Err(RasterError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            DemRaster::from_parts(vec![0.0; 4], 2, 2, None, GeoTransform::from_gdal([0.0; 6])),
            Err(RasterError::DegenerateTransform)
        ));
    }

    #[test]
    fn value_at_checks_bounds() {
        let dem = ramp(4, 3);
        assert_eq!(dem.value_at(0, 0), Some(0.0));
        assert_eq!(dem.value_at(2, 3), Some(11.0));
        assert_eq!(dem.value_at(3, 0), None);
        assert_eq!(dem.value_at(0, 4), None);
        assert_eq!(dem.value_at(-1, 0), None);
    }

    #[test]
    fn nodata_and_nan_are_excluded() {
        let data = vec![1.0f32, 2.0, -9999.0, f32::NAN, 5.0, 6.0];
        let dem = DemRaster::from_parts(data, 3, 2, Some(-9999.0), GeoTransform::default()).unwrap();
        let flags: Vec<bool> = (0..6).map(|i| dem.is_nodata(dem.get(i / 3, i % 3))).collect();
        assert_eq!(flags, [false, false, true, true, false, false]);
    }

    #[test]
    fn nodata_compares_at_grid_precision() {
        // GDAL writes the float32 minimum as nine significant digits, which
        // is not the same f64 as the f32 value widened.
        let nd: f64 = "-3.4028235e+38".parse().unwrap();
        assert_ne!(nd, f64::from(f32::MIN));
        let dem = DemRaster::from_parts(vec![f32::MIN, 0.1, 12.0, 3.0], 2, 2, Some(nd), GeoTransform::default())
            .unwrap();
        assert!(dem.is_nodata(f32::MIN));
        assert!(!dem.is_nodata(12.0));

        // A decimal sentinel has no exact binary form in either width.
        let dem = DemRaster::from_parts(vec![0.1, 1.0], 2, 1, Some(0.1), GeoTransform::default()).unwrap();
        assert!(dem.is_nodata(0.1f32));
        assert!(!dem.is_nodata(1.0));
    }

    #[test]
    fn latlng_is_pixel_centre() {
        let dem = ramp(10, 10);
        let (lat, lng) = dem.latlng(0, 0);
        assert!((lat - 6.9995).abs() < 1e-12);
        assert!((lng - 80.0005).abs() < 1e-12);
        assert_eq!(dem.index(lat, lng), Some((0, 0)));
    }
}
