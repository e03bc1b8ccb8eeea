//! Affine pixel ⇄ geographic transform.

use serde::{Deserialize, Serialize};

/// Six-coefficient affine transform of a north-up (or rotated) raster.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// `x` is longitude and `y` latitude for geographic DEMs. `pixel_height` is
/// negative for the usual north-up layout (row 0 = northernmost).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub pixel_width: f64,
    pub row_rotation: f64,
    pub origin_y: f64,
    pub col_rotation: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// North-up transform without rotation.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    /// GDAL coefficient order `[origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]`.
    pub fn from_gdal(c: [f64; 6]) -> Self {
        Self {
            origin_x: c[0],
            pixel_width: c[1],
            row_rotation: c[2],
            origin_y: c[3],
            col_rotation: c[4],
            pixel_height: c[5],
        }
    }

    pub fn determinant(&self) -> f64 {
        self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation
    }

    pub fn is_degenerate(&self) -> bool {
        let det = self.determinant();
        !det.is_finite() || det.abs() < 1e-15
    }

    /// Pixel containing `(x, y)`: inverse affine, then `floor` on both axes.
    ///
    /// Returns `(row, col)`, which may be negative or past the grid edge.
    /// `None` when the inputs (or the transform) produce a non-finite index.
    pub fn index(&self, x: f64, y: f64) -> Option<(i64, i64)> {
        let det = self.determinant();
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;
        if !row.is_finite() || !col.is_finite() {
            return None;
        }
        Some((row.floor() as i64, col.floor() as i64))
    }

    /// Geographic coordinate `(x, y)` of the centre of pixel `(row, col)`.
    pub fn xy(&self, row: i64, col: i64) -> (f64, f64) {
        let r = row as f64 + 0.5;
        let c = col as f64 + 0.5;
        let x = self.origin_x + c * self.pixel_width + r * self.row_rotation;
        let y = self.origin_y + c * self.col_rotation + r * self.pixel_height;
        (x, y)
    }

    /// Per-axis resolution `(x, y)` in map units per pixel.
    pub fn res(&self) -> (f64, f64) {
        let x = (self.pixel_width * self.pixel_width + self.col_rotation * self.col_rotation).sqrt();
        let y = (self.row_rotation * self.row_rotation + self.pixel_height * self.pixel_height).sqrt();
        (x, y)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::north_up(0.0, 0.0, 1.0, -1.0)
    }
}
