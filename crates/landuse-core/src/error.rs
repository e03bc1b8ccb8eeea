use thiserror::Error;

/// Failures opening or building a DEM.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF decode error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("raster carries no georeferencing (need ModelTransformation or PixelScale + Tiepoint)")]
    MissingGeoreference,

    #[error("degenerate geotransform (zero determinant)")]
    DegenerateTransform,

    #[error("unsupported sample type in band 1")]
    UnsupportedSampleType,

    #[error("invalid raster dimensions: {width}x{height} with {len} samples")]
    InvalidDimensions { width: usize, height: usize, len: usize },
}

/// The only reported failure of zone partitioning. Open errors, an empty mask
/// and an all-nodata mask all collapse into it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneError {
    #[error("no valid elevation data found in the specified region")]
    NoValidData,
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model shape mismatch: {0}")]
    Shape(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

#[derive(Error, Debug)]
pub enum PlaceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("place file JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
