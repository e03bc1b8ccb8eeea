//! GeoTIFF DEM loading with the pure-Rust `tiff` decoder.
//!
//! Only band 1 is kept. Georeferencing comes from `ModelTransformationTag`
//! when present, otherwise from `ModelPixelScaleTag` + `ModelTiepointTag`.
//! The nodata sentinel comes from the GDAL ASCII tag (42113).
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

use super::transform::GeoTransform;
use super::DemRaster;
use crate::error::RasterError;

/// GTRasterTypeGeoKey; value 2 = RasterPixelIsPoint.
const RASTER_TYPE_GEO_KEY: u32 = 1025;
const RASTER_PIXEL_IS_POINT: u32 = 2;

pub(crate) fn read_dem(path: &Path) -> Result<DemRaster, RasterError> {
    let file = File::open(path)?;
    let raster = decode(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        nodata = ?raster.nodata(),
        "opened DEM"
    );
    Ok(raster)
}

/// Decode a GeoTIFF from any seekable reader.
pub fn decode<R: Read + Seek>(reader: R) -> Result<DemRaster, RasterError> {
    // Country-scale DEMs exceed the decoder's default buffer limit.
    let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let transform = read_transform(&mut decoder)?;
    let nodata = read_nodata(&mut decoder)?;

    let samples = to_f32(decoder.read_image()?)?;
    let data = first_band(samples, width, height)?;

    DemRaster::from_parts(data, width, height, nodata, transform)
}

fn find_f64_vec<R: Read + Seek>(decoder: &mut Decoder<R>, tag: Tag) -> Result<Option<Vec<f64>>, RasterError> {
    match decoder.find_tag(tag)? {
        Some(value) => Ok(Some(value.into_f64_vec()?)),
        None => Ok(None),
    }
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform, RasterError> {
    let mut transform = if let Some(m) = find_f64_vec(decoder, Tag::ModelTransformationTag)? {
        if m.len() < 16 {
            return Err(RasterError::MissingGeoreference);
        }
        // 4×4 row-major matrix: x = m0·col + m1·row + m3, y = m4·col + m5·row + m7.
        GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]])
    } else {
        let scale = find_f64_vec(decoder, Tag::ModelPixelScaleTag)?;
        let tie = find_f64_vec(decoder, Tag::ModelTiepointTag)?;
        match (scale, tie) {
            (Some(s), Some(t)) if s.len() >= 2 && t.len() >= 6 => {
                let (sx, sy) = (s[0], s[1]);
                let (i, j, x, y) = (t[0], t[1], t[3], t[4]);
                GeoTransform::north_up(x - i * sx, y + j * sy, sx, -sy)
            }
            _ => return Err(RasterError::MissingGeoreference),
        }
    };

    if is_pixel_is_point(decoder)? {
        // Tie point names a pixel centre; shift the origin to its corner.
        transform.origin_x -= 0.5 * (transform.pixel_width + transform.row_rotation);
        transform.origin_y -= 0.5 * (transform.col_rotation + transform.pixel_height);
    }
    Ok(transform)
}

fn is_pixel_is_point<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<bool, RasterError> {
    let Some(value) = decoder.find_tag(Tag::GeoKeyDirectoryTag)? else {
        return Ok(false);
    };
    let keys = value.into_u32_vec()?;
    // Header is 4 shorts, then one (key, location, count, value) quad per key.
    Ok(keys
        .get(4..)
        .unwrap_or(&[])
        .chunks_exact(4)
        .any(|k| k[0] == RASTER_TYPE_GEO_KEY && k[1] == 0 && k[3] == RASTER_PIXEL_IS_POINT))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>, RasterError> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match text.parse::<f64>() {
        Ok(v) => Ok(Some(v)),
        Err(_) if text.eq_ignore_ascii_case("nan") => Ok(Some(f64::NAN)),
        Err(_) => {
            debug!(nodata = text, "ignoring unparsable GDAL_NODATA tag");
            Ok(None)
        }
    }
}

#[allow(unreachable_patterns)]
fn to_f32(img: DecodingResult) -> Result<Vec<f32>, RasterError> {
    let v = match img {
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        _ => return Err(RasterError::UnsupportedSampleType),
    };
    Ok(v)
}

/// Keep band 1 of a pixel-interleaved buffer.
fn first_band(samples: Vec<f32>, width: usize, height: usize) -> Result<Vec<f32>, RasterError> {
    let pixels = width * height;
    if pixels == 0 || samples.len() < pixels || samples.len() % pixels != 0 {
        return Err(RasterError::InvalidDimensions { width, height, len: samples.len() });
    }
    let bands = samples.len() / pixels;
    if bands == 1 {
        return Ok(samples);
    }
    Ok(samples.into_iter().step_by(bands).collect())
}
