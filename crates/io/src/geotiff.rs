//! Single-band GeoTIFF reading and writing.
//!
//! Only the georeferencing tags needed for north-up or affine grids are
//! handled: `ModelPixelScale` + `ModelTiepoint`, or `ModelTransformation`.
//! The nodata value is taken from the GDAL nodata tag when present.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use drisk_hazard::{GeoTransform, Raster, RasterSource};
use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::IoError;

fn to_f64(result: DecodingResult) -> Vec<f64> {
    match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
    }
}

fn read_transform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
) -> Result<GeoTransform, IoError> {
    let tiff_err = |e: tiff::TiffError| IoError::tiff(path, e);

    if let Some(m) = decoder.find_tag(Tag::ModelTransformationTag).map_err(tiff_err)? {
        let m = m.into_f64_vec().map_err(tiff_err)?;
        if m.len() < 8 {
            return Err(IoError::MissingGeoreference {
                path: path.to_path_buf(),
                reason: format!("ModelTransformation has {} values", m.len()),
            });
        }
        return Ok(GeoTransform {
            a: m[0],
            b: m[1],
            c: m[3],
            d: m[4],
            e: m[5],
            f: m[7],
        });
    }

    let scale = decoder.find_tag(Tag::ModelPixelScaleTag).map_err(tiff_err)?;
    let tie = decoder.find_tag(Tag::ModelTiepointTag).map_err(tiff_err)?;
    let (Some(scale), Some(tie)) = (scale, tie) else {
        return Err(IoError::MissingGeoreference {
            path: path.to_path_buf(),
            reason: "neither ModelTransformation nor ModelPixelScale + ModelTiepoint".to_string(),
        });
    };
    let scale = scale.into_f64_vec().map_err(tiff_err)?;
    let tie = tie.into_f64_vec().map_err(tiff_err)?;
    if scale.len() < 2 || tie.len() < 6 {
        return Err(IoError::MissingGeoreference {
            path: path.to_path_buf(),
            reason: format!(
                "short ModelPixelScale ({}) or ModelTiepoint ({})",
                scale.len(),
                tie.len()
            ),
        });
    }
    let (sx, sy) = (scale[0], scale[1]);
    // Tiepoint maps raster (i, j) to model (x, y).
    let x0 = tie[3] - tie[0] * sx;
    let y0 = tie[4] + tie[1] * sy;
    Ok(GeoTransform::north_up(x0, y0, sx, sy))
}

fn read_nodata<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    path: &Path,
) -> Result<Option<f64>, IoError> {
    let tiff_err = |e: tiff::TiffError| IoError::tiff(path, e);
    let Some(value) = decoder.find_tag(Tag::GdalNodata).map_err(tiff_err)? else {
        return Ok(None);
    };
    let text = value.into_string().map_err(tiff_err)?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match text.parse::<f64>() {
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(IoError::tiff(path, format!("unparseable nodata value '{text}'"))),
    }
}

/// Reads the first band of a GeoTIFF into a [`Raster`].
///
/// Samples of any integer or float type are widened to `f64`.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::Tiff`] on decoding failures
/// or multi-band data, and [`IoError::MissingGeoreference`] when the file has
/// no usable geotransform.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_geotiff(path: &Path) -> Result<Raster, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| IoError::file(path, e))?;
    let tiff_err = |e: tiff::TiffError| IoError::tiff(path, e);
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(tiff_err)?
        .with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions().map_err(tiff_err)?;
    let transform = read_transform(&mut decoder, path)?;
    let nodata = read_nodata(&mut decoder, path)?;
    let values = to_f64(decoder.read_image().map_err(tiff_err)?);

    let shape = (height as usize, width as usize);
    if values.len() != shape.0 * shape.1 {
        return Err(IoError::tiff(
            path,
            format!(
                "{} samples for a {}x{} image; only single-band rasters are supported",
                values.len(),
                shape.0,
                shape.1
            ),
        ));
    }
    let data = Array2::from_shape_vec(shape, values).map_err(|e| IoError::tiff(path, e))?;
    debug!(rows = shape.0, cols = shape.1, ?nodata, "read raster");
    Ok(Raster::new(data, transform, nodata))
}

/// Writes a raster as a single-band 64-bit float GeoTIFF.
///
/// The transform is stored as `ModelTransformation`, the nodata value (if
/// any) as the GDAL nodata tag.
///
/// # Errors
///
/// Returns [`IoError::File`] or [`IoError::Tiff`].
pub fn write_geotiff(path: &Path, raster: &Raster) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::file(path, e))?;
    let tiff_err = |e: tiff::TiffError| IoError::tiff(path, e);
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(tiff_err)?;

    let t = raster.transform();
    let matrix = [
        t.a, t.b, 0.0, t.c, //
        t.d, t.e, 0.0, t.f, //
        0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ];
    let mut image = encoder
        .new_image::<colortype::Gray64Float>(raster.cols() as u32, raster.rows() as u32)
        .map_err(tiff_err)?;
    image
        .encoder()
        .write_tag(Tag::ModelTransformationTag, &matrix[..])
        .map_err(tiff_err)?;
    if let Some(nd) = raster.nodata() {
        image
            .encoder()
            .write_tag(Tag::GdalNodata, nd.to_string().as_str())
            .map_err(tiff_err)?;
    }

    let samples: Vec<f64> = raster.data().iter().copied().collect();
    image.write_data(&samples).map_err(tiff_err)?;
    debug!(path = %path.display(), rows = raster.rows(), cols = raster.cols(), "wrote raster");
    Ok(())
}

/// [`RasterSource`] backed by GeoTIFF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffRasters;

impl RasterSource for GeoTiffRasters {
    type Error = IoError;

    fn read_raster(&self, path: &Path) -> Result<Raster, IoError> {
        read_geotiff(path)
    }
}
