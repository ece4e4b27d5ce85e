//! Single-band rasters with an affine georeference.

use ndarray::Array2;

use crate::centroids::Extent;
use crate::error::HazardError;

/// Affine pixel-to-world transform.
///
/// `x = a * col + b * row + c`, `y = d * col + e * row + f`, with `(col, row)`
/// measured in pixels from the top-left corner of the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// North-up transform from the top-left corner and pixel sizes.
    ///
    /// `pixel_height` is the positive size; rows run southwards.
    pub fn north_up(x_origin: f64, y_origin: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            a: pixel_width,
            b: 0.0,
            c: x_origin,
            d: 0.0,
            e: -pixel_height,
            f: y_origin,
        }
    }

    /// Maps fractional pixel coordinates to world coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// World coordinates of the centre of pixel `(row, col)`.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Whether the transform has no rotation or shear terms.
    pub fn is_axis_aligned(&self) -> bool {
        self.b == 0.0 && self.d == 0.0 && self.a != 0.0 && self.e != 0.0
    }

    /// Errors unless the transform is axis-aligned.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::IrregularGrid`] for rotated or degenerate transforms.
    pub fn require_axis_aligned(&self) -> Result<(), HazardError> {
        if self.is_axis_aligned() {
            Ok(())
        } else {
            Err(HazardError::IrregularGrid {
                reason: format!(
                    "transform ({}, {}, {}, {}, {}, {}) is rotated or degenerate",
                    self.a, self.b, self.c, self.d, self.e, self.f
                ),
            })
        }
    }
}

/// Dense single-band raster.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    data: Array2<f64>,
    transform: GeoTransform,
    nodata: Option<f64>,
}

impl Raster {
    pub fn new(data: Array2<f64>, transform: GeoTransform, nodata: Option<f64>) -> Self {
        Self {
            data,
            transform,
            nodata,
        }
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Whether `v` is a real observation (not NaN and not the nodata value).
    pub fn is_valid(&self, v: f64) -> bool {
        !v.is_nan() && self.nodata.is_none_or(|nd| v != nd)
    }

    /// World-space bounds of the raster's outer pixel edges.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::IrregularGrid`] if the transform is not axis-aligned.
    pub fn bounds(&self) -> Result<Extent, HazardError> {
        self.transform.require_axis_aligned()?;
        let (x0, y0) = self.transform.apply(0.0, 0.0);
        let (x1, y1) = self.transform.apply(self.cols() as f64, self.rows() as f64);
        Extent::new(x0.min(x1), x0.max(x1), y0.min(y1), y0.max(y1))
    }

    /// Longitudes of column centres and latitudes of row centres.
    ///
    /// # Errors
    ///
    /// Returns [`HazardError::IrregularGrid`] if the transform is not axis-aligned.
    pub fn axis_centers(&self) -> Result<(Vec<f64>, Vec<f64>), HazardError> {
        self.transform.require_axis_aligned()?;
        let lons = (0..self.cols())
            .map(|c| self.transform.pixel_center(0, c).0)
            .collect();
        let lats = (0..self.rows())
            .map(|r| self.transform.pixel_center(r, 0).1)
            .collect();
        Ok((lons, lats))
    }
}
