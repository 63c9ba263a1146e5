//! Normalized difference indices
//!
//! NDVI feeds the emissivity estimate of the thermal retrieval. Inputs are
//! usually TOA or DOS-corrected reflectance of the same scene.

use crate::maybe_rayon::*;
use radcal_core::raster::Raster;
use radcal_core::{Error, Result};

/// Normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// The result lies in [-1, 1]. Cells where either band is NaN or nodata,
/// or where the sum vanishes, are NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    if band_a.shape() != band_b.shape() {
        return Err(Error::shape_mismatch(band_a.shape(), band_b.shape()));
    }

    let (rows, cols) = band_a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if band_a.is_nodata(a) || band_b.is_nodata(b) {
                    continue;
                }

                let sum = a + b;
                if sum.abs() < 1e-10 {
                    continue;
                }

                *out = (a - b) / sum;
            }
            row_data
        })
        .collect();

    let array = ndarray::Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| Error::Other(e.to_string()))?;
    band_a.derive(array)
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Water and clouds fall below 0, bare soil around 0.1 to 0.2, dense
/// vegetation above 0.6.
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}
