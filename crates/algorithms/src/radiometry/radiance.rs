//! At-sensor spectral radiance

use ndarray::Array2;
use crate::maybe_rayon::*;
use crate::radiometry::BandContext;
use radcal_core::raster::Raster;
use radcal_core::{Error, Result};

/// Convert digital numbers to at-sensor spectral radiance.
///
/// `L = ((Lmax - Lmin) / (QCALmax - QCALmin)) * (DN - QCALmin) + Lmin`
///
/// A digital number of zero is sensor no-data and yields NaN. No other
/// cell is masked. Units follow the metadata, normally W/(m² sr µm).
pub fn radiance(ctx: &BandContext) -> Result<Raster<f64>> {
    let dn = ctx.digital_numbers();
    let (rows, cols) = dn.shape();
    let rescaling = *ctx.rescaling();
    let gain = rescaling.gain();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let value = unsafe { dn.get_unchecked(row, col) };
                if value == 0.0 {
                    continue;
                }
                row_data[col] =
                    gain * (value - rescaling.quantize_cal_minimum) + rescaling.radiance_minimum;
            }
            row_data
        })
        .collect();

    let array =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    dn.derive(array)
}
