//! NDVI threshold method for land-surface emissivity
//!
//! NDVI is split into four classes: water, bare soil, mixed soil and
//! vegetation, and full vegetation (Zhang et al., 2006). Only the mixed
//! class varies with NDVI, through a logarithmic fit.

use crate::imagery::{select, Branch};
use radcal_core::raster::Raster;
use radcal_core::Result;

/// Emissivity of water (NDVI in [-1, -0.185))
pub const WATER_EMISSIVITY: f64 = 0.995;
/// Emissivity of bare soil (NDVI in [-0.185, 0.157])
pub const SOIL_EMISSIVITY: f64 = 0.985;
/// Emissivity of full vegetation cover (NDVI in (0.727, 1])
pub const FULL_VEGETATION_EMISSIVITY: f64 = 0.990;

const WATER_SOIL_NDVI: f64 = -0.185;
const SOIL_MIXED_NDVI: f64 = 0.157;
const MIXED_VEGETATION_NDVI: f64 = 0.727;

/// Estimate land-surface emissivity from NDVI.
///
/// | NDVI            | emissivity                 |
/// |-----------------|----------------------------|
/// | [-1, -0.185)    | 0.995                      |
/// | [-0.185, 0.157] | 0.985                      |
/// | (0.157, 0.727]  | 0.047 * ln(NDVI) + 1.009   |
/// | (0.727, 1]      | 0.990                      |
///
/// NaN or out-of-range NDVI gives NaN.
pub fn emissivity_from_ndvi(ndvi: &Raster<f64>) -> Result<Raster<f64>> {
    let v = ndvi.data();
    let mixed = v.mapv(|x| 0.047 * x.ln() + 1.009);

    let data = select(
        v.dim(),
        &[
            Branch::when(v, |x| (-1.0..WATER_SOIL_NDVI).contains(&x), WATER_EMISSIVITY),
            Branch::when(
                v,
                |x| (WATER_SOIL_NDVI..=SOIL_MIXED_NDVI).contains(&x),
                SOIL_EMISSIVITY,
            ),
            Branch::when(
                v,
                |x| x > SOIL_MIXED_NDVI && x <= MIXED_VEGETATION_NDVI,
                mixed,
            ),
            Branch::when(
                v,
                |x| x > MIXED_VEGETATION_NDVI && x <= 1.0,
                FULL_VEGETATION_EMISSIVITY,
            ),
        ],
        f64::NAN,
    )?;

    ndvi.derive(data)
}
