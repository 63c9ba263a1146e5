//! Dark-object subtraction (DOS)
//!
//! The darkest valid pixels of a scene are assumed to reflect about 1% of
//! the incoming irradiance; any radiance they show above that is haze.
//! The haze estimate is subtracted from every pixel before converting to
//! reflectance (Chavez, 1996).

use std::f64::consts::PI;

use crate::radiometry::{reflectance, BandContext};
use crate::statistics::nan_percentile;
use radcal_core::raster::Raster;
use radcal_core::{Error, Result};
use tracing::debug;

/// Parameters for dark-object subtraction
#[derive(Debug, Clone)]
pub struct DosParams {
    /// Percentile (in percent) of the radiance taken as the dark object.
    /// Default: 0.01
    pub dark_object_percentile: f64,
    /// Reflectance assumed for the dark object. Default: 0.01 (1%)
    pub dark_object_reflectance: f64,
}

impl Default for DosParams {
    fn default() -> Self {
        Self {
            dark_object_percentile: 0.01,
            dark_object_reflectance: 0.01,
        }
    }
}

/// Radiance of a surface with the dark-object reflectance.
///
/// `L1% = (ρ * cos³(θ) * ESUN) / (π * d²)`
///
/// # Errors
/// `UnsupportedBandType` on a thermal band.
pub fn path_radiance(ctx: &BandContext, params: &DosParams) -> Result<f64> {
    let esun = ctx.solar_irradiance("path_radiance")?;
    let scene = ctx.scene();
    let d = scene.earth_sun_distance;
    let cos = scene.sun_elevation_radians().cos();

    Ok(params.dark_object_reflectance * cos.powi(3) * esun / (PI * d * d))
}

/// Haze radiance: dark-object radiance minus the expected path radiance.
///
/// NaN when `radiance` has no valid cell.
///
/// # Errors
/// - `UnsupportedBandType` on a thermal band
/// - `ShapeMismatch` when `radiance` does not match the band dimensions
pub fn haze_radiance(ctx: &BandContext, radiance: &Raster<f64>, params: &DosParams) -> Result<f64> {
    ctx.check_shape(radiance)?;
    let l1 = path_radiance(ctx, params)?;

    let dark = nan_percentile(radiance, params.dark_object_percentile)?.unwrap_or(f64::NAN);
    let haze = dark - l1;

    debug!(
        "DOS: dark object {:.6}, 1% radiance {:.6}, haze {:.6}",
        dark, l1, haze
    );
    Ok(haze)
}

/// Haze-corrected surface reflectance by dark-object subtraction.
///
/// Subtracts the haze radiance from every cell of `radiance`, converts the
/// result to reflectance and clips negative values to zero. NaN cells stay
/// NaN.
///
/// # Arguments
/// * `ctx` - Reflective band context
/// * `radiance` - At-sensor radiance of the band, normally `radiance(ctx)`
/// * `params` - Dark-object percentile and reflectance
///
/// # Errors
/// - `UnsupportedBandType` on a thermal band
/// - `ShapeMismatch` when `radiance` does not match the band dimensions
/// - `InvalidParameter` when the percentile is outside [0, 100]
pub fn dos_correction(
    ctx: &BandContext,
    radiance: &Raster<f64>,
    params: &DosParams,
) -> Result<Raster<f64>> {
    if !(0.0..=1.0).contains(&params.dark_object_reflectance) {
        return Err(Error::InvalidParameter {
            name: "dark_object_reflectance",
            value: params.dark_object_reflectance.to_string(),
            reason: "must be within [0, 1]".to_string(),
        });
    }

    let haze = haze_radiance(ctx, radiance, params)?;
    let corrected = radiance.derive(radiance.data().mapv(|l| l - haze))?;

    let mut corrected_reflectance = reflectance(ctx, Some(&corrected))?;
    corrected_reflectance
        .data_mut()
        .mapv_inplace(|r| if r < 0.0 { 0.0 } else { r });

    Ok(corrected_reflectance)
}
