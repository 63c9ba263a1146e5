//! Top-of-atmosphere reflectance

use std::f64::consts::PI;

use crate::radiometry::{radiance, BandContext};
use radcal_core::raster::Raster;
use radcal_core::Result;

/// Convert radiance to top-of-atmosphere reflectance.
///
/// `ρ = (π * L * d²) / (ESUN * sin(θ))`
///
/// with `d` the earth-sun distance, `ESUN` the band solar irradiance and
/// `θ` the sun elevation. NaN radiance stays NaN. If `ESUN * sin(θ)` is
/// zero (sun on the horizon) every cell is NaN.
///
/// # Arguments
/// * `ctx` - Reflective band context
/// * `radiance_override` - Radiance to convert instead of the band's own,
///   e.g. a haze-corrected array
///
/// # Errors
/// - `UnsupportedBandType` on a thermal band
/// - `ShapeMismatch` when the override does not match the band dimensions
pub fn reflectance(
    ctx: &BandContext,
    radiance_override: Option<&Raster<f64>>,
) -> Result<Raster<f64>> {
    let esun = ctx.solar_irradiance("reflectance")?;

    let owned;
    let source = match radiance_override {
        Some(r) => {
            ctx.check_shape(r)?;
            r
        }
        None => {
            owned = radiance(ctx)?;
            &owned
        }
    };

    let scene = ctx.scene();
    let d = scene.earth_sun_distance;
    let denom = esun * scene.sun_elevation_radians().sin();

    let data = if denom.abs() < 1e-10 {
        source.data().mapv(|_| f64::NAN)
    } else {
        let factor = PI * d * d / denom;
        source.data().mapv(|l| l * factor)
    };

    ctx.digital_numbers().derive(data)
}
