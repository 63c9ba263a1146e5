//! At-sensor brightness temperature

use crate::radiometry::{radiance, BandContext};
use radcal_core::raster::Raster;
use radcal_core::Result;

/// Offset between Kelvin and degrees Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

/// Convert a thermal band to brightness temperature in degrees Celsius.
///
/// `T = K2 / ln(K1 / L + 1) - 273.15`
///
/// Cells where the logarithm is undefined or zero (`L <= 0`, a
/// non-positive log argument) are NaN rather than an error, so the output
/// keeps the raster shape.
///
/// # Errors
/// `UnsupportedBandType` on a reflective band.
pub fn brightness_temperature(ctx: &BandContext) -> Result<Raster<f64>> {
    let (k1, k2) = ctx.thermal_constants("brightness_temperature")?;
    let radiance = radiance(ctx)?;

    let data = radiance.data().mapv(|l| {
        if l.is_nan() || l <= 0.0 {
            return f64::NAN;
        }
        let arg = k1 / l + 1.0;
        if arg <= 0.0 {
            return f64::NAN;
        }
        let log = arg.ln();
        if log == 0.0 {
            return f64::NAN;
        }
        k2 / log - KELVIN_OFFSET
    });

    radiance.derive(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radiometry::{BandConstants, RescalingFactors, SceneConstants};
    use approx::assert_relative_eq;
    use radcal_core::Error;

    /// Thermal context whose radiance equals `DN / 10 - 1`
    fn context(values: Vec<f64>, constants: BandConstants) -> BandContext {
        let n = values.len();
        let dn = Raster::from_vec(values, 1, n).unwrap();
        BandContext::new(
            RescalingFactors {
                radiance_minimum: -1.0,
                radiance_maximum: 24.5,
                quantize_cal_minimum: 0.0,
                quantize_cal_maximum: 255.0,
            },
            constants,
            SceneConstants { earth_sun_distance: 1.0, sun_elevation: 50.0 },
            &dn,
        )
        .unwrap()
    }

    fn landsat8_b10() -> BandConstants {
        BandConstants::Thermal { k1: 774.89, k2: 1321.08 }
    }

    #[test]
    fn test_known_temperature() {
        // DN 110 -> radiance 10
        let ctx = context(vec![110.0], landsat8_b10());
        let result = brightness_temperature(&ctx).unwrap();
        let t = result.get(0, 0).unwrap();

        assert_relative_eq!(t, 1321.08 / (774.89f64 / 10.0 + 1.0).ln() - 273.15, epsilon = 1e-9);
        assert!((t - 29.64).abs() < 0.01, "got {}", t);
    }

    #[test]
    fn test_non_positive_radiance_is_nan() {
        // DN 5 -> radiance -0.5, DN 1 -> radiance -0.9, DN 0 -> nodata
        let ctx = context(vec![5.0, 1.0, 0.0, 60.0], landsat8_b10());
        let result = brightness_temperature(&ctx).unwrap();

        assert_eq!(result.shape(), (1, 4));
        assert!(result.get(0, 0).unwrap().is_nan());
        assert!(result.get(0, 1).unwrap().is_nan());
        assert!(result.get(0, 2).unwrap().is_nan());
        assert!(result.get(0, 3).unwrap().is_finite());
    }

    #[test]
    fn test_negative_log_argument_is_nan() {
        // K1 < 0 with radiance 1: K1/L + 1 = -1
        let ctx = context(vec![20.0], BandConstants::Thermal { k1: -2.0, k2: 1321.08 });
        let result = brightness_temperature(&ctx).unwrap();
        assert!(result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_reflective_band_rejected() {
        let ctx = context(vec![110.0], BandConstants::Reflective { solar_irradiance: 1000.0 });
        let err = brightness_temperature(&ctx).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBandType { .. }));
    }
}
