//! Land-surface temperature from a single thermal band
//!
//! Inverts the radiative transfer equation
//!
//! ```text
//! L_sensor = τ * (ε * B(T) + (1 - ε) * L↓) + L↑
//! ```
//!
//! for the blackbody radiance `B(T)` of the surface, then inverts Planck's
//! law with the band constants K1 and K2. The atmospheric terms (L↑, L↓, τ)
//! come from an external atmospheric profile, e.g. the NASA atmospheric
//! correction parameter calculator.

use ndarray::{Array2, Zip};

use crate::imagery::{select, Branch};
use crate::radiometry::{radiance, BandContext};
use crate::thermal::emissivity_from_ndvi;
use radcal_core::raster::Raster;
use radcal_core::{Error, Result};

/// Scene-wide atmospheric parameters for the thermal band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphericProfile {
    /// Upwelling (path) radiance L↑
    pub upwelling_radiance: f64,
    /// Downwelling (sky) radiance L↓
    pub downwelling_radiance: f64,
    /// Atmospheric transmittance τ
    pub transmittance: f64,
}

/// Source of the land-surface emissivity
#[derive(Debug, Clone, Copy)]
pub enum Emissivity<'a> {
    /// Caller-supplied emissivity, used unmodified
    Raster(&'a Raster<f64>),
    /// Estimate emissivity from NDVI with the threshold method
    FromNdvi(&'a Raster<f64>),
}

/// Retrieve land-surface temperature in Kelvin.
///
/// With `L` the band radiance and `ε` the emissivity:
///
/// ```text
/// L_s = (L - L↑) / (τ * ε) - ((1 - ε) / ε) * L↓
/// T   = K2 / ln(K1 / L_s + 1)
/// ```
///
/// Degenerate cells are NaN instead of errors: `ε <= 0` (the reflected
/// sky term then uses a ratio of 1), a zero or negative Planck argument,
/// and any non-finite logarithm.
///
/// # Errors
/// - `UnsupportedBandType` on a reflective band
/// - `ShapeMismatch` when the emissivity or NDVI raster does not match the band
/// - `InvalidParameter` when an atmospheric parameter is not finite
pub fn surface_temperature(
    ctx: &BandContext,
    emissivity: Emissivity<'_>,
    atmosphere: &AtmosphericProfile,
) -> Result<Raster<f64>> {
    let (k1, k2) = ctx.thermal_constants("surface_temperature")?;
    check_profile(atmosphere)?;

    let lse = match emissivity {
        Emissivity::Raster(e) => {
            ctx.check_shape(e)?;
            e.data().clone()
        }
        Emissivity::FromNdvi(ndvi) => {
            ctx.check_shape(ndvi)?;
            emissivity_from_ndvi(ndvi)?.into_array()
        }
    };

    let radiance = radiance(ctx)?;
    let shape = radiance.shape();
    let AtmosphericProfile {
        upwelling_radiance: up,
        downwelling_radiance: down,
        transmittance: tau,
    } = *atmosphere;

    let emitted = Zip::from(radiance.data())
        .and(&lse)
        .map_collect(|&l, &e| (l - up) / (tau * e));
    let reflected = emissivity_ratio(&lse)? * down;
    let surface_radiance = emitted - reflected;

    let planck = surface_radiance.mapv(|ls| k1 / ls + 1.0);
    let degenerate = Zip::from(&planck)
        .and(&lse)
        .map_collect(|&p, &e| p == 0.0 || e.is_nan() || e <= 0.0);
    let log_term = select(shape, &[Branch::new(degenerate, 1.0)], planck)?.mapv(f64::ln);

    let kelvin = log_term.mapv(|t| k2 / t);
    let lst = select(
        shape,
        &[
            Branch::when(&log_term, |t| t == 0.0, f64::NAN),
            Branch::when(&log_term, |t| t > 0.0 && t.is_finite(), kelvin),
        ],
        f64::NAN,
    )?;

    radiance.derive(lst)
}

/// `(1 - ε) / ε` where `ε > 0`, 1 elsewhere
fn emissivity_ratio(lse: &Array2<f64>) -> Result<Array2<f64>> {
    select(
        lse.dim(),
        &[Branch::when(lse, |e| e > 0.0, lse.mapv(|e| (1.0 - e) / e))],
        1.0,
    )
}

fn check_profile(atmosphere: &AtmosphericProfile) -> Result<()> {
    let fields = [
        ("upwelling_radiance", atmosphere.upwelling_radiance),
        ("downwelling_radiance", atmosphere.downwelling_radiance),
        ("transmittance", atmosphere.transmittance),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            return Err(Error::InvalidParameter {
                name,
                value: value.to_string(),
                reason: "must be finite".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radiometry::{BandConstants, RescalingFactors, SceneConstants};
    use approx::assert_relative_eq;
    use ndarray::array;

    const K1: f64 = 774.8853;
    const K2: f64 = 1321.0789;

    fn profile() -> AtmosphericProfile {
        AtmosphericProfile {
            upwelling_radiance: 1.5,
            downwelling_radiance: 2.5,
            transmittance: 0.85,
        }
    }

    /// Thermal context whose radiance equals `DN / 10 - 1`
    fn context(values: Vec<f64>, rows: usize, cols: usize, constants: BandConstants) -> BandContext {
        let dn = Raster::from_vec(values, rows, cols).unwrap();
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

    fn thermal(values: Vec<f64>, rows: usize, cols: usize) -> BandContext {
        context(values, rows, cols, BandConstants::Thermal { k1: K1, k2: K2 })
    }

    fn expected_lst(l: f64, e: f64, p: &AtmosphericProfile) -> f64 {
        let ls = (l - p.upwelling_radiance) / (p.transmittance * e)
            - (1.0 - e) / e * p.downwelling_radiance;
        K2 / (K1 / ls + 1.0).ln()
    }

    #[test]
    fn test_known_temperature() {
        let ctx = thermal(vec![110.0; 4], 2, 2);
        let lse = Raster::filled(2, 2, 0.97);

        let result = surface_temperature(&ctx, Emissivity::Raster(&lse), &profile()).unwrap();
        let t = result.get(1, 0).unwrap();

        let rad = radiance(&ctx).unwrap().get(1, 0).unwrap();
        assert_relative_eq!(t, expected_lst(rad, 0.97, &profile()), epsilon = 1e-9);
        assert!(t > 290.0 && t < 320.0, "implausible LST {}", t);
    }

    #[test]
    fn test_ndvi_drives_emissivity() {
        let ctx = thermal(vec![110.0, 95.0, 120.0, 100.0], 2, 2);
        let ndvi = Raster::from_vec(vec![0.5, -0.5, 0.0, 0.9], 2, 2).unwrap();
        let lse = Raster::from_vec(
            vec![0.047 * 0.5f64.ln() + 1.009, 0.995, 0.985, 0.990],
            2,
            2,
        )
        .unwrap();

        let from_ndvi = surface_temperature(&ctx, Emissivity::FromNdvi(&ndvi), &profile()).unwrap();
        let explicit = surface_temperature(&ctx, Emissivity::Raster(&lse), &profile()).unwrap();

        for (a, b) in from_ndvi.data().iter().zip(explicit.data().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_emissivity_ratio_is_one() {
        let lse = array![[0.0, 0.5], [-0.2, 0.98]];
        let ratio = emissivity_ratio(&lse).unwrap();

        assert_eq!(ratio[(0, 0)], 1.0);
        assert_eq!(ratio[(1, 0)], 1.0);
        assert_relative_eq!(ratio[(0, 1)], 1.0);
        assert_relative_eq!(ratio[(1, 1)], 0.02 / 0.98, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_emissivity_masks_only_that_cell() {
        let ctx = thermal(vec![110.0; 4], 2, 2);
        let mut lse = Raster::filled(2, 2, 0.97);
        lse.set(0, 1, 0.0).unwrap();

        let result = surface_temperature(&ctx, Emissivity::Raster(&lse), &profile()).unwrap();
        assert!(result.get(0, 1).unwrap().is_nan());
        assert!(result.get(0, 0).unwrap().is_finite());
        assert!(result.get(1, 1).unwrap().is_finite());
    }

    #[test]
    fn test_degenerate_cells_are_nan() {
        // DN 0 is nodata; DN 20 gives radiance 1 < L↑, a negative Planck argument
        let ctx = thermal(vec![0.0, 20.0, 110.0], 1, 3);
        let lse = Raster::filled(1, 3, 0.97);

        let result = surface_temperature(&ctx, Emissivity::Raster(&lse), &profile()).unwrap();
        assert!(result.get(0, 0).unwrap().is_nan());
        assert!(result.get(0, 1).unwrap().is_nan());
        assert!(result.get(0, 2).unwrap().is_finite());
    }

    #[test]
    fn test_reflective_band_rejected() {
        let ctx = context(vec![110.0; 4], 2, 2, BandConstants::Reflective { solar_irradiance: 1500.0 });
        let lse = Raster::filled(2, 2, 0.97);
        let err = surface_temperature(&ctx, Emissivity::Raster(&lse), &profile()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBandType { .. }));
    }

    #[test]
    fn test_shape_mismatch() {
        let ctx = thermal(vec![110.0; 4], 2, 2);
        let small = Raster::filled(1, 2, 0.5);

        let err = surface_temperature(&ctx, Emissivity::Raster(&small), &profile()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        let err = surface_temperature(&ctx, Emissivity::FromNdvi(&small), &profile()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_non_finite_profile_rejected() {
        let ctx = thermal(vec![110.0; 4], 2, 2);
        let lse = Raster::filled(2, 2, 0.97);
        let bad = AtmosphericProfile { transmittance: f64::NAN, ..profile() };
        let err = surface_temperature(&ctx, Emissivity::Raster(&lse), &bad).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "transmittance", .. }));
    }
}
