//! Band context: calibration constants plus the raw digital numbers
//!
//! A `BandContext` is built once per band from the scene metadata and the
//! band raster, and is read-only afterwards. Every conversion in this crate
//! takes it by reference.

use radcal_core::io::read_geotiff;
use radcal_core::raster::{Raster, RasterElement};
use radcal_core::{BandMetadata, BandSelector, BandType, Error, Result, SceneMetadata};
use std::path::Path;

/// Linear rescaling from quantized counts to at-sensor radiance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RescalingFactors {
    /// Spectral radiance scaled to `quantize_cal_minimum` (Lmin)
    pub radiance_minimum: f64,
    /// Spectral radiance scaled to `quantize_cal_maximum` (Lmax)
    pub radiance_maximum: f64,
    /// Minimum quantized calibrated pixel value (QCALmin)
    pub quantize_cal_minimum: f64,
    /// Maximum quantized calibrated pixel value (QCALmax)
    pub quantize_cal_maximum: f64,
}

impl RescalingFactors {
    /// Radiance per digital number, `(Lmax - Lmin) / (QCALmax - QCALmin)`
    pub fn gain(&self) -> f64 {
        (self.radiance_maximum - self.radiance_minimum)
            / (self.quantize_cal_maximum - self.quantize_cal_minimum)
    }

    /// Radiance for a single digital number, without nodata masking
    pub fn apply(&self, dn: f64) -> f64 {
        self.gain() * (dn - self.quantize_cal_minimum) + self.radiance_minimum
    }
}

/// Band-type specific constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandConstants {
    Reflective {
        /// Mean exoatmospheric solar irradiance (ESUN)
        solar_irradiance: f64,
    },
    Thermal {
        /// K1 thermal conversion constant
        k1: f64,
        /// K2 thermal conversion constant, in Kelvin
        k2: f64,
    },
}

impl BandConstants {
    pub fn band_type(&self) -> BandType {
        match self {
            BandConstants::Reflective { .. } => BandType::Reflective,
            BandConstants::Thermal { .. } => BandType::Thermal,
        }
    }
}

/// Scene-level solar geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConstants {
    /// Earth-sun distance in astronomical units
    pub earth_sun_distance: f64,
    /// Sun elevation in degrees
    pub sun_elevation: f64,
}

impl SceneConstants {
    /// Sun elevation in radians
    pub fn sun_elevation_radians(&self) -> f64 {
        self.sun_elevation.to_radians()
    }
}

/// Loaded calibration state for one band
#[derive(Debug, Clone)]
pub struct BandContext {
    rescaling: RescalingFactors,
    constants: BandConstants,
    scene: SceneConstants,
    digital_numbers: Raster<f64>,
}

impl BandContext {
    /// Build a context from explicit constants.
    ///
    /// The digital numbers are cast to `f64` unchanged; a zero count is
    /// sensor no-data and is masked by the radiance conversion.
    ///
    /// # Errors
    /// `InvalidParameter` when a constant is not finite, QCALmax equals
    /// QCALmin, the earth-sun distance is not positive or the sun
    /// elevation is outside [0, 90] degrees.
    pub fn new<T: RasterElement>(
        rescaling: RescalingFactors,
        constants: BandConstants,
        scene: SceneConstants,
        digital_numbers: &Raster<T>,
    ) -> Result<Self> {
        let mut values = vec![
            ("radiance_minimum", rescaling.radiance_minimum),
            ("radiance_maximum", rescaling.radiance_maximum),
            ("quantize_cal_minimum", rescaling.quantize_cal_minimum),
            ("quantize_cal_maximum", rescaling.quantize_cal_maximum),
            ("earth_sun_distance", scene.earth_sun_distance),
            ("sun_elevation", scene.sun_elevation),
        ];
        match constants {
            BandConstants::Reflective { solar_irradiance } => {
                values.push(("solar_irradiance", solar_irradiance));
            }
            BandConstants::Thermal { k1, k2 } => {
                values.push(("k1_constant", k1));
                values.push(("k2_constant", k2));
            }
        }
        for (name, value) in values {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
        }

        if rescaling.quantize_cal_maximum == rescaling.quantize_cal_minimum {
            return Err(invalid(
                "quantize_cal_maximum",
                rescaling.quantize_cal_maximum,
                "must differ from quantize_cal_minimum",
            ));
        }
        if scene.earth_sun_distance <= 0.0 {
            return Err(invalid(
                "earth_sun_distance",
                scene.earth_sun_distance,
                "must be positive",
            ));
        }
        if !(0.0..=90.0).contains(&scene.sun_elevation) {
            return Err(invalid(
                "sun_elevation",
                scene.sun_elevation,
                "must be within [0, 90] degrees",
            ));
        }

        Ok(Self {
            rescaling,
            constants,
            scene,
            digital_numbers: digital_numbers.to_f64(),
        })
    }

    /// Build a context from a band record and the scene it belongs to
    pub fn from_metadata<T: RasterElement>(
        scene: &SceneMetadata,
        band: &BandMetadata,
        digital_numbers: &Raster<T>,
    ) -> Result<Self> {
        let rescaling = RescalingFactors {
            radiance_minimum: band.radiance_minimum,
            radiance_maximum: band.radiance_maximum,
            quantize_cal_minimum: band.quantize_cal_minimum,
            quantize_cal_maximum: band.quantize_cal_maximum,
        };

        let constants = match band.band_type {
            BandType::Reflective => BandConstants::Reflective {
                solar_irradiance: required(band.solar_irradiance, "solar_irradiance")?,
            },
            BandType::Thermal => BandConstants::Thermal {
                k1: required(band.k1_constant, "k1_constant")?,
                k2: required(band.k2_constant, "k2_constant")?,
            },
        };

        let scene = SceneConstants {
            earth_sun_distance: scene.earth_sun_distance,
            sun_elevation: scene.sun_elevation,
        };

        Self::new(rescaling, constants, scene, digital_numbers)
    }

    /// Resolve a band in the scene metadata and read its raster from disk.
    ///
    /// # Errors
    /// `BandNotFound` when the selector matches no band record.
    pub fn open<P: AsRef<Path>>(
        band_path: P,
        scene: &SceneMetadata,
        selector: &BandSelector,
    ) -> Result<Self> {
        let band = scene.band(selector)?;
        let digital_numbers: Raster<f64> = read_geotiff(band_path.as_ref(), None)?;
        Self::from_metadata(scene, band, &digital_numbers)
    }

    pub fn band_type(&self) -> BandType {
        self.constants.band_type()
    }

    pub fn rescaling(&self) -> &RescalingFactors {
        &self.rescaling
    }

    pub fn constants(&self) -> &BandConstants {
        &self.constants
    }

    pub fn scene(&self) -> &SceneConstants {
        &self.scene
    }

    /// Raw digital numbers as read, with the band's georeferencing
    pub fn digital_numbers(&self) -> &Raster<f64> {
        &self.digital_numbers
    }

    /// Raster dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.digital_numbers.shape()
    }

    /// Fail with `ShapeMismatch` unless `raster` matches the band dimensions
    pub fn check_shape(&self, raster: &Raster<f64>) -> Result<()> {
        self.digital_numbers.check_shape(raster.shape())
    }

    /// Solar irradiance of a reflective band.
    ///
    /// `operation` names the caller in the `UnsupportedBandType` error.
    pub fn solar_irradiance(&self, operation: &'static str) -> Result<f64> {
        match self.constants {
            BandConstants::Reflective { solar_irradiance } => Ok(solar_irradiance),
            BandConstants::Thermal { .. } => Err(Error::UnsupportedBandType {
                operation,
                expected: BandType::Reflective,
                found: BandType::Thermal,
            }),
        }
    }

    /// `(K1, K2)` of a thermal band
    pub fn thermal_constants(&self, operation: &'static str) -> Result<(f64, f64)> {
        match self.constants {
            BandConstants::Thermal { k1, k2 } => Ok((k1, k2)),
            BandConstants::Reflective { .. } => Err(Error::UnsupportedBandType {
                operation,
                expected: BandType::Thermal,
                found: BandType::Reflective,
            }),
        }
    }

    /// Persist a derived array with this band's size and georeferencing
    pub fn save<P: AsRef<Path>>(&self, array: &Raster<f64>, path: P) -> Result<()> {
        radcal_core::io::save_as_georaster(array, path, &self.digital_numbers)
    }
}

fn invalid(name: &'static str, value: f64, reason: &str) -> Error {
    Error::InvalidParameter {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn required(value: Option<f64>, name: &'static str) -> Result<f64> {
    value.ok_or_else(|| Error::InvalidParameter {
        name,
        value: "missing".to_string(),
        reason: "required for this band type".to_string(),
    })
}
