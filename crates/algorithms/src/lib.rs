//! # radcal Algorithms
//!
//! Radiometric calibration and atmospheric correction for Landsat bands.
//!
//! ## Algorithm Categories
//!
//! - **radiometry**: DN to radiance, TOA reflectance, brightness temperature
//! - **atmosphere**: Dark object subtraction
//! - **thermal**: NDVI emissivity, single-channel land-surface temperature
//! - **imagery**: NDVI and per-pixel branch selection
//! - **statistics**: NaN-aware percentiles

pub mod atmosphere;
pub mod imagery;
pub(crate) mod maybe_rayon;
pub mod radiometry;
pub mod statistics;
pub mod thermal;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::atmosphere::{dos_correction, haze_radiance, path_radiance, DosParams};
    pub use crate::imagery::{ndvi, normalized_difference};
    pub use crate::radiometry::{
        brightness_temperature, radiance, reflectance, BandConstants, BandContext,
        RescalingFactors, SceneConstants, KELVIN_OFFSET,
    };
    pub use crate::statistics::nan_percentile;
    pub use crate::thermal::{
        emissivity_from_ndvi, surface_temperature, AtmosphericProfile, Emissivity,
    };
    pub use radcal_core::prelude::*;
}
