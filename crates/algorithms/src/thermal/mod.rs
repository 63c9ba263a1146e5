//! Thermal infrared retrievals
//!
//! - Land-surface emissivity from NDVI thresholds
//! - Single-channel land-surface temperature via the radiative transfer equation

mod emissivity;
mod lst;

pub use emissivity::{
    emissivity_from_ndvi, FULL_VEGETATION_EMISSIVITY, SOIL_EMISSIVITY, WATER_EMISSIVITY,
};
pub use lst::{surface_temperature, AtmosphericProfile, Emissivity};
