//! # radcal Core
//!
//! Core types and I/O for Landsat radiometric calibration.
//!
//! This crate provides:
//! - `Raster<T>`: Generic raster grid type, NaN marks nodata in float rasters
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `CRS`: Coordinate Reference System handling
//! - Scene and band metadata records with band lookup
//! - GeoTIFF reading and atomic result persistence

pub mod crs;
pub mod error;
pub mod io;
pub mod metadata;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use metadata::{BandMetadata, BandSelector, BandType, SceneMetadata};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::metadata::{BandMetadata, BandSelector, BandType, SceneMetadata};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
