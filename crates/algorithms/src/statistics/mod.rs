//! Raster statistics used by the correction algorithms

mod percentile;

pub use percentile::nan_percentile;
