//! Multispectral helpers
//!
//! - Normalized difference indices (NDVI)
//! - Ordered per-pixel branch selection used by the masking rules

mod indices;
mod select;

pub use indices::{ndvi, normalized_difference};
pub use select::{select, Branch, Choice};
