//! Atmospheric correction
//!
//! Image-based corrections that need no external atmospheric data.

mod dos;

pub use dos::{dos_correction, haze_radiance, path_radiance, DosParams};
