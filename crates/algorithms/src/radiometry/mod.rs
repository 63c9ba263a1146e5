//! Radiometric conversion chain
//!
//! Digital number → at-sensor radiance → top-of-atmosphere reflectance
//! (reflective bands) or brightness temperature (thermal bands).

mod brightness;
mod context;
mod radiance;
mod reflectance;

pub use brightness::{brightness_temperature, KELVIN_OFFSET};
pub use context::{BandConstants, BandContext, RescalingFactors, SceneConstants};
pub use radiance::radiance;
pub use reflectance::reflectance;
