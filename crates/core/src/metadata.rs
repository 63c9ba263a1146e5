//! Scene and band calibration metadata
//!
//! Landsat level-1 products ship a metadata file with per-band rescaling
//! constants and scene-level solar geometry. Reading that file is left to
//! an external reader; this module holds the records it produces and the
//! band lookups the calibration pipeline needs.
//!
//! The records deserialize from JSON:
//!
//! ```json
//! {
//!   "earth_sun_distance": 1.0141,
//!   "sun_elevation": 52.3,
//!   "bands": [
//!     { "number": "4", "file_name": "LC08_B4.TIF", "type": "reflectance",
//!       "radiance_minimum": -62.1, "radiance_maximum": 752.2,
//!       "quantize_cal_minimum": 1, "quantize_cal_maximum": 65535,
//!       "solar_irradiance": 1554.0 }
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Kind of sensor band, which decides the legal conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandType {
    /// Solar reflective band (visible, NIR, SWIR)
    #[serde(rename = "reflectance", alias = "reflective")]
    Reflective,
    /// Thermal infrared band
    #[serde(rename = "thermal")]
    Thermal,
}

impl fmt::Display for BandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandType::Reflective => write!(f, "reflective"),
            BandType::Thermal => write!(f, "thermal"),
        }
    }
}

/// Calibration constants of a single band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandMetadata {
    /// Band number as written in the metadata (`"4"`, `"6_VCID_1"`)
    pub number: String,
    /// File name of the band raster
    pub file_name: String,
    /// Reflective or thermal
    #[serde(rename = "type")]
    pub band_type: BandType,
    pub radiance_minimum: f64,
    pub radiance_maximum: f64,
    pub quantize_cal_minimum: f64,
    pub quantize_cal_maximum: f64,
    /// Exoatmospheric solar irradiance (reflective bands only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_irradiance: Option<f64>,
    /// Thermal conversion constant K1 (thermal bands only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k1_constant: Option<f64>,
    /// Thermal conversion constant K2 (thermal bands only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k2_constant: Option<f64>,
}

/// How to pick a band out of the scene metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandSelector {
    /// Match on the final component of the band file path
    FileName(PathBuf),
    /// Match on the band number
    Number(String),
}

impl BandSelector {
    /// Build a selector from an optional band number.
    ///
    /// A missing number, or the number `"0"`, selects by file name.
    pub fn from_number_or_path(number: Option<&str>, path: impl Into<PathBuf>) -> Self {
        match number {
            Some(n) if n != "0" => BandSelector::Number(n.to_string()),
            _ => BandSelector::FileName(path.into()),
        }
    }
}

impl fmt::Display for BandSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandSelector::FileName(path) => write!(f, "file {}", path.display()),
            BandSelector::Number(n) => write!(f, "band {}", n),
        }
    }
}

/// Scene-level metadata with all band records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    /// Earth-sun distance in astronomical units
    pub earth_sun_distance: f64,
    /// Sun elevation in degrees
    pub sun_elevation: f64,
    #[serde(default)]
    pub bands: Vec<BandMetadata>,
}

impl SceneMetadata {
    /// Load metadata from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parse metadata from a JSON string
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Find a band by its number
    pub fn band_by_number(&self, number: &str) -> Result<&BandMetadata> {
        self.bands
            .iter()
            .find(|b| b.number == number)
            .ok_or_else(|| Error::BandNotFound(format!("band {}", number)))
    }

    /// Find a band by the file name of its raster.
    ///
    /// Only the final path component is compared, so full paths work.
    pub fn band_by_file_name<P: AsRef<Path>>(&self, path: P) -> Result<&BandMetadata> {
        let path = path.as_ref();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        self.bands
            .iter()
            .find(|b| !name.is_empty() && b.file_name == name)
            .ok_or_else(|| Error::BandNotFound(format!("file {}", path.display())))
    }

    /// Resolve a band through a selector
    pub fn band(&self, selector: &BandSelector) -> Result<&BandMetadata> {
        match selector {
            BandSelector::FileName(path) => self.band_by_file_name(path),
            BandSelector::Number(n) => self.band_by_number(n),
        }
    }
}
