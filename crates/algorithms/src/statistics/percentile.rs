//! NaN-aware percentiles

use radcal_core::raster::Raster;
use radcal_core::{Error, Result};
use tracing::warn;

/// Percentile `q` (in percent, 0..=100) of the valid cells of a raster.
///
/// Only NaN cells are skipped; a declared no-data value is treated as
/// data. Between ranks the value is linearly interpolated, so `q = 50` of
/// `[1, 2, 3, 4]` is `2.5`. Returns `None` when the raster has no valid
/// cell.
///
/// # Errors
/// `InvalidParameter` when `q` is outside [0, 100] or NaN.
pub fn nan_percentile(raster: &Raster<f64>, q: f64) -> Result<Option<f64>> {
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::InvalidParameter {
            name: "percentile",
            value: q.to_string(),
            reason: "must be within [0, 100]".to_string(),
        });
    }

    let mut valid: Vec<f64> = raster
        .data()
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();

    if valid.is_empty() {
        warn!("Percentile requested on a raster without valid cells");
        return Ok(None);
    }

    valid.sort_unstable_by(f64::total_cmp);

    let rank = q / 100.0 * (valid.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Ok(Some(valid[lo] + (valid[hi] - valid[lo]) * frac))
}
