//! I/O operations for reading and writing band rasters

#[cfg(feature = "gdal")]
mod gdal_io;
#[cfg(not(feature = "gdal"))]
mod native;

#[cfg(feature = "gdal")]
pub use gdal_io::{read_geotiff, write_geotiff, GeoTiffOptions};

#[cfg(not(feature = "gdal"))]
pub use native::{read_geotiff, write_geotiff, GeoTiffOptions};

use crate::error::{Error, Result};
use crate::raster::{Raster, RasterElement};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Persist a derived array as a single-band Float32 GeoTIFF.
///
/// Raster size, geotransform and CRS are copied from `reference`, which is
/// normally the band the array was computed from. The file is written to
/// a temporary sibling and renamed over `path`, so readers never observe a
/// partially written result. An existing file is replaced and keeps its
/// permissions; a new file is readable by everyone.
///
/// # Errors
/// `ShapeMismatch` when `array` and `reference` dimensions differ.
pub fn save_as_georaster<R, P>(array: &Raster<f64>, path: P, reference: &Raster<R>) -> Result<()>
where
    R: RasterElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    reference.check_shape(array.shape())?;

    let (rows, cols) = array.shape();
    let mut output: Raster<f32> = reference.with_same_meta(rows, cols);
    output
        .data_mut()
        .zip_mut_with(array.data(), |out, &v| *out = v as f32);
    output.set_nodata(Some(f32::NAN));

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".radcal-")
        .suffix(".tif")
        .tempfile_in(dir)?;

    write_geotiff(&output, tmp.path(), None)?;

    let permissions = match fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} x {} raster to {}", cols, rows, path.display());
    Ok(())
}

// Temporary files are created owner-only
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CRS;
    use crate::raster::GeoTransform;

    fn reference() -> Raster<u16> {
        let mut r = Raster::filled(8, 10, 100);
        r.set_transform(GeoTransform::new(600_000.0, 5_000_000.0, 30.0, -30.0));
        r.set_crs(Some(CRS::utm(18, true)));
        r
    }

    #[test]
    fn test_save_copies_reference_georeferencing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radiance.tif");

        let mut array = Raster::filled(8, 10, 3.5);
        array.set(0, 0, f64::NAN).unwrap();
        save_as_georaster(&array, &path, &reference()).unwrap();

        let loaded: Raster<f64> = read_geotiff(&path, None).unwrap();
        assert_eq!(loaded.shape(), (8, 10));
        assert_eq!(loaded.transform(), reference().transform());
        assert_eq!(loaded.crs().and_then(|c| c.epsg()), Some(32618));
        assert!(loaded.get(0, 0).unwrap().is_nan());
        assert_eq!(loaded.get(7, 9).unwrap(), 3.5);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tif");
        std::fs::write(&path, b"stale").unwrap();

        save_as_georaster(&Raster::filled(8, 10, 1.0), &path, &reference()).unwrap();

        let loaded: Raster<f64> = read_geotiff(&path, None).unwrap();
        assert_eq!(loaded.get(3, 3).unwrap(), 1.0);
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file should be renamed away");
    }

    #[test]
    fn test_save_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_as_georaster(
            &Raster::filled(10, 8, 1.0),
            dir.path().join("bad.tif"),
            &reference(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tif");
        std::fs::write(&path, b"stale").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        save_as_georaster(&Raster::filled(8, 10, 1.0), &path, &reference()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.tif");

        save_as_georaster(&Raster::filled(8, 10, 1.0), &path, &reference()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(not(feature = "gdal"))]
    #[test]
    fn test_output_is_float32() {
        use tiff::decoder::Decoder;
        use tiff::ColorType;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lst.tif");
        save_as_georaster(&Raster::filled(8, 10, 301.25), &path, &reference()).unwrap();

        let mut decoder = Decoder::new(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(decoder.colortype().unwrap(), ColorType::Gray(32));
    }

    #[cfg(feature = "gdal")]
    #[test]
    fn test_output_is_float32() {
        use gdal::raster::GdalDataType;
        use gdal::Dataset;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lst.tif");
        save_as_georaster(&Raster::filled(8, 10, 301.25), &path, &reference()).unwrap();

        let dataset = Dataset::open(&path).unwrap();
        let band = dataset.rasterband(1).unwrap();
        assert_eq!(band.band_type(), GdalDataType::Float32);
    }
}
