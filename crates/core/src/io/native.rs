//! Native GeoTIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate. Georeferencing is carried through the
//! ModelPixelScale/ModelTiepoint tags and the EPSG code through the
//! GeoKey directory. For WKT-only projections, enable the `gdal` feature.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// Options for writing GeoTIFF files.
///
/// The native writer always produces uncompressed Float32 strips and has
/// nothing to configure; the type matches the GDAL backend's signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffOptions;

/// Read a GeoTIFF file into a Raster
///
/// Only the first band is read; `band` is accepted for API parity with
/// the GDAL backend.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    if band.is_some_and(|b| b != 1) {
        return Err(Error::UnsupportedDataType(
            "native reader only supports band 1".to_string(),
        ));
    }
    let file = File::open(path.as_ref())?;
    decode_geotiff(file)
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

fn decode_geotiff<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    if let Some(epsg) = read_epsg(&mut decoder) {
        raster.set_crs(Some(CRS::from_epsg(epsg)));
    }

    Ok(raster)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];

    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<u32> {
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
    if keys.len() < 4 {
        return None;
    }

    // Header is 4 shorts, then 4 shorts per key: id, location, count, value
    keys[4..]
        .chunks_exact(4)
        .find(|k| {
            (k[0] == PROJECTED_CS_TYPE_KEY || k[0] == GEOGRAPHIC_TYPE_KEY) && k[1] == 0
        })
        .map(|k| k[3] as u32)
}

/// Write a Raster to a GeoTIFF file as 32-bit float
pub fn write_geotiff<T, P>(
    raster: &Raster<T>,
    path: P,
    _options: Option<GeoTiffOptions>,
) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(raster, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    let geokeys = geo_key_directory(raster.crs().and_then(CRS::epsg));
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// GeoKey directory: model type, raster-is-area and, when known, the EPSG code
fn geo_key_directory(epsg: Option<u32>) -> Vec<u16> {
    // EPSG 4000-4999 are geographic systems, everything else is treated as projected
    let geographic = epsg.is_some_and(|code| (4000..5000).contains(&code));
    let model_type = if geographic { 2 } else { 1 };

    let mut keys = vec![
        GT_MODEL_TYPE_KEY, 0, 1, model_type,
        GT_RASTER_TYPE_KEY, 0, 1, 1,
    ];
    if let Some(code) = epsg.and_then(|c| u16::try_from(c).ok()) {
        let key = if geographic { GEOGRAPHIC_TYPE_KEY } else { PROJECTED_CS_TYPE_KEY };
        keys.extend_from_slice(&[key, 0, 1, code]);
    }

    let mut directory = vec![1, 1, 0, (keys.len() / 4) as u16];
    directory.extend(keys);
    directory
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffer_roundtrip_keeps_georeferencing() {
        let mut raster: Raster<f64> = Raster::filled(4, 6, 0.25);
        raster.set(1, 2, f64::NAN).unwrap();
        raster.set_transform(GeoTransform::new(399_960.0, 4_200_000.0, 30.0, -30.0));
        raster.set_crs(Some(CRS::utm(33, true)));

        let mut buf = Cursor::new(Vec::new());
        encode_geotiff(&raster, &mut buf).unwrap();
        buf.set_position(0);

        let loaded: Raster<f64> = decode_geotiff(buf).unwrap();
        assert_eq!(loaded.shape(), (4, 6));
        assert_eq!(loaded.transform(), raster.transform());
        assert_eq!(loaded.crs().and_then(|c| c.epsg()), Some(32633));
        assert!(loaded.get(1, 2).unwrap().is_nan());
        assert_eq!(loaded.get(0, 0).unwrap(), 0.25);
    }

    #[test]
    fn test_georeferencing_survives_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("band.tif");

        let mut raster: Raster<u16> = Raster::filled(3, 5, 812);
        raster.set_transform(GeoTransform::new(286_785.0, 4_337_415.0, 30.0, -30.0));
        raster.set_crs(Some(CRS::utm(12, true)));
        write_geotiff(&raster, &path, Some(GeoTiffOptions)).unwrap();

        let loaded: Raster<f64> = read_geotiff(&path, None).unwrap();
        assert_eq!(
            *loaded.transform(),
            GeoTransform::new(286_785.0, 4_337_415.0, 30.0, -30.0)
        );
        assert_eq!(loaded.crs().and_then(|c| c.epsg()), Some(32612));
        assert_eq!(loaded.get(2, 4).unwrap(), 812.0);
    }

    #[test]
    fn test_geokeys_without_crs() {
        let keys = geo_key_directory(None);
        assert_eq!(keys[3], 2);
        assert_eq!(keys.len(), 12);
    }
}
