//! GeoTIFF decoding into [`RasterGrid`].

use std::io::Cursor;

use bytes::Bytes;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use snow_common::crs::DEFAULT_RASTER_CRS;
use snow_common::{CrsCode, SnowError, SnowResult};

use crate::grid::{GridGeometry, RasterGrid};

// GeoKey ids within the GeoKeyDirectory
const GEOGRAPHIC_TYPE_GEOKEY: u32 = 2048;
const PROJECTED_CS_TYPE_GEOKEY: u32 = 3072;

/// Decode a single-band GeoTIFF into a raster grid.
///
/// All sample formats are widened to f64. A missing or unparseable CRS tag
/// falls back to the documented default ([`DEFAULT_RASTER_CRS`]) rather than
/// failing, matching how the rest of the pipeline treats CRS-less rasters.
pub fn decode(bytes: &Bytes) -> SnowResult<RasterGrid> {
    let mut decoder = Decoder::new(Cursor::new(bytes.as_ref()))
        .map_err(|e| SnowError::DataReadError(format!("TIFF header: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| SnowError::DataReadError(format!("TIFF dimensions: {}", e)))?;

    let (origin_x, origin_y, pixel_width, pixel_height) = read_geotransform(&mut decoder)?;
    let crs = read_crs(&mut decoder);
    let nodata = read_nodata(&mut decoder);

    let data = read_samples(&mut decoder, (width as usize) * (height as usize))?;

    debug!(
        width,
        height,
        crs = %crs,
        ?nodata,
        "Decoded GeoTIFF band"
    );

    Ok(RasterGrid::new(
        GridGeometry {
            width: width as usize,
            height: height as usize,
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            crs,
        },
        data,
        nodata,
    ))
}

fn read_samples<R>(decoder: &mut Decoder<R>, expected: usize) -> SnowResult<Vec<f64>>
where
    R: std::io::Read + std::io::Seek,
{
    let image = decoder
        .read_image()
        .map_err(|e| SnowError::DataReadError(format!("TIFF strip data: {}", e)))?;

    let data: Vec<f64> = match image {
        DecodingResult::U8(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F64(buf) => buf,
    };

    if data.len() < expected {
        return Err(SnowError::DataReadError(format!(
            "TIFF strip truncated: {} of {} samples",
            data.len(),
            expected
        )));
    }

    Ok(data)
}

fn read_geotransform<R>(decoder: &mut Decoder<R>) -> SnowResult<(f64, f64, f64, f64)>
where
    R: std::io::Read + std::io::Seek,
{
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|e| SnowError::DataReadError(format!("missing ModelPixelScale: {}", e)))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|e| SnowError::DataReadError(format!("missing ModelTiepoint: {}", e)))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(SnowError::DataReadError(
            "malformed GeoTIFF georeferencing tags".to_string(),
        ));
    }

    let (sx, sy) = (scale[0], scale[1].abs());
    // Tiepoint maps raster (i, j) to model (x, y); normalize to the corner.
    let origin_x = tiepoint[3] - tiepoint[0] * sx;
    let origin_y = tiepoint[4] + tiepoint[1] * sy;

    Ok((origin_x, origin_y, sx, sy))
}

fn read_crs<R>(decoder: &mut Decoder<R>) -> CrsCode
where
    R: std::io::Read + std::io::Seek,
{
    let Ok(directory) = decoder.get_tag_u32_vec(Tag::GeoKeyDirectoryTag) else {
        return DEFAULT_RASTER_CRS;
    };

    // Entries of four: (key id, tag location, count, value). An inline EPSG
    // code has location 0.
    let epsg = directory.chunks_exact(4).find_map(|entry| {
        let inline = entry[1] == 0;
        match entry[0] {
            PROJECTED_CS_TYPE_GEOKEY | GEOGRAPHIC_TYPE_GEOKEY if inline => Some(entry[3]),
            _ => None,
        }
    });

    match epsg.map(CrsCode::from_epsg) {
        Some(Ok(crs)) => crs,
        _ => DEFAULT_RASTER_CRS,
    }
}

fn read_nodata<R>(decoder: &mut Decoder<R>) -> Option<f64>
where
    R: std::io::Read + std::io::Seek,
{
    let raw = decoder.get_tag_ascii_string(Tag::GdalNodata).ok()?;
    raw.trim_end_matches('\0').trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::GeoTiffBuilder;

    #[test]
    fn test_decode_u16_with_crs() {
        let bytes = Bytes::from(
            GeoTiffBuilder::new(3, 2)
                .origin(430_000.0, 4_420_000.0)
                .pixel_size(30.0, 30.0)
                .epsg(32613)
                .encode_u16(&[10, 20, 30, 40, 50, 60]),
        );

        let grid = decode(&bytes).unwrap();
        assert_eq!(grid.geometry.width, 3);
        assert_eq!(grid.geometry.height, 2);
        assert_eq!(
            grid.geometry.crs,
            CrsCode::Utm {
                zone: 13,
                north: true
            }
        );
        assert_eq!(grid.geometry.origin_x, 430_000.0);
        assert_eq!(grid.geometry.pixel_width, 30.0);
        assert_eq!(grid.value(0, 0), Some(10.0));
        assert_eq!(grid.value(2, 1), Some(60.0));
    }

    #[test]
    fn test_decode_f32_with_nodata() {
        let bytes = Bytes::from(
            GeoTiffBuilder::new(2, 2)
                .origin(0.0, 100.0)
                .pixel_size(10.0, 10.0)
                .epsg(32613)
                .nodata(-9999.0)
                .encode_f32(&[0.5, 1.5, -9999.0, 2.5]),
        );

        let grid = decode(&bytes).unwrap();
        assert_eq!(grid.nodata, Some(-9999.0));
        assert_eq!(grid.value(0, 1), Some(-9999.0));
        assert_eq!(grid.value(1, 1), Some(2.5));
    }

    #[test]
    fn test_missing_crs_falls_back() {
        let bytes = Bytes::from(
            GeoTiffBuilder::new(1, 1)
                .origin(0.0, 10.0)
                .pixel_size(10.0, 10.0)
                .encode_u16(&[7]),
        );

        let grid = decode(&bytes).unwrap();
        assert_eq!(grid.geometry.crs, DEFAULT_RASTER_CRS);
    }

    #[test]
    fn test_garbage_bytes_error() {
        let bytes = Bytes::from_static(b"not a tiff at all");
        assert!(matches!(decode(&bytes), Err(SnowError::DataReadError(_))));
    }
}
