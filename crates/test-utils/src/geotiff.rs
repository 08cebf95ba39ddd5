//! Minimal uncompressed GeoTIFF writer for test fixtures.
//!
//! Writes single-band, single-strip, little-endian TIFFs with the GeoTIFF
//! tags the raster decoder reads: ModelPixelScale, ModelTiepoint,
//! GeoKeyDirectory and the GDAL nodata string. Only what fixtures need;
//! production rasters are decode-only.

// TIFF field types
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

// GeoKey ids
const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

/// Builder for synthetic GeoTIFF rasters.
#[derive(Debug, Clone)]
pub struct GeoTiffBuilder {
    width: u32,
    height: u32,
    /// Top-left corner of the raster in CRS units.
    origin: (f64, f64),
    /// Pixel size in CRS units (both positive).
    pixel_size: (f64, f64),
    /// EPSG code of the raster CRS; None omits the GeoKey directory.
    epsg: Option<u32>,
    nodata: Option<f64>,
}

impl GeoTiffBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            origin: (0.0, 0.0),
            pixel_size: (1.0, 1.0),
            epsg: None,
            nodata: None,
        }
    }

    /// Set the top-left corner coordinate.
    pub fn origin(mut self, x: f64, y: f64) -> Self {
        self.origin = (x, y);
        self
    }

    /// Set the pixel size (both values positive).
    pub fn pixel_size(mut self, dx: f64, dy: f64) -> Self {
        self.pixel_size = (dx, dy);
        self
    }

    pub fn epsg(mut self, code: u32) -> Self {
        self.epsg = Some(code);
        self
    }

    pub fn nodata(mut self, value: f64) -> Self {
        self.nodata = Some(value);
        self
    }

    /// Encode row-major u16 samples (reflectance DNs, Fmask).
    pub fn encode_u16(&self, samples: &[u16]) -> Vec<u8> {
        assert_eq!(samples.len(), (self.width * self.height) as usize);
        let mut strip = Vec::with_capacity(samples.len() * 2);
        for s in samples {
            strip.extend_from_slice(&s.to_le_bytes());
        }
        self.encode(strip, 16, 1)
    }

    /// Encode row-major f32 samples (fSCA and other derived products).
    pub fn encode_f32(&self, samples: &[f32]) -> Vec<u8> {
        assert_eq!(samples.len(), (self.width * self.height) as usize);
        let mut strip = Vec::with_capacity(samples.len() * 4);
        for s in samples {
            strip.extend_from_slice(&s.to_le_bytes());
        }
        self.encode(strip, 32, 3)
    }

    fn encode(&self, strip: Vec<u8>, bits_per_sample: u16, sample_format: u16) -> Vec<u8> {
        let mut out = Vec::new();

        // Header: little-endian marker, magic 42, IFD offset patched below.
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        let ifd_offset_pos = out.len();
        out.extend_from_slice(&0u32.to_le_bytes());

        let strip_offset = out.len() as u32;
        let strip_len = strip.len() as u32;
        out.extend_from_slice(&strip);
        if out.len() % 2 == 1 {
            out.push(0);
        }

        // External value area: pixel scale, tiepoint, geokeys, nodata string.
        let scale_offset = out.len() as u32;
        for v in [self.pixel_size.0, self.pixel_size.1, 0.0] {
            out.extend_from_slice(&v.to_le_bytes());
        }

        let tiepoint_offset = out.len() as u32;
        for v in [0.0, 0.0, 0.0, self.origin.0, self.origin.1, 0.0] {
            out.extend_from_slice(&v.to_le_bytes());
        }

        let geokeys = self.epsg.map(|code| self.geokey_directory(code));
        let geokey_offset = out.len() as u32;
        if let Some(keys) = &geokeys {
            for v in keys {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }

        let nodata_bytes = self.nodata.map(|v| {
            let mut s = format!("{}", v).into_bytes();
            s.push(0);
            s
        });
        let nodata_offset = out.len() as u32;
        if let Some(bytes) = &nodata_bytes {
            out.extend_from_slice(bytes);
            if out.len() % 2 == 1 {
                out.push(0);
            }
        }

        // IFD entries, ascending tag order.
        let mut entries: Vec<[u8; 12]> = Vec::new();
        entries.push(entry_long(256, self.width));
        entries.push(entry_long(257, self.height));
        entries.push(entry_short(258, bits_per_sample));
        entries.push(entry_short(259, 1)); // uncompressed
        entries.push(entry_short(262, 1)); // BlackIsZero
        entries.push(entry_long(273, strip_offset));
        entries.push(entry_short(277, 1));
        entries.push(entry_long(278, self.height));
        entries.push(entry_long(279, strip_len));
        entries.push(entry_short(339, sample_format));
        entries.push(entry_external(33550, TYPE_DOUBLE, 3, scale_offset));
        entries.push(entry_external(33922, TYPE_DOUBLE, 6, tiepoint_offset));
        if let Some(keys) = &geokeys {
            entries.push(entry_external(
                34735,
                TYPE_SHORT,
                keys.len() as u32,
                geokey_offset,
            ));
        }
        if let Some(bytes) = &nodata_bytes {
            entries.push(entry_external(
                42113,
                TYPE_ASCII,
                bytes.len() as u32,
                nodata_offset,
            ));
        }

        let ifd_offset = out.len() as u32;
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for e in &entries {
            out.extend_from_slice(e);
        }
        out.extend_from_slice(&0u32.to_le_bytes()); // no next IFD

        out[ifd_offset_pos..ifd_offset_pos + 4].copy_from_slice(&ifd_offset.to_le_bytes());
        out
    }

    fn geokey_directory(&self, epsg: u32) -> Vec<u16> {
        let epsg = u16::try_from(epsg).expect("EPSG code must fit in a GeoKey SHORT");
        let geographic = epsg == 4326;
        let (crs_key, model) = if geographic {
            (GEOGRAPHIC_TYPE, 2)
        } else {
            (PROJECTED_CS_TYPE, 1)
        };

        vec![
            1, 1, 0, 3, // directory header: version 1.1.0, 3 keys
            GT_MODEL_TYPE, 0, 1, model,
            GT_RASTER_TYPE, 0, 1, 1, // RasterPixelIsArea
            crs_key, 0, 1, epsg,
        ]
    }
}

fn entry_short(tag: u16, value: u16) -> [u8; 12] {
    let mut e = [0u8; 12];
    e[0..2].copy_from_slice(&tag.to_le_bytes());
    e[2..4].copy_from_slice(&TYPE_SHORT.to_le_bytes());
    e[4..8].copy_from_slice(&1u32.to_le_bytes());
    e[8..10].copy_from_slice(&value.to_le_bytes());
    e
}

fn entry_long(tag: u16, value: u32) -> [u8; 12] {
    let mut e = [0u8; 12];
    e[0..2].copy_from_slice(&tag.to_le_bytes());
    e[2..4].copy_from_slice(&TYPE_LONG.to_le_bytes());
    e[4..8].copy_from_slice(&1u32.to_le_bytes());
    e[8..12].copy_from_slice(&value.to_le_bytes());
    e
}

fn entry_external(tag: u16, field_type: u16, count: u32, offset: u32) -> [u8; 12] {
    let mut e = [0u8; 12];
    e[0..2].copy_from_slice(&tag.to_le_bytes());
    e[2..4].copy_from_slice(&field_type.to_le_bytes());
    e[4..8].copy_from_slice(&count.to_le_bytes());
    e[8..12].copy_from_slice(&offset.to_le_bytes());
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_magic() {
        let bytes = GeoTiffBuilder::new(2, 2).encode_u16(&[1, 2, 3, 4]);
        assert_eq!(&bytes[0..2], b"II");
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 42);
        // Strip begins right after the 8-byte header
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 1);
    }

    #[test]
    fn test_geokeys_present_when_epsg_set() {
        let with = GeoTiffBuilder::new(1, 1).epsg(32613).encode_u16(&[0]);
        let without = GeoTiffBuilder::new(1, 1).encode_u16(&[0]);
        assert!(with.len() > without.len());
    }
}
