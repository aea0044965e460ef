//! Fingerprint extraction from canonical RGB grids.
//!
//! A fingerprint is the canonical image flattened in raster order
//! (row-major, left to right, top to bottom), one `(R, G, B)` triple per
//! pixel. It serializes as a plain list of integers.

use crate::canonical::{canonicalize, decode_bytes, decode_path, CanonicalSize};
use crate::trace::trace_span;
use crate::util::{PixMatchError, PixMatchResult};
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Ordered RGB values of a canonicalized image.
///
/// Always non-empty and a whole number of `(R, G, B)` triples.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    /// Wraps raw channel values.
    ///
    /// Fails with [`PixMatchError::InvalidFingerprint`] when `values` is empty
    /// or ends in a partial pixel. The length is not checked against any
    /// canonical size; comparisons between different lengths score zero.
    pub fn from_values(values: Vec<u8>) -> PixMatchResult<Self> {
        if values.is_empty() || values.len() % 3 != 0 {
            return Err(PixMatchError::InvalidFingerprint { len: values.len() });
        }
        Ok(Self(values))
    }

    /// Flattens an already-canonical RGB image in raster order.
    ///
    /// `CanonicalSize` rejects zero dimensions, so canonical images always
    /// yield at least one pixel.
    pub fn extract(img: &RgbImage) -> Self {
        let mut values = Vec::with_capacity(3 * img.width() as usize * img.height() as usize);
        for pixel in img.pixels() {
            values.extend_from_slice(&pixel.0);
        }
        Self(values)
    }

    /// Expected length for fingerprints produced at `size`.
    pub fn len_for(size: CanonicalSize) -> usize {
        size.fingerprint_len()
    }

    /// Returns the channel values.
    pub fn values(&self) -> &[u8] {
        &self.0
    }

    /// Number of channel values (three per pixel).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed fingerprint.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.0.len() / 3
    }

    /// Iterates over `[R, G, B]` triples in raster order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.0.chunks_exact(3)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<u8>::deserialize(deserializer)?;
        Self::from_values(values).map_err(<D::Error as serde::de::Error>::custom)
    }
}

/// Canonicalizes and fingerprints a decoded image.
pub fn fingerprint_image(img: &DynamicImage, size: CanonicalSize) -> Fingerprint {
    let _span = trace_span!("fingerprint", width = size.width(), height = size.height()).entered();
    Fingerprint::extract(&canonicalize(img, size))
}

/// Decodes and fingerprints an encoded image held in memory.
pub fn fingerprint_bytes(bytes: &[u8], size: CanonicalSize) -> PixMatchResult<Fingerprint> {
    let img = decode_bytes(bytes)?;
    Ok(fingerprint_image(&img, size))
}

/// Decodes and fingerprints an image file.
pub fn fingerprint_path<P: AsRef<Path>>(
    path: P,
    size: CanonicalSize,
) -> PixMatchResult<Fingerprint> {
    let img = decode_path(path)?;
    Ok(fingerprint_image(&img, size))
}

#[cfg(test)]
mod tests {
    use super::Fingerprint;
    use crate::util::PixMatchError;
    use image::{Rgb, RgbImage};

    #[test]
    fn extract_reads_row_major() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, Rgb([1, 2, 3]));
        img.put_pixel(1, 0, Rgb([4, 5, 6]));
        img.put_pixel(0, 1, Rgb([7, 8, 9]));
        img.put_pixel(1, 1, Rgb([10, 11, 12]));

        let fp = Fingerprint::extract(&img);
        assert_eq!(fp.values(), &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(fp.pixel_count(), 4);
    }

    #[test]
    fn serializes_as_integer_list() {
        let fp = Fingerprint::from_values(vec![0, 128, 255]).unwrap();
        assert_eq!(serde_json::to_string(&fp).unwrap(), "[0,128,255]");
    }

    #[test]
    fn rejects_empty_and_partial_pixels() {
        assert_eq!(
            Fingerprint::from_values(Vec::new()),
            Err(PixMatchError::InvalidFingerprint { len: 0 })
        );
        assert_eq!(
            Fingerprint::from_values(vec![1, 2, 3, 4]),
            Err(PixMatchError::InvalidFingerprint { len: 4 })
        );
        assert!(serde_json::from_str::<Fingerprint>("[]").is_err());
        assert!(serde_json::from_str::<Fingerprint>("[1, 2, 3, 4]").is_err());
        assert_eq!(
            serde_json::from_str::<Fingerprint>("[1, 2, 3, 4, 5, 6]").unwrap().pixel_count(),
            2
        );
    }

    #[test]
    fn rejects_out_of_range_channel_values() {
        assert!(serde_json::from_str::<Fingerprint>("[0, 256, 1]").is_err());
        assert!(serde_json::from_str::<Fingerprint>("[0, -1, 1]").is_err());
    }
}
