//! Canonicalization of arbitrary images to a fixed RGB grid.
//!
//! Every image is reduced to exactly three channels (alpha is discarded, not
//! composited) and resampled with a Lanczos3 filter to the canonical size.
//! Fingerprints are only comparable when they share a canonical size, so the
//! size is fixed per catalogue.

use crate::trace::trace_span;
use crate::util::{PixMatchError, PixMatchResult};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use std::path::Path;

/// Fixed resolution every image is resampled to before fingerprinting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalSize {
    width: u32,
    height: u32,
}

impl CanonicalSize {
    /// 64x64, giving fingerprints of 12288 values.
    pub const DEFAULT: Self = Self {
        width: 64,
        height: 64,
    };

    /// Creates a canonical size; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> PixMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(PixMatchError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Returns the canonical width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the canonical height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in the canonical grid.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length of every fingerprint produced at this size.
    pub fn fingerprint_len(&self) -> usize {
        3 * self.pixel_count()
    }
}

impl Default for CanonicalSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Converts `img` to RGB and resamples it to `size`.
pub fn canonicalize(img: &DynamicImage, size: CanonicalSize) -> RgbImage {
    let _span = trace_span!(
        "canonicalize",
        src_width = img.width(),
        src_height = img.height()
    )
    .entered();

    let rgb = img.to_rgb8();
    if rgb.dimensions() == (size.width, size.height) {
        return rgb;
    }
    imageops::resize(&rgb, size.width, size.height, FilterType::Lanczos3)
}

/// Decodes an in-memory encoded image, guessing the format from its contents.
pub fn decode_bytes(bytes: &[u8]) -> PixMatchResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|err| PixMatchError::Decode {
        reason: err.to_string(),
    })
}

/// Opens and decodes an image file.
///
/// A missing or unreadable file is reported as [`PixMatchError::Decode`]:
/// to the caller it is simply an image that cannot be fingerprinted.
pub fn decode_path<P: AsRef<Path>>(path: P) -> PixMatchResult<DynamicImage> {
    let path = path.as_ref();
    image::open(path).map_err(|err| PixMatchError::Decode {
        reason: format!("{}: {err}", path.display()),
    })
}
