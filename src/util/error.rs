//! Error types for pixmatch.

use thiserror::Error;

/// Result alias for pixmatch operations.
pub type PixMatchResult<T> = std::result::Result<T, PixMatchError>;

/// Errors that can occur while fingerprinting, persisting, or matching.
///
/// Expected outcomes (absent entries, a corrupt store, fingerprints of
/// different lengths) are reported through status values instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixMatchError {
    /// The source image could not be decoded.
    #[error("cannot decode image: {reason}")]
    Decode { reason: String },
    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {reason}")]
    Io { path: String, reason: String },
    /// Entry names must contain at least one non-whitespace character.
    #[error("entry name must not be empty")]
    InvalidName,
    /// Fingerprints hold at least one pixel and whole RGB triples only.
    #[error("invalid fingerprint length {len}: expected a non-zero multiple of 3")]
    InvalidFingerprint { len: usize },
    /// The canonical resolution has a zero dimension.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// The catalogue could not be encoded for saving.
    #[error("cannot serialize catalogue: {reason}")]
    Serialize { reason: String },
}

impl PixMatchError {
    pub(crate) fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
