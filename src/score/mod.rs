//! Tolerance-based pixel similarity between two fingerprints.
//!
//! Pixels are compared by their worst channel: the L-infinity distance
//! `max(|dR|, |dG|, |dB|)`. A pixel mismatches when that distance exceeds the
//! tolerance, and confidence is the percentage of pixels that did not.

use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};

/// Per-pixel tolerance used when nothing else is configured.
pub const DEFAULT_TOLERANCE: Tolerance = Tolerance(15);

/// Maximum allowed worst-channel difference for a pixel to still match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(pub u32);

impl Tolerance {
    /// Returns true when a worst-channel difference is within tolerance.
    #[inline]
    pub fn admits(self, max_diff: u8) -> bool {
        u32::from(max_diff) <= self.0
    }
}

/// Mismatch counts for one fingerprint comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelTally {
    /// Pixels whose worst-channel difference exceeded the tolerance.
    pub mismatched: usize,
    /// Pixels compared.
    pub total: usize,
}

impl PixelTally {
    /// Percentage of matching pixels in `[0, 100]`. An empty tally scores 0.
    pub fn confidence(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * (1.0 - self.mismatched as f64 / self.total as f64)
    }
}

/// Worst-channel absolute difference between two RGB triples.
#[inline]
pub fn max_channel_diff(a: &[u8], b: &[u8]) -> u8 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

/// Counts mismatched pixels, or `None` when the fingerprints have different
/// lengths and so cannot be compared.
pub fn tally(a: &Fingerprint, b: &Fingerprint, tolerance: Tolerance) -> Option<PixelTally> {
    if a.len() != b.len() {
        return None;
    }
    let mismatched = a
        .pixels()
        .zip(b.pixels())
        .filter(|(pa, pb)| !tolerance.admits(max_channel_diff(pa, pb)))
        .count();
    Some(PixelTally {
        mismatched,
        total: a.pixel_count(),
    })
}

/// Confidence percentage that `a` and `b` show the same content.
///
/// Incomparable fingerprints score `0.0` rather than failing; this only
/// happens when the canonical size changed between indexing and querying.
pub fn confidence(a: &Fingerprint, b: &Fingerprint, tolerance: Tolerance) -> f64 {
    tally(a, b, tolerance).map_or(0.0, |t| t.confidence())
}

#[cfg(test)]
mod tests {
    use super::{confidence, max_channel_diff, tally, PixelTally, Tolerance};
    use crate::fingerprint::Fingerprint;

    #[test]
    fn max_channel_diff_takes_worst_channel() {
        assert_eq!(max_channel_diff(&[10, 20, 30], &[12, 50, 29]), 30);
        assert_eq!(max_channel_diff(&[255, 0, 0], &[0, 0, 0]), 255);
    }

    #[test]
    fn difference_equal_to_tolerance_still_matches() {
        let a = Fingerprint::from_values(vec![100, 100, 100, 0, 0, 0]).unwrap();
        let b = Fingerprint::from_values(vec![115, 100, 100, 16, 0, 0]).unwrap();
        let t = tally(&a, &b, Tolerance(15)).unwrap();
        assert_eq!(
            t,
            PixelTally {
                mismatched: 1,
                total: 2
            }
        );
        assert!((confidence(&a, &b, Tolerance(15)) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn different_lengths_are_incomparable() {
        let a = Fingerprint::from_values(vec![1, 2, 3]).unwrap();
        let b = Fingerprint::from_values(vec![1, 2, 3, 1, 2, 3]).unwrap();
        assert_eq!(tally(&a, &b, Tolerance(255)), None);
        assert_eq!(confidence(&b, &a, Tolerance(255)), 0.0);
        assert_eq!(confidence(&a, &a, Tolerance(0)), 100.0);
    }

    #[test]
    fn empty_tally_scores_zero() {
        let t = PixelTally {
            mismatched: 0,
            total: 0,
        };
        assert_eq!(t.confidence(), 0.0);
    }
}
