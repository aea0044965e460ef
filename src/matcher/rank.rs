//! Scoring and ordering of catalogue entries for one query.

use crate::catalogue::Catalogue;
use crate::fingerprint::Fingerprint;
use crate::matcher::MatchResult;
use crate::score::{confidence, Tolerance};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Scores every entry, in catalogue order.
pub(crate) fn score_entries(
    query: &Fingerprint,
    catalogue: &Catalogue,
    tolerance: Tolerance,
) -> Vec<MatchResult> {
    catalogue
        .iter()
        .map(|entry| MatchResult {
            name: entry.name().to_owned(),
            confidence: confidence(query, entry.fingerprint(), tolerance),
        })
        .collect()
}

/// Parallel variant of [`score_entries`]; output order is catalogue order.
#[cfg(feature = "rayon")]
pub(crate) fn score_entries_par(
    query: &Fingerprint,
    catalogue: &Catalogue,
    tolerance: Tolerance,
) -> Vec<MatchResult> {
    catalogue
        .entries()
        .par_iter()
        .map(|entry| MatchResult {
            name: entry.name().to_owned(),
            confidence: confidence(query, entry.fingerprint(), tolerance),
        })
        .collect()
}

/// Sorts by descending confidence. The sort is stable, so equal scores keep
/// catalogue order.
pub(crate) fn sort_desc(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
