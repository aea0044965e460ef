//! Ranking a query fingerprint against a whole catalogue.
//!
//! Matching is a pure function of the query, a catalogue snapshot and the
//! configuration. Every entry is scored, results are ordered by descending
//! confidence with ties left in catalogue order, and the best entry is
//! judged against a strong-match threshold. The threshold only labels the
//! result; it never filters or reorders the ranking.

mod rank;

use crate::catalogue::Catalogue;
use crate::fingerprint::Fingerprint;
use crate::score::{Tolerance, DEFAULT_TOLERANCE};
use crate::trace::{trace_event, trace_span};
use crate::util::{PixMatchError, PixMatchResult};
use serde::Serialize;

/// Confidence at or above which the best entry counts as a strong match.
pub const DEFAULT_STRONG_MATCH_THRESHOLD: f64 = 60.0;

/// Confidence above which an entry is reported as a near-perfect hit.
pub const NEAR_PERFECT_THRESHOLD: f64 = 99.0;

/// Length of the top list reported to the operator.
pub const DEFAULT_TOP_N: usize = 5;

/// Matching parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Per-pixel worst-channel tolerance.
    pub tolerance: Tolerance,
    /// Strong-match confidence threshold in `[0, 100]`.
    pub strong_threshold: f64,
    /// Number of leading entries in [`MatchReport::top_entries`].
    pub top_n: usize,
    /// Score entries on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            strong_threshold: DEFAULT_STRONG_MATCH_THRESHOLD,
            top_n: DEFAULT_TOP_N,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Checks that the configuration is usable.
    pub fn validate(&self) -> PixMatchResult<()> {
        if !self.strong_threshold.is_finite() || !(0.0..=100.0).contains(&self.strong_threshold) {
            return Err(PixMatchError::InvalidConfig(
                "strong_threshold must be within [0, 100]",
            ));
        }
        Ok(())
    }
}

/// Confidence of one catalogue entry for a query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
    pub name: String,
    pub confidence: f64,
}

/// Judgement on the best-ranked entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The catalogue was empty; there is no best entry.
    NoEntries,
    /// The best entry reached the strong-match threshold.
    StrongMatch,
    /// The best entry fell short of the threshold.
    NoStrongMatch,
}

/// Ranked outcome of matching one query.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchReport {
    ranked: Vec<MatchResult>,
    strong_threshold: f64,
    top_n: usize,
}

impl MatchReport {
    /// All entries, best first.
    pub fn ranked(&self) -> &[MatchResult] {
        &self.ranked
    }

    /// Consumes the report, returning the ranking.
    pub fn into_ranked(self) -> Vec<MatchResult> {
        self.ranked
    }

    /// The top-ranked entry, or `None` for an empty catalogue.
    pub fn best(&self) -> Option<&MatchResult> {
        self.ranked.first()
    }

    /// Verdict on the best entry.
    pub fn verdict(&self) -> Verdict {
        match self.best() {
            None => Verdict::NoEntries,
            Some(best) if best.confidence >= self.strong_threshold => Verdict::StrongMatch,
            Some(_) => Verdict::NoStrongMatch,
        }
    }

    /// The best entry if it is a strong match.
    pub fn strong_match(&self) -> Option<&MatchResult> {
        self.best()
            .filter(|best| best.confidence >= self.strong_threshold)
    }

    /// At most `n` leading entries.
    pub fn top(&self, n: usize) -> &[MatchResult] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// The configured top list.
    pub fn top_entries(&self) -> &[MatchResult] {
        self.top(self.top_n)
    }

    /// Entries scoring strictly above [`NEAR_PERFECT_THRESHOLD`].
    pub fn near_perfect(&self) -> impl Iterator<Item = &MatchResult> + '_ {
        self.ranked
            .iter()
            .take_while(|r| r.confidence > NEAR_PERFECT_THRESHOLD)
    }

    /// Threshold the verdict was judged against.
    pub fn strong_threshold(&self) -> f64 {
        self.strong_threshold
    }
}

/// Ranks queries against catalogue snapshots.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher after validating `cfg`.
    pub fn new(cfg: MatchConfig) -> PixMatchResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Scores `query` against every entry of `catalogue` and ranks them.
    pub fn match_query(&self, query: &Fingerprint, catalogue: &Catalogue) -> MatchReport {
        let _span = trace_span!(
            "match_query",
            entries = catalogue.len(),
            tolerance = self.cfg.tolerance.0
        )
        .entered();

        let mut ranked = self.score(query, catalogue);
        rank::sort_desc(&mut ranked);

        let report = MatchReport {
            ranked,
            strong_threshold: self.cfg.strong_threshold,
            top_n: self.cfg.top_n,
        };
        if let Some(best) = report.best() {
            trace_event!("best_match", confidence = best.confidence);
        }
        report
    }

    #[cfg(feature = "rayon")]
    fn score(&self, query: &Fingerprint, catalogue: &Catalogue) -> Vec<MatchResult> {
        if self.cfg.parallel {
            rank::score_entries_par(query, catalogue, self.cfg.tolerance)
        } else {
            rank::score_entries(query, catalogue, self.cfg.tolerance)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn score(&self, query: &Fingerprint, catalogue: &Catalogue) -> Vec<MatchResult> {
        rank::score_entries(query, catalogue, self.cfg.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchConfig, Matcher};
    use crate::util::PixMatchError;

    #[test]
    fn threshold_outside_percentage_range_is_rejected() {
        for bad in [-1.0, 100.5, f64::NAN] {
            let cfg = MatchConfig {
                strong_threshold: bad,
                ..MatchConfig::default()
            };
            assert!(matches!(
                Matcher::new(cfg).err(),
                Some(PixMatchError::InvalidConfig(_))
            ));
        }
    }
}
