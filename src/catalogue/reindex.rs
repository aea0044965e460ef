//! Batch fingerprinting of reference images into a catalogue.
//!
//! Items are processed one at a time. An item that cannot be decoded is
//! recorded as a failure and the batch continues; partial success is normal.

use crate::canonical::CanonicalSize;
use crate::catalogue::Catalogue;
use crate::fingerprint::{fingerprint_bytes, fingerprint_path, Fingerprint};
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::PixMatchResult;
use std::path::PathBuf;

/// Where the encoded image for a source entry comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Decodes and fingerprints the image.
    pub fn fingerprint(&self, size: CanonicalSize) -> PixMatchResult<Fingerprint> {
        match self {
            Self::Path(path) => fingerprint_path(path, size),
            Self::Bytes(bytes) => fingerprint_bytes(bytes, size),
        }
    }
}

/// A named image to be indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub source: ImageSource,
}

impl SourceEntry {
    pub fn new(name: impl Into<String>, source: ImageSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// An item skipped during reindexing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReindexFailure {
    pub name: String,
    pub reason: String,
}

/// Per-item outcome of [`reindex_all`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Names that were inserted or overwritten, in processing order.
    pub indexed: Vec<String>,
    /// Items that were skipped, in processing order.
    pub failures: Vec<ReindexFailure>,
}

impl ReindexReport {
    pub fn indexed_count(&self) -> usize {
        self.indexed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Fingerprints every source and upserts the results into `catalogue`.
///
/// Every item is recomputed, whether or not its name is already present.
pub fn reindex_all<I>(catalogue: &mut Catalogue, sources: I, size: CanonicalSize) -> ReindexReport
where
    I: IntoIterator<Item = SourceEntry>,
{
    let _span = trace_span!("reindex_all").entered();

    let mut report = ReindexReport::default();
    for entry in sources {
        let result = entry
            .source
            .fingerprint(size)
            .and_then(|fp| catalogue.upsert(entry.name.clone(), fp));
        match result {
            Ok(_) => report.indexed.push(entry.name),
            Err(err) => {
                let reason = err.to_string();
                trace_warn!(
                    "reindex_skipped",
                    entry = entry.name.as_str(),
                    reason = reason.as_str()
                );
                report.failures.push(ReindexFailure {
                    name: entry.name,
                    reason,
                });
            }
        }
    }

    trace_event!(
        "reindex_done",
        indexed = report.indexed_count(),
        failed = report.failure_count()
    );
    report
}
