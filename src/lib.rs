//! PixMatch recognizes whether an image shows the same content as one of a
//! catalogue of reference images, tolerating resizing and lossy
//! re-compression.
//!
//! Images are resampled to a fixed canonical RGB grid and flattened into a
//! fingerprint. Fingerprints are compared pixel by pixel using the worst
//! channel difference against a tolerance, and a query is ranked against
//! every catalogue entry. Catalogues persist as JSON.
//!
//! ```no_run
//! use pixmatch::{fingerprint_path, CanonicalSize, CatalogueStore, MatchConfig, Matcher};
//!
//! # fn main() -> pixmatch::PixMatchResult<()> {
//! let store = CatalogueStore::new("image_index.json");
//! let catalogue = store.load().catalogue;
//! let query = fingerprint_path("query.png", CanonicalSize::DEFAULT)?;
//! let report = Matcher::new(MatchConfig::default())?.match_query(&query, &catalogue);
//! if let Some(best) = report.strong_match() {
//!     println!("{} ({:.2}%)", best.name, best.confidence);
//! }
//! # Ok(())
//! # }
//! ```

pub mod canonical;
pub mod catalogue;
pub mod fingerprint;
pub mod matcher;
pub mod score;
mod trace;
pub mod util;

pub use canonical::{canonicalize, decode_bytes, decode_path, CanonicalSize};
pub use catalogue::{
    reindex_all, Catalogue, CatalogueEntry, CatalogueStore, ImageSource, LoadOutcome, Removal,
    ReindexFailure, ReindexReport, SourceEntry, StoreStatus, Upsert,
};
pub use fingerprint::{fingerprint_bytes, fingerprint_image, fingerprint_path, Fingerprint};
pub use matcher::{
    MatchConfig, MatchReport, MatchResult, Matcher, Verdict, DEFAULT_STRONG_MATCH_THRESHOLD,
    DEFAULT_TOP_N, NEAR_PERFECT_THRESHOLD,
};
pub use score::{confidence, PixelTally, Tolerance, DEFAULT_TOLERANCE};
pub use util::{PixMatchError, PixMatchResult};
