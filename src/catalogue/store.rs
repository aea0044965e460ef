//! Durable JSON storage for a catalogue.
//!
//! The whole catalogue is read on load and written on save. Saving goes
//! through a temporary file in the target directory that is renamed over the
//! store, so a failed save never leaves a half-written file behind.

use crate::catalogue::Catalogue;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{PixMatchError, PixMatchResult};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// What [`CatalogueStore::load`] found on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreStatus {
    /// No store yet; the catalogue starts empty.
    Missing,
    /// The store was read successfully.
    Loaded,
    /// The store exists but is not a valid catalogue; starting over.
    Corrupt { reason: String },
    /// The store exists but could not be read; starting over.
    Unreadable { reason: String },
}

impl StoreStatus {
    /// Returns true when the caller should warn that stored data was ignored.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Corrupt { .. } | Self::Unreadable { .. })
    }
}

/// Result of loading a store: always a usable catalogue plus its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOutcome {
    pub catalogue: Catalogue,
    pub status: StoreStatus,
}

impl LoadOutcome {
    fn empty(status: StoreStatus) -> Self {
        Self {
            catalogue: Catalogue::new(),
            status,
        }
    }
}

/// A catalogue persisted as a pretty-printed JSON object at `path`.
#[derive(Clone, Debug)]
pub struct CatalogueStore {
    path: PathBuf,
}

impl CatalogueStore {
    /// Creates a handle for the store at `path`. Nothing is read yet.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the store. Never fails: a missing, unreadable or malformed store
    /// yields an empty catalogue and a status describing why.
    pub fn load(&self) -> LoadOutcome {
        let _span = trace_span!("load_catalogue").entered();

        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return LoadOutcome::empty(StoreStatus::Missing);
            }
            Err(err) => {
                let reason = err.to_string();
                trace_warn!("catalogue_unreadable", reason = reason.as_str());
                return LoadOutcome::empty(StoreStatus::Unreadable { reason });
            }
        };

        match serde_json::from_str::<Catalogue>(&text) {
            Ok(catalogue) => {
                trace_event!("catalogue_loaded", entries = catalogue.len());
                LoadOutcome {
                    catalogue,
                    status: StoreStatus::Loaded,
                }
            }
            Err(err) => {
                let reason = err.to_string();
                trace_warn!("catalogue_corrupt", reason = reason.as_str());
                LoadOutcome::empty(StoreStatus::Corrupt { reason })
            }
        }
    }

    /// Replaces the store with `catalogue`.
    pub fn save(&self, catalogue: &Catalogue) -> PixMatchResult<()> {
        let _span = trace_span!("save_catalogue", entries = catalogue.len()).entered();

        let bytes = encode_pretty(catalogue)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|err| PixMatchError::io(&dir, err))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|err| PixMatchError::io(&dir, err))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|err| PixMatchError::io(tmp.path(), err))?;
        tmp.persist(&self.path)
            .map_err(|err| PixMatchError::io(&self.path, err.error))?;

        trace_event!("catalogue_saved", entries = catalogue.len());
        Ok(())
    }
}

fn encode_pretty(catalogue: &Catalogue) -> PixMatchResult<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    catalogue
        .serialize(&mut ser)
        .map_err(|err| PixMatchError::Serialize {
            reason: err.to_string(),
        })?;
    out.push(b'\n');
    Ok(out)
}
