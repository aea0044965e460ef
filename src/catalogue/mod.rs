//! Named collection of reference fingerprints.
//!
//! The catalogue keeps entries in insertion order. Overwriting an existing
//! name keeps its position, and the durable JSON object is written and read
//! in the same order, so ranking ties resolve identically across sessions.
//! A name index beside the ordered entries keeps lookups constant-time.

mod reindex;
pub mod source;
mod store;

pub use reindex::{reindex_all, ImageSource, ReindexFailure, ReindexReport, SourceEntry};
pub use store::{CatalogueStore, LoadOutcome, StoreStatus};

use crate::fingerprint::Fingerprint;
use crate::util::{PixMatchError, PixMatchResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// One named reference fingerprint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogueEntry {
    name: String,
    fingerprint: Fingerprint,
}

impl CatalogueEntry {
    /// Display name, unique within its catalogue.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored fingerprint.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

/// Outcome of [`Catalogue::upsert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Outcome of [`Catalogue::remove`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
}

/// Insertion-ordered mapping from name to fingerprint.
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
    // name -> position in `entries`
    index: HashMap<String, usize>,
}

// The index is derived from `entries`, so equality only looks at entries.
impl PartialEq for Catalogue {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Catalogue {}

impl Catalogue {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the fingerprint stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Fingerprint> {
        self.position(name).map(|idx| &self.entries[idx].fingerprint)
    }

    /// Returns true when `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Inserts `fingerprint` under `name`, overwriting any previous entry.
    pub fn upsert(
        &mut self,
        name: impl Into<String>,
        fingerprint: Fingerprint,
    ) -> PixMatchResult<Upsert> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PixMatchError::InvalidName);
        }
        match self.position(&name) {
            Some(idx) => {
                self.entries[idx].fingerprint = fingerprint;
                Ok(Upsert::Replaced)
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(CatalogueEntry { name, fingerprint });
                Ok(Upsert::Inserted)
            }
        }
    }

    /// Deletes the entry for `name` if present.
    pub fn remove(&mut self, name: &str) -> Removal {
        match self.position(name) {
            Some(idx) => {
                self.entries.remove(idx);
                self.index.remove(name);
                for (pos, entry) in self.entries.iter().enumerate().skip(idx) {
                    if let Some(slot) = self.index.get_mut(&entry.name) {
                        *slot = pos;
                    }
                }
                Removal::Removed
            }
            None => Removal::NotFound,
        }
    }

    /// Entries in catalogue order.
    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    /// Iterates over entries in catalogue order.
    pub fn iter(&self) -> std::slice::Iter<'_, CatalogueEntry> {
        self.entries.iter()
    }

    /// Iterates over entry names in catalogue order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

impl<'a> IntoIterator for &'a Catalogue {
    type Item = &'a CatalogueEntry;
    type IntoIter = std::slice::Iter<'a, CatalogueEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Catalogue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.fingerprint)?;
        }
        map.end()
    }
}

struct CatalogueVisitor;

impl<'de> Visitor<'de> for CatalogueVisitor {
    type Value = Catalogue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping entry names to fingerprints")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut catalogue = Catalogue::new();
        while let Some((name, fingerprint)) = access.next_entry::<String, Fingerprint>()? {
            // Repeated keys: the later value wins, in the earlier position.
            catalogue
                .upsert(name, fingerprint)
                .map_err(<A::Error as serde::de::Error>::custom)?;
        }
        Ok(catalogue)
    }
}

impl<'de> Deserialize<'de> for Catalogue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CatalogueVisitor)
    }
}
