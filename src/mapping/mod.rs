//! The canonical dictionary: normalized variant key → canonical display title.
//!
//! Keys are Sanitizer output (lowercase, trimmed, never a blank token). Values are opaque
//! display strings and need not be unique. The mapping is loaded once per run, grows when
//! the resolver auto-learns, and is rewritten in full after every auto-learn event through
//! a [`MappingStore`].

pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod store;


pub use error::{MappingLoadError, PersistenceError};
#[cfg(any(test, feature = "mock"))]
pub use mock::MemoryMappingStore;
pub use store::{JsonMappingStore, MappingStore};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::text::{Sanitized, sanitize};

/// Variant key → canonical title. Iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMapping {
    entries: BTreeMap<String, String>,
}

impl CanonicalMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from raw pairs, sanitizing every key.
    ///
    /// Keys that sanitize to a blank token are dropped. When two raw keys collapse to the
    /// same sanitized key, the first in iteration order wins. Both cases are logged.
    pub fn from_raw_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut mapping = Self::new();
        for (raw_key, canonical) in entries {
            let raw_key = raw_key.as_ref();
            let Sanitized::Text(key) = sanitize(raw_key) else {
                warn!(key = raw_key, "Dropping mapping entry with a blank key");
                continue;
            };

            match mapping.entries.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(canonical.into());
                }
                Entry::Occupied(existing) => {
                    warn!(
                        key = raw_key,
                        kept = %existing.get(),
                        "Dropping mapping entry that collides after normalization"
                    );
                }
            }
        }
        mapping
    }

    /// Looks up the canonical title for a sanitized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces an entry; returns the previous canonical title.
    pub fn insert(&mut self, key: impl Into<String>, canonical: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), canonical.into())
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(key, canonical)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for CanonicalMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_raw_entries(iter)
    }
}
