//! Ordered free-form attribute bags.
//!
//! Every declared item may carry an `attributes="k1=v1,k2=v2"` bag that is
//! copied verbatim into the mapping descriptor. Bags are replaced as a whole
//! by overrides; keys are never merged individually.

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Insertion-ordered mapping from attribute name to value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttrBag(IndexMap<String, String>);

impl AttrBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the `k1=v1,k2=v2` tag form.
    ///
    /// An entry without a value (`k1`) maps to the empty string. Returns
    /// `None` when an entry has an empty key.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut bag = Self::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = match entry.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (entry, ""),
            };
            if key.is_empty() {
                return None;
            }
            bag.insert(key, value);
        }
        Some(bag)
    }

    /// Inserts or replaces an entry, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the bag has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttrBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}
