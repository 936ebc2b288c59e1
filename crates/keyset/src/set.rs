//! The ordered key set.

use crate::{IndexMap, Key, KeyName};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// An append-ordered set of keys, unique by name.
///
/// Appending a name that is already present replaces the stored handle and
/// keeps its position, so iteration order always reflects first appearance.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: IndexMap<String, Key>,
}

impl KeySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Append a key, replacing any key of the same name in place.
    pub fn append(&mut self, key: Key) {
        self.keys.insert(key.rendered_name(), key);
    }

    /// Look up a key by name.
    #[must_use]
    pub fn lookup(&self, name: &KeyName) -> Option<Key> {
        self.keys.get(&name.to_string()).cloned()
    }

    /// Look up a key by rendered name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Key> {
        self.keys.get(name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    /// Rendered names in append order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.keys.keys().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a Key;
    type IntoIter = indexmap::map::Values<'a, String, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.values()
    }
}

impl Serialize for KeySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.keys.len()))?;
        for key in self.keys.values() {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}
