//! Keys and key handles.

use crate::{IndexMap, KeyName, NameError};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::cell::{Ref, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// The value slot of a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum KeyValue {
    /// No value has been set yet.
    #[default]
    Null,
    String(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Default)]
struct KeyData {
    name: KeyName,
    value: KeyValue,
    meta: IndexMap<String, String>,
}

/// A cheaply cloneable handle to a key.
///
/// Clones share the underlying key; the live handle count takes the place
/// of a manual reference count. A key set, the parse driver's slots and
/// every stack frame all hold handles to the same key, so metadata written
/// through one handle is visible through all of them.
#[derive(Debug, Clone, Default)]
pub struct Key(Rc<RefCell<KeyData>>);

impl Key {
    #[must_use]
    pub fn new(name: KeyName) -> Self {
        Self(Rc::new(RefCell::new(KeyData {
            name,
            ..KeyData::default()
        })))
    }

    /// Create a key from a rendered name.
    pub fn from_name(name: &str) -> Result<Self, NameError> {
        Ok(Self::new(KeyName::parse(name)?))
    }

    /// Duplicate the name into a fresh key. Value and metadata start empty.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self::new(self.0.borrow().name.clone())
    }

    #[must_use]
    pub fn name(&self) -> Ref<'_, KeyName> {
        Ref::map(self.0.borrow(), |data| &data.name)
    }

    /// The rendered absolute name.
    #[must_use]
    pub fn rendered_name(&self) -> String {
        self.0.borrow().name.to_string()
    }

    /// Append one name segment.
    pub fn append_basename(&self, segment: impl Into<String>) {
        self.0.borrow_mut().name.push(segment);
    }

    /// Append an array-index segment.
    pub fn append_index_basename(&self, index: u64) {
        self.0.borrow_mut().name.push_index(index);
    }

    pub fn set_string(&self, value: impl Into<String>) {
        self.0.borrow_mut().value = KeyValue::String(value.into());
    }

    pub fn set_binary(&self, value: Vec<u8>) {
        self.0.borrow_mut().value = KeyValue::Binary(value);
    }

    #[must_use]
    pub fn value(&self) -> KeyValue {
        self.0.borrow().value.clone()
    }

    /// The string value, if the key holds one.
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        match &self.0.borrow().value {
            KeyValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn set_meta(&self, name: impl Into<String>, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .meta
            .insert(name.into(), value.into());
    }

    #[must_use]
    pub fn meta(&self, name: &str) -> Option<String> {
        self.0.borrow().meta.get(name).cloned()
    }

    /// All metadata in insertion order.
    #[must_use]
    pub fn meta_entries(&self) -> Vec<(String, String)> {
        self.0
            .borrow()
            .meta
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Compare by name.
    #[must_use]
    pub fn cmp_name(&self, other: &Self) -> Ordering {
        self.0.borrow().name.cmp(&other.0.borrow().name)
    }

    #[must_use]
    pub fn name_eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.0.borrow().name == other.0.borrow().name
    }

    /// Whether both handles refer to the same key.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The number of live handles to this key.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.borrow().name.fmt(f)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self.0.borrow();
        let mut s = serializer.serialize_struct("Key", 3)?;
        s.serialize_field("name", &data.name)?;
        s.serialize_field("value", &data.value)?;
        s.serialize_field("meta", &data.meta)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_copies_the_name_only() {
        let key = Key::from_name("/a").unwrap();
        key.set_string("v");
        key.set_meta("type", "string");

        let dup = key.duplicate();
        assert!(dup.name_eq(&key));
        assert!(!dup.ptr_eq(&key));
        assert_eq!(dup.value(), KeyValue::Null);
        assert_eq!(dup.meta("type"), None);
    }

    #[test]
    fn shared_mutation_through_handles() {
        let key = Key::from_name("/a").unwrap();
        let other = key.clone();
        other.set_meta("order", "3");
        assert_eq!(key.meta("order").as_deref(), Some("3"));
        assert_eq!(key.handle_count(), 2);
    }

    #[test]
    fn name_building() {
        let key = Key::from_name("/t").unwrap();
        key.append_basename("k");
        key.append_index_basename(0);
        assert_eq!(key.rendered_name(), "/t/k/#0");
    }

    #[test]
    fn meta_keeps_insertion_order() {
        let key = Key::from_name("/a").unwrap();
        key.set_meta("comment/#0", "one");
        key.set_meta("comment/#1", "two");
        key.set_meta("order", "0");
        let names: Vec<_> = key.meta_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["comment/#0", "comment/#1", "order"]);
    }
}
