#![warn(clippy::pedantic)]
#![allow(
    clippy::single_match,
    clippy::wildcard_imports,
    clippy::too_many_lines,
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    clippy::module_name_repetitions,
    clippy::single_match_else
)]

//! A flat, ordered store of hierarchical configuration keys.
//!
//! Keys are addressed by slash-separated names, carry a typed value and a
//! string metadata map, and are handed around as cheap [`Key`] handles.
//! A [`KeySet`] keeps keys in append order and replaces in place when a
//! name is appended twice.

pub mod key;
pub mod name;
pub mod set;

pub type IndexMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;

pub use key::{Key, KeyValue};
pub use name::{KeyName, NameError};
pub use set::KeySet;
