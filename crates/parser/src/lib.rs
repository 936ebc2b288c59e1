#![warn(clippy::pedantic)]
#![allow(
    clippy::single_match,
    clippy::wildcard_imports,
    clippy::too_many_lines,
    clippy::enum_glob_use,
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    clippy::module_name_repetitions,
    clippy::single_match_else
)]

//! A TOML-to-keyed-configuration translator.
//!
//! A TOML document is flattened into an ordered set of slash-named keys.
//! Hierarchy moves into the key names (`[t]` + `k = 1` becomes `t/k`,
//! `[[a]]` elements become `a/#0`, `a/#1`, ...). Everything needed to
//! write the document back is kept as key metadata: original literal
//! forms, the TOML sub-type, comments and blank lines, source order.
//!
//! ```
//! use flatoml_parser::keyset::{Key, KeySet};
//!
//! let root = Key::from_name("/").unwrap();
//! let mut store = KeySet::new();
//! flatoml_parser::read("a = 1\n", &mut store, &root).unwrap();
//!
//! let key = store.get("/a").unwrap();
//! assert_eq!(key.string_value().as_deref(), Some("1"));
//! assert_eq!(key.meta("type").as_deref(), Some("long_long"));
//! assert_eq!(key.meta("order").as_deref(), Some("0"));
//! ```
//!
//! Reading stops at the first error: the error is attached to the root
//! key's `error/*` metadata and returned, and the store keeps the keys
//! processed up to that point.

pub mod comments;
pub mod datetime;
pub mod driver;
pub mod error;
pub mod grammar;
pub mod scalar;
pub mod special;
pub mod syntax;
pub mod translate;

pub use driver::Driver;
pub use error::{Error, ErrorClass, ErrorKind, Span};
pub use flatoml_keyset as keyset;

use flatoml_keyset::{Key, KeySet};
use std::path::Path;

/// Read a TOML document into `store`, relative to `root`.
///
/// # Errors
///
/// The first syntactic or semantic error stops the parse; it is reported
/// on the root key and returned. Emission up to the error is kept.
pub fn read(source: &str, store: &mut KeySet, root: &Key) -> Result<(), Error> {
    let mut driver = Driver::new(store, root);
    grammar::parse(source, &mut driver);
    driver.finish()
}

/// Read a TOML file into `store`, relative to `root`.
///
/// # Errors
///
/// A file that cannot be read is a resource error; everything else is as
/// in [`read`].
pub fn read_file(path: impl AsRef<Path>, store: &mut KeySet, root: &Key) -> Result<(), Error> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) => read(&source, store, root),
        Err(io) => {
            let kind = ErrorKind::Resource(format!("{}: {io}", path.display()));
            let error = Error::new(kind, 0);
            error::report(root, &error);
            Err(error)
        }
    }
}
