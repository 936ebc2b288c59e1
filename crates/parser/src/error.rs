//! Error classification and positioned diagnostics.
//!
//! Every error belongs to one of five classes. The first error of a parse
//! latches the driver; diagnostics are attached as metadata to the root
//! key, in addition to being returned from [`crate::read`].

use flatoml_keyset::Key;
use std::fmt;
use thiserror::Error;

/// A positioned parse error.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct Error {
    /// The line the error was detected on, 1-based.
    pub line: u32,
    /// The source range, when the lexer position is known.
    pub span: Option<Span>,
    pub kind: ErrorKind,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, line: u32) -> Self {
        Self {
            line,
            span: None,
            kind,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// A `line:column` range, 1-based and inclusive of the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

/// The five error classes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorClass {
    Internal,
    Memory,
    Syntactic,
    Semantic,
    Resource,
}

/// All the errors that can stop a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // region: Semantic
    #[error("Multiple occurences of keyname '{0}'")]
    DuplicateKey(String),

    #[error("Invalid bare string: '{0}'")]
    InvalidBareString(String),

    #[error("Multiline strings are not allowed as simple keys")]
    MultilineSimpleKey,

    #[error("Bare string '{0}' is not allowed as a value")]
    BareValue(String),

    #[error("Invalid datetime: '{0}'")]
    InvalidDatetime(String),

    #[error("Malformed escape sequence '{0}'")]
    MalformedEscape(String),

    #[error("Integer out of range: '{0}'")]
    IntegerOutOfRange(String),
    // endregion

    // region: Syntactic
    #[error("Unexpected token '{got}', expected {expected}")]
    UnexpectedToken { got: String, expected: &'static str },

    #[error("Unexpected end of file, expected {0}")]
    UnexpectedEof(&'static str),

    #[error("Invalid input")]
    InvalidInput,
    // endregion

    #[error("Internal error: {0}")]
    Internal(&'static str),

    #[error("Cannot read file: {0}")]
    Resource(String),

    #[error("Out of memory")]
    OutOfMemory,
}

impl ErrorKind {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::DuplicateKey(_)
            | Self::InvalidBareString(_)
            | Self::MultilineSimpleKey
            | Self::BareValue(_)
            | Self::InvalidDatetime(_)
            | Self::MalformedEscape(_)
            | Self::IntegerOutOfRange(_) => ErrorClass::Semantic,
            Self::UnexpectedToken { .. } | Self::UnexpectedEof(_) | Self::InvalidInput => {
                ErrorClass::Syntactic
            }
            Self::Internal(_) => ErrorClass::Internal,
            Self::Resource(_) => ErrorClass::Resource,
            Self::OutOfMemory => ErrorClass::Memory,
        }
    }
}

/// Attach a positioned diagnostic to the root key.
pub(crate) fn report(root: &Key, error: &Error) {
    root.set_meta("error/kind", error.kind.class().as_ref());
    root.set_meta("error/reason", error.kind.to_string());
    root.set_meta("error/line", error.line.to_string());
    if let Some(span) = &error.span {
        root.set_meta("error/span", span.to_string());
    }
}

/// The out-of-memory sentinel; no message formatting may happen on this
/// path in a faithful port, so the reason is a fixed literal.
#[allow(dead_code)]
pub(crate) fn set_out_of_memory(root: &Key) {
    root.set_meta("error/kind", ErrorClass::Memory.as_ref());
    root.set_meta("error/reason", "Out of memory");
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn classes() {
        assert_eq!(
            ErrorKind::DuplicateKey("a".into()).class(),
            ErrorClass::Semantic
        );
        assert_eq!(ErrorKind::InvalidInput.class(), ErrorClass::Syntactic);
        assert_eq!(ErrorKind::Internal("x").class(), ErrorClass::Internal);
        assert_eq!(ErrorKind::OutOfMemory.class(), ErrorClass::Memory);
        assert_eq!(
            ErrorKind::Resource("f".into()).class(),
            ErrorClass::Resource
        );
        assert_eq!(ErrorClass::iter().count(), 5);
    }

    #[test]
    fn messages() {
        assert_eq!(
            ErrorKind::DuplicateKey("a".into()).to_string(),
            "Multiple occurences of keyname 'a'"
        );
        assert_eq!(ErrorClass::Semantic.as_ref(), "semantic");
    }

    #[test]
    fn reporting_writes_root_metadata() {
        let root = Key::from_name("/").unwrap();
        let error = Error::new(ErrorKind::DuplicateKey("a".into()), 2).with_span(Span {
            start_line: 2,
            start_col: 1,
            end_line: 2,
            end_col: 2,
        });
        report(&root, &error);

        assert_eq!(root.meta("error/kind").as_deref(), Some("semantic"));
        assert_eq!(
            root.meta("error/reason").as_deref(),
            Some("Multiple occurences of keyname 'a'")
        );
        assert_eq!(root.meta("error/line").as_deref(), Some("2"));
        assert_eq!(root.meta("error/span").as_deref(), Some("2:1-2:2"));
    }
}
