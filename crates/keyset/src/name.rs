//! Hierarchical key names.
//!
//! A name is a sequence of segments, rendered as an absolute slash-separated
//! path. The empty sequence is the root and renders as `/`. Inside a rendered
//! segment, `\` escapes the separator and the escape character itself, so a
//! segment may contain any text (`k.x`, `a/b`, `#0`).

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const SEPARATOR: char = '/';
const ESCAPE: char = '\\';

/// A hierarchical key name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyName {
    segments: Vec<String>,
}

/// Errors of [`KeyName::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("key name must start with `{SEPARATOR}`")]
    MissingRoot,
    #[error("empty name segment")]
    EmptySegment,
    #[error("name ends in an unfinished escape")]
    TrailingEscape,
}

impl KeyName {
    /// The root name, `/`.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a rendered name back into its segments.
    pub fn parse(name: &str) -> Result<Self, NameError> {
        let mut chars = name.chars();
        if chars.next() != Some(SEPARATOR) {
            return Err(NameError::MissingRoot);
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut escaped = false;
        let mut rest = false;

        for ch in chars {
            rest = true;
            if escaped {
                current.push(ch);
                escaped = false;
            } else if ch == ESCAPE {
                escaped = true;
            } else if ch == SEPARATOR {
                if current.is_empty() {
                    return Err(NameError::EmptySegment);
                }
                segments.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
        }

        if escaped {
            return Err(NameError::TrailingEscape);
        }
        if !current.is_empty() {
            segments.push(current);
        } else if rest {
            // The name ended in an unescaped separator.
            return Err(NameError::EmptySegment);
        }

        Ok(Self { segments })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Append one segment. The segment is taken verbatim; escaping only
    /// happens when the name is rendered.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Append an array-index segment, `#0`, `#42`, ...
    pub fn push_index(&mut self, index: u64) {
        self.segments.push(format!("#{index}"));
    }

    /// The last segment, if any.
    #[must_use]
    pub fn base_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The name with the last segment removed, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Whether `self` is strictly below `other` in the hierarchy.
    #[must_use]
    pub fn is_below(&self, other: &Self) -> bool {
        self.segments.len() > other.segments.len()
            && self.segments[..other.segments.len()] == *other.segments
    }

    /// Render relative to `ancestor`: the full rendered form when `self`
    /// is not below it, the sub-path otherwise.
    #[must_use]
    pub fn render_below(&self, ancestor: &Self) -> String {
        if self == ancestor {
            return self.to_string();
        }
        if !self.is_below(ancestor) {
            return self.to_string();
        }
        let mut out = String::new();
        for (i, segment) in self.segments[ancestor.depth()..].iter().enumerate() {
            if i > 0 {
                out.push(SEPARATOR);
            }
            escape_into(&mut out, segment);
        }
        out
    }
}

fn escape_into(out: &mut String, segment: &str) {
    for ch in segment.chars() {
        if ch == SEPARATOR || ch == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        let mut out = String::new();
        for segment in &self.segments {
            out.push(SEPARATOR);
            escape_into(&mut out, segment);
        }
        f.write_str(&out)
    }
}

impl Serialize for KeyName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
