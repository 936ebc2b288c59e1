//! Collected comments and blank lines between keys.

/// One comment line, or a pure blank-line separator when `text` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentEntry {
    /// The comment text without the `#` marker and at most one leading
    /// space, `None` for a blank-line entry.
    pub text: Option<String>,
    /// The raw source lexeme.
    pub original: Option<String>,
    /// Blank lines accounted to this entry.
    pub blank_lines: u32,
}

impl CommentEntry {
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// Build an entry from a raw `# ...` lexeme.
    #[must_use]
    pub fn from_lexeme(lexeme: &str) -> Self {
        let text = lexeme.strip_prefix('#').unwrap_or(lexeme);
        let text = text.strip_prefix(' ').unwrap_or(text);
        Self {
            text: Some(text.to_string()),
            original: Some(lexeme.to_string()),
            blank_lines: 0,
        }
    }
}

/// The ordered comments waiting to be attached to a key.
///
/// The head of the list is the inline-comment candidate at the boundaries
/// where one is taken (array elements, the ends of key-pair and table
/// lines); everything else becomes a preceding comment of the next key.
#[derive(Debug, Default)]
pub struct CommentList {
    entries: Vec<CommentEntry>,
}

impl CommentList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: CommentEntry) {
        self.entries.push(entry);
    }

    /// Add blank lines to the most recent entry.
    pub fn add_spacing(&mut self, blank_lines: u32) {
        if let Some(tail) = self.entries.last_mut() {
            tail.blank_lines += blank_lines;
        }
    }

    /// Remove and return the head entry.
    pub fn take_first(&mut self) -> Option<CommentEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    pub fn drain(&mut self) -> impl Iterator<Item = CommentEntry> + '_ {
        self.entries.drain(..)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
