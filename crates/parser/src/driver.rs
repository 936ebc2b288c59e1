//! The grammar-driven parser driver.
//!
//! The front-end raises one event per grammar production; the driver owns
//! all state between events: the current partially-built key path, the
//! most recently finalized key, the pending scalar, three stacks tracking
//! the open hierarchy, the collected comments, and the emission order
//! counter. On the first error the driver latches and every further event
//! becomes a no-op.

use crate::comments::{CommentEntry, CommentList};
use crate::datetime;
use crate::error::{report, Error, ErrorKind, Span};
use crate::scalar::{Scalar, ScalarKind};
use crate::special::check_special_value;
use crate::translate::translate;
use flatoml_keyset::{Key, KeyName, KeySet};

/// Holder of one open hierarchical construct.
#[derive(Debug)]
struct ParentFrame {
    key: Key,
}

/// The current index of an open array of tables.
#[derive(Debug)]
struct TableArrayFrame {
    key: Key,
    curr_index: u64,
}

/// Whether `text` is a valid bare string, `[A-Za-z0-9_-]+`.
#[must_use]
pub fn is_bare_string(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// The driver state for one parse.
pub struct Driver<'a> {
    store: &'a mut KeySet,
    root: Key,
    curr_key: Option<Key>,
    prev_key: Option<Key>,
    last_scalar: Option<Scalar>,
    parents: Vec<ParentFrame>,
    indices: Vec<u64>,
    table_arrays: Vec<TableArrayFrame>,
    comments: CommentList,
    pending_newlines: u32,
    order: u64,
    curr_line: u32,
    simple_table_active: bool,
    drain_comments_on_key_exit: bool,
    error: Option<Error>,
}

impl<'a> Driver<'a> {
    pub fn new(store: &'a mut KeySet, root: &Key) -> Self {
        Self {
            store,
            root: root.clone(),
            curr_key: None,
            prev_key: None,
            last_scalar: None,
            parents: vec![ParentFrame {
                key: root.duplicate(),
            }],
            indices: Vec::new(),
            table_arrays: Vec::new(),
            comments: CommentList::default(),
            pending_newlines: 0,
            order: 0,
            curr_line: 1,
            simple_table_active: false,
            drain_comments_on_key_exit: true,
            error: None,
        }
    }

    /// End the parse: release everything the driver still holds and
    /// return the latched error, if any.
    pub fn finish(mut self) -> Result<(), Error> {
        self.parents.clear();
        self.indices.clear();
        self.table_arrays.clear();
        self.curr_key = None;
        self.prev_key = None;
        self.last_scalar = None;
        self.comments.clear();
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    // region: Document events

    pub fn enter_toml(&mut self) {
        if self.error.is_some() {
            return;
        }
        self.curr_key = None;
        self.prev_key = None;
        self.last_scalar = None;
        self.parents.clear();
        self.parents.push(ParentFrame {
            key: self.root.duplicate(),
        });
        self.indices.clear();
        self.table_arrays.clear();
        self.comments.clear();
        self.pending_newlines = 0;
        self.order = 0;
        self.curr_line = 1;
        self.simple_table_active = false;
        self.drain_comments_on_key_exit = true;
    }

    /// Trailing document comments are bound to a synthesized key carrying
    /// the root name.
    pub fn exit_toml(&mut self) {
        if self.error.is_some() {
            return;
        }
        if !self.comments.is_empty() {
            let key = self.root.duplicate();
            self.drain_comments_into(&key);
            self.store.append(key);
        }
        self.pending_newlines = 0;
    }

    // endregion

    // region: Key events

    /// The dotted name that follows is relative to the enclosing parent.
    pub fn enter_key(&mut self) {
        if self.error.is_some() {
            return;
        }
        self.curr_key = None;
        match self.parents.last() {
            Some(parent) => self.curr_key = Some(parent.key.duplicate()),
            None => self.internal_error("parent stack exhausted on key enter"),
        }
    }

    /// Append one dotted-key segment to the current key.
    pub fn exit_simple_key(&mut self, scalar: &Scalar) {
        if self.error.is_some() {
            return;
        }
        self.curr_line = scalar.line;

        if scalar.kind.is_multiline_string() {
            self.semantic_error(ErrorKind::MultilineSimpleKey, scalar.line);
            return;
        }

        let segment = match translate(scalar) {
            Ok(segment) => segment,
            Err(kind) => {
                self.semantic_error(kind, scalar.line);
                return;
            }
        };

        // Quoted and bare strings are taken as-is; anything else must
        // satisfy the bare-string charset after translation.
        let accepted = matches!(
            scalar.kind,
            ScalarKind::StringBasic | ScalarKind::StringLiteral | ScalarKind::StringBare
        ) || is_bare_string(&segment);

        if !accepted {
            self.semantic_error(
                ErrorKind::InvalidBareString(scalar.text.clone()),
                scalar.line,
            );
            return;
        }

        match &self.curr_key {
            Some(curr) => curr.append_basename(segment),
            None => self.internal_error("no current key on simple-key exit"),
        }
    }

    /// Finish a key path: check uniqueness, open a parent frame for it and
    /// stamp its emission order.
    pub fn exit_key(&mut self) {
        if self.error.is_some() {
            return;
        }
        let Some(curr) = self.curr_key.clone() else {
            self.internal_error("no current key on key exit");
            return;
        };

        if let Some(existing) = self.store.lookup(&curr.name()) {
            let table_array_root =
                existing.meta("tomltype").as_deref() == Some("tablearray");
            if !table_array_root && !existing.name_eq(&self.root) {
                let name = self.relative_name(&existing);
                self.semantic_error(ErrorKind::DuplicateKey(name), self.curr_line);
                return;
            }
        }

        self.parents.push(ParentFrame { key: curr.clone() });
        if self.drain_comments_on_key_exit {
            self.drain_comments_into(&curr);
        }
        self.pending_newlines = 0;
        self.assign_order(&curr);
    }

    // endregion

    // region: Value events

    /// Validate and stash a scalar until the enclosing production commits it.
    pub fn exit_value(&mut self, scalar: Scalar) {
        if self.error.is_some() {
            return;
        }
        self.curr_line = scalar.line;

        if scalar.kind == ScalarKind::StringBare {
            self.semantic_error(ErrorKind::BareValue(scalar.text.clone()), scalar.line);
            return;
        }
        if scalar.kind.is_date() {
            if let Err(kind) = datetime::validate(&scalar) {
                self.semantic_error(kind, scalar.line);
                return;
            }
        }

        self.last_scalar = Some(scalar);
    }

    /// Commit the pending scalar into the key opened by the key path,
    /// promote it to the previous key and close its frame.
    pub fn exit_key_value(&mut self) {
        if self.error.is_some() {
            return;
        }
        if let Some(scalar) = self.last_scalar.take() {
            self.commit_scalar(&scalar);
            if self.error.is_some() {
                return;
            }
        }
        match self.parents.pop() {
            Some(frame) => self.prev_key = Some(frame.key),
            None => self.internal_error("parent stack exhausted on key-value exit"),
        }
    }

    // endregion

    // region: Simple tables

    pub fn enter_simple_table(&mut self) {
        if self.error.is_some() {
            return;
        }
        if self.simple_table_active {
            // Close the scope of the previous simple table.
            if self.parents.pop().is_none() {
                self.internal_error("parent stack exhausted on table enter");
                return;
            }
        } else {
            self.simple_table_active = true;
        }
        self.curr_key = None;
    }

    pub fn exit_simple_table(&mut self) {
        if self.error.is_some() {
            return;
        }
        match self.parents.last() {
            Some(frame) => {
                frame.key.set_meta("tomltype", "simpletable");
                self.store.append(frame.key.clone());
            }
            None => self.internal_error("parent stack exhausted on table exit"),
        }
    }

    // endregion

    // region: Table arrays

    pub fn enter_table_array(&mut self) {
        if self.error.is_some() {
            return;
        }
        if self.simple_table_active {
            if self.parents.pop().is_none() {
                self.internal_error("parent stack exhausted on table-array enter");
                return;
            }
            self.simple_table_active = false;
        }
        if !self.table_arrays.is_empty() {
            // The indexed parent of the previous header.
            if self.parents.pop().is_none() {
                self.internal_error("parent stack exhausted on table-array enter");
                return;
            }
        }
        self.curr_key = None;
        // The unindexed header must not absorb comments.
        self.drain_comments_on_key_exit = false;
    }

    pub fn exit_table_array(&mut self) {
        if self.error.is_some() {
            return;
        }
        let Some(header) = self.parents.last().map(|frame| frame.key.clone()) else {
            self.internal_error("parent stack exhausted on table-array exit");
            return;
        };
        let header_name = header.name().clone();

        enum Relation {
            Same,
            Below,
            Other,
        }

        let relation = match self.table_arrays.last() {
            None => Relation::Other,
            Some(top) => {
                if *top.key.name() == header_name {
                    Relation::Same
                } else if header_name.is_below(&top.key.name()) {
                    Relation::Below
                } else {
                    Relation::Other
                }
            }
        };

        match relation {
            Relation::Same => {
                if let Some(top) = self.table_arrays.last_mut() {
                    top.curr_index += 1;
                }
            }
            Relation::Below => {
                // A nested array of tables opens below the current one.
                self.table_arrays.push(TableArrayFrame {
                    key: header.clone(),
                    curr_index: 0,
                });
            }
            Relation::Other => {
                loop {
                    let matches = match self.table_arrays.last() {
                        None => break,
                        Some(top) => *top.key.name() == header_name,
                    };
                    if matches {
                        break;
                    }
                    self.table_arrays.pop();
                }
                match self.table_arrays.last_mut() {
                    Some(top) => top.curr_index += 1,
                    None => self.table_arrays.push(TableArrayFrame {
                        key: header.clone(),
                        curr_index: 0,
                    }),
                }
            }
        }

        // The unindexed header must not consume the order slot that the
        // indexed variant needs.
        self.parents.pop();
        self.order = self.order.saturating_sub(1);

        let indexed = Key::new(self.compose_indexed_name());
        let Some(descriptor_name) = indexed.name().parent() else {
            self.internal_error("table-array header has no parent name");
            return;
        };

        match self.store.lookup(&descriptor_name) {
            None => {
                let descriptor = Key::new(descriptor_name);
                descriptor.set_meta("tomltype", "tablearray");
                descriptor.set_meta("array", "#0");
                self.assign_order(&descriptor);
                self.store.append(descriptor);
            }
            Some(descriptor) => {
                if let Some(base) = indexed.name().base_name() {
                    descriptor.set_meta("array", base);
                }
            }
        }

        tracing::trace!(key = %indexed, "opened table-array element");
        self.parents.push(ParentFrame {
            key: indexed.clone(),
        });
        if !self.comments.is_empty() {
            self.drain_comments_into(&indexed);
            self.store.append(indexed);
        }
        self.pending_newlines = 0;
        self.drain_comments_on_key_exit = true;
    }

    /// The indexed path of the current table-array element: the header
    /// name with every open level's index spliced in, e.g. `/a/#1/b/#0`.
    fn compose_indexed_name(&self) -> KeyName {
        let mut name = self.root.name().clone();
        let mut depth = name.depth();
        for frame in &self.table_arrays {
            let frame_name = frame.key.name();
            for segment in &frame_name.segments()[depth..] {
                name.push(segment.clone());
            }
            name.push_index(frame.curr_index);
            depth = frame_name.depth();
        }
        name
    }

    // endregion

    // region: Arrays

    pub fn enter_array(&mut self) {
        if self.error.is_some() {
            return;
        }
        self.indices.push(0);
        let Some(parent) = self.parents.last().map(|frame| frame.key.clone()) else {
            self.internal_error("parent stack exhausted on array enter");
            return;
        };

        if parent.meta("array").is_some() {
            // The parent already holds an array; nest under a synthesized
            // index-0 element.
            let mut child_name = parent.name().clone();
            child_name.push_index(0);
            let child = Key::new(child_name);
            self.assign_order(&child);
            self.parents.push(ParentFrame { key: child });
        }

        if let Some(frame) = self.parents.last() {
            frame.key.set_meta("array", "");
        }
    }

    pub fn exit_array(&mut self) {
        if self.error.is_some() {
            return;
        }
        // The first trailing comment stays on the last element.
        if let Some(first) = self.comments.take_first() {
            if let Some(prev) = &self.prev_key {
                attach_inline(prev, &first);
            }
        }
        if !self.comments.is_empty() {
            // TODO: where trailing comments inside the brackets belong is
            // still unresolved; they are dropped for now.
            tracing::trace!("dropping trailing array comments");
            self.comments.clear();
        }
        self.pending_newlines = 0;

        if self.indices.pop().is_none() {
            self.internal_error("index stack exhausted on array exit");
            return;
        }
        match self.parents.last() {
            Some(frame) => self.store.append(frame.key.clone()),
            None => self.internal_error("parent stack exhausted on array exit"),
        }
    }

    pub fn empty_array(&mut self) {
        self.enter_array();
        self.exit_array();
    }

    pub fn enter_array_element(&mut self) {
        if self.error.is_some() {
            return;
        }
        let Some(index) = self.indices.last().copied() else {
            self.internal_error("index stack exhausted on array element");
            return;
        };
        if index == u64::MAX {
            self.internal_error("array index overflow");
            return;
        }

        if index > 0 {
            // A pending comment belongs to the previous element.
            if let Some(first) = self.comments.take_first() {
                if let Some(prev) = &self.prev_key {
                    attach_inline(prev, &first);
                }
            }
        }

        let Some(parent) = self.parents.last().map(|frame| frame.key.clone()) else {
            self.internal_error("parent stack exhausted on array element");
            return;
        };
        let mut child_name = parent.name().clone();
        child_name.push_index(index);
        let child = Key::new(child_name);

        self.parents.push(ParentFrame { key: child.clone() });
        if let Some(base) = child.name().base_name() {
            parent.set_meta("array", base);
        }
        if let Some(top) = self.indices.last_mut() {
            *top += 1;
        }
        self.drain_comments_into(&child);
    }

    pub fn exit_array_element(&mut self) {
        if self.error.is_some() {
            return;
        }
        // Inline-table elements leave no pending scalar behind.
        if let Some(scalar) = self.last_scalar.take() {
            self.commit_scalar(&scalar);
            if self.error.is_some() {
                return;
            }
        }
        match self.parents.pop() {
            Some(frame) => self.prev_key = Some(frame.key),
            None => self.internal_error("parent stack exhausted on array-element exit"),
        }
    }

    // endregion

    // region: Inline tables

    pub fn enter_inline_table(&mut self) {
        if self.error.is_some() {
            return;
        }
        match self.parents.last() {
            Some(frame) => {
                frame.key.set_meta("tomltype", "inlinetable");
                self.store.append(frame.key.clone());
            }
            None => self.internal_error("parent stack exhausted on inline-table enter"),
        }
    }

    pub fn exit_inline_table(&mut self) {
        if self.error.is_some() {
            return;
        }
        self.last_scalar = None;
    }

    pub fn empty_inline_table(&mut self) {
        self.enter_inline_table();
    }

    // endregion

    // region: Comments and newlines

    pub fn exit_comment(&mut self, scalar: &Scalar) {
        if self.error.is_some() {
            return;
        }
        self.curr_line = scalar.line;

        if self.pending_newlines > 0 {
            if self.comments.is_empty() {
                // Materialize the blank lines as a leading placeholder.
                self.comments.push(CommentEntry::blank());
                self.pending_newlines -= 1;
            }
            self.comments.add_spacing(self.pending_newlines);
            self.pending_newlines = 0;
        }

        self.comments.push(CommentEntry::from_lexeme(&scalar.text));
    }

    pub fn exit_newline(&mut self) {
        if self.error.is_some() {
            return;
        }
        self.pending_newlines += 1;
    }

    /// At most one comment may trail a key pair; it becomes the inline
    /// comment of the key that was just finalized.
    pub fn exit_opt_comment_key_pair(&mut self) {
        if self.error.is_some() {
            return;
        }
        match self.comments.len() {
            0 => {}
            1 => {
                if let Some(entry) = self.comments.take_first() {
                    if let Some(prev) = &self.prev_key {
                        attach_inline(prev, &entry);
                    }
                }
            }
            _ => self.internal_error("more than one comment after a key pair"),
        }
    }

    /// Same as [`Self::exit_opt_comment_key_pair`], for table headers; the
    /// comment lands on the table key itself.
    pub fn exit_opt_comment_table(&mut self) {
        if self.error.is_some() {
            return;
        }
        match self.comments.len() {
            0 => {}
            1 => {
                if let Some(entry) = self.comments.take_first() {
                    if let Some(frame) = self.parents.last() {
                        attach_inline(&frame.key, &entry);
                    }
                }
            }
            _ => self.internal_error("more than one comment after a table header"),
        }
    }

    // endregion

    // region: Errors

    pub(crate) fn set_error(&mut self, error: Error) {
        if self.error.is_some() {
            return;
        }
        tracing::trace!(%error, line = error.line, "parse error");
        report(&self.root, &error);
        self.error = Some(error);
    }

    pub(crate) fn semantic_error(&mut self, kind: ErrorKind, line: u32) {
        let span = Span {
            start_line: line,
            start_col: 1,
            end_line: line,
            end_col: 1,
        };
        self.set_error(Error::new(kind, line).with_span(span));
    }

    fn internal_error(&mut self, message: &'static str) {
        let line = self.curr_line;
        self.set_error(Error::new(ErrorKind::Internal(message), line));
    }

    // endregion

    fn commit_scalar(&mut self, scalar: &Scalar) {
        let Some(key) = self.parents.last().map(|frame| frame.key.clone()) else {
            self.internal_error("parent stack exhausted on scalar commit");
            return;
        };

        let normalized = match translate(scalar) {
            Ok(normalized) => normalized,
            Err(kind) => {
                self.semantic_error(kind, scalar.line);
                return;
            }
        };
        key.set_string(normalized.clone());

        let kind = scalar.kind;
        if kind.is_quoted_string() {
            let handled = check_special_value(&key, &normalized);
            if !handled
                && !normalized.is_empty()
                && key.meta("type").as_deref() != Some("binary")
            {
                key.set_meta("type", "string");
            }
            self.record_origvalue(&key, &normalized, scalar);
            if let Some(tomltype) = kind.tomltype() {
                key.set_meta("tomltype", tomltype);
            }
        } else if kind == ScalarKind::Boolean {
            key.set_meta("type", "boolean");
        } else if kind.is_float() {
            key.set_meta("type", "double");
            self.record_origvalue(&key, &normalized, scalar);
        } else if kind == ScalarKind::IntDec {
            key.set_meta("type", "long_long");
            self.record_origvalue(&key, &normalized, scalar);
        } else if matches!(
            kind,
            ScalarKind::IntBin | ScalarKind::IntOct | ScalarKind::IntHex
        ) {
            key.set_meta("type", "unsigned_long_long");
            self.record_origvalue(&key, &normalized, scalar);
        } else if kind.is_date() {
            self.record_origvalue(&key, &normalized, scalar);
        } else {
            // Bare strings are rejected before they can be committed.
            self.internal_error("bare scalar reached commit");
            return;
        }

        self.store.append(key);
    }

    #[allow(clippy::unused_self)]
    fn record_origvalue(&self, key: &Key, normalized: &str, scalar: &Scalar) {
        if normalized != scalar.text {
            key.set_meta("origvalue", scalar.text.clone());
        }
    }

    fn assign_order(&mut self, key: &Key) {
        key.set_meta("order", self.order.to_string());
        self.order += 1;
    }

    fn drain_comments_into(&mut self, key: &Key) {
        if self.comments.is_empty() {
            return;
        }
        for (n, entry) in self.comments.drain().enumerate() {
            key.set_meta(format!("comment/#{n}"), entry.text.unwrap_or_default());
            if entry.blank_lines > 0 {
                key.set_meta(format!("comment/#{n}/space"), entry.blank_lines.to_string());
            }
        }
    }

    fn relative_name(&self, key: &Key) -> String {
        key.name().render_below(&self.root.name())
    }
}

fn attach_inline(key: &Key, entry: &CommentEntry) {
    key.set_meta("inline/comment", entry.text.clone().unwrap_or_default());
}
