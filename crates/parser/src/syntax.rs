//! This module contains token kind declarations
//! and a Logos-based lexer implementation.

#![allow(non_camel_case_types)]

use logos::{Lexer as LogosLexer, Logos};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// `TokenKind` represents all the token types (kinds) found in a TOML
/// document.
///
/// The lexer is context-free: a lexeme such as `1979-05-27` is a
/// `LOCAL_DATE` wherever it appears, and the grammar reinterprets scalar
/// tokens that show up in key position.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // region: Punctuation
    #[token("=")]
    EQUAL,
    #[token(".")]
    DOT,
    #[token(",")]
    COMMA,
    #[token("[")]
    BRACKET_START,
    #[token("]")]
    BRACKET_END,
    #[token("{")]
    BRACE_START,
    #[token("}")]
    BRACE_END,
    // endregion

    // region: Strings
    #[token("\"\"\"", lex_string_ml_basic)]
    STRING_ML_BASIC,

    #[token("\"", lex_string_basic)]
    STRING_BASIC,

    #[token("'''", lex_string_ml_literal)]
    STRING_ML_LITERAL,

    #[token("'", lex_string_literal)]
    STRING_LITERAL,
    // endregion

    // region: Numbers
    #[regex(r"[+-]?(0|[1-9](_?[0-9])*)", priority = 3)]
    INT_DEC,

    #[regex(r"0b[01](_?[01])*", priority = 6)]
    INT_BIN,

    #[regex(r"0o[0-7](_?[0-7])*", priority = 6)]
    INT_OCT,

    #[regex(r"0x[0-9A-Fa-f](_?[0-9A-Fa-f])*", priority = 6)]
    INT_HEX,

    #[regex(
        r"[+-]?(0|[1-9](_?[0-9])*)(\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?|[eE][+-]?[0-9](_?[0-9])*)",
        priority = 4
    )]
    FLOAT,

    #[regex(r"[+-]?inf", priority = 6)]
    FLOAT_INF,

    #[regex(r"[+-]?nan", priority = 6)]
    FLOAT_NAN,
    // endregion

    #[regex("true|false", priority = 6)]
    BOOLEAN,

    // region: Datetimes
    // RFC 3339 shapes; TOML additionally permits a space separator and a
    // lowercase `t`/`z`. Semantic validation happens later.
    #[regex(
        r"[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9][Tt ][0-9][0-9]:[0-9][0-9]:[0-9][0-9](\.[0-9]+)?([Zz]|[+-][0-9][0-9]:[0-9][0-9])",
        priority = 10
    )]
    OFFSET_DATETIME,

    #[regex(
        r"[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9][Tt ][0-9][0-9]:[0-9][0-9]:[0-9][0-9](\.[0-9]+)?",
        priority = 10
    )]
    LOCAL_DATETIME,

    #[regex(r"[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]", priority = 10)]
    LOCAL_DATE,

    #[regex(r"[0-9][0-9]:[0-9][0-9]:[0-9][0-9](\.[0-9]+)?", priority = 10)]
    LOCAL_TIME,
    // endregion

    // region: Other
    #[regex(r"[A-Za-z0-9_-]+", priority = 1)]
    BARE_STRING,

    #[regex(r"#[^\r\n]*")]
    COMMENT,

    #[regex(r"\r?\n")]
    NEWLINE,

    #[regex(r"[ \t]+")]
    WHITESPACE,

    #[error]
    ERROR,
    // endregion
}

pub(crate) struct Lexer<'source> {
    lexer: LogosLexer<'source, TokenKind>,
    peeked: Option<Option<TokenKind>>,
}

impl core::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("peeked", &self.peeked)
            .finish()
    }
}

impl<'source> Lexer<'source> {
    pub(crate) fn new(source: &'source str) -> Self {
        Self {
            lexer: TokenKind::lexer(source),
            peeked: None,
        }
    }

    /// Peek the next token without consuming it. [`Self::slice`] and
    /// [`Self::span`] refer to the peeked token afterwards.
    pub(crate) fn peek(&mut self) -> Option<TokenKind> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next());
        }
        self.peeked.unwrap()
    }

    pub(crate) fn span(&self) -> Range<usize> {
        self.lexer.span()
    }

    pub(crate) fn slice(&self) -> &'source str {
        self.lexer.slice()
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = TokenKind;

    fn next(&mut self) -> Option<TokenKind> {
        self.peeked
            .take()
            .map_or_else(|| self.lexer.next(), |peeked| peeked)
    }
}

fn lex_string_basic(lex: &mut LogosLexer<TokenKind>) -> Option<()> {
    let mut escaped = false;

    for (i, b) in lex.remainder().bytes().enumerate() {
        match b {
            // Basic strings are single-line.
            b'\n' | b'\r' => return None,
            b'"' if !escaped => {
                lex.bump(i + 1);
                return Some(());
            }
            _ => {}
        }
        escaped = !escaped && b == b'\\';
    }

    None
}

fn lex_string_literal(lex: &mut LogosLexer<TokenKind>) -> Option<()> {
    for (i, b) in lex.remainder().bytes().enumerate() {
        match b {
            b'\n' | b'\r' => return None,
            b'\'' => {
                lex.bump(i + 1);
                return Some(());
            }
            _ => {}
        }
    }

    None
}

// The closing delimiter is the last three quotes of a run, so that one or
// two quotes may sit directly against it.
fn lex_string_ml_basic(lex: &mut LogosLexer<TokenKind>) -> Option<()> {
    lex_multi_line(lex, b'"', true)
}

fn lex_string_ml_literal(lex: &mut LogosLexer<TokenKind>) -> Option<()> {
    lex_multi_line(lex, b'\'', false)
}

fn lex_multi_line(lex: &mut LogosLexer<TokenKind>, quote: u8, escapes: bool) -> Option<()> {
    let bytes = lex.remainder().as_bytes();
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b == quote && !escaped {
            let mut run = 1;
            while i + run < bytes.len() && bytes[i + run] == quote {
                run += 1;
            }
            if run >= 3 {
                lex.bump(i + run);
                return Some(());
            }
            i += run;
            continue;
        }

        escaped = escapes && !escaped && b == b'\\';
        i += 1;
    }

    None
}
