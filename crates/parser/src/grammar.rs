//! The grammar front-end.
//!
//! A recursive-descent walk over the token stream that raises the driver
//! events in grammar order. Scalar tokens that appear in key position are
//! reinterpreted here; in particular a lexeme such as `1.2`, which the
//! context-free lexer can only see as a float, is split into two dotted
//! key segments before it reaches the driver.
//!
//! Syntactic errors abort the walk; semantic errors reported by the driver
//! latch it, and the rest of the event stream is consumed cheaply.

use crate::driver::{is_bare_string, Driver};
use crate::error::{Error, ErrorKind, Span};
use crate::scalar::{Scalar, ScalarKind};
use crate::syntax::{Lexer, TokenKind, TokenKind::*};
use tracing::instrument;

/// A syntactic error was reported; unwinds the recursive descent.
struct Abort;

type PResult = Result<(), Abort>;

/// Feed `source` through the driver.
pub fn parse(source: &str, driver: &mut Driver<'_>) {
    let mut ctx = Ctx::new(source, driver);
    let _ = parse_toml(&mut ctx);
}

struct Ctx<'src, 'drv, 'store> {
    lexer: Lexer<'src>,
    // Position of the current token's start, 1-based.
    line: u32,
    col: u32,
    // Byte offset right after the previously consumed token.
    prev_end: usize,
    driver: &'drv mut Driver<'store>,
}

impl<'src, 'drv, 'store> Ctx<'src, 'drv, 'store> {
    fn new(source: &'src str, driver: &'drv mut Driver<'store>) -> Self {
        Self {
            lexer: Lexer::new(source),
            line: 1,
            col: 1,
            prev_end: 0,
            driver,
        }
    }

    /// The current token, skipping whitespace.
    fn token(&mut self) -> Option<TokenKind> {
        loop {
            match self.lexer.peek() {
                Some(WHITESPACE) => self.eat(),
                token => return token,
            }
        }
    }

    fn eat(&mut self) {
        if self.lexer.next().is_some() {
            self.prev_end = self.lexer.span().end;
            for ch in self.lexer.slice().chars() {
                if ch == '\n' {
                    self.line += 1;
                    self.col = 1;
                } else {
                    self.col += 1;
                }
            }
        }
    }

    fn slice(&self) -> &'src str {
        self.lexer.slice()
    }

    /// Whether the next raw token is `kind` and directly touches the
    /// previous one. `[[` and `]]` must not contain whitespace.
    fn adjacent(&mut self, kind: TokenKind) -> bool {
        match self.lexer.peek() {
            Some(token) => token == kind && self.lexer.span().start == self.prev_end,
            None => false,
        }
    }

    /// Build a scalar from the current token, stripping string delimiters.
    fn make_scalar(&self, kind: ScalarKind) -> Scalar {
        let slice = self.slice();
        let text = match kind {
            ScalarKind::StringBasic | ScalarKind::StringLiteral => &slice[1..slice.len() - 1],
            ScalarKind::StringMlBasic | ScalarKind::StringMlLiteral => {
                &slice[3..slice.len() - 3]
            }
            _ => slice,
        };
        Scalar::new(kind, text, self.line)
    }

    fn span_of_current(&mut self) -> Span {
        let start_line = self.line;
        let start_col = self.col;
        let mut end_line = start_line;
        let mut end_col = start_col;
        if self.lexer.peek().is_some() {
            for ch in self.lexer.slice().chars() {
                if ch == '\n' {
                    end_line += 1;
                    end_col = 1;
                } else {
                    end_col += 1;
                }
            }
        }
        Span {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    fn error_unexpected(&mut self, expected: &'static str) -> Abort {
        let kind = match self.lexer.peek() {
            Some(ERROR) => ErrorKind::InvalidInput,
            Some(_) => ErrorKind::UnexpectedToken {
                got: self.slice().to_string(),
                expected,
            },
            None => ErrorKind::UnexpectedEof(expected),
        };
        let line = self.line;
        let span = self.span_of_current();
        self.driver.set_error(Error::new(kind, line).with_span(span));
        Abort
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult {
        if self.token() == Some(kind) {
            self.eat();
            Ok(())
        } else {
            Err(self.error_unexpected(expected))
        }
    }

    fn expect_line_end(&mut self) -> PResult {
        match self.token() {
            None => Ok(()),
            Some(NEWLINE) => {
                self.eat();
                Ok(())
            }
            Some(_) => Err(self.error_unexpected("a newline")),
        }
    }
}

/// The scalar kind of a value-ish token, `None` for punctuation.
fn scalar_kind(token: TokenKind, slice: &str) -> Option<ScalarKind> {
    let signed = |positive, negative, plain| match slice.as_bytes().first() {
        Some(b'+') => positive,
        Some(b'-') => negative,
        _ => plain,
    };

    Some(match token {
        STRING_BASIC => ScalarKind::StringBasic,
        STRING_ML_BASIC => ScalarKind::StringMlBasic,
        STRING_LITERAL => ScalarKind::StringLiteral,
        STRING_ML_LITERAL => ScalarKind::StringMlLiteral,
        BARE_STRING => ScalarKind::StringBare,
        INT_DEC => ScalarKind::IntDec,
        INT_BIN => ScalarKind::IntBin,
        INT_OCT => ScalarKind::IntOct,
        INT_HEX => ScalarKind::IntHex,
        FLOAT => ScalarKind::FloatNum,
        FLOAT_INF => signed(
            ScalarKind::FloatPosInf,
            ScalarKind::FloatNegInf,
            ScalarKind::FloatInf,
        ),
        FLOAT_NAN => signed(
            ScalarKind::FloatPosNan,
            ScalarKind::FloatNegNan,
            ScalarKind::FloatNan,
        ),
        BOOLEAN => ScalarKind::Boolean,
        OFFSET_DATETIME => ScalarKind::DateOffsetDatetime,
        LOCAL_DATETIME => ScalarKind::DateLocalDatetime,
        LOCAL_DATE => ScalarKind::DateLocalDate,
        LOCAL_TIME => ScalarKind::DateLocalTime,
        _ => return None,
    })
}

#[instrument(level = "trace", skip(ctx))]
fn parse_toml(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    ctx.driver.enter_toml();

    while let Some(token) = ctx.token() {
        match token {
            NEWLINE => {
                // A line of its own: a blank line.
                ctx.eat();
                ctx.driver.exit_newline();
            }
            COMMENT => {
                let scalar = ctx.make_scalar(ScalarKind::StringBare);
                ctx.eat();
                ctx.driver.exit_comment(&scalar);
                ctx.expect_line_end()?;
            }
            BRACKET_START => parse_table_header(ctx)?,
            _ => parse_key_pair_line(ctx)?,
        }
    }

    ctx.driver.exit_toml();
    Ok(())
}

#[instrument(level = "trace", skip(ctx))]
fn parse_table_header(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    ctx.eat(); // `[`

    if ctx.adjacent(BRACKET_START) {
        ctx.eat();
        ctx.driver.enter_table_array();
        parse_key(ctx)?;
        ctx.expect(BRACKET_END, "`]]`")?;
        if !ctx.adjacent(BRACKET_END) {
            return Err(ctx.error_unexpected("`]]`"));
        }
        ctx.eat();
        ctx.driver.exit_table_array();
    } else {
        ctx.driver.enter_simple_table();
        parse_key(ctx)?;
        ctx.expect(BRACKET_END, "`]`")?;
        ctx.driver.exit_simple_table();
    }

    parse_opt_comment(ctx);
    ctx.driver.exit_opt_comment_table();
    ctx.expect_line_end()
}

#[instrument(level = "trace", skip(ctx))]
fn parse_key_pair_line(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    parse_key_pair(ctx)?;
    parse_opt_comment(ctx);
    ctx.driver.exit_opt_comment_key_pair();
    ctx.expect_line_end()
}

fn parse_key_pair(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    parse_key(ctx)?;
    ctx.expect(EQUAL, "`=`")?;
    parse_value(ctx)?;
    ctx.driver.exit_key_value();
    Ok(())
}

#[instrument(level = "trace", skip(ctx))]
fn parse_key(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    ctx.driver.enter_key();
    loop {
        parse_simple_key(ctx)?;
        match ctx.token() {
            Some(DOT) => ctx.eat(),
            _ => break,
        }
    }
    ctx.driver.exit_key();
    Ok(())
}

fn parse_simple_key(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    let Some(token) = ctx.token() else {
        return Err(ctx.error_unexpected("a key"));
    };

    if token == FLOAT {
        let line = ctx.line;
        let text = ctx.slice().to_string();
        ctx.eat();
        match split_float_key(&text) {
            FloatKey::Pair(first, second) => {
                ctx.driver
                    .exit_simple_key(&Scalar::new(ScalarKind::StringBare, first, line));
                ctx.driver
                    .exit_simple_key(&Scalar::new(ScalarKind::StringBare, second, line));
            }
            FloatKey::Single(segment) => {
                ctx.driver
                    .exit_simple_key(&Scalar::new(ScalarKind::StringBare, segment, line));
            }
            FloatKey::Invalid => {
                ctx.driver
                    .semantic_error(ErrorKind::InvalidBareString(text), line);
            }
        }
        return Ok(());
    }

    match scalar_kind(token, ctx.slice()) {
        Some(kind) => {
            let scalar = ctx.make_scalar(kind);
            ctx.eat();
            ctx.driver.exit_simple_key(&scalar);
            Ok(())
        }
        None => Err(ctx.error_unexpected("a key")),
    }
}

enum FloatKey {
    Single(String),
    Pair(String, String),
    Invalid,
}

/// A dotted key the lexer saw as one float. Only the `digits.digits` shape
/// splits into two segments; exponents and signs make no valid key.
fn split_float_key(text: &str) -> FloatKey {
    fn digit_run(part: &str) -> bool {
        !part.is_empty()
            && part
                .bytes()
                .all(|b| b.is_ascii_digit() || b == b'_')
    }

    match text.split_once('.') {
        None if is_bare_string(text) => FloatKey::Single(text.to_string()),
        None => FloatKey::Invalid,
        Some((first, second)) if digit_run(first) && digit_run(second) => {
            FloatKey::Pair(first.to_string(), second.to_string())
        }
        Some(_) => FloatKey::Invalid,
    }
}

#[instrument(level = "trace", skip(ctx))]
fn parse_value(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    let Some(token) = ctx.token() else {
        return Err(ctx.error_unexpected("a value"));
    };

    match token {
        BRACKET_START => parse_array(ctx),
        BRACE_START => parse_inline_table(ctx),
        _ => match scalar_kind(token, ctx.slice()) {
            Some(kind) => {
                let scalar = ctx.make_scalar(kind);
                ctx.eat();
                ctx.driver.exit_value(scalar);
                Ok(())
            }
            None => Err(ctx.error_unexpected("a value")),
        },
    }
}

#[instrument(level = "trace", skip(ctx))]
fn parse_array(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    ctx.eat(); // `[`

    if ctx.token() == Some(BRACKET_END) {
        ctx.eat();
        ctx.driver.empty_array();
        return Ok(());
    }

    ctx.driver.enter_array();
    loop {
        skip_array_trivia(ctx);
        match ctx.token() {
            Some(BRACKET_END) => break,
            Some(_) => {}
            None => return Err(ctx.error_unexpected("`]`")),
        }

        ctx.driver.enter_array_element();
        parse_value(ctx)?;
        ctx.driver.exit_array_element();

        skip_array_trivia(ctx);
        match ctx.token() {
            Some(COMMA) => ctx.eat(),
            Some(BRACKET_END) => break,
            _ => return Err(ctx.error_unexpected("`,` or `]`")),
        }
    }
    ctx.eat(); // `]`
    ctx.driver.exit_array();
    Ok(())
}

/// Newlines and comments are allowed between array elements. Only blank
/// lines count as spacing, so the first newline of a run is silent.
fn skip_array_trivia(ctx: &mut Ctx<'_, '_, '_>) {
    let mut saw_newline = false;
    loop {
        match ctx.token() {
            Some(NEWLINE) => {
                ctx.eat();
                if saw_newline {
                    ctx.driver.exit_newline();
                }
                saw_newline = true;
            }
            Some(COMMENT) => {
                let scalar = ctx.make_scalar(ScalarKind::StringBare);
                ctx.eat();
                ctx.driver.exit_comment(&scalar);
                saw_newline = false;
            }
            _ => return,
        }
    }
}

#[instrument(level = "trace", skip(ctx))]
fn parse_inline_table(ctx: &mut Ctx<'_, '_, '_>) -> PResult {
    ctx.eat(); // `{`

    if ctx.token() == Some(BRACE_END) {
        ctx.eat();
        ctx.driver.empty_inline_table();
        return Ok(());
    }

    ctx.driver.enter_inline_table();
    loop {
        parse_key_pair(ctx)?;
        match ctx.token() {
            Some(COMMA) => ctx.eat(),
            Some(BRACE_END) => break,
            _ => return Err(ctx.error_unexpected("`,` or `}`")),
        }
    }
    ctx.eat(); // `}`
    ctx.driver.exit_inline_table();
    Ok(())
}

fn parse_opt_comment(ctx: &mut Ctx<'_, '_, '_>) {
    if ctx.token() == Some(COMMENT) {
        let scalar = ctx.make_scalar(ScalarKind::StringBare);
        ctx.eat();
        ctx.driver.exit_comment(&scalar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_key_splitting() {
        assert!(matches!(
            split_float_key("1.2"),
            FloatKey::Pair(a, b) if a == "1" && b == "2"
        ));
        assert!(matches!(
            split_float_key("3.14159"),
            FloatKey::Pair(a, b) if a == "3" && b == "14159"
        ));
        assert!(matches!(
            split_float_key("1e3"),
            FloatKey::Single(s) if s == "1e3"
        ));
        assert!(matches!(split_float_key("1.2e3"), FloatKey::Invalid));
        assert!(matches!(split_float_key("+1.2"), FloatKey::Invalid));
        assert!(matches!(split_float_key("1.2.3"), FloatKey::Invalid));
    }
}
