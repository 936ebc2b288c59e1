//! Translation of scalars into their canonical stored text.

use crate::error::ErrorKind;
use crate::scalar::{Scalar, ScalarKind};

/// Translate a scalar into the canonical string that is stored as a key
/// value (or appended as a key-name segment).
///
/// Canonical forms:
/// - basic strings: escape sequences processed; the multiline forms
///   additionally lose a leading newline and honor `\` line continuations,
/// - literal strings: verbatim (multiline loses a leading newline),
/// - integers: digit separators stripped, a leading `+` dropped; the
///   non-decimal bases are converted to unsigned decimal,
/// - floats: digit separators stripped, a leading `+` dropped, the exponent
///   marker lowercased,
/// - infinities and NaNs: fixed tokens with the sign preserved,
/// - booleans: `1` / `0`,
/// - datetimes: RFC 3339 with an uppercase `T` separator and `Z` suffix.
pub fn translate(scalar: &Scalar) -> Result<String, ErrorKind> {
    let text = scalar.text.as_str();

    match scalar.kind {
        ScalarKind::StringBare | ScalarKind::StringLiteral => Ok(text.to_string()),
        ScalarKind::StringMlLiteral => Ok(trim_leading_newline(text).to_string()),
        ScalarKind::StringBasic => unescape(text),
        ScalarKind::StringMlBasic => unescape(trim_leading_newline(text)),
        ScalarKind::IntDec => Ok(clean_number(text, false)),
        ScalarKind::IntBin => from_radix(text, 2),
        ScalarKind::IntOct => from_radix(text, 8),
        ScalarKind::IntHex => from_radix(text, 16),
        ScalarKind::FloatNum => Ok(clean_number(text, true)),
        ScalarKind::FloatPosInf => Ok("+inf".to_string()),
        ScalarKind::FloatNegInf => Ok("-inf".to_string()),
        ScalarKind::FloatInf => Ok("inf".to_string()),
        ScalarKind::FloatPosNan => Ok("+nan".to_string()),
        ScalarKind::FloatNegNan => Ok("-nan".to_string()),
        ScalarKind::FloatNan => Ok("nan".to_string()),
        ScalarKind::Boolean => Ok(if text == "true" { "1" } else { "0" }.to_string()),
        ScalarKind::DateOffsetDatetime
        | ScalarKind::DateLocalDatetime
        | ScalarKind::DateLocalDate
        | ScalarKind::DateLocalTime => Ok(canonical_datetime(text)),
    }
}

fn trim_leading_newline(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("\r\n") {
        rest
    } else if let Some(rest) = text.strip_prefix('\n') {
        rest
    } else {
        text
    }
}

fn clean_number(text: &str, lower_exponent: bool) -> String {
    let text = text.strip_prefix('+').unwrap_or(text);
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '_' => {}
            'E' if lower_exponent => out.push('e'),
            _ => out.push(ch),
        }
    }
    out
}

fn from_radix(text: &str, radix: u32) -> Result<String, ErrorKind> {
    let digits: String = text[2..].chars().filter(|c| *c != '_').collect();
    match u64::from_str_radix(&digits, radix) {
        Ok(value) => Ok(value.to_string()),
        Err(_) => Err(ErrorKind::IntegerOutOfRange(text.to_string())),
    }
}

fn canonical_datetime(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            't' | ' ' => 'T',
            'z' => 'Z',
            _ => ch,
        })
        .collect()
}

fn unescape(text: &str) -> Result<String, ErrorKind> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(esc @ ('u' | 'U')) => {
                let len = if esc == 'u' { 4 } else { 8 };
                let mut value: u32 = 0;
                let mut seq = format!("\\{esc}");
                for _ in 0..len {
                    let digit = chars.next().and_then(|c| {
                        seq.push(c);
                        c.to_digit(16)
                    });
                    match digit {
                        Some(digit) => value = value * 16 + digit,
                        None => return Err(ErrorKind::MalformedEscape(seq)),
                    }
                }
                match char::from_u32(value) {
                    Some(c) => out.push(c),
                    None => return Err(ErrorKind::MalformedEscape(seq)),
                }
            }
            // Line continuation: a backslash at the end of a line removes
            // the newline and all whitespace that follows it.
            Some(ws @ (' ' | '\t' | '\r' | '\n')) => {
                let mut seen_newline = ws == '\n';
                let mut seq = String::from("\\");
                seq.push(ws);
                while let Some(next) = chars.peek().copied() {
                    if !matches!(next, ' ' | '\t' | '\r' | '\n') {
                        break;
                    }
                    seen_newline |= next == '\n';
                    chars.next();
                }
                if !seen_newline {
                    return Err(ErrorKind::MalformedEscape(seq));
                }
            }
            Some(other) => {
                return Err(ErrorKind::MalformedEscape(format!("\\{other}")));
            }
            None => return Err(ErrorKind::MalformedEscape("\\".to_string())),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn scalar(kind: ScalarKind, text: &str) -> Scalar {
        Scalar::new(kind, text, 1)
    }

    #[test_case(ScalarKind::IntDec, "1", "1")]
    #[test_case(ScalarKind::IntDec, "+10", "10")]
    #[test_case(ScalarKind::IntDec, "-5", "-5")]
    #[test_case(ScalarKind::IntDec, "1_000", "1000")]
    #[test_case(ScalarKind::IntBin, "0b0101", "5")]
    #[test_case(ScalarKind::IntOct, "0o17", "15")]
    #[test_case(ScalarKind::IntHex, "0xFF", "255")]
    #[test_case(ScalarKind::IntHex, "0xdead_beef", "3735928559")]
    #[test_case(ScalarKind::FloatNum, "1.2", "1.2")]
    #[test_case(ScalarKind::FloatNum, "+1.0", "1.0")]
    #[test_case(ScalarKind::FloatNum, "6.26E-34", "6.26e-34")]
    #[test_case(ScalarKind::FloatNum, "1_0.5", "10.5")]
    #[test_case(ScalarKind::Boolean, "true", "1")]
    #[test_case(ScalarKind::Boolean, "false", "0")]
    #[test_case(ScalarKind::FloatNegNan, "-nan", "-nan")]
    #[test_case(ScalarKind::DateLocalDate, "1979-05-27", "1979-05-27")]
    #[test_case(
        ScalarKind::DateOffsetDatetime,
        "1979-05-27t07:32:00z",
        "1979-05-27T07:32:00Z"
    )]
    #[test_case(
        ScalarKind::DateLocalDatetime,
        "1979-05-27 07:32:00",
        "1979-05-27T07:32:00"
    )]
    fn canonical(kind: ScalarKind, text: &str, expected: &str) {
        assert_eq!(translate(&scalar(kind, text)).unwrap(), expected);
    }

    #[test]
    fn basic_string_escapes() {
        let s = scalar(ScalarKind::StringBasic, r#"a\tb\n\"q\" \\ \u0041"#);
        assert_eq!(translate(&s).unwrap(), "a\tb\n\"q\" \\ A");
    }

    #[test]
    fn big_unicode_escape() {
        let s = scalar(ScalarKind::StringBasic, r"\U0001F600");
        assert_eq!(translate(&s).unwrap(), "\u{1F600}");
    }

    #[test]
    fn malformed_escapes() {
        for text in [r"\q", r"\u00", r"\uD800", r"bad \"] {
            let s = scalar(ScalarKind::StringBasic, text);
            assert!(matches!(
                translate(&s),
                Err(ErrorKind::MalformedEscape(_))
            ));
        }
    }

    #[test]
    fn multiline_basic() {
        let s = scalar(ScalarKind::StringMlBasic, "\nroses\nviolets");
        assert_eq!(translate(&s).unwrap(), "roses\nviolets");

        let s = scalar(ScalarKind::StringMlBasic, "one \\\n   two");
        assert_eq!(translate(&s).unwrap(), "one two");

        let s = scalar(ScalarKind::StringMlBasic, "one \\\n\n   two");
        assert_eq!(translate(&s).unwrap(), "one two");
    }

    #[test]
    fn multiline_literal_keeps_escapes() {
        let s = scalar(ScalarKind::StringMlLiteral, "\nC:\\path\\n");
        assert_eq!(translate(&s).unwrap(), "C:\\path\\n");
    }

    #[test]
    fn int_out_of_range() {
        let s = scalar(ScalarKind::IntHex, "0xFFFF_FFFF_FFFF_FFFF_F");
        assert!(matches!(
            translate(&s),
            Err(ErrorKind::IntegerOutOfRange(_))
        ));
    }
}
