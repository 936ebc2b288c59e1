//! Semantic validation of datetime scalars.
//!
//! The lexer only guarantees the shape of a datetime; impossible calendar
//! or clock combinations are rejected here.

use crate::error::ErrorKind;
use crate::scalar::{Scalar, ScalarKind};

/// Validate a datetime scalar of any of the four kinds.
///
/// Returns an error for non-datetime scalars too; the caller is expected
/// to dispatch on [`ScalarKind::is_date`] first.
pub fn validate(scalar: &Scalar) -> Result<(), ErrorKind> {
    let text = scalar.text.as_str();
    let invalid = || ErrorKind::InvalidDatetime(text.to_string());

    let ok = match scalar.kind {
        ScalarKind::DateLocalDate => valid_date(text),
        ScalarKind::DateLocalTime => valid_time(text),
        ScalarKind::DateLocalDatetime => valid_datetime(text),
        ScalarKind::DateOffsetDatetime => valid_offset_datetime(text),
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn digits(text: &str, range: std::ops::Range<usize>) -> Option<u32> {
    let part = text.get(range)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

// YYYY-MM-DD
fn valid_date(text: &str) -> bool {
    if text.len() != 10 {
        return false;
    }
    let (year, month, day) = match (
        digits(text, 0..4),
        digits(text, 5..7),
        digits(text, 8..10),
    ) {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        _ => return false,
    };
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month)
}

// HH:MM:SS with an optional fraction.
fn valid_time(text: &str) -> bool {
    if text.len() < 8 {
        return false;
    }
    let (hour, minute, second) = match (
        digits(text, 0..2),
        digits(text, 3..5),
        digits(text, 6..8),
    ) {
        (Some(h), Some(m), Some(s)) => (h, m, s),
        _ => return false,
    };
    // TODO: leap seconds are rejected for now.
    hour <= 23 && minute <= 59 && second <= 59
}

fn valid_datetime(text: &str) -> bool {
    if text.len() < 19 {
        return false;
    }
    valid_date(&text[..10]) && valid_time(&text[11..])
}

fn valid_offset_datetime(text: &str) -> bool {
    let (datetime, offset) = match text
        .char_indices()
        .skip(19)
        .find(|(_, ch)| matches!(ch, 'Z' | 'z' | '+' | '-'))
    {
        Some((at, _)) => text.split_at(at),
        None => return false,
    };

    if !valid_datetime(datetime) {
        return false;
    }

    match offset {
        "Z" | "z" => true,
        _ => {
            // +HH:MM / -HH:MM
            offset.len() == 6
                && matches!(
                    (digits(offset, 1..3), digits(offset, 4..6)),
                    (Some(h), Some(m)) if h <= 23 && m <= 59
                )
        }
    }
}
