//! Scalar literals.

use serde::{Deserialize, Serialize};

/// Every kind of TOML literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    StringBasic,
    StringLiteral,
    StringMlBasic,
    StringMlLiteral,
    StringBare,
    IntDec,
    IntBin,
    IntOct,
    IntHex,
    FloatNum,
    FloatPosInf,
    FloatNegInf,
    FloatInf,
    FloatPosNan,
    FloatNegNan,
    FloatNan,
    Boolean,
    DateOffsetDatetime,
    DateLocalDatetime,
    DateLocalDate,
    DateLocalTime,
}

impl ScalarKind {
    /// Whether this is one of the four quoted string kinds.
    #[must_use]
    pub fn is_quoted_string(self) -> bool {
        matches!(
            self,
            Self::StringBasic | Self::StringLiteral | Self::StringMlBasic | Self::StringMlLiteral
        )
    }

    #[must_use]
    pub fn is_multiline_string(self) -> bool {
        matches!(self, Self::StringMlBasic | Self::StringMlLiteral)
    }

    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(
            self,
            Self::DateOffsetDatetime
                | Self::DateLocalDatetime
                | Self::DateLocalDate
                | Self::DateLocalTime
        )
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(
            self,
            Self::FloatNum
                | Self::FloatPosInf
                | Self::FloatNegInf
                | Self::FloatInf
                | Self::FloatPosNan
                | Self::FloatNegNan
                | Self::FloatNan
        )
    }

    /// The `tomltype` metadata value for the quoted string kinds.
    #[must_use]
    pub fn tomltype(self) -> Option<&'static str> {
        match self {
            Self::StringBasic => Some("string_basic"),
            Self::StringMlBasic => Some("string_ml_basic"),
            Self::StringLiteral => Some("string_literal"),
            Self::StringMlLiteral => Some("string_ml_literal"),
            _ => None,
        }
    }
}

/// A single TOML literal together with its source form.
///
/// For the quoted string kinds, `text` is the raw content with the
/// delimiters already stripped but escapes untouched; for every other kind
/// it is the full lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub kind: ScalarKind,
    pub text: String,
    pub line: u32,
}

impl Scalar {
    #[must_use]
    pub fn new(kind: ScalarKind, text: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}
