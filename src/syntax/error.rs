//! Parse failure taxonomy.
//!
//! Parsing fails atomically on the first unrecoverable mismatch. Every
//! failure carries the byte offset where it was detected; offsets always fall
//! on a `char` boundary of the input.

use std::fmt;

use thiserror::Error;

/// Classification of a [`ParseError`], usable in test assertions and exit
/// reporting without matching on the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Input ended in the middle of a production.
    UnexpectedEnd,
    /// A character did not match any production expected at its offset.
    UnexpectedToken,
    /// A complete address was read but input remains after it.
    TrailingInput,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedEnd => "unexpected_end",
            ParseErrorKind::UnexpectedToken => "unexpected_token",
            ParseErrorKind::TrailingInput => "trailing_input",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed parse of an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input at offset {offset}: expected {expected}")]
    UnexpectedEnd { offset: usize, expected: String },

    #[error("unexpected {found} at offset {offset}: expected {expected}")]
    UnexpectedToken {
        offset: usize,
        expected: String,
        found: String,
    },

    #[error("trailing input at offset {offset}: {found}")]
    TrailingInput { offset: usize, found: String },
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::UnexpectedEnd { .. } => ParseErrorKind::UnexpectedEnd,
            ParseError::UnexpectedToken { .. } => ParseErrorKind::UnexpectedToken,
            ParseError::TrailingInput { .. } => ParseErrorKind::TrailingInput,
        }
    }

    /// Byte offset of the failure point.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::UnexpectedEnd { offset, .. }
            | ParseError::UnexpectedToken { offset, .. }
            | ParseError::TrailingInput { offset, .. } => *offset,
        }
    }

    /// Description of what the grammar expected, when known.
    pub fn expected(&self) -> Option<&str> {
        match self {
            ParseError::UnexpectedEnd { expected, .. }
            | ParseError::UnexpectedToken { expected, .. } => Some(expected),
            ParseError::TrailingInput { .. } => None,
        }
    }

    /// Builds the error for a failure detected at `offset` of `input`,
    /// choosing between end-of-input and bad-token by position alone.
    pub(crate) fn at(input: &str, offset: usize, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        match input.get(offset..).and_then(|rest| rest.chars().next()) {
            None => ParseError::UnexpectedEnd { offset, expected },
            Some(ch) => ParseError::UnexpectedToken {
                offset,
                expected,
                found: describe_char(ch),
            },
        }
    }

    pub(crate) fn trailing(input: &str, offset: usize) -> Self {
        let rest = input.get(offset..).unwrap_or_default();
        ParseError::TrailingInput {
            offset,
            found: format!("unconsumed input {:?}", rest),
        }
    }
}

fn describe_char(ch: char) -> String {
    format!("'{}'", ch.escape_debug())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_end_of_input_is_unexpected_end() {
        let err = ParseError::at("abc.", 4, "resource name");
        assert_eq!(err.kind(), ParseErrorKind::UnexpectedEnd);
        assert_eq!(err.offset(), 4);
        assert_eq!(err.expected(), Some("resource name"));
    }

    #[test]
    fn test_mid_input_is_unexpected_token() {
        let err = ParseError::at("abc.!", 4, "resource name");
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                offset: 4,
                expected: "resource name".to_string(),
                found: "'!'".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "unexpected '!' at offset 4: expected resource name"
        );
    }

    #[test]
    fn test_trailing_reports_remainder() {
        let err = ParseError::trailing("a.b.c", 3);
        assert_eq!(err.kind(), ParseErrorKind::TrailingInput);
        assert_eq!(err.expected(), None);
        assert!(err.to_string().contains("\".c\""));
    }
}
