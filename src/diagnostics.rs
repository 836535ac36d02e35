//! `miette` rendering for parse failures.
//!
//! [`ParseError`] stays a plain value (cheap to clone and compare). Attaching
//! the source text turns it into an [`AddressDiagnostic`], which points a
//! labelled span at the failure offset.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::syntax::error::{ParseError, ParseErrorKind};

pub type SourceArc = Arc<NamedSource<String>>;

/// A parse failure paired with the text it was raised against.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AddressDiagnostic {
    pub error: ParseError,
    pub src: SourceArc,
}

impl ParseError {
    /// Attaches the parsed text under `name` for diagnostic rendering.
    pub fn with_source(self, name: impl AsRef<str>, text: impl Into<String>) -> AddressDiagnostic {
        AddressDiagnostic {
            error: self,
            src: to_error_source(name, text),
        }
    }
}

/// Converts a source string into an `Arc<NamedSource<String>>`.
pub fn to_error_source(name: impl AsRef<str>, text: impl Into<String>) -> SourceArc {
    Arc::new(NamedSource::new(name, text.into()))
}

impl AddressDiagnostic {
    pub fn kind(&self) -> ParseErrorKind {
        self.error.kind()
    }

    fn label_text(&self) -> String {
        match &self.error {
            ParseError::UnexpectedEnd { expected, .. } => format!("expected {} here", expected),
            ParseError::UnexpectedToken { expected, .. } => format!("expected {}", expected),
            ParseError::TrailingInput { .. } => "address ends here".to_string(),
        }
    }
}

impl Diagnostic for AddressDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("resaddr::parse::{}", self.error.kind())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let help = match self.error.kind() {
            ParseErrorKind::UnexpectedEnd => {
                "the address is incomplete; every address ends in `<type>.<name>`"
            }
            ParseErrorKind::UnexpectedToken => {
                "identifiers start with a letter; indexes are `[<integer>]` or `[\"<text>\"]`"
            }
            ParseErrorKind::TrailingInput => {
                "an address has exactly one `<type>.<name>`; nest modules with `module.<name>.`"
            }
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(self.src.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let offset = self.error.offset();
        let total = self.src.inner().len();
        // A zero-length span at end of input still renders as a caret.
        let len = match &self.error {
            _ if offset >= total => 0,
            ParseError::TrailingInput { .. } => total - offset,
            _ => 1,
        };
        let label = LabeledSpan::new(Some(self.label_text()), offset, len);
        Some(Box::new(std::iter::once(label)))
    }
}

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;
    use crate::parse;

    #[test]
    fn test_report_contains_label_and_help() {
        let err = parse("aws_instance.").unwrap_err();
        let report = Report::new(err.with_source("input", "aws_instance."));
        let output = format!("{report:?}");
        assert!(output.contains("resource name"));
        assert!(output.contains("every address ends in"));
    }

    #[test]
    fn test_code_names_the_kind() {
        let diag = parse("a.b.c").unwrap_err().with_source("input", "a.b.c");
        let code = diag.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("resaddr::parse::trailing_input"));
        assert_eq!(diag.kind(), ParseErrorKind::TrailingInput);
    }

    #[test]
    fn test_label_points_at_offset() {
        let diag = parse("a.b[x]").unwrap_err().with_source("input", "a.b[x]");
        let labels: Vec<_> = diag.labels().into_iter().flatten().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 4);
        assert_eq!(labels[0].len(), 1);
    }
}
