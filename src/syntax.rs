//! Syntax layer: the address grammar, its parser and the parse error taxonomy.

pub mod error;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
