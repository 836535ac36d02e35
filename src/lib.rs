//! Resource address parsing and canonical rendering.
//!
//! An address names one managed resource or data source, optionally nested
//! inside modules:
//!
//! ```text
//! module.network[0].module.subnets["private"].data.aws_ami.base[2]
//! ```
//!
//! [`parse`] turns text into an [`Address`]; `Display` (or `render()`) turns
//! it back into canonical text. For every accepted input `s`,
//! `parse(&parse(s)?.render())` yields the same value.

pub use crate::address::{
    Address, Index, Module, ModulePath, ResourceMode, ResourceSpec, UnknownModeError,
};
pub use crate::diagnostics::AddressDiagnostic;
pub use crate::syntax::error::{ParseError, ParseErrorKind};
pub use crate::syntax::parser::parse;

pub mod address;
pub mod cli;
pub mod diagnostics;
pub mod syntax;
