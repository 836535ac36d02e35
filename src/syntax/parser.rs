//! Address Parser
//!
//! Drives the pest grammar in `grammar.pest` and converts the resulting parse
//! tree into an [`Address`]. Parsing is a pure function of its input; the
//! grammar carries all syntax rules and this module only classifies failures
//! and builds values.

use pest::error::{ErrorVariant, InputLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::{debug, trace};

use crate::address::{Address, Index, Module, ModulePath, ResourceMode, ResourceSpec};
use crate::syntax::error::ParseError;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct AddressParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse an address string.
///
/// Module segments are returned outer-most first. A `data.` segment directly
/// before a complete `<type>.<name>` is always the mode marker, so a resource
/// whose type is literally `data` cannot be addressed inside that position.
pub fn parse(text: &str) -> Result<Address, ParseError> {
    trace!(input = text, "parsing address");

    let mut pairs = AddressParser::parse(Rule::address_eoi, text).map_err(|err| {
        let error = classify_failure(text, err);
        debug!(kind = %error.kind(), offset = error.offset(), "address rejected");
        error
    })?;

    let top = pairs
        .next()
        .ok_or_else(|| ParseError::at(text, 0, "address"))?;
    let address_pair = top
        .into_inner()
        .find(|p| p.as_rule() == Rule::address)
        .ok_or_else(|| ParseError::at(text, 0, "address"))?;

    let address = build_address(address_pair, text)?;
    trace!(address = %address, "parsed address");
    Ok(address)
}

// ============================================================================
// FAILURE CLASSIFICATION
// ============================================================================

/// Maps a failed full-input parse to one of the three error kinds.
///
/// The furthest offset any production reached is the failure point. If a
/// complete address can be read from the start of the input and nothing got
/// past its end, the real problem is whatever follows it.
fn classify_failure(text: &str, err: pest::error::Error<Rule>) -> ParseError {
    let offset = match err.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    let expected = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } => describe_expected(positives),
        ErrorVariant::CustomError { message } => message.clone(),
    };

    if let Ok(mut prefix) = AddressParser::parse(Rule::address, text) {
        if let Some(address) = prefix.next() {
            let end = address.as_span().end();
            if offset <= end && end < text.len() {
                return ParseError::trailing(text, end);
            }
        }
    }

    ParseError::at(text, offset, expected)
}

fn describe_expected(rules: &[Rule]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for rule in rules {
        let name = describe_rule(*rule);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    match names.len() {
        0 => "a resource address".to_string(),
        _ => names.join(" or "),
    }
}

fn describe_rule(rule: Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of input",
        Rule::address | Rule::address_eoi => "a resource address",
        Rule::module_path | Rule::module | Rule::module_keyword => "'module.'",
        Rule::data_mode => "'data.'",
        Rule::resource_spec | Rule::resource_type => "resource type",
        Rule::resource_name => "resource name",
        Rule::identifier => "identifier",
        Rule::dot => "'.'",
        Rule::index | Rule::index_open => "'['",
        Rule::index_close => "']'",
        Rule::integer | Rule::text => "integer or quoted string",
        Rule::text_body | Rule::quote_close => "closing '\"'",
        Rule::text_escape | Rule::escaped => "'\"' or '\\' after a backslash",
        #[allow(unreachable_patterns)]
        _ => "a resource address",
    }
}

// ============================================================================
// VALUE BUILDERS
// ============================================================================

fn build_address(pair: Pair<Rule>, text: &str) -> Result<Address, ParseError> {
    let mut module_path = ModulePath::new();
    let mut mode = ResourceMode::Managed;
    let mut resource_spec = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::module_path => module_path = build_module_path(inner, text)?,
            Rule::data_mode => mode = ResourceMode::Data,
            Rule::resource_spec => resource_spec = Some(build_resource_spec(inner, text)?),
            _ => {}
        }
    }

    let resource_spec = resource_spec.ok_or_else(|| ParseError::at(text, text.len(), "resource type"))?;
    Ok(Address::new(module_path, resource_spec, mode))
}

fn build_module_path(pair: Pair<Rule>, text: &str) -> Result<ModulePath, ParseError> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::module)
        .map(|p| build_module(p, text))
        .collect()
}

fn build_module(pair: Pair<Rule>, text: &str) -> Result<Module, ParseError> {
    let start = pair.as_span().start();
    let mut name = None;
    let mut index = Index::Absent;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => name = Some(inner.as_str().to_string()),
            Rule::index => index = build_index(inner, text)?,
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ParseError::at(text, start, "identifier"))?;
    Ok(Module::new(name, index))
}

fn build_resource_spec(pair: Pair<Rule>, text: &str) -> Result<ResourceSpec, ParseError> {
    let start = pair.as_span().start();
    let mut resource_type = None;
    let mut name = None;
    let mut index = Index::Absent;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::resource_type => resource_type = Some(inner.as_str().to_string()),
            Rule::resource_name => name = Some(inner.as_str().to_string()),
            Rule::index => index = build_index(inner, text)?,
            _ => {}
        }
    }

    match (resource_type, name) {
        (Some(resource_type), Some(name)) => Ok(ResourceSpec::new(resource_type, name, index)),
        (None, _) => Err(ParseError::at(text, start, "resource type")),
        (Some(_), None) => Err(ParseError::at(text, start, "resource name")),
    }
}

fn build_index(pair: Pair<Rule>, text: &str) -> Result<Index, ParseError> {
    let start = pair.as_span().start();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::integer => {
                let offset = inner.as_span().start();
                // The grammar admits any digit run; the value must still fit.
                return inner
                    .as_str()
                    .parse::<i64>()
                    .map(Index::Integer)
                    .map_err(|_| ParseError::at(text, offset, "integer within 64-bit range"));
            }
            Rule::text => {
                let body = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::text_body)
                    .map(|p| p.as_str())
                    .unwrap_or_default();
                return Ok(Index::Text(unescape_text(body)));
            }
            _ => {}
        }
    }
    Err(ParseError::at(text, start, "integer or quoted string"))
}

/// Resolves `\"` and `\\`. The grammar rejects every other escape and a
/// dangling backslash, so any backslash here is followed by one of those two.
fn unescape_text(body: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(ch);
        }
    }
    result
}
