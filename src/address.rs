//! Resource address data model
//!
//! An address names one resource or data source inside a hierarchy of nested
//! modules. Every type here renders to canonical text through [`fmt::Display`];
//! the `render()` methods are shorthands for `to_string()`.
//!
//! Values are normally produced by [`crate::parse`]. Programmatic construction
//! is allowed, but the caller is responsible for the identifier invariants the
//! parser would otherwise enforce (non-empty names, identifier characters).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::syntax::error::ParseError;

// ============================================================================
// INDEX
// ============================================================================

/// The optional bracketed qualifier selecting one instance of a module or
/// resource.
///
/// # Examples
///
/// ```rust
/// use resaddr::Index;
/// assert_eq!(Index::Integer(3).render(), "3");
/// assert_eq!(Index::from("a\"b").render(), r#""a\"b""#);
/// assert_eq!(Index::Absent.render(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Index {
    #[default]
    Absent,
    Integer(i64),
    Text(String),
}

impl Index {
    pub fn is_absent(&self) -> bool {
        matches!(self, Index::Absent)
    }

    /// Canonical text of the index value, without brackets.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Writes `[<index>]`, or nothing when absent.
    fn write_bracketed(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_absent() {
            return Ok(());
        }
        write!(f, "[{}]", self)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Absent => Ok(()),
            Index::Integer(value) => write!(f, "{}", value),
            Index::Text(value) => f.write_str(&quote_text(value)),
        }
    }
}

impl From<i64> for Index {
    fn from(value: i64) -> Self {
        Index::Integer(value)
    }
}

impl From<&str> for Index {
    fn from(value: &str) -> Self {
        Index::Text(value.to_string())
    }
}

impl From<String> for Index {
    fn from(value: String) -> Self {
        Index::Text(value)
    }
}

/// Quotes a text index. Only `"` and `\` are escaped; those are the only
/// escapes the grammar accepts, so the result always parses back.
pub(crate) fn quote_text(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

// ============================================================================
// MODULE / MODULE PATH
// ============================================================================

/// One `module.<name>[<index>]` segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub index: Index,
}

impl Module {
    pub fn new(name: impl Into<String>, index: Index) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module.{}", self.name)?;
        self.index.write_bracketed(f)
    }
}

/// Ordered module segments, outer-most first. Empty for a root-level address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(Vec<Module>);

impl ModulePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: Module) {
        self.0.push(module);
    }

    /// Removes and returns the inner-most module.
    pub fn pop(&mut self) -> Option<Module> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module> {
        self.0.iter()
    }

    pub fn modules(&self) -> &[Module] {
        &self.0
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, module) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", module)?;
        }
        Ok(())
    }
}

impl FromIterator<Module> for ModulePath {
    fn from_iter<I: IntoIterator<Item = Module>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Module>> for ModulePath {
    fn from(modules: Vec<Module>) -> Self {
        Self(modules)
    }
}

impl<'a> IntoIterator for &'a ModulePath {
    type Item = &'a Module;
    type IntoIter = std::slice::Iter<'a, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// RESOURCE SPEC / MODE
// ============================================================================

/// The terminal `<type>.<name>[<index>]` of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    #[serde(default)]
    pub index: Index,
}

impl ResourceSpec {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>, index: Index) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            index,
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)?;
        self.index.write_bracketed(f)
    }
}

/// Whether an address names a managed resource or a read-only data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    #[default]
    Managed,
    Data,
}

impl ResourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceMode::Managed => "managed",
            ResourceMode::Data => "data",
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown resource mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource mode `{0}` (expected `managed` or `data`)")]
pub struct UnknownModeError(pub String);

impl FromStr for ResourceMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "managed" => Ok(ResourceMode::Managed),
            "data" => Ok(ResourceMode::Data),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

// ============================================================================
// ADDRESS
// ============================================================================

/// A parsed resource address: `[<module path>.][data.]<resource spec>`.
///
/// # Examples
///
/// ```rust
/// use resaddr::{Address, ResourceMode};
/// let addr: Address = "module.net[0].data.aws_ami.base".parse().unwrap();
/// assert_eq!(addr.mode, ResourceMode::Data);
/// assert_eq!(addr.module_path.len(), 1);
/// assert_eq!(addr.render(), "module.net[0].data.aws_ami.base");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub module_path: ModulePath,
    pub resource_spec: ResourceSpec,
    #[serde(default)]
    pub mode: ResourceMode,
}

impl Address {
    pub fn new(module_path: ModulePath, resource_spec: ResourceSpec, mode: ResourceMode) -> Self {
        Self {
            module_path,
            resource_spec,
            mode,
        }
    }

    /// Parses `text`. Same as [`crate::parse`].
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        crate::syntax::parser::parse(text)
    }

    pub fn is_data(&self) -> bool {
        self.mode == ResourceMode::Data
    }

    /// True when the address has no enclosing modules.
    pub fn is_root(&self) -> bool {
        self.module_path.is_empty()
    }

    /// Returns an owned copy whose module path is a fresh allocation.
    pub fn deep_clone(&self) -> Self {
        self.clone()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.module_path.is_empty() {
            write!(f, "{}.", self.module_path)?;
        }
        if self.mode == ResourceMode::Data {
            f.write_str("data.")?;
        }
        write!(f, "{}", self.resource_spec)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address::new(
            vec![
                Module::new("foo", Index::Integer(1)),
                Module::new("bar", Index::Absent),
            ]
            .into(),
            ResourceSpec::new("aws_ami", "baz", Index::Integer(0)),
            ResourceMode::Data,
        )
    }

    #[test]
    fn test_render_full_address() {
        assert_eq!(sample().render(), "module.foo[1].module.bar.data.aws_ami.baz[0]");
    }

    #[test]
    fn test_render_root_managed() {
        let addr = Address::new(
            ModulePath::new(),
            ResourceSpec::new("aws_instance", "foo", Index::Absent),
            ResourceMode::Managed,
        );
        assert_eq!(addr.render(), "aws_instance.foo");
        assert!(addr.is_root());
        assert!(!addr.is_data());
    }

    #[test]
    fn test_text_index_escapes_quote_and_backslash_only() {
        assert_eq!(Index::from(r"a\b").render(), r#""a\\b""#);
        assert_eq!(Index::from("a\"b").render(), r#""a\"b""#);
        assert_eq!(Index::from("tab\there").render(), "\"tab\there\"");
    }

    #[test]
    fn test_negative_integer_index() {
        let spec = ResourceSpec::new("t", "n", Index::Integer(-2));
        assert_eq!(spec.render(), "t.n[-2]");
    }

    #[test]
    fn test_module_path_join() {
        let path: ModulePath = ["a", "b", "c"]
            .iter()
            .map(|n| Module::new(*n, Index::Absent))
            .collect();
        assert_eq!(path.render(), "module.a.module.b.module.c");
        assert_eq!(ModulePath::new().render(), "");
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let original = sample();
        let mut copy = original.deep_clone();
        copy.module_path.push(Module::new("extra", Index::from("k")));
        assert_eq!(original.module_path.len(), 2);
        assert_eq!(copy.module_path.len(), 3);
        copy.module_path.pop();
        copy.module_path.pop();
        assert_eq!(original.render(), "module.foo[1].module.bar.data.aws_ami.baz[0]");
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ResourceMode::Data.as_str(), "data");
        assert_eq!("managed".parse::<ResourceMode>(), Ok(ResourceMode::Managed));
        assert!("resource".parse::<ResourceMode>().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["mode"], "data");
        assert_eq!(json["module_path"][0]["name"], "foo");
        assert_eq!(json["module_path"][0]["index"], 1);
        assert!(json["module_path"][1]["index"].is_null());
        assert_eq!(json["resource_spec"]["type"], "aws_ami");

        let back: Address = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
