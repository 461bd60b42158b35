//! Prefix registry
//!
//! Maps namespace prefixes (including the empty prefix) to IRI strings and
//! resolves prefixed names and relative IRIs against an optional base.
//! `@prefix`/`PREFIX` directives overwrite earlier declarations for the same
//! label. The registry is owned by the parsing thread for the duration of a
//! parse; callers seed it up front through the parser constructors.

use indexmap::IndexMap;

use crate::error::{Result, TurtleError};

/// Prefix label to namespace IRI mapping, plus the current base IRI.
#[derive(Debug, Clone, Default)]
pub struct PrefixRegistry {
    prefixes: IndexMap<String, String>,
    base: Option<String>,
}

impl PrefixRegistry {
    /// An empty registry: no prefixes, no base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an iterator of (prefix, namespace) pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut registry = Self::new();
        for (prefix, namespace) in pairs {
            registry.add_prefix(prefix.into(), namespace.into());
        }
        registry
    }

    /// Register or overwrite a prefix.
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the base IRI for relative resolution.
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = Some(base.into());
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn prefixes(&self) -> &IndexMap<String, String> {
        &self.prefixes
    }

    /// Resolve `prefix:local` to a full IRI string.
    pub fn resolve(&self, prefix: &str, local: &str) -> Result<String> {
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(format!("{}{}", namespace, local)),
            None => Err(TurtleError::UndefinedPrefix(prefix.to_string())),
        }
    }

    /// Resolve a possibly relative IRI against the base, if one was declared.
    ///
    /// This is string concatenation against the declared base (fragment
    /// references replace the base's fragment), not full RFC 3986 reference
    /// resolution.
    pub fn resolve_relative(&self, iri: &str) -> String {
        if iri.contains("://") {
            return iri.to_string();
        }
        let Some(base) = &self.base else {
            return iri.to_string();
        };
        if let Some(fragment) = iri.strip_prefix('#') {
            let stem = match base.find('#') {
                Some(pos) => &base[..pos],
                None => base.as_str(),
            };
            return format!("{}#{}", stem, fragment);
        }
        format!("{}{}", base, iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefixed() {
        let mut registry = PrefixRegistry::new();
        registry.add_prefix("ex", "http://example.org/");
        assert_eq!(registry.resolve("ex", "foo").unwrap(), "http://example.org/foo");
    }

    #[test]
    fn test_undefined_prefix() {
        let registry = PrefixRegistry::new();
        let err = registry.resolve("foaf", "name");
        assert!(matches!(err, Err(TurtleError::UndefinedPrefix(p)) if p == "foaf"));
    }

    #[test]
    fn test_empty_prefix() {
        let mut registry = PrefixRegistry::new();
        registry.add_prefix("", "http://example.org/elements/");
        assert_eq!(
            registry.resolve("", "atomicNumber").unwrap(),
            "http://example.org/elements/atomicNumber"
        );
    }

    #[test]
    fn test_redeclaration_overwrites() {
        let mut registry = PrefixRegistry::new();
        registry.add_prefix("ex", "http://old.example/");
        registry.add_prefix("ex", "http://new.example/");
        assert_eq!(registry.resolve("ex", "x").unwrap(), "http://new.example/x");
    }

    #[test]
    fn test_resolve_relative() {
        let mut registry = PrefixRegistry::new();
        registry.set_base("http://example.org/base/");
        assert_eq!(registry.resolve_relative("doc"), "http://example.org/base/doc");
        assert_eq!(registry.resolve_relative("http://other.org/"), "http://other.org/");

        registry.set_base("http://example.org/doc#old");
        assert_eq!(registry.resolve_relative("#frag"), "http://example.org/doc#frag");
    }

    #[test]
    fn test_no_base_passthrough() {
        let registry = PrefixRegistry::new();
        assert_eq!(registry.resolve_relative("relative"), "relative");
    }
}
