//! RDF term representations
//!
//! This module defines the core value types for RDF and SPARQL terms:
//! - IRI references (named nodes)
//! - Blank nodes (anonymous nodes)
//! - Literals (with optional language tag or datatype)
//! - Variables (for triple patterns)
//!
//! Every term owns exactly one canonical string, its *identifier*: `<uri>`
//! for IRIs, `_:label` for blank nodes, `"value"`, `"value"@lang` or
//! `"value"^^<datatype>` for literals, and the bare name for variables.
//! Equality, ordering and hashing are defined purely on that string, so all
//! four kinds participate in one total order and mixed-kind sets are
//! well-defined. Derived views (the URI without brackets, the literal value
//! without quotes, the language tag, the datatype IRI) are byte ranges into
//! the owned identifier, computed once at construction.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Result, TurtleError};
use crate::ns;

mod triple;

pub use triple::{Triple, TriplePattern};

/// Byte range into a term's identifier. Only ever applied to the string that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    len: usize,
}

impl Span {
    fn slice<'a>(&self, owner: &'a str) -> &'a str {
        &owner[self.start..self.start + self.len]
    }
}

/// The kind of a [`Term`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// An IRI reference (named node)
    Iri,
    /// A blank node (anonymous)
    BlankNode,
    /// A literal value
    Literal,
    /// A SPARQL variable
    Variable,
}

/// Kind-specific view offsets into the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Detail {
    Iri { value: Span },
    BlankNode { label: Span },
    Literal {
        value: Span,
        lang: Option<Span>,
        datatype: Option<Span>,
    },
    Variable { anonymous: bool },
}

/// An RDF term or SPARQL variable.
#[derive(Clone)]
pub struct Term {
    identifier: String,
    detail: Detail,
}

impl Term {
    /// Create an IRI reference term. The identifier is `<uri>`.
    pub fn iri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let value = Span { start: 1, len: uri.len() };
        Term {
            identifier: format!("<{}>", uri),
            detail: Detail::Iri { value },
        }
    }

    /// Create a blank node term. The identifier is `_:label`.
    pub fn blank(label: impl Into<String>) -> Self {
        let label = label.into();
        let span = Span { start: 2, len: label.len() };
        Term {
            identifier: format!("_:{}", label),
            detail: Detail::BlankNode { label: span },
        }
    }

    /// Create a plain literal. The identifier is `"value"`.
    pub fn plain_literal(value: impl Into<String>) -> Self {
        let value = value.into();
        let span = Span { start: 1, len: value.len() };
        Term {
            identifier: format!("\"{}\"", value),
            detail: Detail::Literal { value: span, lang: None, datatype: None },
        }
    }

    /// Create a language-tagged literal. Language-tagged strings carry no
    /// explicit datatype slot in the canonical form.
    pub fn lang_literal(value: impl Into<String>, lang: impl Into<String>) -> Self {
        let value = value.into();
        let lang = lang.into();
        let value_span = Span { start: 1, len: value.len() };
        let lang_span = Span { start: value.len() + 3, len: lang.len() };
        Term {
            identifier: format!("\"{}\"@{}", value, lang),
            detail: Detail::Literal {
                value: value_span,
                lang: Some(lang_span),
                datatype: None,
            },
        }
    }

    /// Create a typed literal. `xsd:string` is the implicit default and is
    /// stored as the bare quoted form instead of an explicit datatype.
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let value = value.into();
        let datatype = datatype.into();
        if datatype == ns::XSD_STRING {
            return Term::plain_literal(value);
        }
        let value_span = Span { start: 1, len: value.len() };
        let datatype_span = Span { start: value.len() + 5, len: datatype.len() };
        Term {
            identifier: format!("\"{}\"^^<{}>", value, datatype),
            detail: Detail::Literal {
                value: value_span,
                lang: None,
                datatype: Some(datatype_span),
            },
        }
    }

    /// Create a literal from its parts, applying the canonicalisation policy.
    /// A language tag together with a datatype is rejected outright.
    pub fn literal(
        value: impl Into<String>,
        lang: Option<&str>,
        datatype: Option<&str>,
    ) -> Result<Self> {
        match (lang, datatype) {
            (Some(_), Some(_)) => Err(TurtleError::LanguageAndDatatype),
            (Some(lang), None) => Ok(Term::lang_literal(value, lang)),
            (None, Some(dt)) => Ok(Term::typed_literal(value, dt)),
            (None, None) => Ok(Term::plain_literal(value)),
        }
    }

    /// Create a SPARQL variable. The identifier is the bare name.
    pub fn variable(name: impl Into<String>, anonymous: bool) -> Self {
        Term {
            identifier: name.into(),
            detail: Detail::Variable { anonymous },
        }
    }

    /// The canonical identifier string.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The kind of this term.
    pub fn kind(&self) -> TermKind {
        match self.detail {
            Detail::Iri { .. } => TermKind::Iri,
            Detail::BlankNode { .. } => TermKind::BlankNode,
            Detail::Literal { .. } => TermKind::Literal,
            Detail::Variable { .. } => TermKind::Variable,
        }
    }

    /// The value view: the URI without angle brackets, the blank label, the
    /// literal's lexical value without quotes, or the variable name.
    pub fn value(&self) -> &str {
        match &self.detail {
            Detail::Iri { value } => value.slice(&self.identifier),
            Detail::BlankNode { label } => label.slice(&self.identifier),
            Detail::Literal { value, .. } => value.slice(&self.identifier),
            Detail::Variable { .. } => &self.identifier,
        }
    }

    /// The language tag, if this is a language-tagged literal.
    pub fn language(&self) -> Option<&str> {
        match &self.detail {
            Detail::Literal { lang: Some(l), .. } => Some(l.slice(&self.identifier)),
            _ => None,
        }
    }

    /// The datatype IRI, if this is a typed literal. Never `xsd:string`.
    pub fn datatype(&self) -> Option<&str> {
        match &self.detail {
            Detail::Literal { datatype: Some(d), .. } => Some(d.slice(&self.identifier)),
            _ => None,
        }
    }

    /// Whether this literal carries a language tag.
    pub fn has_language(&self) -> bool {
        self.language().is_some()
    }

    /// Whether this literal carries an explicit datatype.
    pub fn has_datatype(&self) -> bool {
        self.datatype().is_some()
    }

    pub fn is_iri(&self) -> bool {
        matches!(self.detail, Detail::Iri { .. })
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.detail, Detail::BlankNode { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.detail, Detail::Literal { .. })
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.detail, Detail::Variable { .. })
    }

    /// Whether this is an anonymous variable.
    pub fn is_anonymous_variable(&self) -> bool {
        matches!(self.detail, Detail::Variable { anonymous: true })
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Term {}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }
}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_iri_canonical_string() {
        let t = Term::iri("http://example.com/x");
        assert_eq!(t.identifier(), "<http://example.com/x>");
        assert_eq!(t.value(), "http://example.com/x");
        assert_eq!(t.kind(), TermKind::Iri);
    }

    #[test]
    fn test_blank_node() {
        let t = Term::blank("b0");
        assert_eq!(t.identifier(), "_:b0");
        assert_eq!(t.value(), "b0");
        assert!(t.is_blank());
    }

    #[test]
    fn test_plain_literal() {
        let t = Term::plain_literal("hello");
        assert_eq!(t.identifier(), "\"hello\"");
        assert_eq!(t.value(), "hello");
        assert!(!t.has_language());
        assert!(!t.has_datatype());
    }

    #[test]
    fn test_lang_literal_views() {
        let t = Term::lang_literal("hello", "en");
        assert_eq!(t.identifier(), "\"hello\"@en");
        assert_eq!(t.value(), "hello");
        assert_eq!(t.language(), Some("en"));
        // lang and datatype are mutually exclusive
        assert!(!t.has_datatype());
    }

    #[test]
    fn test_typed_literal_views() {
        let t = Term::typed_literal("42", crate::ns::XSD_INTEGER);
        assert_eq!(
            t.identifier(),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(t.value(), "42");
        assert_eq!(t.datatype(), Some(crate::ns::XSD_INTEGER));
        assert!(!t.has_language());
    }

    #[test]
    fn test_xsd_string_is_implicit() {
        let t = Term::typed_literal("text", crate::ns::XSD_STRING);
        assert_eq!(t.identifier(), "\"text\"");
        assert!(!t.has_datatype());
        assert_eq!(t, Term::plain_literal("text"));
    }

    #[test]
    fn test_lang_and_datatype_rejected() {
        let err = Term::literal("x", Some("en"), Some(crate::ns::XSD_STRING));
        assert!(matches!(err, Err(TurtleError::LanguageAndDatatype)));
    }

    #[test]
    fn test_variable() {
        let t = Term::variable("name", false);
        assert_eq!(t.identifier(), "name");
        assert!(t.is_variable());
        assert!(!t.is_anonymous_variable());

        let anon = Term::variable("b0", true);
        assert!(anon.is_anonymous_variable());
    }

    #[test]
    fn test_equality_on_identifier() {
        assert_eq!(Term::iri("http://e.org/x"), Term::iri("http://e.org/x"));
        assert_ne!(Term::iri("http://e.org/x"), Term::blank("x"));
        // views never leak across instances; equality is byte-equality of
        // the canonical strings
        assert_ne!(Term::plain_literal("x"), Term::variable("\"x\"", false).clone());
    }

    #[test]
    fn test_total_order_across_kinds() {
        let mut terms = vec![
            Term::variable("zed", false),
            Term::iri("http://a.example/"),
            Term::blank("a"),
            Term::plain_literal("a"),
        ];
        terms.sort();
        let ids: Vec<&str> = terms.iter().map(|t| t.identifier()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(Term::iri("http://e.org/x"));
        set.insert(Term::iri("http://e.org/x"));
        set.insert(Term::blank("x"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_iri_roundtrip() {
        let u = "http://example.com/x";
        let t = Term::iri(u);
        assert_eq!(t.identifier(), format!("<{}>", u));
        // reparse the identifier's value as a standalone term
        let again = Term::iri(t.value());
        assert_eq!(t, again);
    }
}
