//! Triple and triple-pattern value types

use std::fmt;

use super::Term;

/// An RDF statement: an ordered (subject, predicate, object) tuple of bound
/// terms. Immutable after construction; compares and hashes structurally.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Triple { subject, predicate, object }
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} .", self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// A triple where any slot may hold a SPARQL variable instead of a bound
/// term. Produced only by the triple-pattern-block parsing mode.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl TriplePattern {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        TriplePattern { subject, predicate, object }
    }

    /// Whether any slot holds a variable.
    pub fn has_variables(&self) -> bool {
        self.subject.is_variable() || self.predicate.is_variable() || self.object.is_variable()
    }
}

impl From<Triple> for TriplePattern {
    fn from(t: Triple) -> Self {
        TriplePattern {
            subject: t.subject,
            predicate: t.predicate,
            object: t.object,
        }
    }
}

impl fmt::Debug for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} {:?} .", self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn iri(s: &str) -> Term {
        Term::iri(s)
    }

    #[test]
    fn test_triple_equality() {
        let a = Triple::new(iri("http://e.com/x"), iri("http://e.com/p"), iri("http://e.com/y"));
        let b = Triple::new(iri("http://e.com/x"), iri("http://e.com/p"), iri("http://e.com/y"));
        let c = Triple::new(iri("http://e.com/not"), iri("http://e.com/p"), iri("http://e.com/y"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_triple_hash() {
        let mut set: HashSet<Triple> = HashSet::new();
        set.insert(Triple::new(iri("http://e.com/x"), iri("http://e.com/p"), iri("http://e.com/y")));
        set.insert(Triple::new(iri("http://e.com/x"), iri("http://e.com/p"), iri("http://e.com/y")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_triple_display() {
        let t = Triple::new(iri("http://e.com/s"), iri("http://e.com/p"), Term::plain_literal("o"));
        assert_eq!(t.to_string(), "<http://e.com/s> <http://e.com/p> \"o\" .");
    }

    #[test]
    fn test_pattern_variables() {
        let p = TriplePattern::new(
            Term::variable("x", false),
            iri("http://xmlns.com/foaf/0.1/name"),
            Term::variable("name", false),
        );
        assert!(p.has_variables());

        let ground: TriplePattern =
            Triple::new(iri("http://e.com/s"), iri("http://e.com/p"), iri("http://e.com/o")).into();
        assert!(!ground.has_variables());
    }
}
