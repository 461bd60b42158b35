//! Incremental triple-construction state machine
//!
//! The grammar engine recognises productions and reports them as ordered
//! [`Event`]s; this module turns that event sequence into completed
//! [`Triple`]s. The builder owns all per-parse mutable state (current
//! subject and predicate, the pending predicate-object pairs, and the stack
//! of open collections and blank-node property lists) and moves each
//! finished triple into a [`TripleSink`], so the same machine serves both
//! the synchronous in-process queue and the concurrent bounded pipeline.
//!
//! Desugaring happens here, not in the grammar: collections become
//! `rdf:first`/`rdf:rest`/`rdf:nil` chains and blank-node property lists
//! become fresh blank-node subjects, both emitted when their frame closes.

use std::collections::VecDeque;
use std::mem;

use crate::error::{Result, TurtleError};
use crate::ns;
use crate::term::{Term, Triple};

/// A grammar-rule match event, in source order.
///
/// One variant per grammar production the state machine cares about; the
/// engine that produces them is interchangeable.
#[derive(Debug, Clone)]
pub enum Event {
    /// A subject term was recognised; it becomes the current subject.
    SubjectParsed(Term),
    /// A verb was recognised (`a` already resolved to `rdf:type`).
    VerbParsed(Term),
    /// An object term (or variable) was recognised.
    ObjectParsed(Term),
    /// The (current verb, last object) pair is complete.
    PredicateObjectPairClosed,
    /// `(`: a collection starts.
    CollectionOpen,
    /// `)`: the innermost collection ends and desugars.
    CollectionClose,
    /// `[`: a blank-node property list starts.
    BnodePropertyListOpen,
    /// `]`: the innermost blank-node property list ends.
    BnodePropertyListClose,
    /// `.`: flush all pending pairs against the current subject.
    TripleStatementClosed,
    /// End of document; no further events are processed.
    DocumentComplete,
}

/// Destination for completed triples. Implementations decide whether
/// `accept` stores, discards, or blocks on backpressure.
pub trait TripleSink {
    fn accept(&mut self, triple: Triple) -> Result<()>;
}

impl TripleSink for Vec<Triple> {
    fn accept(&mut self, triple: Triple) -> Result<()> {
        self.push(triple);
        Ok(())
    }
}

impl TripleSink for VecDeque<Triple> {
    fn accept(&mut self, triple: Triple) -> Result<()> {
        self.push_back(triple);
        Ok(())
    }
}

/// Drops every triple; used by validation-only parsing.
#[derive(Debug, Default)]
pub struct DiscardSink;

impl TripleSink for DiscardSink {
    fn accept(&mut self, _triple: Triple) -> Result<()> {
        Ok(())
    }
}

/// Saved outer context of an open blank-node property list.
#[derive(Debug)]
struct PropertyListFrame {
    node: Term,
    saved_subject: Option<Term>,
    saved_predicate: Option<Term>,
    saved_pending: Vec<(Term, Term)>,
}

/// One open nesting construct. A single tagged stack keeps the interleaving
/// right: an object inside a property list that is itself inside a
/// collection pairs with the property-list verb instead of joining the
/// outer collection's items.
#[derive(Debug)]
enum Frame {
    Collection(Vec<Term>),
    PropertyList(PropertyListFrame),
}

impl Frame {
    fn kind(&self) -> &'static str {
        match self {
            Frame::Collection(_) => "collection",
            Frame::PropertyList(_) => "blank-node property list",
        }
    }
}

/// The state machine. Created once per parse, mutated only by the parsing
/// thread, discarded when parsing completes or fails.
#[derive(Debug)]
pub struct TripleBuilder<S: TripleSink> {
    sink: S,
    subject: Option<Term>,
    predicate: Option<Term>,
    last_object: Option<Term>,
    pending: Vec<(Term, Term)>,
    nesting: Vec<Frame>,
    /// Term produced by the most recent collection/property-list close,
    /// consumed by the grammar as the surrounding subject or object.
    element: Option<Term>,
    blank_counter: u64,
    finished: bool,
}

impl<S: TripleSink> TripleBuilder<S> {
    pub fn new(sink: S) -> Self {
        TripleBuilder {
            sink,
            subject: None,
            predicate: None,
            last_object: None,
            pending: Vec::new(),
            nesting: Vec::new(),
            element: None,
            blank_counter: 0,
            finished: false,
        }
    }

    /// Apply one event to the machine.
    pub fn handle(&mut self, event: Event) -> Result<()> {
        if self.finished {
            return Err(TurtleError::IllegalState("event after document completion"));
        }
        match event {
            Event::SubjectParsed(term) => {
                self.subject = Some(term);
            }
            Event::VerbParsed(term) => {
                self.predicate = Some(term);
            }
            Event::ObjectParsed(term) => match self.nesting.last_mut() {
                Some(Frame::Collection(items)) => items.push(term),
                _ => self.last_object = Some(term),
            },
            Event::PredicateObjectPairClosed => {
                let predicate = self
                    .predicate
                    .clone()
                    .ok_or(TurtleError::IllegalState("pair closed without a verb"))?;
                let object = self
                    .last_object
                    .take()
                    .ok_or(TurtleError::IllegalState("pair closed without an object"))?;
                self.pending.push((predicate, object));
            }
            Event::CollectionOpen => {
                self.nesting.push(Frame::Collection(Vec::new()));
            }
            Event::CollectionClose => match self.nesting.pop() {
                Some(Frame::Collection(items)) => {
                    let head = self.desugar_collection(items)?;
                    self.element = Some(head);
                }
                _ => return Err(TurtleError::IllegalState("unmatched collection close")),
            },
            Event::BnodePropertyListOpen => {
                let node = self.fresh_blank();
                self.nesting.push(Frame::PropertyList(PropertyListFrame {
                    node: node.clone(),
                    saved_subject: self.subject.take(),
                    saved_predicate: self.predicate.take(),
                    saved_pending: mem::take(&mut self.pending),
                }));
                self.subject = Some(node);
            }
            Event::BnodePropertyListClose => match self.nesting.pop() {
                Some(Frame::PropertyList(frame)) => {
                    for (predicate, object) in mem::take(&mut self.pending) {
                        self.sink
                            .accept(Triple::new(frame.node.clone(), predicate, object))?;
                    }
                    self.subject = frame.saved_subject;
                    self.predicate = frame.saved_predicate;
                    self.pending = frame.saved_pending;
                    self.element = Some(frame.node);
                }
                _ => return Err(TurtleError::IllegalState("unmatched property list close")),
            },
            Event::TripleStatementClosed => {
                let subject = self
                    .subject
                    .take()
                    .ok_or(TurtleError::IllegalState("statement closed without a subject"))?;
                for (predicate, object) in mem::take(&mut self.pending) {
                    self.sink
                        .accept(Triple::new(subject.clone(), predicate, object))?;
                }
                self.predicate = None;
                self.last_object = None;
            }
            Event::DocumentComplete => {
                if let Some(frame) = self.nesting.last() {
                    return Err(TurtleError::UnterminatedNesting(frame.kind()));
                }
                self.finished = true;
            }
        }
        Ok(())
    }

    /// Take the term synthesised by the most recent close event. The grammar
    /// calls this to use a collection or property list as subject or object.
    pub fn take_element(&mut self) -> Result<Term> {
        self.element
            .take()
            .ok_or(TurtleError::IllegalState("no pending nested element"))
    }

    /// Allocate a synthetic blank node. Labels are unique within one parse.
    pub fn fresh_blank(&mut self) -> Term {
        let label = format!("b{}", self.blank_counter);
        self.blank_counter += 1;
        Term::blank(label)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Emit the `rdf:first`/`rdf:rest` chain for a closed collection and
    /// return its head term (`rdf:nil` for the empty collection).
    fn desugar_collection(&mut self, items: Vec<Term>) -> Result<Term> {
        if items.is_empty() {
            return Ok(Term::iri(ns::RDF_NIL));
        }
        let nodes: Vec<Term> = items.iter().map(|_| self.fresh_blank()).collect();
        let head = nodes[0].clone();
        let count = items.len();
        for (i, item) in items.into_iter().enumerate() {
            self.sink
                .accept(Triple::new(nodes[i].clone(), Term::iri(ns::RDF_FIRST), item))?;
            let rest = if i + 1 < count {
                nodes[i + 1].clone()
            } else {
                Term::iri(ns::RDF_NIL)
            };
            self.sink
                .accept(Triple::new(nodes[i].clone(), Term::iri(ns::RDF_REST), rest))?;
        }
        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Term {
        Term::iri(s)
    }

    fn int_lit(s: &str) -> Term {
        Term::typed_literal(s, ns::XSD_INTEGER)
    }

    #[test]
    fn test_simple_statement() {
        let mut b = TripleBuilder::new(Vec::new());
        b.handle(Event::SubjectParsed(iri("http://e.com/s"))).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p"))).unwrap();
        b.handle(Event::ObjectParsed(iri("http://e.com/o"))).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::TripleStatementClosed).unwrap();
        b.handle(Event::DocumentComplete).unwrap();

        let triples = b.into_sink();
        assert_eq!(triples.len(), 1);
        assert_eq!(
            triples[0],
            Triple::new(iri("http://e.com/s"), iri("http://e.com/p"), iri("http://e.com/o"))
        );
    }

    #[test]
    fn test_predicate_object_groups_keep_source_order() {
        // s p1 o1 ; p2 o2a, o2b .
        let mut b = TripleBuilder::new(Vec::new());
        b.handle(Event::SubjectParsed(iri("http://e.com/s"))).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p1"))).unwrap();
        b.handle(Event::ObjectParsed(iri("http://e.com/o1"))).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p2"))).unwrap();
        b.handle(Event::ObjectParsed(iri("http://e.com/o2a"))).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::ObjectParsed(iri("http://e.com/o2b"))).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::TripleStatementClosed).unwrap();

        let triples = b.into_sink();
        let predicates: Vec<&str> = triples.iter().map(|t| t.predicate.value()).collect();
        assert_eq!(
            predicates,
            vec!["http://e.com/p1", "http://e.com/p2", "http://e.com/p2"]
        );
        assert_eq!(triples[1].object.value(), "http://e.com/o2a");
        assert_eq!(triples[2].object.value(), "http://e.com/o2b");
    }

    #[test]
    fn test_collection_desugaring() {
        // s p (1 2) .
        let mut b = TripleBuilder::new(Vec::new());
        b.handle(Event::SubjectParsed(iri("http://e.com/s"))).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p"))).unwrap();
        b.handle(Event::CollectionOpen).unwrap();
        b.handle(Event::ObjectParsed(int_lit("1"))).unwrap();
        b.handle(Event::ObjectParsed(int_lit("2"))).unwrap();
        b.handle(Event::CollectionClose).unwrap();
        let head = b.take_element().unwrap();
        b.handle(Event::ObjectParsed(head.clone())).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::TripleStatementClosed).unwrap();

        let triples = b.into_sink();
        // 4 synthetic chain triples plus the enclosing one
        assert_eq!(triples.len(), 5);
        assert_eq!(triples[0].subject, head);
        assert_eq!(triples[0].predicate, iri(ns::RDF_FIRST));
        assert_eq!(triples[0].object, int_lit("1"));
        assert_eq!(triples[1].predicate, iri(ns::RDF_REST));
        assert_eq!(triples[1].object, triples[2].subject);
        assert_eq!(triples[2].object, int_lit("2"));
        assert_eq!(triples[3].object, iri(ns::RDF_NIL));
        assert_eq!(triples[4].object, head);
    }

    #[test]
    fn test_empty_collection_is_nil() {
        let mut b = TripleBuilder::new(Vec::new());
        b.handle(Event::SubjectParsed(iri("http://e.com/s"))).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p"))).unwrap();
        b.handle(Event::CollectionOpen).unwrap();
        b.handle(Event::CollectionClose).unwrap();
        let head = b.take_element().unwrap();
        assert_eq!(head, iri(ns::RDF_NIL));
        b.handle(Event::ObjectParsed(head)).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::TripleStatementClosed).unwrap();

        let triples = b.into_sink();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].object, iri(ns::RDF_NIL));
    }

    #[test]
    fn test_property_list_desugaring() {
        // <a> <p> [ <q> <b> ] .
        let mut b = TripleBuilder::new(Vec::new());
        b.handle(Event::SubjectParsed(iri("http://e.com/a"))).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p"))).unwrap();
        b.handle(Event::BnodePropertyListOpen).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/q"))).unwrap();
        b.handle(Event::ObjectParsed(iri("http://e.com/b"))).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::BnodePropertyListClose).unwrap();
        let node = b.take_element().unwrap();
        b.handle(Event::ObjectParsed(node.clone())).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::TripleStatementClosed).unwrap();

        let triples = b.into_sink();
        assert_eq!(triples.len(), 2);
        assert!(node.is_blank());
        assert_eq!(
            triples[0],
            Triple::new(node.clone(), iri("http://e.com/q"), iri("http://e.com/b"))
        );
        assert_eq!(
            triples[1],
            Triple::new(iri("http://e.com/a"), iri("http://e.com/p"), node)
        );
    }

    #[test]
    fn test_property_list_inside_collection() {
        // s p ( [ <q> <o> ] ) . The inner object pairs with <q>; it must
        // not join the collection's item list.
        let mut b = TripleBuilder::new(Vec::new());
        b.handle(Event::SubjectParsed(iri("http://e.com/s"))).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p"))).unwrap();
        b.handle(Event::CollectionOpen).unwrap();
        b.handle(Event::BnodePropertyListOpen).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/q"))).unwrap();
        b.handle(Event::ObjectParsed(iri("http://e.com/o"))).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::BnodePropertyListClose).unwrap();
        let bnode = b.take_element().unwrap();
        b.handle(Event::ObjectParsed(bnode.clone())).unwrap();
        b.handle(Event::CollectionClose).unwrap();
        let head = b.take_element().unwrap();
        b.handle(Event::ObjectParsed(head)).unwrap();
        b.handle(Event::PredicateObjectPairClosed).unwrap();
        b.handle(Event::TripleStatementClosed).unwrap();

        let triples = b.into_sink();
        // bnpl pair + 2 chain triples (one item) + enclosing
        assert_eq!(triples.len(), 4);
        assert_eq!(triples[0].subject, bnode);
        assert_eq!(triples[0].predicate, iri("http://e.com/q"));
        // the collection has exactly one item: the bnode
        assert_eq!(triples[1].predicate, iri(ns::RDF_FIRST));
        assert_eq!(triples[1].object, bnode);
    }

    #[test]
    fn test_unterminated_nesting_is_fatal() {
        let mut b = TripleBuilder::new(Vec::new());
        b.handle(Event::SubjectParsed(iri("http://e.com/s"))).unwrap();
        b.handle(Event::VerbParsed(iri("http://e.com/p"))).unwrap();
        b.handle(Event::BnodePropertyListOpen).unwrap();
        let err = b.handle(Event::DocumentComplete);
        assert!(matches!(
            err,
            Err(TurtleError::UnterminatedNesting("blank-node property list"))
        ));
    }

    #[test]
    fn test_fresh_blanks_are_unique_per_parse() {
        let mut b = TripleBuilder::new(DiscardSink);
        let b0 = b.fresh_blank();
        let b1 = b.fresh_blank();
        assert_ne!(b0, b1);
        assert_eq!(b0.identifier(), "_:b0");
        assert_eq!(b1.identifier(), "_:b1");
    }

    #[test]
    fn test_no_events_after_completion() {
        let mut b = TripleBuilder::new(DiscardSink);
        b.handle(Event::DocumentComplete).unwrap();
        assert!(b.is_finished());
        let err = b.handle(Event::SubjectParsed(iri("http://e.com/s")));
        assert!(matches!(err, Err(TurtleError::IllegalState(_))));
    }
}
