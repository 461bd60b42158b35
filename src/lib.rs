//! RDF Turtle parsing with incremental triple construction and
//! concurrent streaming.
//!
//! # Architecture
//!
//! Parsing is split into two halves connected by an event stream:
//!
//! - [`grammar`] recognises Turtle (or SPARQL triple-pattern block) syntax
//!   and reports grammar matches as [`builder::Event`]s
//! - [`builder::TripleBuilder`] holds the construction state and assembles
//!   finished [`Triple`]s out of those events, desugaring collections and
//!   blank-node property lists along the way
//!
//! Finished triples flow into a [`builder::TripleSink`]; the in-memory
//! parsers buffer them, the streaming parser pushes them into a bounded
//! queue drained by the consumer thread.
//!
//! # Example
//!
//! ```rust
//! use rdf_turtle::{Triple, TurtleStringParser};
//!
//! let parser = TurtleStringParser::new(
//!     "@prefix ex: <http://example.org/> .\n\
//!      ex:alice ex:knows ex:bob .",
//! );
//! let triples: Vec<Triple> = parser.collect();
//! assert_eq!(triples.len(), 1);
//! assert_eq!(triples[0].subject.identifier(), "<http://example.org/alice>");
//! ```
//!
//! For inputs too large to hold in memory, [`ConcurrentStreamParser`]
//! parses on a producer thread and hands triples over through a bounded
//! queue with backpressure:
//!
//! ```rust,no_run
//! use rdf_turtle::ConcurrentStreamParser;
//!
//! let parser = ConcurrentStreamParser::open("dataset.ttl")?;
//! for triple in parser {
//!     println!("{triple}");
//! }
//! # Ok::<(), rdf_turtle::TurtleError>(())
//! ```

pub mod builder;
pub mod error;
pub mod grammar;
pub mod ns;
pub mod parser;
pub mod prefixes;
pub mod queue;
pub mod term;

pub use builder::{Event, TripleBuilder, TripleSink};
pub use error::{Result, TurtleError};
pub use grammar::{GrammarEngine, ParseMode};
pub use parser::{
    ConcurrentStreamParser, PullIterator, TriplesBlockFileParser, TriplesBlockStringParser,
    TriplesSource, TurtleFileParser, TurtleStringParser,
};
pub use prefixes::PrefixRegistry;
pub use queue::{BoundedQueue, DEFAULT_QUEUE_CAPACITY};
pub use term::{Term, TermKind, Triple, TriplePattern};
