//! Parser surfaces
//!
//! String parsers parse eagerly on construction and hand out their triples
//! through a pull iterator; file parsers wrap them after reading the whole
//! file. The concurrent stream parser in [`stream`] is the surface for
//! inputs too large to hold in memory.

pub mod stream;

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::builder::DiscardSink;
use crate::error::{Result, TurtleError};
use crate::grammar::{GrammarEngine, ParseMode};
use crate::prefixes::PrefixRegistry;
use crate::term::{Triple, TriplePattern};

pub use stream::ConcurrentStreamParser;

/// A source of parsed triples consumed one element at a time.
///
/// `has_next` may block (the stream parser waits on its queue) and reports
/// `false` permanently once the source is drained. A parse error is
/// surfaced through `stored_error` after `has_next` turns false.
pub trait TriplesSource {
    type Item;

    fn has_next(&mut self) -> bool;
    fn next_item(&mut self) -> Option<Self::Item>;
    fn stored_error(&mut self) -> Option<TurtleError>;
}

/// Pull-style cursor over a [`TriplesSource`].
///
/// Construction promotes the first ready element to current, so the loop is
/// `while has_more { use current; advance }`. `current` is valid exactly
/// while `has_more` is true; on an empty or exhausted source it errors with
/// `IllegalState`. [`Iterator`] is implemented on top for `for`-loop use.
pub struct PullIterator<S: TriplesSource> {
    source: S,
    current: Option<S::Item>,
}

impl<S: TriplesSource> PullIterator<S> {
    pub fn new(mut source: S) -> Self {
        let current = if source.has_next() {
            source.next_item()
        } else {
            None
        };
        PullIterator { source, current }
    }

    /// Whether a current element is in place.
    pub fn has_more(&self) -> bool {
        self.current.is_some()
    }

    /// Replace the current element with the next one from the source, if any.
    pub fn advance(&mut self) {
        self.current = if self.source.has_next() {
            self.source.next_item()
        } else {
            None
        };
    }

    /// Borrow the current element.
    pub fn current(&self) -> Result<&S::Item> {
        self.current
            .as_ref()
            .ok_or(TurtleError::IllegalState("no current element"))
    }

    /// The parse error that ended the source early, if any. Meaningful only
    /// once `has_more` is false.
    pub fn stored_error(&mut self) -> Option<TurtleError> {
        self.source.stored_error()
    }
}

impl<S: TriplesSource> Iterator for PullIterator<S> {
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current.take()?;
        self.advance();
        Some(item)
    }
}

/// A drained in-memory buffer of parse results.
pub struct BufferedTriples<T> {
    buf: VecDeque<T>,
    error: Option<TurtleError>,
}

impl<T> TriplesSource for BufferedTriples<T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        !self.buf.is_empty()
    }

    fn next_item(&mut self) -> Option<T> {
        self.buf.pop_front()
    }

    fn stored_error(&mut self) -> Option<TurtleError> {
        self.error.take()
    }
}

fn parse_into_buffer<T: From<Triple>>(
    input: &str,
    mode: ParseMode,
    prefixes: PrefixRegistry,
) -> BufferedTriples<T> {
    let mut engine = GrammarEngine::new(VecDeque::new(), mode, prefixes);
    let error = engine.parse_document(input).err();
    let buf = engine.into_sink().into_iter().map(T::from).collect();
    BufferedTriples { buf, error }
}

fn check_parsable(input: &str, mode: ParseMode) -> bool {
    let mut engine = GrammarEngine::new(DiscardSink, mode, PrefixRegistry::new());
    engine.parse_document(input).is_ok()
}

/// Eager in-memory parser for Turtle documents.
///
/// The whole document is parsed in the constructor; triples produced before
/// a parse error are still yielded, and the error replays from
/// `stored_error` after the last of them.
pub struct TurtleStringParser {
    iter: PullIterator<BufferedTriples<Triple>>,
}

impl TurtleStringParser {
    pub fn new(input: &str) -> Self {
        Self::with_prefixes(input, PrefixRegistry::new())
    }

    /// Parse with pre-declared prefixes, as when the enclosing document's
    /// directives are handled elsewhere.
    pub fn with_prefixes(input: &str, prefixes: PrefixRegistry) -> Self {
        TurtleStringParser {
            iter: PullIterator::new(parse_into_buffer(input, ParseMode::Turtle, prefixes)),
        }
    }

    /// Whether the input parses to the end without error. Nothing is
    /// retained; triples go to a discarding sink.
    pub fn is_parsable(input: &str) -> bool {
        check_parsable(input, ParseMode::Turtle)
    }

    pub fn iter(self) -> PullIterator<BufferedTriples<Triple>> {
        self.iter
    }
}

impl Iterator for TurtleStringParser {
    type Item = Triple;

    fn next(&mut self) -> Option<Triple> {
        self.iter.next()
    }
}

/// Eager in-memory parser for SPARQL-style triple-pattern blocks.
///
/// Accepts variables in any term position and an omitted dot after the
/// final pattern; yields [`TriplePattern`]s.
pub struct TriplesBlockStringParser {
    iter: PullIterator<BufferedTriples<TriplePattern>>,
}

impl TriplesBlockStringParser {
    pub fn new(input: &str) -> Self {
        Self::with_prefixes(input, PrefixRegistry::new())
    }

    pub fn with_prefixes(input: &str, prefixes: PrefixRegistry) -> Self {
        TriplesBlockStringParser {
            iter: PullIterator::new(parse_into_buffer(input, ParseMode::TriplesBlock, prefixes)),
        }
    }

    pub fn is_parsable(input: &str) -> bool {
        check_parsable(input, ParseMode::TriplesBlock)
    }

    pub fn iter(self) -> PullIterator<BufferedTriples<TriplePattern>> {
        self.iter
    }
}

impl Iterator for TriplesBlockStringParser {
    type Item = TriplePattern;

    fn next(&mut self) -> Option<TriplePattern> {
        self.iter.next()
    }
}

/// Read a whole Turtle file into memory and parse it eagerly. For inputs
/// too large for that, use [`ConcurrentStreamParser`].
pub struct TurtleFileParser;

impl TurtleFileParser {
    pub fn open(path: impl AsRef<Path>) -> Result<TurtleStringParser> {
        let content = fs::read_to_string(path)?;
        Ok(TurtleStringParser::new(&content))
    }

    pub fn open_with_prefixes(
        path: impl AsRef<Path>,
        prefixes: PrefixRegistry,
    ) -> Result<TurtleStringParser> {
        let content = fs::read_to_string(path)?;
        Ok(TurtleStringParser::with_prefixes(&content, prefixes))
    }
}

/// Read a whole triple-pattern file into memory and parse it eagerly.
pub struct TriplesBlockFileParser;

impl TriplesBlockFileParser {
    pub fn open(path: impl AsRef<Path>) -> Result<TriplesBlockStringParser> {
        let content = fs::read_to_string(path)?;
        Ok(TriplesBlockStringParser::new(&content))
    }

    pub fn open_with_prefixes(
        path: impl AsRef<Path>,
        prefixes: PrefixRegistry,
    ) -> Result<TriplesBlockStringParser> {
        let content = fs::read_to_string(path)?;
        Ok(TriplesBlockStringParser::with_prefixes(&content, prefixes))
    }
}
