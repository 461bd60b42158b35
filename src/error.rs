//! Error types for Turtle and triple-pattern parsing
//!
//! All parse failures are fatal to the current parse: they abort the builder
//! and propagate to whichever thread owns the failing step (a direct return in
//! synchronous mode, stored-and-replayed through the bounded queue in
//! streaming mode). Triples emitted before the failure point remain valid.

/// Unified error type for this crate.
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    /// Malformed token (string, number, IRI) with a byte offset.
    #[error("lexical error at offset {position}: {message}")]
    Lexical { position: usize, message: String },

    /// Input does not match any grammar production.
    #[error("grammar error at offset {position}: {message}")]
    Grammar { position: usize, message: String },

    /// A prefixed name references a prefix that was never declared.
    #[error("undefined prefix: {0:?}")]
    UndefinedPrefix(String),

    /// A collection or blank-node property list is still open at end of input.
    #[error("unterminated {0} at end of input")]
    UnterminatedNesting(&'static str),

    /// A literal carried both a language tag and a datatype. Rejected, never
    /// heuristically resolved.
    #[error("literal cannot carry both a language tag and a datatype")]
    LanguageAndDatatype,

    /// API misuse, e.g. dereferencing an exhausted iterator.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// I/O failure while reading a file or stream source.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The consumer dropped the streaming pipeline; the producer unwinds.
    #[error("parse cancelled")]
    Cancelled,
}

impl TurtleError {
    /// Shorthand for a positioned grammar error.
    pub(crate) fn grammar(position: usize, message: impl Into<String>) -> Self {
        TurtleError::Grammar {
            position,
            message: message.into(),
        }
    }

    /// Shorthand for a positioned lexical error.
    pub(crate) fn lexical(position: usize, message: impl Into<String>) -> Self {
        TurtleError::Lexical {
            position,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TurtleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = TurtleError::grammar(17, "expected '.'");
        assert_eq!(e.to_string(), "grammar error at offset 17: expected '.'");

        let e = TurtleError::UndefinedPrefix("foaf".to_string());
        assert_eq!(e.to_string(), "undefined prefix: \"foaf\"");

        let e = TurtleError::UnterminatedNesting("collection");
        assert_eq!(e.to_string(), "unterminated collection at end of input");
    }
}
