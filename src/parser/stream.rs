//! Concurrent streaming parser
//!
//! A producer thread reads the input in fixed-size chunks, cuts it at
//! statement boundaries and feeds complete statements to the grammar
//! engine, whose sink pushes triples into a [`BoundedQueue`]. The consumer
//! pops from the queue on its own thread; backpressure from the queue's
//! watermarks keeps the producer from racing ahead of a slow consumer.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::builder::TripleSink;
use crate::error::{Result, TurtleError};
use crate::grammar::{scan, GrammarEngine, ParseMode};
use crate::prefixes::PrefixRegistry;
use crate::queue::{BoundedQueue, DEFAULT_QUEUE_CAPACITY};
use crate::term::Triple;

use super::TriplesSource;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Sink end of the handoff queue; lives on the producer thread.
struct QueueSink(Arc<BoundedQueue<Triple>>);

impl TripleSink for QueueSink {
    fn accept(&mut self, triple: Triple) -> Result<()> {
        self.0.push(triple)
    }
}

/// Streaming Turtle parser backed by a producer thread and a bounded queue.
///
/// Triples come out in document order, each exactly once. When the producer
/// hits a parse error it stops, and the error replays from `stored_error`
/// after the triples parsed before it are drained. Dropping the parser
/// closes the queue and joins the producer, so an abandoned parse does not
/// leak a thread.
pub struct ConcurrentStreamParser {
    queue: Arc<BoundedQueue<Triple>>,
    producer: Option<JoinHandle<()>>,
    peeked: Option<Triple>,
    error: Option<TurtleError>,
}

impl ConcurrentStreamParser {
    /// Stream a Turtle file with the default queue capacity.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, DEFAULT_QUEUE_CAPACITY, PrefixRegistry::new())
    }

    /// Stream a Turtle file with an explicit queue capacity and seed
    /// prefixes.
    pub fn open_with(
        path: impl AsRef<Path>,
        capacity: usize,
        prefixes: PrefixRegistry,
    ) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader_with(BufReader::new(file), capacity, prefixes))
    }

    /// Stream from any reader. The reader moves onto the producer thread.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::from_reader_with(reader, DEFAULT_QUEUE_CAPACITY, PrefixRegistry::new())
    }

    pub fn from_reader_with<R: Read + Send + 'static>(
        reader: R,
        capacity: usize,
        prefixes: PrefixRegistry,
    ) -> Self {
        let queue = Arc::new(BoundedQueue::new(capacity));
        let producer_queue = Arc::clone(&queue);
        let producer = thread::spawn(move || {
            let result = pump(reader, &producer_queue, prefixes);
            match &result {
                Ok(()) => debug!("stream parse complete"),
                Err(TurtleError::Cancelled) => debug!("stream parse cancelled by consumer"),
                Err(error) => debug!(%error, "stream parse failed"),
            }
            producer_queue.finish(result.err());
        });

        ConcurrentStreamParser {
            queue,
            producer: Some(producer),
            peeked: None,
            error: None,
        }
    }
}

/// Producer loop: read chunks, repair UTF-8 split across chunk boundaries,
/// cut at statement ends and feed the engine.
fn pump<R: Read>(
    mut reader: R,
    queue: &Arc<BoundedQueue<Triple>>,
    prefixes: PrefixRegistry,
) -> Result<()> {
    let mut engine = GrammarEngine::new(
        QueueSink(Arc::clone(queue)),
        ParseMode::Turtle,
        prefixes,
    );
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut pending: Vec<u8> = Vec::new();
    let mut buf = String::new();
    let mut total_read: usize = 0;

    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        pending.extend_from_slice(&chunk[..n]);

        let valid_len = match std::str::from_utf8(&pending) {
            Ok(_) => pending.len(),
            // a char split at the chunk boundary completes on the next read
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(TurtleError::lexical(
                    total_read + e.valid_up_to(),
                    "invalid UTF-8 in input",
                ));
            }
        };
        let valid = std::str::from_utf8(&pending[..valid_len])
            .map_err(|_| TurtleError::lexical(total_read, "invalid UTF-8 in input"))?;
        buf.push_str(valid);
        pending.drain(..valid_len);
        total_read += n;

        if let Some(end) = scan::statement_end(&buf) {
            engine.feed(&buf[..end])?;
            buf.drain(..end);
        }
    }

    if !pending.is_empty() {
        return Err(TurtleError::lexical(total_read, "truncated UTF-8 at end of input"));
    }
    // whatever remains is the final (possibly dot-less-after-ws) tail
    engine.feed(&buf)?;
    engine.finish()
}

impl TriplesSource for ConcurrentStreamParser {
    type Item = Triple;

    fn has_next(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }
        match self.queue.pop() {
            Some(triple) => {
                self.peeked = Some(triple);
                true
            }
            None => {
                if self.error.is_none() {
                    self.error = self.queue.take_error();
                }
                false
            }
        }
    }

    fn next_item(&mut self) -> Option<Triple> {
        if self.peeked.is_none() {
            self.has_next();
        }
        self.peeked.take()
    }

    fn stored_error(&mut self) -> Option<TurtleError> {
        if self.error.is_none() {
            self.error = self.queue.take_error();
        }
        self.error.take()
    }
}

impl Iterator for ConcurrentStreamParser {
    type Item = Triple;

    fn next(&mut self) -> Option<Triple> {
        if self.has_next() {
            self.next_item()
        } else {
            None
        }
    }
}

impl Drop for ConcurrentStreamParser {
    fn drop(&mut self) {
        self.queue.close();
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
    }
}
