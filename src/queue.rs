//! Bounded handoff queue between the parsing thread and the consumer
//!
//! Single producer, single consumer. The producer blocks when the queue is
//! full and is only woken once the consumer has drained it below a low
//! watermark (one tenth of capacity), so the two threads trade bursts
//! instead of thrashing on every element. Completion travels in-band:
//! `finish` marks the end of production and carries the terminal error, if
//! any; `close` lets the consumer tear the producer down early.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::error::{Result, TurtleError};

/// Default capacity used by the stream parsers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32_768;

struct State<T> {
    buf: VecDeque<T>,
    finished: bool,
    closed: bool,
    error: Option<TurtleError>,
    producer_waiting: bool,
}

/// A blocking bounded FIFO with high/low watermark hysteresis.
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    /// signalled when the producer may push again
    space: Condvar,
    /// signalled when elements (or completion) are available
    items: Condvar,
    capacity: usize,
    low_watermark: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        BoundedQueue {
            state: Mutex::new(State {
                buf: VecDeque::new(),
                finished: false,
                closed: false,
                error: None,
                producer_waiting: false,
            }),
            space: Condvar::new(),
            items: Condvar::new(),
            capacity,
            low_watermark: (capacity / 10).max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append an element, blocking while the queue is at capacity. Returns
    /// `Err(Cancelled)` once the consumer has closed the queue.
    pub fn push(&self, item: T) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        while state.buf.len() >= self.capacity && !state.closed {
            state.producer_waiting = true;
            state = self.space.wait(state).unwrap();
        }
        state.producer_waiting = false;
        if state.closed {
            return Err(TurtleError::Cancelled);
        }
        state.buf.push_back(item);
        drop(state);
        self.items.notify_one();
        Ok(())
    }

    /// Remove the oldest element, blocking until one is available or the
    /// producer has finished. `None` means the queue is drained and no more
    /// elements will arrive.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(item) = state.buf.pop_front() {
                // wake the producer only once the backlog has drained
                // below the low watermark
                if state.producer_waiting && state.buf.len() < self.low_watermark {
                    self.space.notify_one();
                }
                return Some(item);
            }
            if state.finished {
                return None;
            }
            state = self.items.wait(state).unwrap();
        }
    }

    /// Mark the end of production, recording the terminal error if the
    /// producer failed. Idempotent beyond the first call's error.
    pub fn finish(&self, error: Option<TurtleError>) {
        let mut state = self.state.lock().unwrap();
        if !state.finished {
            state.finished = true;
            state.error = error;
        }
        drop(state);
        self.items.notify_all();
    }

    /// Consumer-side shutdown: discard buffered elements and make every
    /// pending or future `push` return `Err(Cancelled)` so the producer
    /// thread unwinds promptly.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        state.buf.clear();
        drop(state);
        self.space.notify_all();
        self.items.notify_all();
    }

    pub fn is_finished(&self) -> bool {
        self.state.lock().unwrap().finished
    }

    /// Take the terminal error left behind by `finish`, if any.
    pub fn take_error(&self) -> Option<TurtleError> {
        self.state.lock().unwrap().error.take()
    }
}
