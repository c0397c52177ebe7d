// Ordered buffer — bounded, sender-ordered message queue
//
// Behaves like a min-priority queue keyed on `sender_name` (byte-wise string
// order). There is no priority field; "earliest" means lexicographically least.

use crate::message::Message;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::warn;

/// Default buffer capacity
pub const MAX_BUFFER_SIZE: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Ordered buffer is full (capacity {capacity})")]
    Full { capacity: usize },
    #[error("Ordered buffer is empty")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct OrderedBuffer {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl Default for OrderedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a message, keeping the buffer in ascending sender order.
    ///
    /// The new message goes after every message whose sender is `<=` its own,
    /// so equal senders stay in insertion order. At capacity the call is a
    /// no-op that returns `BufferError::Full`.
    pub fn insert(&mut self, message: Message) -> Result<(), BufferError> {
        if self.messages.len() >= self.capacity {
            warn!("Ordered buffer is full, dropping insert");
            return Err(BufferError::Full {
                capacity: self.capacity,
            });
        }

        let pos = self
            .messages
            .partition_point(|m| m.sender_name.as_bytes() <= message.sender_name.as_bytes());
        self.messages.insert(pos, message);
        Ok(())
    }

    /// Remove and return the message with the least sender name
    pub fn extract_min(&mut self) -> Result<Message, BufferError> {
        self.messages.pop_front().ok_or(BufferError::Empty)
    }

    /// Message `extract_min` would return next
    pub fn peek_min(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Sort messages by sender by pushing each through an `OrderedBuffer` and
/// draining it.
///
/// The buffer is sized to hold the whole input, so the output always has the
/// same length. Ties keep their input order.
pub fn sort_all_by_sender(messages: &[Message]) -> Vec<Message> {
    let mut buffer = OrderedBuffer::with_capacity(messages.len().max(MAX_BUFFER_SIZE));

    for message in messages {
        // Cannot fail: capacity covers the input
        let _ = buffer.insert(message.clone());
    }

    let mut sorted = Vec::with_capacity(buffer.len());
    while let Ok(message) = buffer.extract_min() {
        sorted.push(message);
    }
    sorted
}
