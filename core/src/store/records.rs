// Record store — bounded in-memory users and messages
//
// Owns both collections. Capacity checks happen here; name validity is the
// caller's job (see `Chatbox::send_message`).

use crate::message::{Message, User};
use crate::store::ordered::sort_all_by_sender;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Default maximum registered users
pub const MAX_USERS: usize = 10;

/// Default maximum stored messages
pub const MAX_MESSAGES: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Maximum number of {kind} reached ({limit})")]
    CapacityExceeded { kind: RecordKind, limit: usize },
    #[error("Invalid user number {index} (expected 1..={count})")]
    InvalidSelection { index: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Message,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::User => f.write_str("users"),
            RecordKind::Message => f.write_str("messages"),
        }
    }
}

/// Capacity limits for a record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLimits {
    pub max_users: usize,
    pub max_messages: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_users: MAX_USERS,
            max_messages: MAX_MESSAGES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    users: Vec<User>,
    messages: Vec<Message>,
    limits: StoreLimits,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::with_limits(StoreLimits::default())
    }

    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            users: Vec::with_capacity(limits.max_users),
            messages: Vec::with_capacity(limits.max_messages),
            limits,
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Register a user under the next sequential id.
    ///
    /// Fails without side effects once `max_users` users exist.
    pub fn register_user(&mut self, name: impl Into<String>) -> Result<User, StoreError> {
        if self.users.len() >= self.limits.max_users {
            warn!("User registration refused: store is full");
            return Err(StoreError::CapacityExceeded {
                kind: RecordKind::User,
                limit: self.limits.max_users,
            });
        }

        let user = User {
            name: name.into(),
            id: self.users.len() as u32 + 1,
        };
        debug!("Registered user {} as #{}", user.name, user.id);
        self.users.push(user.clone());
        Ok(user)
    }

    /// Users in registration order
    pub fn list_users(&self) -> &[User] {
        &self.users
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Find a user by exact name
    pub fn find_user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    /// Look up a user by 1-based position in registration order
    pub fn select_user_by_index(&self, index: usize) -> Result<&str, StoreError> {
        index
            .checked_sub(1)
            .and_then(|i| self.users.get(i))
            .map(|u| u.name.as_str())
            .ok_or(StoreError::InvalidSelection {
                index,
                count: self.users.len(),
            })
    }

    /// Sentinel form of `select_user_by_index`: an empty string means the
    /// index was out of range and any dependent step must be skipped.
    pub fn select_user_name(&self, index: usize) -> String {
        match self.select_user_by_index(index) {
            Ok(name) => name.to_string(),
            Err(e) => {
                warn!("{}", e);
                String::new()
            }
        }
    }

    /// Append a message and return the stored copy.
    ///
    /// Fails without side effects once `max_messages` messages exist.
    pub fn record_message(
        &mut self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        body: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<Message, StoreError> {
        if self.messages.len() >= self.limits.max_messages {
            warn!("Message refused: store is full");
            return Err(StoreError::CapacityExceeded {
                kind: RecordKind::Message,
                limit: self.limits.max_messages,
            });
        }

        let message = Message::new(sender, receiver, body, timestamp);
        debug!(
            "Recorded message {} -> {} ({} chars)",
            message.sender_name,
            message.receiver_name,
            message.body.chars().count()
        );
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Messages in their current order (insertion order until resorted)
    pub fn list_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Replace the message collection with a copy sorted by sender name.
    ///
    /// The previous insertion order is discarded.
    pub fn sort_messages_by_sender(&mut self) {
        self.messages = sort_all_by_sender(&self.messages);
        debug!("Resorted {} messages by sender", self.messages.len());
    }
}
