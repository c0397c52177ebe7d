// Record types — users and the messages they exchange

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout used for display and for the append-only log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A registered user.
///
/// Ids are assigned by the record store in registration order, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name, unique only by convention
    pub name: String,
    /// Sequential id (1-based)
    pub id: u32,
}

/// A short text message between two registered users.
///
/// Immutable once recorded. The sender and receiver are stored by name, not id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Name of the sending user
    pub sender_name: String,
    /// Name of the receiving user
    pub receiver_name: String,
    /// Message text
    pub body: String,
    /// Local time the message was sent, `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
}

impl Message {
    pub fn new(
        sender_name: impl Into<String>,
        receiver_name: impl Into<String>,
        body: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            sender_name: sender_name.into(),
            receiver_name: receiver_name.into(),
            body: body.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// Current local time in `TIMESTAMP_FORMAT`
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Check that a string parses back with `TIMESTAMP_FORMAT`
pub fn is_well_formed_timestamp(value: &str) -> bool {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_message() {
        let msg = Message::new("alice", "bob", "hello world", "2024-01-02 03:04:05");

        assert_eq!(msg.sender_name, "alice");
        assert_eq!(msg.receiver_name, "bob");
        assert_eq!(msg.body, "hello world");
        assert!(is_well_formed_timestamp(&msg.timestamp));
    }

    #[test]
    fn test_timestamp_now_is_well_formed() {
        let now = timestamp_now();
        assert_eq!(now.len(), 19);
        assert!(is_well_formed_timestamp(&now));
    }

    #[test]
    fn test_malformed_timestamps() {
        assert!(!is_well_formed_timestamp(""));
        assert!(!is_well_formed_timestamp("2024-01-02"));
        assert!(!is_well_formed_timestamp("2024-13-02 03:04:05"));
        assert!(!is_well_formed_timestamp("02/01/2024 03:04:05"));
    }
}
