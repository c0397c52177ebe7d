// Chatbox Core — message logging spine
//
// Users register, exchange short text messages, and the messages can be
// listed, filtered, searched, or resorted by sender. Everything runs on the
// caller's thread; the only I/O is the append-only message log.

pub mod message;
pub mod message_log;
pub mod query;
pub mod store;

use thiserror::Error;
use tracing::{info, warn};

pub use message::{
    is_well_formed_timestamp, timestamp_now, Message, TextError, TextField, TextPolicy, User,
};
pub use message_log::{read_log, CsvLogAppender, LogError, LogFormat, LogSink, DEFAULT_LOG_FILE};
pub use query::{filter_by_sender_and_receiver, search_by_word};
pub use store::{
    sort_all_by_sender, BufferError, OrderedBuffer, RecordKind, RecordStore, StoreError,
    StoreLimits,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error)]
pub enum ChatboxError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Text(#[from] TextError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error("Invalid user selection")]
    InvalidSelection,
}

// ============================================================================
// DATA TYPES
// ============================================================================

/// Outcome of writing a recorded message to the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStatus {
    Written,
    /// The message is still recorded in memory
    Failed(String),
}

/// A successfully recorded message and what happened when it was logged
#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: Message,
    pub log_status: LogStatus,
}

// ============================================================================
// CHATBOX
// ============================================================================

/// Record store plus log sink, with the send flow wired between them
pub struct Chatbox<S: LogSink> {
    store: RecordStore,
    sink: S,
    policy: TextPolicy,
}

impl Chatbox<CsvLogAppender> {
    /// Chatbox logging to `path` with default limits
    pub fn with_log_file(path: impl Into<std::path::PathBuf>, format: LogFormat) -> Self {
        Self::new(RecordStore::new(), CsvLogAppender::new(path, format), TextPolicy::default())
    }
}

impl<S: LogSink> Chatbox<S> {
    pub fn new(store: RecordStore, sink: S, policy: TextPolicy) -> Self {
        Self {
            store,
            sink,
            policy,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn policy(&self) -> TextPolicy {
        self.policy
    }

    pub fn register_user(&mut self, name: &str) -> Result<User, ChatboxError> {
        let name = self.policy.apply(TextField::Name, name)?;
        let user = self.store.register_user(name)?;
        info!("User {} created", user.id);
        Ok(user)
    }

    pub fn list_users(&self) -> &[User] {
        self.store.list_users()
    }

    /// Name of the user at 1-based `index`, or an empty string when the index
    /// is out of range
    pub fn select_user(&self, index: usize) -> String {
        self.store.select_user_name(index)
    }

    /// Record a message and append it to the log.
    ///
    /// An empty sender or receiver is an aborted selection: nothing is stored.
    /// A log failure is reported in the returned `Delivery` and does not undo
    /// the in-memory record.
    pub fn send_message(
        &mut self,
        sender: &str,
        receiver: &str,
        body: &str,
    ) -> Result<Delivery, ChatboxError> {
        if sender.is_empty() || receiver.is_empty() {
            return Err(ChatboxError::InvalidSelection);
        }

        let body = self.policy.apply(TextField::Body, body)?;
        let message = self
            .store
            .record_message(sender, receiver, body, timestamp_now())?;

        let log_status = match self.sink.append(&message) {
            Ok(()) => LogStatus::Written,
            Err(e) => {
                warn!("Message recorded but not logged: {}", e);
                LogStatus::Failed(e.to_string())
            }
        };

        Ok(Delivery {
            message,
            log_status,
        })
    }

    pub fn list_messages(&self) -> &[Message] {
        self.store.list_messages()
    }

    pub fn filter(&self, sender: &str, receiver: &str) -> Vec<&Message> {
        filter_by_sender_and_receiver(self.store.list_messages(), sender, receiver)
    }

    pub fn search(&self, word: &str) -> Vec<&Message> {
        search_by_word(self.store.list_messages(), word)
    }

    /// Permanently reorder all messages by sender name
    pub fn sort_by_sender(&mut self) {
        self.store.sort_messages_by_sender();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_log::MockLogSink;

    fn chatbox_with(sink: MockLogSink) -> Chatbox<MockLogSink> {
        let mut chatbox = Chatbox::new(RecordStore::new(), sink, TextPolicy::Truncate);
        chatbox.register_user("alice").unwrap();
        chatbox.register_user("bob").unwrap();
        chatbox
    }

    #[test]
    fn test_send_logs_message() {
        let mut sink = MockLogSink::new();
        sink.expect_append()
            .withf(|m| m.sender_name == "alice" && m.receiver_name == "bob" && m.body == "hi")
            .times(1)
            .returning(|_| Ok(()));

        let mut chatbox = chatbox_with(sink);
        let delivery = chatbox.send_message("alice", "bob", "hi").unwrap();

        assert_eq!(delivery.log_status, LogStatus::Written);
        assert!(is_well_formed_timestamp(&delivery.message.timestamp));
        assert_eq!(chatbox.list_messages().len(), 1);
    }

    #[test]
    fn test_log_failure_keeps_record() {
        let mut sink = MockLogSink::new();
        sink.expect_append().times(1).returning(|_| {
            Err(LogError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });

        let mut chatbox = chatbox_with(sink);
        let delivery = chatbox.send_message("alice", "bob", "hi").unwrap();

        assert!(matches!(delivery.log_status, LogStatus::Failed(_)));
        assert_eq!(chatbox.list_messages().len(), 1);
    }

    #[test]
    fn test_sentinel_aborts_send() {
        let mut sink = MockLogSink::new();
        sink.expect_append().times(0);

        let mut chatbox = chatbox_with(sink);
        let sender = chatbox.select_user(0);
        let receiver = chatbox.select_user(2);
        assert_eq!(sender, "");

        let err = chatbox.send_message(&sender, &receiver, "hi").unwrap_err();
        assert!(matches!(err, ChatboxError::InvalidSelection));

        let receiver = chatbox.select_user(3);
        let err = chatbox.send_message("alice", &receiver, "hi").unwrap_err();
        assert!(matches!(err, ChatboxError::InvalidSelection));
        assert_eq!(chatbox.list_messages().len(), 0);
    }

    #[test]
    fn test_message_capacity_skips_log() {
        let mut sink = MockLogSink::new();
        sink.expect_append().times(1).returning(|_| Ok(()));

        let store = RecordStore::with_limits(StoreLimits {
            max_users: 10,
            max_messages: 1,
        });
        let mut chatbox = Chatbox::new(store, sink, TextPolicy::Truncate);

        chatbox.send_message("alice", "bob", "one").unwrap();
        let err = chatbox.send_message("alice", "bob", "two").unwrap_err();

        assert!(matches!(
            err,
            ChatboxError::Store(StoreError::CapacityExceeded { .. })
        ));
        assert_eq!(chatbox.list_messages().len(), 1);
    }

    #[test]
    fn test_reject_policy_refuses_long_body() {
        let mut sink = MockLogSink::new();
        sink.expect_append().times(0);

        let mut chatbox = Chatbox::new(RecordStore::new(), sink, TextPolicy::Reject);
        let body = "x".repeat(300);

        let err = chatbox.send_message("alice", "bob", &body).unwrap_err();
        assert!(matches!(err, ChatboxError::Text(TextError::TooLong { .. })));
        assert!(chatbox.list_messages().is_empty());
    }

    #[test]
    fn test_register_truncates_long_name() {
        let mut chatbox = Chatbox::new(RecordStore::new(), MockLogSink::new(), TextPolicy::Truncate);

        let user = chatbox.register_user("bartholomew-the-magnificent").unwrap();
        assert_eq!(user.name, "bartholomew-the-mag");
        assert_eq!(user.id, 1);
    }

    #[test]
    fn test_register_empty_name_fails() {
        let mut chatbox = Chatbox::new(RecordStore::new(), MockLogSink::new(), TextPolicy::Truncate);

        let err = chatbox.register_user("  ").unwrap_err();
        assert!(matches!(err, ChatboxError::Text(TextError::EmptyName)));
        assert!(chatbox.list_users().is_empty());
    }

    #[test]
    fn test_filter_search_and_sort() {
        let mut sink = MockLogSink::new();
        sink.expect_append().returning(|_| Ok(()));

        let mut chatbox = chatbox_with(sink);
        chatbox.register_user("carol").unwrap();
        chatbox.send_message("carol", "alice", "hello alice").unwrap();
        chatbox.send_message("bob", "alice", "hello again").unwrap();
        chatbox.send_message("alice", "bob", "goodbye").unwrap();

        assert_eq!(chatbox.filter("bob", "alice").len(), 1);
        assert_eq!(chatbox.search("hello").len(), 2);

        chatbox.sort_by_sender();
        let senders: Vec<&str> = chatbox
            .list_messages()
            .iter()
            .map(|m| m.sender_name.as_str())
            .collect();
        assert_eq!(senders, vec!["alice", "bob", "carol"]);
    }
}
