// Store module — in-memory records and the sender-ordered buffer

pub mod ordered;
pub mod records;

pub use ordered::{sort_all_by_sender, BufferError, OrderedBuffer, MAX_BUFFER_SIZE};
pub use records::{RecordKind, RecordStore, StoreError, StoreLimits, MAX_MESSAGES, MAX_USERS};
