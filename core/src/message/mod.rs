// Message module — record types and text validation

pub mod text;
pub mod types;

pub use text::{TextError, TextField, TextPolicy, MAX_BODY_CHARS, MAX_NAME_CHARS};
pub use types::{is_well_formed_timestamp, timestamp_now, Message, User, TIMESTAMP_FORMAT};
