// Text length policy for user names and message bodies

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Maximum user name length, in characters
pub const MAX_NAME_CHARS: usize = 19;

/// Maximum message body length, in characters
pub const MAX_BODY_CHARS: usize = 255;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("{field} is {len} characters long (max {max})")]
    TooLong {
        field: TextField,
        len: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Body,
}

impl TextField {
    pub fn max_chars(self) -> usize {
        match self {
            TextField::Name => MAX_NAME_CHARS,
            TextField::Body => MAX_BODY_CHARS,
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextField::Name => f.write_str("Name"),
            TextField::Body => f.write_str("Message body"),
        }
    }
}

/// What to do with input longer than the field allows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPolicy {
    /// Keep the leading characters and warn
    #[default]
    Truncate,
    /// Refuse the input
    Reject,
}

impl TextPolicy {
    /// Apply the policy to `input` for the given field.
    ///
    /// Lengths are counted in `char`s so multi-byte input is never split.
    /// Names must be non-empty after trimming whitespace.
    pub fn apply(self, field: TextField, input: &str) -> Result<String, TextError> {
        let input = match field {
            TextField::Name => input.trim(),
            TextField::Body => input,
        };

        if field == TextField::Name && input.is_empty() {
            return Err(TextError::EmptyName);
        }

        let max = field.max_chars();
        let len = input.chars().count();
        if len <= max {
            return Ok(input.to_string());
        }

        match self {
            TextPolicy::Truncate => {
                warn!("{} truncated from {} to {} characters", field, len, max);
                Ok(input.chars().take(max).collect())
            }
            TextPolicy::Reject => Err(TextError::TooLong { field, len, max }),
        }
    }
}

impl std::str::FromStr for TextPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "truncate" => Ok(TextPolicy::Truncate),
            "reject" => Ok(TextPolicy::Reject),
            other => Err(format!("unknown text policy: {}", other)),
        }
    }
}

impl fmt::Display for TextPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextPolicy::Truncate => f.write_str("truncate"),
            TextPolicy::Reject => f.write_str("reject"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_passes_unchanged() {
        let name = TextPolicy::Reject.apply(TextField::Name, "alice").unwrap();
        assert_eq!(name, "alice");

        let body = TextPolicy::Reject.apply(TextField::Body, "  hi  ").unwrap();
        assert_eq!(body, "  hi  ");
    }

    #[test]
    fn test_truncate_long_name() {
        let long = "abcdefghijklmnopqrstuvwxyz";
        let name = TextPolicy::Truncate.apply(TextField::Name, long).unwrap();
        assert_eq!(name, "abcdefghijklmnopqrs");
        assert_eq!(name.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let body: String = "é".repeat(300);
        let truncated = TextPolicy::Truncate.apply(TextField::Body, &body).unwrap();
        assert_eq!(truncated.chars().count(), MAX_BODY_CHARS);
    }

    #[test]
    fn test_reject_long_body() {
        let body = "x".repeat(256);
        let err = TextPolicy::Reject.apply(TextField::Body, &body).unwrap_err();
        assert_eq!(
            err,
            TextError::TooLong {
                field: TextField::Body,
                len: 256,
                max: 255
            }
        );
    }

    #[test]
    fn test_empty_name_rejected_by_both_policies() {
        assert_eq!(
            TextPolicy::Truncate.apply(TextField::Name, "   ").unwrap_err(),
            TextError::EmptyName
        );
        assert_eq!(
            TextPolicy::Reject.apply(TextField::Name, "").unwrap_err(),
            TextError::EmptyName
        );
    }

    #[test]
    fn test_empty_body_allowed() {
        assert_eq!(TextPolicy::Reject.apply(TextField::Body, "").unwrap(), "");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("truncate".parse::<TextPolicy>().unwrap(), TextPolicy::Truncate);
        assert_eq!("reject".parse::<TextPolicy>().unwrap(), TextPolicy::Reject);
        assert!("drop".parse::<TextPolicy>().is_err());
    }
}
