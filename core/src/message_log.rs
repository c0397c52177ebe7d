// Append-only message log
//
// One record per sent message, written as `sender,receiver,body,timestamp`
// after a blank separator line. The file is opened in append mode and closed
// again for every record.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "messages.csv";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed log record at line {line}")]
    Malformed { line: usize },
}

/// Field encoding for the log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Fields written verbatim. Commas in names or newlines in bodies are
    /// not escaped.
    #[default]
    Legacy,
    /// Fields containing `,` `"` CR or LF are double-quoted, with embedded
    /// quotes doubled
    Quoted,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" => Ok(LogFormat::Legacy),
            "quoted" => Ok(LogFormat::Quoted),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Legacy => f.write_str("legacy"),
            LogFormat::Quoted => f.write_str("quoted"),
        }
    }
}

/// Destination for recorded messages
#[cfg_attr(test, automock)]
pub trait LogSink {
    fn append(&mut self, message: &Message) -> Result<(), LogError>;
}

/// Flat-file log appender
#[derive(Debug, Clone)]
pub struct CsvLogAppender {
    path: PathBuf,
    format: LogFormat,
}

impl CsvLogAppender {
    pub fn new(path: impl Into<PathBuf>, format: LogFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }
}

impl LogSink for CsvLogAppender {
    fn append(&mut self, message: &Message) -> Result<(), LogError> {
        let record = format_record(message, self.format);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;

        debug!("Appended message to {}", self.path.display());
        Ok(())
    }
}

/// Render one log record, including the leading blank line and trailing newline
pub fn format_record(message: &Message, format: LogFormat) -> String {
    let fields = [
        message.sender_name.as_str(),
        message.receiver_name.as_str(),
        message.body.as_str(),
        message.timestamp.as_str(),
    ];

    let line = match format {
        LogFormat::Legacy => fields.join(","),
        LogFormat::Quoted => fields
            .iter()
            .map(|f| quote_field(f))
            .collect::<Vec<_>>()
            .join(","),
    };

    format!("\n{}\n", line)
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Read every record back from a log file. A missing file is an empty log.
pub fn read_log(path: &Path, format: LogFormat) -> Result<Vec<Message>, LogError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    match format {
        LogFormat::Legacy => parse_legacy(&contents),
        LogFormat::Quoted => parse_quoted(&contents),
    }
}

// Sender and receiver end at the first two commas, the timestamp starts after
// the last one, and whatever is left in between is the body.
fn parse_legacy(contents: &str) -> Result<Vec<Message>, LogError> {
    let mut messages = Vec::new();

    for (i, line) in contents.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let malformed = || LogError::Malformed { line: i + 1 };
        let (sender, rest) = line.split_once(',').ok_or_else(malformed)?;
        let (receiver, rest) = rest.split_once(',').ok_or_else(malformed)?;
        let (body, timestamp) = rest.rsplit_once(',').ok_or_else(malformed)?;

        messages.push(Message::new(sender, receiver, body, timestamp));
    }

    Ok(messages)
}

fn parse_quoted(contents: &str) -> Result<Vec<Message>, LogError> {
    let mut messages = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                finish_record(&mut messages, &mut fields, &mut field, record_line)?;
                line += 1;
                record_line = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(LogError::Malformed { line: record_line });
    }
    finish_record(&mut messages, &mut fields, &mut field, record_line)?;

    Ok(messages)
}

fn finish_record(
    messages: &mut Vec<Message>,
    fields: &mut Vec<String>,
    field: &mut String,
    line: usize,
) -> Result<(), LogError> {
    if fields.is_empty() && field.is_empty() {
        return Ok(());
    }

    fields.push(std::mem::take(field));
    let record = std::mem::take(fields);
    let [sender, receiver, body, timestamp]: [String; 4] = record
        .try_into()
        .map_err(|_| LogError::Malformed { line })?;

    messages.push(Message::new(sender, receiver, body, timestamp));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn msg(sender: &str, receiver: &str, body: &str) -> Message {
        Message::new(sender, receiver, body, "2024-05-01 12:00:00")
    }

    #[test]
    fn test_legacy_record_layout() {
        let record = format_record(&msg("alice", "bob", "hi"), LogFormat::Legacy);
        assert_eq!(record, "\nalice,bob,hi,2024-05-01 12:00:00\n");
    }

    #[test]
    fn test_legacy_does_not_escape() {
        let record = format_record(&msg("alice", "bob", "a, \"b\""), LogFormat::Legacy);
        assert_eq!(record, "\nalice,bob,a, \"b\",2024-05-01 12:00:00\n");
    }

    #[test]
    fn test_quoted_escapes_special_fields() {
        let record = format_record(&msg("alice", "bob", "a, \"b\"\nc"), LogFormat::Quoted);
        assert_eq!(record, "\nalice,bob,\"a, \"\"b\"\"\nc\",2024-05-01 12:00:00\n");
    }

    #[test]
    fn test_append_creates_and_appends() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("messages.csv");
        let mut appender = CsvLogAppender::new(&path, LogFormat::Legacy);

        appender.append(&msg("alice", "bob", "hi"))?;
        appender.append(&msg("bob", "alice", "hey"))?;

        let contents = std::fs::read_to_string(&path)?;
        assert_eq!(
            contents,
            "\nalice,bob,hi,2024-05-01 12:00:00\n\nbob,alice,hey,2024-05-01 12:00:00\n"
        );
        Ok(())
    }

    #[test]
    fn test_append_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("messages.csv");
        let mut appender = CsvLogAppender::new(path, LogFormat::Legacy);

        let err = appender.append(&msg("alice", "bob", "hi")).unwrap_err();
        assert!(matches!(err, LogError::Io(_)));
    }

    #[test]
    fn test_read_legacy_keeps_commas_in_body() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("messages.csv");
        let mut appender = CsvLogAppender::new(&path, LogFormat::Legacy);

        appender.append(&msg("alice", "bob", "well, hi"))?;
        appender.append(&msg("bob", "alice", "hey"))?;

        let entries = read_log(&path, LogFormat::Legacy)?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].body, "well, hi");
        assert_eq!(entries[0].timestamp, "2024-05-01 12:00:00");
        assert_eq!(entries[1].sender_name, "bob");
        Ok(())
    }

    #[test]
    fn test_read_quoted_multiline_body() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("messages.csv");
        let mut appender = CsvLogAppender::new(&path, LogFormat::Quoted);

        let tricky = msg("al,ice", "bob", "line one\n\"quoted\", line two");
        appender.append(&tricky)?;
        appender.append(&msg("bob", "alice", "plain"))?;

        let entries = read_log(&path, LogFormat::Quoted)?;
        assert_eq!(entries, vec![tricky, msg("bob", "alice", "plain")]);
        Ok(())
    }

    #[test]
    fn test_read_missing_file_is_empty() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let entries = read_log(&dir.path().join("nope.csv"), LogFormat::Legacy)?;
        assert!(entries.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_malformed_legacy_line() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("messages.csv");
        std::fs::write(&path, "\nalice,bob,hi,2024-05-01 12:00:00\n\nbroken,line\n")?;

        let err = read_log(&path, LogFormat::Legacy).unwrap_err();
        assert!(matches!(err, LogError::Malformed { line: 4 }));
        Ok(())
    }

    #[test]
    fn test_read_unterminated_quote() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("messages.csv");
        std::fs::write(&path, "\nalice,bob,\"oops,2024-05-01 12:00:00\n")?;

        let err = read_log(&path, LogFormat::Quoted).unwrap_err();
        assert!(matches!(err, LogError::Malformed { line: 2 }));
        Ok(())
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("legacy".parse::<LogFormat>().unwrap(), LogFormat::Legacy);
        assert_eq!("quoted".parse::<LogFormat>().unwrap(), LogFormat::Quoted);
        assert!("csv".parse::<LogFormat>().is_err());
    }
}
