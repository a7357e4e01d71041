use std::fmt;
use std::io::BufRead;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{EventError, EventKind};

pub const FIELD_DELIMITER: char = ';';

/// One decoded log line: timestamp, kind and untyped positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    time: i64,
    kind: EventKind,
    args: Vec<String>,
}

impl RawEvent {
    pub fn new(time: i64, kind: EventKind, args: Vec<String>) -> Self {
        Self { time, kind, args }
    }

    /// Decode a single line.
    ///
    /// `origin` is the file the line was read from; it is carried into
    /// errors so a bad line can be traced back to its source.
    pub fn decode(line: &str, origin: &Path) -> Result<Self, EventError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.split(FIELD_DELIMITER);

        let time_field = fields.next().unwrap_or_default();
        let time = time_field
            .parse::<i64>()
            .map_err(|source| EventError::ParseError {
                path: origin.to_path_buf(),
                value: time_field.to_string(),
                source,
            })?;

        let token = fields.next().unwrap_or_default();
        let kind = EventKind::from_token(token).ok_or_else(|| EventError::UnknownEventKind {
            path: origin.to_path_buf(),
            token: token.to_string(),
        })?;

        let args = fields.map(str::to_string).collect();

        Ok(Self { time, kind, args })
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Encodes the event back into the log line grammar.
impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.time, FIELD_DELIMITER, self.kind)?;
        for arg in &self.args {
            write!(f, "{}{}", FIELD_DELIMITER, arg)?;
        }
        Ok(())
    }
}

/// Decode every non-blank line of `reader`, stopping at the first bad line.
pub fn decode_lines<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<RawEvent>, EventError> {
    let mut events = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|source| EventError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        events.push(RawEvent::decode(&line, origin)?);
    }

    tracing::trace!(path = %origin.display(), events = events.len(), "Decoded event lines");
    Ok(events)
}
