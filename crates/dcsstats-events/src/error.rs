use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::EventKind;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("{}: invalid timestamp '{value}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("{}: unknown event '{token}'", .path.display())]
    UnknownEventKind { path: PathBuf, token: String },

    #[error("Invalid event {kind}: {reason}")]
    InvalidEventShape { kind: EventKind, reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EventError {
    pub(crate) fn shape(kind: EventKind, reason: impl Into<String>) -> Self {
        EventError::InvalidEventShape {
            kind,
            reason: reason.into(),
        }
    }
}
