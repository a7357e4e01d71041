use std::path::PathBuf;

use dcsstats_events::{EventError, EventKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session file name '{file_name}': {reason}")]
    FilenameFormatError { file_name: String, reason: String },

    #[error("{}: unhandled event {kind} at {time}", .path.display())]
    UnhandledEventKind {
        path: PathBuf,
        kind: EventKind,
        time: i64,
    },

    #[error(transparent)]
    Event(#[from] EventError),
}

/// Why a session could not be counted towards play time.
#[derive(Error, Debug)]
pub enum PlayTimeError {
    #[error("session has no events")]
    Empty,

    #[error("first event is not a connect: {0}")]
    MissingConnect(String),

    #[error("last event is not a disconnect: {0}")]
    MissingDisconnect(String),

    #[error("connect at {connect} and disconnect at {disconnect} are too far apart")]
    OutOfRange { connect: i64, disconnect: i64 },
}
