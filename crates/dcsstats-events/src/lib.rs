//! # dcsstats-events
//!
//! Decoding of the per-player event logs written by the dedicated server.
//!
//! Every log file holds one event per line:
//!
//! ```text
//! <epochSeconds>;<kind>;<arg0>;<arg1>;...
//! ```
//!
//! Decoding happens in two steps:
//!
//! 1. [`RawEvent::decode`] splits a line into timestamp, [`EventKind`] and
//!    positional arguments. Unknown kind tokens are rejected here.
//! 2. [`TypedEvent::try_from`] checks the argument shape for the kind and
//!    produces a variant with named fields.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dcsstats_events::{RawEvent, TypedEvent};
//! use std::path::Path;
//!
//! let raw = RawEvent::decode("1010;takeoff;10;Batumi", Path::new("a.csv"))?;
//! let typed = TypedEvent::try_from(&raw)?;
//! assert_eq!(typed.to_raw(), raw);
//! ```

mod error;
mod kind;
mod raw;
mod typed;

pub use error::EventError;
pub use kind::EventKind;
pub use raw::{decode_lines, RawEvent, FIELD_DELIMITER};
pub use typed::{
    ChangeSlot, EventHeader, FriendlyFire, Kill, KilledBy, Landing, Marker, Takeoff, TypedEvent,
    UnitEvent,
};
