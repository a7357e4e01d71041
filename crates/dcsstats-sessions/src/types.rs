use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dcsstats_events::{FriendlyFire, Kill, KilledBy, Landing, RawEvent, Takeoff, UnitEvent};
use serde::{Deserialize, Serialize};

use crate::sortie::{reconstruct, ReconstructOptions};
use crate::SessionError;

/// Classified cause of a sortie ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    Disconnect,
    Landing,
    Eject,
    PilotDeath,
    Crash,
    KilledBy,
    /// Also what a slot change records when nothing else ended the sortie.
    /// The log source most likely meant "changed slot", but downstream
    /// consumers already rely on this label.
    SelfKill,
}

impl EndReason {
    /// Higher ranks override lower ones inside the grace window.
    /// Equal ranks never override, so the first of Landing/Disconnect sticks.
    pub fn precedence(self) -> u8 {
        match self {
            EndReason::Disconnect | EndReason::Landing => 1,
            EndReason::Eject => 2,
            EndReason::PilotDeath => 3,
            EndReason::Crash => 4,
            EndReason::KilledBy => 5,
            EndReason::SelfKill => 6,
        }
    }
}

/// One flight segment of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sortie {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub plane: String,
    pub end_reason: Option<EndReason>,
    pub takeoff: Option<Takeoff>,
    pub landing: Option<Landing>,
    pub kills: Vec<Kill>,
    pub friendly_fires: Vec<FriendlyFire>,
    pub eject: Option<UnitEvent>,
    pub pilot_death: Option<UnitEvent>,
    pub killed_by: Option<KilledBy>,
    pub crash: Option<UnitEvent>,
    #[serde(skip)]
    pub events: Vec<RawEvent>,
}

impl Sortie {
    /// Seconds between takeoff and end, when both are known.
    pub fn duration_secs(&self) -> Option<i64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end >= start => end.checked_sub(start),
            _ => None,
        }
    }
}

/// All events of one player during one server connection, read from one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub file_name: PathBuf,
    pub mission_name: String,
    /// Epoch seconds, taken from the file name.
    pub session_start: i64,
    pub source: String,
    events: Vec<RawEvent>,
    sorties: Vec<Sortie>,
}

impl Session {
    pub fn new(
        file_name: PathBuf,
        mission_name: String,
        session_start: i64,
        source: String,
        events: Vec<RawEvent>,
    ) -> Self {
        Self {
            file_name,
            mission_name,
            session_start,
            source,
            events,
            sorties: Vec::new(),
        }
    }

    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    pub fn sorties(&self) -> &[Sortie] {
        &self.sorties
    }

    pub fn path(&self) -> &Path {
        &self.file_name
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.session_start, 0)
    }

    /// Rebuild the sortie list from this session's events.
    pub fn reconstruct_sorties(
        &mut self,
        options: &ReconstructOptions,
    ) -> Result<&[Sortie], SessionError> {
        self.sorties = reconstruct(&self.events, &self.file_name, options)?;
        Ok(&self.sorties)
    }
}
