use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a logged event. Serializes as the token used in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Connect,
    Disconnect,
    Kill,
    KilledBy,
    SelfKill,
    ChangeSlot,
    Crash,
    Eject,
    Takeoff,
    Landing,
    PilotDeath,
    FriendlyFire,
}

const TOKENS: &[(&str, EventKind)] = &[
    ("connect", EventKind::Connect),
    ("disconnect", EventKind::Disconnect),
    ("kill", EventKind::Kill),
    ("killed_by", EventKind::KilledBy),
    ("self_kill", EventKind::SelfKill),
    ("change_slot", EventKind::ChangeSlot),
    ("crash", EventKind::Crash),
    ("eject", EventKind::Eject),
    ("takeoff", EventKind::Takeoff),
    ("landing", EventKind::Landing),
    ("pilot_death", EventKind::PilotDeath),
    ("friendly_fire", EventKind::FriendlyFire),
];

impl EventKind {
    /// Look up the kind for a log token. Matching is exact and case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, kind)| *kind)
    }

    /// The token this kind is written as in log lines.
    pub fn token(self) -> &'static str {
        TOKENS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(t, _)| *t)
            .unwrap_or("unknown")
    }

    pub fn all() -> impl Iterator<Item = EventKind> {
        TOKENS.iter().map(|(_, kind)| *kind)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
