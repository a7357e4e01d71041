//! Output files written after a successful run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dcsstats_sessions::{session_play_time, PlayerRoster, Session, Sortie};
use serde::Serialize;

pub const PLAYER_NAMES_FILE: &str = "player-names.json";
pub const TOTAL_TIMES_FILE: &str = "total-times.json";
pub const SORTIES_FILE: &str = "sorties.json";

#[derive(Debug, Serialize)]
pub struct SessionReport<'a> {
    pub file: &'a Path,
    pub mission: &'a str,
    pub source: &'a str,
    pub started_at: Option<DateTime<Utc>>,
    pub play_time_secs: Option<i64>,
    pub sorties: &'a [Sortie],
}

impl<'a> SessionReport<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            file: session.path(),
            mission: &session.mission_name,
            source: &session.source,
            started_at: session.started_at(),
            play_time_secs: session_play_time(session).ok(),
            sorties: session.sorties(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlayerReport<'a> {
    pub name: &'a str,
    pub sessions: Vec<SessionReport<'a>>,
}

/// Write `player-names.json`: player id to display name.
pub fn write_player_names(roster: &PlayerRoster, target_dir: &Path) -> Result<PathBuf> {
    write_json(target_dir, PLAYER_NAMES_FILE, &roster.player_names())
}

/// Write `total-times.json`: player id to total play time in seconds.
pub fn write_total_play_time(roster: &PlayerRoster, target_dir: &Path) -> Result<PathBuf> {
    write_json(target_dir, TOTAL_TIMES_FILE, &roster.play_times())
}

/// Write `sorties.json`: player id to sessions and their sorties.
pub fn write_sorties(roster: &PlayerRoster, target_dir: &Path) -> Result<PathBuf> {
    let report: BTreeMap<&str, PlayerReport> = roster
        .players()
        .map(|player| {
            (
                player.id.as_str(),
                PlayerReport {
                    name: &player.name,
                    sessions: player.sessions.iter().map(SessionReport::new).collect(),
                },
            )
        })
        .collect();

    write_json(target_dir, SORTIES_FILE, &report)
}

fn write_json<T: Serialize>(target_dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(target_dir)
        .with_context(|| format!("Failed to create output dir: {:?}", target_dir))?;

    let path = target_dir.join(file_name);
    let json = serde_json::to_vec(value)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;

    tracing::info!(path = %path.display(), "Wrote output");
    Ok(path)
}
