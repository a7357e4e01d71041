use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::filename::FileNameInfo;
use crate::playtime::total_play_time;
use crate::types::Session;

/// One player across every source and session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Stable id from the file name; never reassigned.
    pub id: String,
    /// Display name from the latest session seen so far.
    pub name: String,
    /// Session start that `name` was taken from.
    pub name_seen_at: i64,
    pub sessions: Vec<Session>,
}

impl Player {
    fn new(id: String, name: String, name_seen_at: i64) -> Self {
        Self {
            id,
            name,
            name_seen_at,
            sessions: Vec::new(),
        }
    }

    /// Take `name` if it comes from a strictly later session start.
    fn observe_name(&mut self, name: &str, seen_at: i64) {
        if seen_at > self.name_seen_at {
            debug!(player = %self.id, old = %self.name, new = %name, "Display name updated");
            self.name = name.to_string();
            self.name_seen_at = seen_at;
        }
    }

    pub fn total_play_time(&self) -> i64 {
        total_play_time(self)
    }

    pub fn sortie_count(&self) -> usize {
        self.sessions.iter().map(|s| s.sorties().len()).sum()
    }
}

/// Players keyed by stable id.
///
/// Built by folding sessions in with [`PlayerRoster::insert`] or by merging
/// partial rosters. The resulting display names depend only on session start
/// times, not on the order files were folded in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRoster {
    players: BTreeMap<String, Player>,
}

impl PlayerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one session file to the roster.
    pub fn insert(&mut self, info: &FileNameInfo, session: Session) {
        let player = match self.players.entry(info.player_id.clone()) {
            Entry::Vacant(entry) => entry.insert(Player::new(
                info.player_id.clone(),
                info.player_name.clone(),
                info.session_start,
            )),
            Entry::Occupied(entry) => {
                let player = entry.into_mut();
                player.observe_name(&info.player_name, info.session_start);
                player
            }
        };
        player.sessions.push(session);
    }

    /// Fold another roster into this one.
    pub fn merge(&mut self, other: PlayerRoster) {
        for (id, incoming) in other.players {
            match self.players.entry(id) {
                Entry::Vacant(entry) => {
                    entry.insert(incoming);
                }
                Entry::Occupied(entry) => {
                    let player = entry.into_mut();
                    player.observe_name(&incoming.name, incoming.name_seen_at);
                    player.sessions.extend(incoming.sessions);
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player id to current display name.
    pub fn player_names(&self) -> BTreeMap<String, String> {
        self.players
            .values()
            .map(|p| (p.id.clone(), p.name.clone()))
            .collect()
    }

    /// Player id to total play time in seconds.
    pub fn play_times(&self) -> BTreeMap<String, i64> {
        self.players
            .values()
            .map(|p| (p.id.clone(), p.total_play_time()))
            .collect()
    }
}

impl Extend<(FileNameInfo, Session)> for PlayerRoster {
    fn extend<T: IntoIterator<Item = (FileNameInfo, Session)>>(&mut self, iter: T) {
        for (info, session) in iter {
            self.insert(&info, session);
        }
    }
}

impl FromIterator<(FileNameInfo, Session)> for PlayerRoster {
    fn from_iter<T: IntoIterator<Item = (FileNameInfo, Session)>>(iter: T) -> Self {
        let mut roster = PlayerRoster::new();
        roster.extend(iter);
        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(start: i64, name: &str, id: &str) -> (FileNameInfo, Session) {
        let info = FileNameInfo {
            session_start: start,
            mission_name: "MissionA".to_string(),
            player_name: name.to_string(),
            player_id: id.to_string(),
        };
        let session = Session::new(
            PathBuf::from(format!("{start}-[MissionA]-[{name}]-[{id}].csv")),
            info.mission_name.clone(),
            start,
            "main".to_string(),
            Vec::new(),
        );
        (info, session)
    }

    #[test]
    fn test_one_player_per_id() {
        let roster: PlayerRoster = vec![
            file(1000, "Pilot1", "P1"),
            file(2000, "Pilot2", "P2"),
            file(3000, "Pilot1", "P1"),
        ]
        .into_iter()
        .collect();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get("P1").unwrap().sessions.len(), 2);
        assert_eq!(roster.get("P2").unwrap().sessions.len(), 1);
    }

    #[test]
    fn test_latest_name_wins_regardless_of_order() {
        let files = [
            file(3000, "Viper", "P1"),
            file(1000, "Rookie", "P1"),
            file(2000, "Hornet", "P1"),
        ];

        let orders: [[usize; 3]; 3] = [[0, 1, 2], [1, 2, 0], [2, 1, 0]];
        for order in orders {
            let roster: PlayerRoster = order.iter().map(|&i| files[i].clone()).collect();
            let player = roster.get("P1").unwrap();
            assert_eq!(player.name, "Viper");
            assert_eq!(player.name_seen_at, 3000);
        }
    }

    #[test]
    fn test_equal_start_keeps_first_name() {
        let roster: PlayerRoster = vec![file(1000, "First", "P1"), file(1000, "Second", "P1")]
            .into_iter()
            .collect();
        assert_eq!(roster.get("P1").unwrap().name, "First");
    }

    #[test]
    fn test_duplicate_files_are_not_deduplicated() {
        let roster: PlayerRoster = vec![file(1000, "Pilot1", "P1"), file(1000, "Pilot1", "P1")]
            .into_iter()
            .collect();
        assert_eq!(roster.get("P1").unwrap().sessions.len(), 2);
    }

    #[test]
    fn test_merge_matches_single_fold() {
        let mut left: PlayerRoster = vec![file(1000, "Rookie", "P1"), file(500, "Ace", "P2")]
            .into_iter()
            .collect();
        let right: PlayerRoster = vec![file(3000, "Viper", "P1"), file(4000, "Zed", "P3")]
            .into_iter()
            .collect();

        left.merge(right);

        assert_eq!(left.len(), 3);
        let names = left.player_names();
        assert_eq!(names["P1"], "Viper");
        assert_eq!(names["P2"], "Ace");
        assert_eq!(names["P3"], "Zed");
        assert_eq!(left.get("P1").unwrap().sessions.len(), 2);
    }

    #[test]
    fn test_merge_keeps_newer_name_on_left() {
        let mut left: PlayerRoster = vec![file(5000, "Newest", "P1")].into_iter().collect();
        let right: PlayerRoster = vec![file(1000, "Oldest", "P1")].into_iter().collect();
        left.merge(right);
        assert_eq!(left.get("P1").unwrap().name, "Newest");
    }

    #[test]
    fn test_play_times_for_empty_sessions_are_zero() {
        let roster: PlayerRoster = vec![file(1000, "Pilot1", "P1")].into_iter().collect();
        assert_eq!(roster.play_times()["P1"], 0);
    }
}
