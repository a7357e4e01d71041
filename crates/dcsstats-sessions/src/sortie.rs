//! Sortie reconstruction.
//!
//! A session's events are walked in file order with a single active sortie.
//! The first terminal event (landing, crash, disconnect, ...) fixes the
//! sortie's end time. Terminal events that follow within the grace window
//! may still replace the end reason with a higher-precedence one, but never
//! move the end time. After the window the sortie is closed.
//!
//! A takeoff seen after the active sortie has an end time starts the next
//! sortie, which inherits the last selected plane.

use std::path::Path;

use dcsstats_events::{RawEvent, TypedEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::types::{EndReason, Sortie};
use crate::SessionError;

pub const DEFAULT_GRACE_WINDOW_SECS: i64 = 30;

/// What to do with a terminal event that arrives after the grace window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateTerminalPolicy {
    /// Drop its influence: reason, end time and detail stay untouched.
    #[default]
    Ignore,
    /// Close the active sortie and apply the event to a fresh one.
    StartNewSortie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    pub grace_window_secs: i64,
    pub late_terminal: LateTerminalPolicy,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            grace_window_secs: DEFAULT_GRACE_WINDOW_SECS,
            late_terminal: LateTerminalPolicy::Ignore,
        }
    }
}

/// A terminal-reason candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Reason(EndReason),
    /// Only fills an empty reason, and fills it with `SelfKill`.
    SlotChange,
}

/// Apply the precedence rule to the current reason.
fn resolve(current: Option<EndReason>, candidate: Candidate) -> Option<EndReason> {
    match (current, candidate) {
        (None, Candidate::SlotChange) => Some(EndReason::SelfKill),
        (Some(reason), Candidate::SlotChange) => Some(reason),
        (Some(reason), Candidate::Reason(next)) if reason.precedence() >= next.precedence() => {
            Some(reason)
        }
        (_, Candidate::Reason(next)) => Some(next),
    }
}

struct SortieBuilder<'a> {
    options: &'a ReconstructOptions,
    origin: &'a Path,
    sorties: Vec<Sortie>,
    current: Sortie,
    last_plane: String,
}

impl<'a> SortieBuilder<'a> {
    fn new(options: &'a ReconstructOptions, origin: &'a Path) -> Self {
        Self {
            options,
            origin,
            sorties: Vec::new(),
            current: Sortie::default(),
            last_plane: String::new(),
        }
    }

    fn is_closed_at(&self, time: i64) -> bool {
        self.current
            .end_time
            .is_some_and(|end| time.saturating_sub(end) > self.options.grace_window_secs)
    }

    fn start_next(&mut self) {
        let next = Sortie {
            plane: self.last_plane.clone(),
            ..Default::default()
        };
        let finished = std::mem::replace(&mut self.current, next);
        if !finished.events.is_empty() {
            trace!(
                start = ?finished.start_time,
                end = ?finished.end_time,
                reason = ?finished.end_reason,
                "Sortie closed"
            );
            self.sorties.push(finished);
        }
    }

    /// Returns false when the event was ignored as late.
    fn terminal(&mut self, time: i64, candidate: Candidate) -> bool {
        if self.is_closed_at(time) {
            match self.options.late_terminal {
                LateTerminalPolicy::Ignore => {
                    debug!(
                        path = %self.origin.display(),
                        time,
                        end_time = ?self.current.end_time,
                        ?candidate,
                        "Ignoring terminal event after grace window"
                    );
                    return false;
                }
                LateTerminalPolicy::StartNewSortie => self.start_next(),
            }
        }

        self.current.end_reason = resolve(self.current.end_reason, candidate);
        if self.current.end_time.is_none() {
            self.current.end_time = Some(time);
        }
        true
    }

    fn apply(&mut self, raw: &RawEvent, event: TypedEvent) -> Result<(), SessionError> {
        let time = event.time();

        match event {
            TypedEvent::Connect(_) => {}
            TypedEvent::Takeoff(takeoff) => {
                if self.current.end_time.is_some() {
                    self.start_next();
                }
                self.current.start_time = Some(time);
                self.current.takeoff = Some(takeoff);
            }
            TypedEvent::Kill(kill) => self.current.kills.push(kill),
            TypedEvent::FriendlyFire(ff) => self.current.friendly_fires.push(ff),
            TypedEvent::ChangeSlot(slot) => {
                self.last_plane = slot.unit_type.clone();
                self.terminal(time, Candidate::SlotChange);
                self.current.plane = slot.unit_type;
            }
            TypedEvent::Disconnect(_) => {
                self.terminal(time, Candidate::Reason(EndReason::Disconnect));
            }
            TypedEvent::Landing(landing) => {
                if self.terminal(time, Candidate::Reason(EndReason::Landing)) {
                    self.current.landing = Some(landing);
                }
            }
            TypedEvent::Crash(crash) => {
                if self.terminal(time, Candidate::Reason(EndReason::Crash)) {
                    self.current.crash = Some(crash);
                }
            }
            TypedEvent::Eject(eject) => {
                if self.terminal(time, Candidate::Reason(EndReason::Eject)) {
                    self.current.eject = Some(eject);
                }
            }
            TypedEvent::PilotDeath(death) => {
                if self.terminal(time, Candidate::Reason(EndReason::PilotDeath)) {
                    self.current.pilot_death = Some(death);
                }
            }
            TypedEvent::KilledBy(killed_by) => {
                if self.terminal(time, Candidate::Reason(EndReason::KilledBy)) {
                    self.current.killed_by = Some(killed_by);
                }
            }
            TypedEvent::SelfKill(marker) => {
                return Err(SessionError::UnhandledEventKind {
                    path: self.origin.to_path_buf(),
                    kind: marker.header.kind,
                    time,
                });
            }
        }

        self.current.events.push(raw.clone());
        Ok(())
    }

    fn finish(mut self) -> Vec<Sortie> {
        self.start_next();
        self.sorties
    }
}

/// Reconstruct the sorties of one session.
///
/// `origin` is only used for error messages and logging.
pub fn reconstruct(
    events: &[RawEvent],
    origin: &Path,
    options: &ReconstructOptions,
) -> Result<Vec<Sortie>, SessionError> {
    let mut builder = SortieBuilder::new(options, origin);

    for raw in events {
        let event = TypedEvent::try_from(raw)?;
        builder.apply(raw, event)?;
    }

    let sorties = builder.finish();
    debug!(path = %origin.display(), sorties = sorties.len(), "Reconstructed sorties");
    Ok(sorties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcsstats_events::{EventError, EventKind};

    fn events(lines: &[&str]) -> Vec<RawEvent> {
        lines
            .iter()
            .map(|line| RawEvent::decode(line, Path::new("test.csv")).unwrap())
            .collect()
    }

    fn run(lines: &[&str]) -> Vec<Sortie> {
        reconstruct(&events(lines), Path::new("test.csv"), &ReconstructOptions::default()).unwrap()
    }

    fn run_with(lines: &[&str], options: ReconstructOptions) -> Vec<Sortie> {
        reconstruct(&events(lines), Path::new("test.csv"), &options).unwrap()
    }

    #[test]
    fn test_single_landing_sortie() {
        let sorties = run(&[
            "1000;connect",
            "1010;takeoff;10",
            "1500;landing;10;Airbase",
            "1510;disconnect",
        ]);

        assert_eq!(sorties.len(), 1);
        let sortie = &sorties[0];
        assert_eq!(sortie.start_time, Some(1010));
        assert_eq!(sortie.end_time, Some(1500));
        assert_eq!(sortie.end_reason, Some(EndReason::Landing));
        assert_eq!(sortie.landing.as_ref().unwrap().airdome_name, "Airbase");
        assert_eq!(sortie.events.len(), 4);
    }

    #[test]
    fn test_killed_by_then_crash_keeps_killed_by() {
        let sorties = run(&[
            "1900;takeoff;7",
            "2000;killed_by;Su-27;1;-1;F-16C_50;2;R-27ET",
            "2010;crash;7",
        ]);

        let sortie = &sorties[0];
        assert_eq!(sortie.end_reason, Some(EndReason::KilledBy));
        assert_eq!(sortie.end_time, Some(2000));
        assert!(sortie.killed_by.is_some());
        assert!(sortie.crash.is_some());
    }

    #[test]
    fn test_higher_precedence_upgrades_without_moving_end() {
        let sorties = run(&["1900;takeoff;7", "2000;eject;7", "2020;crash;7"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Crash));
        assert_eq!(sorties[0].end_time, Some(2000));
    }

    #[test]
    fn test_grace_window_boundary_is_inclusive() {
        let sorties = run(&["1900;takeoff;7", "2000;landing;7;Batumi", "2030;crash;7"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Crash));

        let sorties = run(&["1900;takeoff;7", "2000;landing;7;Batumi", "2031;crash;7"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Landing));
    }

    #[test]
    fn test_late_terminal_is_ignored() {
        let sorties = run(&[
            "1900;takeoff;7",
            "2000;landing;7;Batumi",
            "2100;killed_by;Su-27;1;-1;F-16C_50;2;R-27ET",
        ]);

        assert_eq!(sorties.len(), 1);
        let sortie = &sorties[0];
        assert_eq!(sortie.end_reason, Some(EndReason::Landing));
        assert_eq!(sortie.end_time, Some(2000));
        assert!(sortie.killed_by.is_none());
    }

    #[test]
    fn test_late_terminal_can_start_new_sortie() {
        let options = ReconstructOptions {
            late_terminal: LateTerminalPolicy::StartNewSortie,
            ..Default::default()
        };
        let sorties = run_with(
            &[
                "1900;takeoff;7",
                "2000;landing;7;Batumi",
                "2100;crash;7",
            ],
            options,
        );

        assert_eq!(sorties.len(), 2);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Landing));
        assert_eq!(sorties[1].end_reason, Some(EndReason::Crash));
        assert_eq!(sorties[1].end_time, Some(2100));
        assert_eq!(sorties[1].start_time, None);
    }

    #[test]
    fn test_custom_grace_window() {
        let options = ReconstructOptions {
            grace_window_secs: 5,
            ..Default::default()
        };
        let sorties = run_with(
            &["1900;takeoff;7", "2000;eject;7", "2010;pilot_death;7"],
            options,
        );
        assert_eq!(sorties[0].end_reason, Some(EndReason::Eject));
    }

    #[test]
    fn test_landing_and_disconnect_only_fill_empty_reason() {
        let sorties = run(&["1900;takeoff;7", "2000;disconnect", "2005;landing;7;Batumi"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Disconnect));
        assert!(sorties[0].landing.is_some());
    }

    #[test]
    fn test_eject_does_not_override_pilot_death() {
        let sorties = run(&["1900;takeoff;7", "2000;pilot_death;7", "2001;eject;7"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::PilotDeath));

        let sorties = run(&["1900;takeoff;7", "2000;eject;7", "2001;pilot_death;7"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::PilotDeath));
    }

    #[test]
    fn test_precedence_is_order_independent() {
        let terminals = [
            "2000;landing;7;Batumi",
            "2001;eject;7",
            "2002;pilot_death;7",
            "2003;crash;7",
            "2004;killed_by;Su-27;1;-1;F-16C_50;2;R-27ET",
            "2005;disconnect",
        ];

        // every rotation of the terminal events ends up on the strongest reason
        for shift in 0..terminals.len() {
            let mut lines = vec!["1900;takeoff;7"];
            lines.extend(terminals.iter().cycle().skip(shift).take(terminals.len()));
            let sorties = run(&lines);
            assert_eq!(sorties.len(), 1);
            assert_eq!(sorties[0].end_reason, Some(EndReason::KilledBy), "shift {shift}");
        }
    }

    #[test]
    fn test_slot_change_records_self_kill() {
        let sorties = run(&["1000;connect", "1005;change_slot;2;12;F-16C_50;pilot;Viper 1"]);
        assert_eq!(sorties.len(), 1);
        assert_eq!(sorties[0].end_reason, Some(EndReason::SelfKill));
        assert_eq!(sorties[0].end_time, Some(1005));
        assert_eq!(sorties[0].plane, "F-16C_50");
    }

    #[test]
    fn test_self_kill_is_never_downgraded() {
        let sorties = run(&[
            "1000;change_slot;2;12;F-16C_50;pilot;Viper 1",
            "1010;killed_by;Su-27;1;-1;F-16C_50;2;R-27ET",
            "1011;crash;12",
        ]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::SelfKill));
    }

    #[test]
    fn test_slot_change_does_not_replace_existing_reason() {
        let sorties = run(&[
            "1900;takeoff;7",
            "2000;landing;7;Batumi",
            "2010;change_slot;2;14;A-10C;pilot;Hog 1",
        ]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Landing));
    }

    #[test]
    fn test_takeoff_after_end_starts_next_sortie_with_plane() {
        let sorties = run(&[
            "1000;connect",
            "1005;change_slot;2;12;F-16C_50;pilot;Viper 1",
            "1010;takeoff;12;Incirlik",
            "1400;kill;F-16C_50;2;P9;Su-27;1;AIM-120C",
            "1500;landing;12;Incirlik",
            "1600;takeoff;12;Incirlik",
            "1700;friendly_fire;M61;P44",
            "1800;crash;12",
            "1900;disconnect",
        ]);

        assert_eq!(sorties.len(), 3);

        assert_eq!(sorties[0].start_time, None);
        assert_eq!(sorties[0].end_reason, Some(EndReason::SelfKill));

        assert_eq!(sorties[1].plane, "F-16C_50");
        assert_eq!(sorties[1].start_time, Some(1010));
        assert_eq!(sorties[1].end_time, Some(1500));
        assert_eq!(sorties[1].end_reason, Some(EndReason::Landing));
        assert_eq!(sorties[1].kills.len(), 1);
        assert_eq!(sorties[1].kills[0].victim_unit_type, "Su-27");

        assert_eq!(sorties[2].plane, "F-16C_50");
        assert_eq!(sorties[2].start_time, Some(1600));
        assert_eq!(sorties[2].end_time, Some(1800));
        assert_eq!(sorties[2].end_reason, Some(EndReason::Crash));
        assert_eq!(sorties[2].friendly_fires.len(), 1);
        assert_eq!(sorties[2].events.last().unwrap().kind(), EventKind::Disconnect);
    }

    #[test]
    fn test_kills_never_set_reason() {
        let sorties = run(&[
            "1010;takeoff;12",
            "1400;kill;F-16C_50;2;P9;Su-27;1;AIM-120C",
            "1401;kill;F-16C_50;2;P10;Su-27;1;AIM-120C",
        ]);
        assert_eq!(sorties[0].kills.len(), 2);
        assert_eq!(sorties[0].end_reason, None);
        assert_eq!(sorties[0].end_time, None);
    }

    #[test]
    fn test_open_sortie_is_emitted_at_end() {
        let sorties = run(&["1000;connect", "1010;takeoff;10"]);
        assert_eq!(sorties.len(), 1);
        assert_eq!(sorties[0].start_time, Some(1010));
        assert_eq!(sorties[0].end_time, None);
    }

    #[test]
    fn test_empty_session_has_no_sorties() {
        assert!(run(&[]).is_empty());
    }

    #[test]
    fn test_self_kill_event_is_unhandled() {
        let err = reconstruct(
            &events(&["1000;connect", "1100;self_kill"]),
            Path::new("test.csv"),
            &ReconstructOptions::default(),
        )
        .unwrap_err();

        match err {
            SessionError::UnhandledEventKind { kind, time, .. } => {
                assert_eq!(kind, EventKind::SelfKill);
                assert_eq!(time, 1100);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_shape_aborts_reconstruction() {
        let err = reconstruct(
            &events(&["1000;connect", "1500;landing;10"]),
            Path::new("test.csv"),
            &ReconstructOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Event(EventError::InvalidEventShape { .. })
        ));
    }

    #[test]
    fn test_late_slot_change_still_sets_plane() {
        let sorties = run(&[
            "1005;change_slot;2;12;F-16C_50;pilot;Viper 1",
            "1010;takeoff;12",
            "1500;landing;12;Incirlik",
            "1600;change_slot;2;14;A-10C;pilot;Hog 1",
        ]);

        assert_eq!(sorties.len(), 2);
        let sortie = &sorties[1];
        assert_eq!(sortie.plane, "A-10C");
        assert_eq!(sortie.start_time, Some(1010));
        assert_eq!(sortie.end_time, Some(1500));
        assert_eq!(sortie.end_reason, Some(EndReason::Landing));
    }

    #[test]
    fn test_late_slot_change_under_new_sortie_policy() {
        let options = ReconstructOptions {
            late_terminal: LateTerminalPolicy::StartNewSortie,
            ..Default::default()
        };
        let sorties = run_with(
            &[
                "1010;takeoff;12",
                "1500;landing;12;Incirlik",
                "1600;change_slot;2;14;A-10C;pilot;Hog 1",
            ],
            options,
        );

        assert_eq!(sorties.len(), 2);
        assert_eq!(sorties[0].plane, "");
        assert_eq!(sorties[1].plane, "A-10C");
        assert_eq!(sorties[1].end_reason, Some(EndReason::SelfKill));
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let sorties = run(&["1000;landing;1;A", "-9223372036854775808;crash;1"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Crash));
        assert_eq!(sorties[0].end_time, Some(1000));

        let sorties = run(&["-9223372036854775808;landing;1;A", "9223372036854775807;crash;1"]);
        assert_eq!(sorties[0].end_reason, Some(EndReason::Landing));
        assert_eq!(sorties[0].end_time, Some(i64::MIN));

        let options = ReconstructOptions {
            late_terminal: LateTerminalPolicy::StartNewSortie,
            ..Default::default()
        };
        let sorties = run_with(
            &["-9223372036854775808;eject;1", "9223372036854775807;crash;1"],
            options,
        );
        assert_eq!(sorties.len(), 2);
        assert_eq!(sorties[1].end_time, Some(i64::MAX));
    }
}
