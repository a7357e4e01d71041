use serde::{Deserialize, Serialize};

use crate::{EventError, EventKind, RawEvent};

/// Time and kind shared by every typed event, copied out of the raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeader {
    pub time: i64,
    pub kind: EventKind,
}

/// Event without payload (`connect`, `disconnect`, `self_kill`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub header: EventHeader,
}

/// Event that only names the player's unit (`crash`, `eject`, `pilot_death`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEvent {
    pub header: EventHeader,
    pub unit_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Takeoff {
    pub header: EventHeader,
    pub unit_id: String,
    /// Missing for air starts and takeoffs away from an airfield.
    pub airdome_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landing {
    pub header: EventHeader,
    pub unit_id: String,
    pub airdome_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSlot {
    pub header: EventHeader,
    pub side: i32,
    pub unit_id: String,
    pub unit_type: String,
    pub role: String,
    pub group_name: String,
}

/// The player destroyed another unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kill {
    pub header: EventHeader,
    pub killer_unit_type: String,
    pub killer_side: i32,
    pub victim_player_id: String,
    pub victim_unit_type: String,
    pub victim_side: i32,
    pub weapon_name: String,
}

/// The player was destroyed by another unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KilledBy {
    pub header: EventHeader,
    pub killer_unit_type: String,
    pub killer_side: i32,
    pub killer_player_id: String,
    pub victim_unit_type: String,
    pub victim_side: i32,
    pub weapon_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendlyFire {
    pub header: EventHeader,
    pub weapon_name: String,
    pub victim_player_id: String,
}

/// A log event with its arguments checked and named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypedEvent {
    Connect(Marker),
    Disconnect(Marker),
    Takeoff(Takeoff),
    Landing(Landing),
    Crash(UnitEvent),
    Eject(UnitEvent),
    PilotDeath(UnitEvent),
    KilledBy(KilledBy),
    Kill(Kill),
    FriendlyFire(FriendlyFire),
    ChangeSlot(ChangeSlot),
    SelfKill(Marker),
}

type Decoder = fn(EventHeader, &[String]) -> Result<TypedEvent, EventError>;

/// Accepted argument counts and decoder for one kind.
struct Shape {
    kind: EventKind,
    min_args: usize,
    max_args: usize,
    decode: Decoder,
}

const SHAPES: &[Shape] = &[
    Shape {
        kind: EventKind::Connect,
        min_args: 0,
        max_args: 0,
        decode: |header, _| Ok(TypedEvent::Connect(Marker { header })),
    },
    Shape {
        kind: EventKind::Disconnect,
        min_args: 0,
        max_args: 0,
        decode: |header, _| Ok(TypedEvent::Disconnect(Marker { header })),
    },
    Shape {
        kind: EventKind::SelfKill,
        min_args: 0,
        max_args: 0,
        decode: |header, _| Ok(TypedEvent::SelfKill(Marker { header })),
    },
    Shape {
        kind: EventKind::Takeoff,
        min_args: 1,
        max_args: 2,
        decode: |header, args| {
            Ok(TypedEvent::Takeoff(Takeoff {
                header,
                unit_id: args[0].clone(),
                airdome_name: args.get(1).cloned(),
            }))
        },
    },
    Shape {
        kind: EventKind::Landing,
        min_args: 2,
        max_args: 2,
        decode: |header, args| {
            Ok(TypedEvent::Landing(Landing {
                header,
                unit_id: args[0].clone(),
                airdome_name: args[1].clone(),
            }))
        },
    },
    Shape {
        kind: EventKind::Crash,
        min_args: 1,
        max_args: 1,
        decode: |header, args| Ok(TypedEvent::Crash(unit_event(header, args))),
    },
    Shape {
        kind: EventKind::Eject,
        min_args: 1,
        max_args: 1,
        decode: |header, args| Ok(TypedEvent::Eject(unit_event(header, args))),
    },
    Shape {
        kind: EventKind::PilotDeath,
        min_args: 1,
        max_args: 1,
        decode: |header, args| Ok(TypedEvent::PilotDeath(unit_event(header, args))),
    },
    Shape {
        kind: EventKind::ChangeSlot,
        min_args: 5,
        max_args: 5,
        decode: |header, args| {
            Ok(TypedEvent::ChangeSlot(ChangeSlot {
                header,
                side: parse_side(header.kind, args, 0)?,
                unit_id: args[1].clone(),
                unit_type: args[2].clone(),
                role: args[3].clone(),
                group_name: args[4].clone(),
            }))
        },
    },
    Shape {
        kind: EventKind::Kill,
        min_args: 6,
        max_args: 6,
        decode: |header, args| {
            Ok(TypedEvent::Kill(Kill {
                header,
                killer_unit_type: args[0].clone(),
                killer_side: parse_side(header.kind, args, 1)?,
                victim_player_id: args[2].clone(),
                victim_unit_type: args[3].clone(),
                victim_side: parse_side(header.kind, args, 4)?,
                weapon_name: args[5].clone(),
            }))
        },
    },
    Shape {
        kind: EventKind::KilledBy,
        min_args: 6,
        max_args: 6,
        decode: |header, args| {
            Ok(TypedEvent::KilledBy(KilledBy {
                header,
                killer_unit_type: args[0].clone(),
                killer_side: parse_side(header.kind, args, 1)?,
                killer_player_id: args[2].clone(),
                victim_unit_type: args[3].clone(),
                victim_side: parse_side(header.kind, args, 4)?,
                weapon_name: args[5].clone(),
            }))
        },
    },
    Shape {
        kind: EventKind::FriendlyFire,
        min_args: 2,
        max_args: 2,
        decode: |header, args| {
            Ok(TypedEvent::FriendlyFire(FriendlyFire {
                header,
                weapon_name: args[0].clone(),
                victim_player_id: args[1].clone(),
            }))
        },
    },
];

fn unit_event(header: EventHeader, args: &[String]) -> UnitEvent {
    UnitEvent {
        header,
        unit_id: args[0].clone(),
    }
}

fn parse_side(kind: EventKind, args: &[String], index: usize) -> Result<i32, EventError> {
    args[index].parse::<i32>().map_err(|_| {
        EventError::shape(
            kind,
            format!("argument {} is not a side id: '{}'", index, args[index]),
        )
    })
}

impl TryFrom<&RawEvent> for TypedEvent {
    type Error = EventError;

    fn try_from(raw: &RawEvent) -> Result<Self, Self::Error> {
        let kind = raw.kind();
        let shape = SHAPES
            .iter()
            .find(|shape| shape.kind == kind)
            .ok_or_else(|| EventError::shape(kind, "no decoder registered"))?;

        let count = raw.args().len();
        if count < shape.min_args || count > shape.max_args {
            let expected = if shape.min_args == shape.max_args {
                shape.min_args.to_string()
            } else {
                format!("{}-{}", shape.min_args, shape.max_args)
            };
            return Err(EventError::shape(
                kind,
                format!("expected {} arguments, found {}", expected, count),
            ));
        }

        let header = EventHeader {
            time: raw.time(),
            kind,
        };
        (shape.decode)(header, raw.args())
    }
}

impl TypedEvent {
    pub fn header(&self) -> EventHeader {
        match self {
            TypedEvent::Connect(e) | TypedEvent::Disconnect(e) | TypedEvent::SelfKill(e) => {
                e.header
            }
            TypedEvent::Crash(e) | TypedEvent::Eject(e) | TypedEvent::PilotDeath(e) => e.header,
            TypedEvent::Takeoff(e) => e.header,
            TypedEvent::Landing(e) => e.header,
            TypedEvent::KilledBy(e) => e.header,
            TypedEvent::Kill(e) => e.header,
            TypedEvent::FriendlyFire(e) => e.header,
            TypedEvent::ChangeSlot(e) => e.header,
        }
    }

    pub fn time(&self) -> i64 {
        self.header().time
    }

    pub fn kind(&self) -> EventKind {
        self.header().kind
    }

    /// Rebuild the untyped event this was decoded from.
    pub fn to_raw(&self) -> RawEvent {
        let args: Vec<String> = match self {
            TypedEvent::Connect(_) | TypedEvent::Disconnect(_) | TypedEvent::SelfKill(_) => {
                Vec::new()
            }
            TypedEvent::Crash(e) | TypedEvent::Eject(e) | TypedEvent::PilotDeath(e) => {
                vec![e.unit_id.clone()]
            }
            TypedEvent::Takeoff(e) => std::iter::once(e.unit_id.clone())
                .chain(e.airdome_name.clone())
                .collect(),
            TypedEvent::Landing(e) => vec![e.unit_id.clone(), e.airdome_name.clone()],
            TypedEvent::ChangeSlot(e) => vec![
                e.side.to_string(),
                e.unit_id.clone(),
                e.unit_type.clone(),
                e.role.clone(),
                e.group_name.clone(),
            ],
            TypedEvent::Kill(e) => vec![
                e.killer_unit_type.clone(),
                e.killer_side.to_string(),
                e.victim_player_id.clone(),
                e.victim_unit_type.clone(),
                e.victim_side.to_string(),
                e.weapon_name.clone(),
            ],
            TypedEvent::KilledBy(e) => vec![
                e.killer_unit_type.clone(),
                e.killer_side.to_string(),
                e.killer_player_id.clone(),
                e.victim_unit_type.clone(),
                e.victim_side.to_string(),
                e.weapon_name.clone(),
            ],
            TypedEvent::FriendlyFire(e) => {
                vec![e.weapon_name.clone(), e.victim_player_id.clone()]
            }
        };

        RawEvent::new(self.time(), self.kind(), args)
    }
}
