//! World snapshot delivered to the decision core each tick.
//!
//! The snapshot is what the simulator lets the agent see: its own position,
//! what the human is doing (when visible or reported by the environment),
//! the static room layout and any objects currently in view. The wire
//! envelopes used by the runner live here too.

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::enums::{Direction, ObstacleKind};
use crate::ids::{ObjectId, RoomName, VictimId};
use crate::structs::Message;

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coord {
    /// Construct a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (king moves).
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }

    /// Manhattan distance.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// The neighbouring tile in a direction.
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::North => Self::new(self.x, self.y.saturating_sub(1)),
            Direction::East => Self::new(self.x.saturating_add(1), self.y),
            Direction::South => Self::new(self.x, self.y.saturating_add(1)),
            Direction::West => Self::new(self.x.saturating_sub(1), self.y),
        }
    }

    /// The four orthogonal neighbours.
    pub const fn neighbours(self) -> [Self; 4] {
        [
            self.step(Direction::North),
            self.step(Direction::East),
            self.step(Direction::South),
            self.step(Direction::West),
        ]
    }
}

/// What kind of thing a [`WorldObject`] is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    /// A victim; `descriptor` is its [`VictimId`].
    Victim {
        /// Victim descriptor.
        descriptor: VictimId,
    },
    /// An obstacle of the given weight class.
    Obstacle {
        /// Weight class.
        obstacle: ObstacleKind,
    },
    /// The door of a room.
    Door {
        /// Room the door belongs to.
        room: RoomName,
        /// Tile just outside the door where the agent stands to enter.
        doormat: Coord,
    },
    /// A walkable tile inside a room.
    AreaTile {
        /// Room the tile belongs to.
        room: RoomName,
    },
}

/// Coarse category used by world queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    /// Victims.
    Victim,
    /// Obstacles.
    Obstacle,
    /// Doors.
    Door,
    /// Room tiles.
    AreaTile,
}

impl ObjectKind {
    /// The category of this object.
    pub const fn category(&self) -> ObjectCategory {
        match self {
            Self::Victim { .. } => ObjectCategory::Victim,
            Self::Obstacle { .. } => ObjectCategory::Obstacle,
            Self::Door { .. } => ObjectCategory::Door,
            Self::AreaTile { .. } => ObjectCategory::AreaTile,
        }
    }
}

/// An object visible in (or statically known about) the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Simulator object id.
    pub id: ObjectId,
    /// Tile the object occupies.
    pub location: Coord,
    /// What the object is.
    pub kind: ObjectKind,
}

impl WorldObject {
    /// The victim descriptor, if this object is a victim.
    pub const fn victim(&self) -> Option<&VictimId> {
        match &self.kind {
            ObjectKind::Victim { descriptor } => Some(descriptor),
            _ => None,
        }
    }

    /// The obstacle class, if this object is an obstacle.
    pub const fn obstacle(&self) -> Option<ObstacleKind> {
        match &self.kind {
            ObjectKind::Obstacle { obstacle } => Some(*obstacle),
            _ => None,
        }
    }
}

/// One slot of the drop zone: where a particular victim must be delivered.
///
/// Slots are listed in delivery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropZoneSlot {
    /// Victim that belongs in this slot.
    pub victim: VictimId,
    /// Tile of the slot.
    pub location: Coord,
    /// Whether the victim has already been delivered here.
    #[serde(default)]
    pub delivered: bool,
}

/// The human as seen from the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeammateView {
    /// Last known location.
    pub location: Coord,
    /// Victim the human is currently carrying, if any.
    #[serde(default)]
    pub carrying: Option<VictimId>,
}

/// Everything the core may see in one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Current tick.
    pub tick: u64,
    /// Agent position.
    pub agent_location: Coord,
    /// The human's state, when known.
    #[serde(default)]
    pub teammate: Option<TeammateView>,
    /// Whether the human is within the agent's view.
    #[serde(default)]
    pub teammate_in_view: bool,
    /// Static layout (doors, tiles) plus objects currently in view.
    #[serde(default)]
    pub objects: Vec<WorldObject>,
    /// Drop-zone slots in delivery order.
    #[serde(default)]
    pub drop_zones: Vec<DropZoneSlot>,
}

impl WorldSnapshot {
    /// An empty snapshot at a tick and position.
    pub const fn empty(tick: u64, agent_location: Coord) -> Self {
        Self {
            tick,
            agent_location,
            teammate: None,
            teammate_in_view: false,
            objects: Vec::new(),
            drop_zones: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// Inbound payload: one tick of world state plus new messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEnvelope {
    /// World snapshot for the tick.
    pub snapshot: WorldSnapshot,
    /// Messages received since the previous tick.
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Outbound payload: the decision for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Tick the decision was made for.
    pub tick: u64,
    /// Chosen action, if any.
    pub action: Option<Action>,
    /// Chat messages the agent sends this tick.
    pub messages: Vec<String>,
}
