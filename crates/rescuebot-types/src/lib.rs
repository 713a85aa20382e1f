//! Shared type definitions for the RescueBot decision core.
//!
//! Every crate in the workspace speaks these types: the decision core uses
//! them internally, the database crate persists [`BeliefRecord`] rows, and
//! the runner moves [`TickEnvelope`] and [`ActionEnvelope`] over NATS.
//!
//! # Modules
//!
//! - [`ids`] -- String newtypes for teammates, victims, objects and rooms
//! - [`enums`] -- Severity, task categories, obstacle classes, directions
//! - [`structs`] -- Messages, trust beliefs and confirmed-info events
//! - [`actions`] -- The action surface handed back to the simulator
//! - [`snapshot`] -- World snapshot and wire envelopes

pub mod actions;
pub mod enums;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::Action;
pub use enums::{
    Actor, ConfirmedInfoKind, Direction, Distance, ObstacleKind, RescueMode, Severity,
    TaskCategory, TeammateCondition, VictimState,
};
pub use ids::{ObjectId, RoomName, TeammateId, VictimId};
pub use snapshot::{
    ActionEnvelope, Coord, DropZoneSlot, ObjectCategory, ObjectKind, TeammateView, TickEnvelope,
    WorldObject, WorldSnapshot,
};
pub use structs::{
    BELIEF_MAX, BELIEF_MIN, BeliefRecord, BeliefSet, ConfirmedInfoEvent, EventSubject, Message,
    TrustBelief,
};
