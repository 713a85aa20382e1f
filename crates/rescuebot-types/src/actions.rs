//! Actions the decision core hands back to the simulator.
//!
//! At most one action is emitted per tick. `None` from the core means the
//! agent does nothing this tick (for example while it is carrying a victim
//! together with the human and the human is steering).

use serde::{Deserialize, Serialize};

use crate::enums::Direction;
use crate::ids::{ObjectId, TeammateId};

/// A single action for the simulator to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Step one tile.
    Move {
        /// Direction of the step.
        direction: Direction,
    },
    /// Remove an obstacle adjacent to the agent.
    RemoveObstacle {
        /// World object id of the obstacle.
        object_id: ObjectId,
    },
    /// Pick up a victim, optionally together with a partner.
    CarryObject {
        /// World object id of the victim.
        object_id: ObjectId,
        /// Partner sharing the carry, if any.
        partner: Option<TeammateId>,
    },
    /// Drop whatever the agent is carrying.
    Drop {
        /// Partner sharing the carry, if any.
        partner: Option<TeammateId>,
    },
    /// Do nothing for a number of ticks.
    Idle {
        /// How many ticks to idle.
        duration_ticks: u32,
    },
}

impl Action {
    /// Shorthand for [`Action::Idle`].
    pub const fn idle(duration_ticks: u32) -> Self {
        Self::Idle { duration_ticks }
    }

    /// Whether this action moves the agent.
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Move { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tagged_serialization() {
        let action = Action::CarryObject {
            object_id: ObjectId::from("victim_3"),
            partner: None,
        };
        let json = serde_json::to_value(&action).ok();
        let expected = serde_json::json!({
            "type": "carry_object",
            "object_id": "victim_3",
            "partner": null,
        });
        assert_eq!(json, Some(expected));
    }

    #[test]
    fn idle_shorthand() {
        assert_eq!(Action::idle(25), Action::Idle { duration_ticks: 25 });
        assert!(!Action::idle(1).is_move());
        assert!(
            Action::Move {
                direction: Direction::East
            }
            .is_move()
        );
    }
}
