//! Per-mission state carried between phases and ticks.

use rescuebot_types::{Action, Coord, Distance, ObjectId, ObstacleKind, RescueMode, RoomName, VictimId};

use crate::message::Reply;
use crate::wait_timer::WaitWindow;

/// The 19 phases of the mission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Announce the mission and wait for the human to start moving.
    Intro,
    /// Choose the next victim to rescue or fall through to room search.
    FindNextGoal,
    /// Choose the nearest room not yet searched.
    PickUnsearchedRoom,
    /// Route to the doormat of the target room.
    PlanPathToRoom,
    /// Walk to the doormat, clearing stones on the way.
    FollowPathToRoom,
    /// Deal with an obstacle blocking the door.
    RemoveObstacleIfNeeded,
    /// Step through the door.
    EnterRoom,
    /// Lay out the sweep over the room's tiles.
    PlanRoomSearchPath,
    /// Sweep the room, recording victims.
    FollowRoomSearchPath,
    /// Route to a victim's tile.
    PlanPathToVictim,
    /// Walk to a victim's tile.
    FollowPathToVictim,
    /// Reconcile the requested carry mode with the victim's needs.
    FixOrderGrab,
    /// Pick up the victim, or hand over to a joint carry.
    TakeVictim,
    /// Wait next to the victim for the human.
    WaitForHuman,
    /// After a joint lift, wait for the carry to finish.
    WaitAtZone,
    /// Resolve where the carried victim goes.
    FixOrderDrop,
    /// Route to the drop-zone slot.
    PlanPathToDroppoint,
    /// Walk to the drop-zone slot.
    FollowPathToDroppoint,
    /// Put the victim down.
    DropVictim,
}

/// The result of running one phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Move to another phase within the same tick.
    Goto(Phase),
    /// End the tick with an action (or none) and resume in `next`.
    Yield {
        /// Action for the tick.
        action: Option<Action>,
        /// Phase to resume in on the next tick.
        next: Phase,
    },
}

impl Flow {
    /// End the tick without acting and stay in `phase`.
    pub const fn block(phase: Phase) -> Self {
        Self::Yield { action: None, next: phase }
    }

    /// End the tick with `action` and resume in `next`.
    pub const fn act(action: Action, next: Phase) -> Self {
        Self::Yield {
            action: Some(action),
            next,
        }
    }
}

/// A question put to the human that has not been settled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Whether (and how) to remove an obstacle at a door.
    Obstacle {
        /// The obstacle.
        object_id: ObjectId,
        /// Its weight class.
        kind: ObstacleKind,
    },
    /// Whether (and how) to rescue a victim.
    Victim(VictimId),
}

impl Decision {
    /// Whether `reply` is a valid answer to this question.
    pub const fn accepts(&self, reply: Reply) -> bool {
        match self {
            Self::Obstacle { .. } => matches!(
                reply,
                Reply::Remove | Reply::RemoveAlone | Reply::RemoveTogether | Reply::Continue
            ),
            Self::Victim(_) => reply.is_rescue() || matches!(reply, Reply::Continue),
        }
    }
}

/// The door the agent is heading for or standing in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorTarget {
    /// Room behind the door.
    pub room: RoomName,
    /// Door tile.
    pub location: Coord,
    /// Tile in front of the door.
    pub doormat: Coord,
}

/// State that survives between ticks.
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MissionContext {
    pub goal: Option<VictimId>,
    pub door: Option<DoorTarget>,
    pub rescue_mode: RescueMode,
    pub wait: Option<WaitWindow>,
    pub awaiting: Option<Decision>,
    pub reply: Option<Reply>,
    /// The current trip answers a teammate's request for removal help.
    pub remove_request: bool,
    pub carrying: bool,
    pub carrying_together: bool,
    pub joint_carry_seen: bool,
    pub moving: bool,
    pub recent_victim: Option<VictimId>,
    pub room_victims: Vec<VictimId>,
    pub swept: bool,
    /// Door tile of the last room the agent reached.
    pub current_door: Option<Coord>,
    pub distance: Distance,
    pub drop_target: Option<Coord>,
    /// Obstacle the agent is waiting to remove together with the human.
    pub joint_obstacle: Option<ObjectId>,
    /// Obstacle the agent has started removing alone.
    pub removing: Option<ObjectId>,
    pub promised_help: Option<RoomName>,
    pub intro_sent: bool,
}

impl MissionContext {
    /// Forget everything about the current goal. Long-lived state (the
    /// last door, the human's distance, promises) is kept.
    pub fn reset_goal(&mut self) {
        self.goal = None;
        self.door = None;
        self.rescue_mode = RescueMode::Alone;
        self.clear_decision();
        self.remove_request = false;
        self.carrying = false;
        self.joint_carry_seen = false;
        self.moving = false;
        self.room_victims.clear();
        self.swept = false;
        self.drop_target = None;
        self.joint_obstacle = None;
        self.removing = None;
    }

    /// Drop the pending question, its reply and its wait.
    pub fn clear_decision(&mut self) {
        self.awaiting = None;
        self.reply = None;
        self.wait = None;
    }
}

/// Chat messages queued for the current tick.
///
/// A message identical to the one sent just before it is dropped, so
/// phases that re-run every tick do not flood the chat.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    pending: Vec<String>,
    last: Option<String>,
}

impl Outbox {
    /// Queue a message.
    pub fn send(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.last.as_deref() == Some(text.as_str()) {
            return;
        }
        self.last = Some(text.clone());
        self.pending.push(text);
    }

    /// Take the messages queued this tick.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}
