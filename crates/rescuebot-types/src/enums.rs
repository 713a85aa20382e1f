//! Enumeration types shared across the RescueBot workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Victims
// ---------------------------------------------------------------------------

/// How badly a victim is injured.
///
/// Critical victims can only be carried by the agent and the human
/// together; mild victims can be carried by either alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Mildly injured.
    Mild,
    /// Critically injured.
    Critical,
}

impl Severity {
    /// Derive the severity from a victim descriptor.
    ///
    /// Descriptors starting with `critical` map to [`Severity::Critical`],
    /// those starting with `mild` to [`Severity::Mild`]. Anything else
    /// (notably `healthy ...`) is not a victim in need of rescue.
    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        let trimmed = descriptor.trim_start();
        if trimmed.starts_with("critical") {
            Some(Self::Critical)
        } else if trimmed.starts_with("mild") {
            Some(Self::Mild)
        } else {
            None
        }
    }

    /// Returns `true` for critically injured victims.
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::Critical)
    }
}

/// Lifecycle of a victim as tracked by the agent's knowledge store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictimState {
    /// Reported or seen, room known but not the exact tile.
    KnownNoLocation,
    /// Exact location and object id are known.
    KnownLocated,
    /// Currently carried by the agent, the human, or both.
    BeingCarried,
    /// Picked up and no longer at its original position.
    Collected,
    /// Dropped at its drop-zone slot.
    Delivered,
    /// Searched for at the reported place and not found.
    ConfirmedAbsent,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// The task category a trust belief is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Searching rooms and removing obstacles.
    Search,
    /// Finding, carrying and delivering victims.
    Rescue,
}

impl TaskCategory {
    /// Every category, in persistence order.
    pub const ALL: [Self; 2] = [Self::Search, Self::Rescue];

    /// The lowercase label used in persisted belief rows.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Rescue => "rescue",
        }
    }

    /// Parse a persisted label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "search" => Some(Self::Search),
            "rescue" => Some(Self::Rescue),
            _ => None,
        }
    }
}

impl core::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performed a logged search of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// The RescueBot itself.
    Agent,
    /// The human teammate.
    Teammate,
}

/// Carry mode chosen for a victim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescueMode {
    /// The agent carries the victim by itself.
    #[default]
    Alone,
    /// The agent and the human carry the victim together.
    Together,
}

/// Assessment of the human's overall ability, derived from trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeammateCondition {
    /// Reports are unreliable; victims are handled jointly.
    Weak,
    /// No adjustment to message handling.
    Normal,
    /// Reports are reliable; mild victims may be left to the human.
    Strong,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Obstacle weight classes found in doorways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Stones: removable alone or together.
    Light,
    /// Tree: removable by the agent alone.
    Medium,
    /// Rock: only removable together.
    Heavy,
}

impl ObstacleKind {
    /// Classify an obstacle from its world object name.
    pub fn from_object_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.contains("stone") {
            Some(Self::Light)
        } else if lower.contains("tree") {
            Some(Self::Medium)
        } else if lower.contains("rock") {
            Some(Self::Heavy)
        } else {
            None
        }
    }

    /// The name used when talking about the obstacle in chat.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "stones",
            Self::Medium => "tree",
            Self::Heavy => "rock",
        }
    }
}

/// Coarse distance between the agent and the human.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    /// The human is in view or in the same half of the map.
    #[default]
    Close,
    /// The human is in the other half of the map.
    Far,
}

/// Grid movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Decrease `y`.
    North,
    /// Increase `x`.
    East,
    /// Increase `y`.
    South,
    /// Decrease `x`.
    West,
}

// ---------------------------------------------------------------------------
// Confirmed information
// ---------------------------------------------------------------------------

/// Ground-truth observations the phase machine feeds back into trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmedInfoKind {
    /// A teammate-reported victim was seen where reported.
    Found,
    /// A teammate-reported victim was not where reported.
    NotFound,
    /// The human did not answer or show up in time.
    WaitTimeout,
    /// A jointly carried victim was delivered.
    Delivered,
    /// A victim was lifted together with the human.
    Collected,
    /// A jointly handled obstacle was removed.
    Removed,
    /// The human claimed a rescue with no rescue decision pending.
    FalseRescueClaim,
}
