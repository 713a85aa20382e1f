//! Parser for the fixed chat grammar spoken by the human teammate.
//!
//! Reports:
//!
//! - `Search: area <n>`
//! - `Found: <victim> in area <n>`
//! - `Collect: <victim> in area <n>`
//! - `Remove: <free text> area <n>` (a request for help)
//!
//! Replies to a question the agent asked: `Remove`, `Remove alone`,
//! `Remove together`, `Continue`, `Rescue`, `Rescue alone`,
//! `Rescue together`.
//!
//! Keywords are case-sensitive. Anything else parses to
//! [`ParsedMessage::Unrecognized`], which is consumed but never scored.

use rescuebot_types::{RescueMode, RoomName, TaskCategory, VictimId};

/// A reply to a decision the agent asked the human to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reply {
    /// Remove the obstacle (tree or rock).
    Remove,
    /// Agent removes the stones alone.
    RemoveAlone,
    /// Remove the stones together.
    RemoveTogether,
    /// Skip the decision and keep searching.
    Continue,
    /// Rescue the critical victim (always together).
    Rescue,
    /// Agent rescues the mild victim alone.
    RescueAlone,
    /// Rescue the mild victim together.
    RescueTogether,
}

impl Reply {
    /// Whether the reply answers a victim decision.
    pub const fn is_rescue(self) -> bool {
        matches!(self, Self::Rescue | Self::RescueAlone | Self::RescueTogether)
    }

    /// The carry mode a rescue reply asks for.
    pub const fn requested_mode(self) -> Option<RescueMode> {
        match self {
            Self::Rescue | Self::RescueTogether => Some(RescueMode::Together),
            Self::RescueAlone => Some(RescueMode::Alone),
            _ => None,
        }
    }

    fn parse(content: &str) -> Option<Self> {
        match content {
            "Remove" => Some(Self::Remove),
            "Remove alone" => Some(Self::RemoveAlone),
            "Remove together" => Some(Self::RemoveTogether),
            "Continue" => Some(Self::Continue),
            "Rescue" => Some(Self::Rescue),
            "Rescue alone" => Some(Self::RescueAlone),
            "Rescue together" => Some(Self::RescueTogether),
            _ => None,
        }
    }
}

/// A teammate message after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    /// The human searched a room.
    Search {
        /// Room searched.
        room: RoomName,
    },
    /// The human found a victim.
    Found {
        /// Victim descriptor.
        victim: VictimId,
        /// Room the victim was found in.
        room: RoomName,
    },
    /// The human picked up a victim.
    Collect {
        /// Victim descriptor.
        victim: VictimId,
        /// Room the victim was collected from.
        room: RoomName,
    },
    /// The human asks for help removing an obstacle.
    RemoveRequest {
        /// Room with the obstacle.
        room: RoomName,
    },
    /// Reply to a pending decision.
    Reply(Reply),
    /// Anything outside the grammar.
    Unrecognized,
}

impl ParsedMessage {
    /// Parse raw message content.
    pub fn parse(content: &str) -> Self {
        let content = content.trim();
        if let Some(reply) = Reply::parse(content) {
            return Self::Reply(reply);
        }
        if let Some(rest) = content.strip_prefix("Search:") {
            return room_from_words(rest).map_or(Self::Unrecognized, |room| Self::Search { room });
        }
        if let Some(rest) = content.strip_prefix("Found:") {
            return victim_in_room(rest)
                .map_or(Self::Unrecognized, |(victim, room)| Self::Found { victim, room });
        }
        if let Some(rest) = content.strip_prefix("Collect:") {
            return victim_in_room(rest)
                .map_or(Self::Unrecognized, |(victim, room)| Self::Collect { victim, room });
        }
        if let Some(rest) = content.strip_prefix("Remove:") {
            return trailing_room_index(rest).map_or(Self::Unrecognized, |index| {
                Self::RemoveRequest {
                    room: RoomName::from_index(index),
                }
            });
        }
        Self::Unrecognized
    }

    /// The task a report is about, together with the number of ticks the
    /// reported work is expected to take. Replies and unrecognized
    /// messages have no expectation.
    pub const fn expectation(&self) -> Option<(TaskCategory, u64)> {
        match self {
            Self::Search { .. } => Some((TaskCategory::Search, 1)),
            Self::Found { .. } => Some((TaskCategory::Rescue, 1)),
            Self::RemoveRequest { .. } => Some((TaskCategory::Search, 10)),
            Self::Collect { .. } => Some((TaskCategory::Rescue, 10)),
            Self::Reply(_) | Self::Unrecognized => None,
        }
    }

    /// Whether the message fell outside the grammar.
    pub const fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized)
    }
}

/// The area index when the last whitespace-separated token of a message is
/// a bare number.
pub fn trailing_room_index(content: &str) -> Option<u32> {
    content.split_whitespace().last()?.parse().ok()
}

/// `area <n>` at the end of a fragment.
fn room_from_words(fragment: &str) -> Option<RoomName> {
    let mut words = fragment.split_whitespace().rev();
    let index: u32 = words.next()?.parse().ok()?;
    (words.next()? == "area").then(|| RoomName::from_index(index))
}

/// `<victim> in area <n>`.
fn victim_in_room(fragment: &str) -> Option<(VictimId, RoomName)> {
    let (victim, room) = fragment.rsplit_once(" in ")?;
    let victim = victim.trim();
    if victim.is_empty() {
        return None;
    }
    let room = room_from_words(room)?;
    Some((VictimId::from(victim), room))
}
