//! The agent's knowledge store: what it knows about victims and rooms.
//!
//! Knowledge is built from two sources. Teammate messages are interpreted
//! through [`KnowledgeStore::ingest`], and the phase machine records its own
//! observations (sightings, searches, deliveries) directly.
//!
//! # Invariants
//!
//! - A message is interpreted at most once, keyed by `(content, ordinal)`.
//! - A victim confirmed absent or delivered is removed from the known set.
//! - The explored set only grows until [`KnowledgeStore::start_new_cycle`].
//! - Search and found logs are append-only for the lifetime of the episode.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, warn};

use rescuebot_types::{
    Actor, Coord, Message, ObjectId, RoomName, Severity, TeammateCondition, VictimId, VictimState,
};

use crate::message::{ParsedMessage, trailing_room_index};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// What the agent knows about one victim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VictimRecord {
    /// Room the victim is believed to be in.
    pub room: RoomName,
    /// Exact tile, once the agent has seen the victim.
    pub location: Option<Coord>,
    /// World object id, once the agent has seen the victim.
    pub object_id: Option<ObjectId>,
    /// Lifecycle state.
    pub state: VictimState,
}

/// One logged search of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchEntry {
    /// Who searched.
    pub actor: Actor,
    /// When.
    pub tick: u64,
}

/// One logged sighting or report of a victim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundEntry {
    /// Who saw or reported the victim.
    pub actor: Actor,
    /// Room named in the sighting.
    pub room: RoomName,
    /// When.
    pub tick: u64,
}

/// A freshly ingested teammate message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreted {
    /// The raw message.
    pub message: Message,
    /// Its parsed form.
    pub parsed: ParsedMessage,
}

// ---------------------------------------------------------------------------
// KnowledgeStore
// ---------------------------------------------------------------------------

/// Everything the agent knows about victims, rooms and the human's
/// whereabouts during one episode.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    victims: BTreeMap<VictimId, VictimRecord>,
    explored: BTreeSet<RoomName>,
    skipped: Vec<RoomName>,
    search_log: BTreeMap<RoomName, Vec<SearchEntry>>,
    found_log: BTreeMap<VictimId, Vec<FoundEntry>>,
    collected: BTreeSet<VictimId>,
    retry: Vec<VictimId>,
    joint: BTreeSet<VictimId>,
    teammate_area: Option<u32>,
    seen: HashSet<(String, u64)>,
}

impl KnowledgeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret new teammate messages and apply their side effects.
    ///
    /// Messages already seen (same content and ordinal) are skipped. The
    /// returned list holds only the fresh ones, in input order, including
    /// unrecognized messages so callers can account for them.
    pub fn ingest(&mut self, messages: &[Message], condition: TeammateCondition) -> Vec<Interpreted> {
        let mut fresh = Vec::new();
        for message in messages {
            if !self
                .seen
                .insert((message.content.clone(), message.ordinal))
            {
                continue;
            }
            let parsed = ParsedMessage::parse(&message.content);
            if parsed.is_unrecognized() {
                warn!(content = %message.content, "unrecognized teammate message");
            }
            self.apply(&parsed, message.tick, condition);
            if let Some(index) = trailing_room_index(&message.content) {
                self.teammate_area = Some(index);
            }
            fresh.push(Interpreted {
                message: message.clone(),
                parsed,
            });
        }
        fresh
    }

    fn apply(&mut self, parsed: &ParsedMessage, tick: u64, condition: TeammateCondition) {
        match parsed {
            ParsedMessage::Search { room } => {
                self.explored.insert(room.clone());
                self.log_search(room, Actor::Teammate, tick);
            }
            ParsedMessage::Found { victim, room } => {
                self.explored.insert(room.clone());
                self.log_found(victim, room, Actor::Teammate, tick);
                self.note_reported(victim, room);
                match condition {
                    TeammateCondition::Weak => {
                        self.joint.insert(victim.clone());
                    }
                    TeammateCondition::Strong if victim.severity() == Some(Severity::Mild) => {
                        self.defer(victim);
                    }
                    TeammateCondition::Strong | TeammateCondition::Normal => {}
                }
            }
            ParsedMessage::Collect { victim, room } => {
                self.explored.insert(room.clone());
                self.note_reported(victim, room);
                if condition == TeammateCondition::Weak {
                    self.joint.insert(victim.clone());
                } else {
                    self.mark_collected(victim);
                }
            }
            ParsedMessage::RemoveRequest { .. }
            | ParsedMessage::Reply(_)
            | ParsedMessage::Unrecognized => {}
        }
    }

    /// Record a victim named in a report, moving it if the room changed.
    fn note_reported(&mut self, victim: &VictimId, room: &RoomName) {
        match self.victims.get_mut(victim) {
            Some(record) if &record.room != room => {
                debug!(%victim, from = %record.room, to = %room, "victim reported in another room");
                record.room = room.clone();
                record.location = None;
                record.object_id = None;
                record.state = VictimState::KnownNoLocation;
            }
            Some(_) => {}
            None => {
                self.victims.insert(
                    victim.clone(),
                    VictimRecord {
                        room: room.clone(),
                        location: None,
                        object_id: None,
                        state: VictimState::KnownNoLocation,
                    },
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Victims
    // -----------------------------------------------------------------------

    /// Whether the victim is in the known set.
    pub fn is_known(&self, victim: &VictimId) -> bool {
        self.victims.contains_key(victim)
    }

    /// The record of a known victim.
    pub fn victim(&self, victim: &VictimId) -> Option<&VictimRecord> {
        self.victims.get(victim)
    }

    /// Record that the agent saw a victim at an exact tile.
    pub fn record_sighting(&mut self, victim: &VictimId, room: &RoomName, location: Coord, object_id: &ObjectId) {
        self.victims.insert(
            victim.clone(),
            VictimRecord {
                room: room.clone(),
                location: Some(location),
                object_id: Some(object_id.clone()),
                state: VictimState::KnownLocated,
            },
        );
    }

    /// Whether the victim has been picked up by anyone.
    pub fn is_collected(&self, victim: &VictimId) -> bool {
        self.collected.contains(victim)
    }

    /// Mark a victim as picked up.
    pub fn mark_collected(&mut self, victim: &VictimId) {
        self.collected.insert(victim.clone());
        if let Some(record) = self.victims.get_mut(victim) {
            record.state = VictimState::Collected;
        }
    }

    /// Mark a victim as carried by the agent.
    pub fn mark_carried(&mut self, victim: &VictimId) {
        self.collected.insert(victim.clone());
        if let Some(record) = self.victims.get_mut(victim) {
            record.state = VictimState::BeingCarried;
        }
    }

    /// Forget a victim that was searched for and not found.
    pub fn confirm_absent(&mut self, victim: &VictimId) {
        debug!(%victim, "victim confirmed absent");
        self.forget(victim);
    }

    /// Forget a victim that reached the drop zone.
    pub fn mark_delivered(&mut self, victim: &VictimId) {
        self.collected.insert(victim.clone());
        self.forget(victim);
    }

    fn forget(&mut self, victim: &VictimId) {
        self.victims.remove(victim);
        self.retry.retain(|v| v != victim);
        self.joint.remove(victim);
    }

    /// Put a victim on the agent's retry list.
    pub fn defer(&mut self, victim: &VictimId) {
        if !self.retry.contains(victim) {
            self.retry.push(victim.clone());
        }
    }

    /// Whether the victim is on the retry list.
    pub fn is_deferred(&self, victim: &VictimId) -> bool {
        self.retry.contains(victim)
    }

    /// Whether the victim was queued for joint handling.
    pub fn is_joint(&self, victim: &VictimId) -> bool {
        self.joint.contains(victim)
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    /// Whether the room is in the explored set.
    pub fn is_explored(&self, room: &RoomName) -> bool {
        self.explored.contains(room)
    }

    /// Whether no room has been explored in the current cycle.
    pub fn explored_is_empty(&self) -> bool {
        self.explored.is_empty()
    }

    /// Add a room to the explored set.
    pub fn mark_explored(&mut self, room: &RoomName) {
        self.explored.insert(room.clone());
    }

    /// Skip a room for the rest of the cycle.
    pub fn skip_room(&mut self, room: &RoomName) {
        if !self.skipped.contains(room) {
            self.skipped.push(room.clone());
        }
    }

    /// Whether the room is skipped in this cycle.
    pub fn is_skipped(&self, room: &RoomName) -> bool {
        self.skipped.contains(room)
    }

    /// Begin a new search cycle: clear the explored set and the skipped
    /// rooms. Logs and known victims survive.
    pub fn start_new_cycle(&mut self) {
        self.explored.clear();
        self.skipped.clear();
    }

    /// Append a search to a room's log. A repeat of the same actor and tick
    /// is ignored.
    pub fn log_search(&mut self, room: &RoomName, actor: Actor, tick: u64) {
        let log = self.search_log.entry(room.clone()).or_default();
        let entry = SearchEntry { actor, tick };
        if !log.contains(&entry) {
            log.push(entry);
        }
    }

    /// The search log of a room, oldest first.
    pub fn search_log(&self, room: &RoomName) -> &[SearchEntry] {
        self.search_log.get(room).map(Vec::as_slice).unwrap_or_default()
    }

    /// Append a sighting or report of a victim. Only one entry per tick is
    /// kept.
    pub fn log_found(&mut self, victim: &VictimId, room: &RoomName, actor: Actor, tick: u64) {
        let log = self.found_log.entry(victim.clone()).or_default();
        if log.iter().all(|entry| entry.tick != tick) {
            log.push(FoundEntry {
                actor,
                room: room.clone(),
                tick,
            });
        }
    }

    /// The found log of a victim, oldest first.
    pub fn found_log(&self, victim: &VictimId) -> &[FoundEntry] {
        self.found_log.get(victim).map(Vec::as_slice).unwrap_or_default()
    }

    /// The area index the human last mentioned.
    pub const fn teammate_area(&self) -> Option<u32> {
        self.teammate_area
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rescuebot_types::TeammateId;

    fn msg(content: &str, tick: u64, ordinal: u64) -> Message {
        Message::new(content, TeammateId::from("human"), tick, ordinal)
    }

    fn room(n: u32) -> RoomName {
        RoomName::from_index(n)
    }

    #[test]
    fn search_marks_explored_and_logs() {
        let mut store = KnowledgeStore::new();
        store.ingest(&[msg("Search: area 3", 10, 0)], TeammateCondition::Normal);
        assert!(store.is_explored(&room(3)));
        assert_eq!(
            store.search_log(&room(3)),
            &[SearchEntry {
                actor: Actor::Teammate,
                tick: 10
            }]
        );
        assert_eq!(store.teammate_area(), Some(3));
    }

    #[test]
    fn duplicate_messages_are_ignored() {
        let mut store = KnowledgeStore::new();
        let first = store.ingest(&[msg("Search: area 3", 10, 0)], TeammateCondition::Normal);
        let second = store.ingest(&[msg("Search: area 3", 11, 0)], TeammateCondition::Normal);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(store.search_log(&room(3)).len(), 1);

        // Same content at a new ordinal is a new message.
        let third = store.ingest(&[msg("Search: area 3", 12, 1)], TeammateCondition::Normal);
        assert_eq!(third.len(), 1);
        assert_eq!(store.search_log(&room(3)).len(), 2);
    }

    #[test]
    fn found_report_creates_known_victim() {
        let mut store = KnowledgeStore::new();
        let cat = VictimId::from("mildly injured cat");
        store.ingest(&[msg("Found: mildly injured cat in area 5", 4, 0)], TeammateCondition::Normal);
        let record = store.victim(&cat).unwrap();
        assert_eq!(record.room, room(5));
        assert_eq!(record.state, VictimState::KnownNoLocation);
        assert_eq!(store.found_log(&cat).len(), 1);
        assert!(!store.is_deferred(&cat));
    }

    #[test]
    fn re_report_moves_victim() {
        let mut store = KnowledgeStore::new();
        let cat = VictimId::from("mildly injured cat");
        store.record_sighting(&cat, &room(2), Coord::new(3, 3), &ObjectId::from("cat_1"));
        store.ingest(&[msg("Found: mildly injured cat in area 6", 4, 0)], TeammateCondition::Normal);
        let record = store.victim(&cat).unwrap();
        assert_eq!(record.room, room(6));
        assert_eq!(record.location, None);
    }

    #[test]
    fn strong_teammate_defers_mild_reports() {
        let mut store = KnowledgeStore::new();
        store.ingest(
            &[
                msg("Found: mildly injured cat in area 5", 4, 0),
                msg("Found: critically injured man in area 6", 5, 1),
            ],
            TeammateCondition::Strong,
        );
        assert!(store.is_deferred(&VictimId::from("mildly injured cat")));
        assert!(!store.is_deferred(&VictimId::from("critically injured man")));
    }

    #[test]
    fn weak_teammate_queues_joint_and_collect_not_trusted() {
        let mut store = KnowledgeStore::new();
        let boy = VictimId::from("mildly injured boy");
        store.ingest(&[msg("Collect: mildly injured boy in area 1", 4, 0)], TeammateCondition::Weak);
        assert!(store.is_joint(&boy));
        assert!(!store.is_collected(&boy));
        assert!(store.is_known(&boy));
    }

    #[test]
    fn collect_marks_collected() {
        let mut store = KnowledgeStore::new();
        let boy = VictimId::from("mildly injured boy");
        store.ingest(&[msg("Collect: mildly injured boy in area 1", 4, 0)], TeammateCondition::Normal);
        assert!(store.is_collected(&boy));
        assert_eq!(store.victim(&boy).unwrap().state, VictimState::Collected);
    }

    #[test]
    fn confirmed_absent_victim_is_forgotten() {
        let mut store = KnowledgeStore::new();
        let dog = VictimId::from("critically injured dog");
        store.ingest(&[msg("Found: critically injured dog in area 9", 4, 0)], TeammateCondition::Normal);
        store.defer(&dog);
        store.confirm_absent(&dog);
        assert!(!store.is_known(&dog));
        assert!(!store.is_deferred(&dog));
        // The found log stays for trust scoring.
        assert_eq!(store.found_log(&dog).len(), 1);
    }

    #[test]
    fn new_cycle_clears_explored_and_skipped_only() {
        let mut store = KnowledgeStore::new();
        let cat = VictimId::from("mildly injured cat");
        store.mark_explored(&room(1));
        store.skip_room(&room(2));
        store.defer(&cat);
        store.start_new_cycle();
        assert!(store.explored_is_empty());
        assert!(!store.is_skipped(&room(2)));
        assert!(store.is_deferred(&cat));
    }
}
