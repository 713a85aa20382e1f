//! Trust belief model: rule-based revision of the human's competence and
//! willingness per task category.
//!
//! # Architecture
//!
//! The model keeps a *base* belief set that accumulates every message and
//! confirmed-info adjustment. Silence decay is not folded into the base;
//! it is an overlay computed from the message timeline at read time, so
//! asking for the beliefs twice in one tick never decays twice. The
//! effective beliefs returned by [`TrustModel::beliefs`] are the base minus
//! the current decay.
//!
//! Messages are scored against the [`KnowledgeStore`] *after* it has
//! interpreted them. All "before this tick" checks are strict, so the
//! entries a message itself created never count as prior evidence.
//!
//! # Invariants
//!
//! - Every scalar stays in `[-1.0, 1.0]`; non-finite deltas are rejected.
//! - A message is scored at most once, keyed by `(content, ordinal)`.
//! - Decay is non-negative and never pushes a scalar below the floor;
//!   scalars already at or below the floor are left alone.
//! - Reserved teammates (`ALWAYS_TRUST`, `NEVER_TRUST`, `RANDOM_TRUST`) are
//!   never revised.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use rescuebot_types::{
    Actor, BeliefRecord, BeliefSet, ConfirmedInfoEvent, ConfirmedInfoKind, Message, RoomName,
    Severity, TaskCategory, TeammateCondition, TeammateId, VictimId,
};

use crate::belief_store::BeliefStore;
use crate::config::{AgentConfig, DecayConfig};
use crate::error::AgentError;
use crate::knowledge::KnowledgeStore;
use crate::message::{ParsedMessage, Reply};

/// Penalty for reporting on a room nobody had searched yet.
const UNSEARCHED_PENALTY: f64 = -0.12;

/// The last scored message, for the timeliness check.
#[derive(Debug, Clone, Copy)]
struct PreviousMessage {
    expectation: Option<(TaskCategory, u64)>,
    tick: u64,
}

/// Trust beliefs about one teammate, plus the state needed to revise them.
#[derive(Debug, Clone)]
pub struct TrustModel {
    base: BeliefSet,
    frozen: bool,
    decay: DecayConfig,
    weak_threshold: f64,
    strong_threshold: f64,
    scored: HashSet<(String, u64)>,
    message_ticks: Vec<u64>,
    previous: Option<PreviousMessage>,
    origin: u64,
}

impl TrustModel {
    /// Build a model from persisted rows. Tasks without a usable row
    /// start from the configured defaults.
    pub fn new(teammate: TeammateId, records: &[BeliefRecord], config: &AgentConfig) -> Self {
        let frozen = config.trust.is_reserved(teammate.as_str());
        let base = BeliefSet::from_records(teammate, records, config.trust.default_belief());
        if frozen {
            info!(teammate = %base.teammate, "reserved teammate, beliefs are fixed");
        }
        Self {
            base,
            frozen,
            decay: config.decay.clone(),
            weak_threshold: config.mission.weak_threshold,
            strong_threshold: config.mission.strong_threshold,
            scored: HashSet::new(),
            message_ticks: Vec::new(),
            previous: None,
            origin: 0,
        }
    }

    /// Load the latest persisted beliefs for `teammate` from a store.
    pub fn load(store: &dyn BeliefStore, teammate: TeammateId, config: &AgentConfig) -> Result<Self, AgentError> {
        let records = store.latest(&teammate)?;
        debug!(teammate = %teammate, rows = records.len(), "loaded trust beliefs");
        Ok(Self::new(teammate, &records, config))
    }

    /// Write the current effective beliefs to a store.
    pub fn persist(&self, store: &mut dyn BeliefStore, now: u64) -> Result<(), AgentError> {
        store.save(&self.beliefs(now).to_records())
    }

    /// The teammate these beliefs are about.
    pub const fn teammate(&self) -> &TeammateId {
        &self.base.teammate
    }

    /// Whether the teammate is a reserved baseline identity.
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Beliefs before silence decay.
    pub const fn base(&self) -> &BeliefSet {
        &self.base
    }

    /// Effective beliefs at `now`: the base with silence decay applied.
    pub fn beliefs(&self, now: u64) -> BeliefSet {
        if self.frozen {
            return self.base.clone();
        }
        let decay = self.silence_decay(now);
        let floor = self.decay.floor;
        let mut effective = self.base.clone();
        for task in TaskCategory::ALL {
            let belief = effective.get_mut(task);
            belief.competence = decayed(belief.competence, decay, floor);
            belief.willingness = decayed(belief.willingness, decay, floor);
        }
        effective
    }

    /// The human's overall condition from mean competence.
    pub fn condition(&self, now: u64) -> TeammateCondition {
        let mean = self.beliefs(now).mean_competence();
        if mean < self.weak_threshold {
            TeammateCondition::Weak
        } else if mean < self.strong_threshold {
            TeammateCondition::Normal
        } else {
            TeammateCondition::Strong
        }
    }

    /// Score new messages and apply confirmed-info events, returning the
    /// effective beliefs at `now`.
    ///
    /// `knowledge` must already have interpreted `messages`. Messages
    /// scored before are skipped; events are consumed and never replayed.
    pub fn update(
        &mut self,
        messages: &[Message],
        knowledge: &KnowledgeStore,
        events: &[ConfirmedInfoEvent],
        now: u64,
    ) -> BeliefSet {
        for message in messages {
            self.score_message(message, knowledge);
        }
        self.apply_events(events);
        self.beliefs(now)
    }

    /// Score one message. Returns `false` when the message was already
    /// scored or the teammate is reserved.
    pub fn score_message(&mut self, message: &Message, knowledge: &KnowledgeStore) -> bool {
        if self.frozen {
            return false;
        }
        if !self
            .scored
            .insert((message.content.clone(), message.ordinal))
        {
            return false;
        }
        self.message_ticks.push(message.tick);

        let parsed = ParsedMessage::parse(&message.content);
        if parsed.is_unrecognized() {
            debug!(content = %message.content, "unrecognized message consumed without scoring");
            return true;
        }
        let tick = message.tick;
        match &parsed {
            ParsedMessage::Collect { victim, room } => self.score_collect(victim, room, tick, knowledge),
            ParsedMessage::Search { room } => self.score_search(room, tick, knowledge),
            ParsedMessage::Found { victim, room } => self.score_found(victim, room, tick, knowledge),
            ParsedMessage::RemoveRequest { room } => self.score_remove_request(room, tick, knowledge),
            ParsedMessage::Reply(reply) => self.score_reply(*reply),
            ParsedMessage::Unrecognized => {}
        }

        if let Some(PreviousMessage {
            expectation: Some((task, expected)),
            tick: previous_tick,
        }) = self.previous
        {
            if tick.saturating_sub(previous_tick) < expected {
                self.adjust(task, -0.1, -0.2, "previous task likely unfinished");
            }
        }
        self.previous = Some(PreviousMessage {
            expectation: parsed.expectation(),
            tick,
        });
        true
    }

    fn score_collect(&mut self, victim: &VictimId, room: &RoomName, tick: u64, knowledge: &KnowledgeStore) {
        let scale = if victim.severity() == Some(Severity::Critical) { 2.0 } else { 1.0 };
        let earlier = knowledge.found_log(victim).iter().rev().find(|entry| entry.tick < tick);
        match earlier {
            None => self.adjust(
                TaskCategory::Rescue,
                -0.1 * scale,
                -0.1 * scale,
                "victim collected but never found",
            ),
            Some(entry) if &entry.room != room => self.adjust(
                TaskCategory::Rescue,
                -0.05 * scale,
                -0.05 * scale,
                "victim collected but found in another room",
            ),
            Some(_) => self.adjust(
                TaskCategory::Rescue,
                0.1 * scale,
                0.1 * scale,
                "victim collected where it was found",
            ),
        }

        match knowledge.search_log(room).first() {
            None => {
                debug!(room = %room, "collected room has no search log, skipping search check");
            }
            Some(first) if first.tick >= tick => {
                self.adjust_all(UNSEARCHED_PENALTY, UNSEARCHED_PENALTY, "victim collected from unsearched room");
            }
            Some(_) => {}
        }
    }

    fn score_search(&mut self, room: &RoomName, tick: u64, knowledge: &KnowledgeStore) {
        match knowledge.search_log(room).first() {
            Some(prior) if prior.tick < tick => {
                let (competence, willingness) = match prior.actor {
                    Actor::Teammate => (-0.1, -0.1),
                    Actor::Agent => (-0.15, -0.15),
                };
                self.adjust(TaskCategory::Search, competence, willingness, "room searched before");
            }
            _ => self.adjust(TaskCategory::Search, 0.05, 0.08, "room searched for the first time"),
        }
    }

    fn score_found(&mut self, victim: &VictimId, room: &RoomName, tick: u64, knowledge: &KnowledgeStore) {
        let mut earlier = knowledge
            .found_log(victim)
            .iter()
            .filter(|entry| entry.tick < tick)
            .peekable();
        if earlier.peek().is_none() {
            self.adjust(TaskCategory::Rescue, 0.0, 0.05, "victim reported for the first time");
        } else if earlier.any(|entry| &entry.room != room) {
            self.adjust(TaskCategory::Rescue, -0.12, -0.12, "victim reported in two different rooms");
        } else {
            self.adjust(TaskCategory::Rescue, -0.05, -0.05, "victim reported twice in the same room");
        }

        if is_unsearched(knowledge, room, tick) {
            self.adjust_all(UNSEARCHED_PENALTY, UNSEARCHED_PENALTY, "victim found in unsearched room");
        }
    }

    fn score_remove_request(&mut self, room: &RoomName, tick: u64, knowledge: &KnowledgeStore) {
        self.adjust(TaskCategory::Search, 0.0, 0.1, "asked for help removing an obstacle");
        if is_unsearched(knowledge, room, tick) {
            self.adjust(TaskCategory::Search, UNSEARCHED_PENALTY, 0.0, "asked for removal help in unsearched room");
        }
    }

    fn score_reply(&mut self, reply: Reply) {
        match reply {
            Reply::RemoveAlone | Reply::RescueAlone => {
                debug!(?reply, "agent acts alone, no trust change");
            }
            Reply::RemoveTogether => self.adjust(TaskCategory::Search, 0.05, 0.15, "offered to remove together"),
            Reply::Remove => self.adjust(TaskCategory::Search, 0.0, 0.05, "asked to remove obstacle"),
            Reply::Rescue | Reply::RescueTogether => {
                self.adjust(TaskCategory::Rescue, 0.12, 0.12, "offered to rescue together");
            }
            Reply::Continue => self.adjust_all(0.0, -0.1, "chose to continue"),
        }
    }

    /// Apply confirmed-info events in order.
    pub fn apply_events(&mut self, events: &[ConfirmedInfoEvent]) {
        if self.frozen {
            return;
        }
        for event in events {
            let (task, competence, willingness) = match event.kind {
                ConfirmedInfoKind::Found => (TaskCategory::Rescue, 0.1, 0.05),
                ConfirmedInfoKind::NotFound => (TaskCategory::Rescue, -0.15, 0.0),
                ConfirmedInfoKind::WaitTimeout if event.is_about_obstacle() => (TaskCategory::Search, 0.0, -0.1),
                ConfirmedInfoKind::WaitTimeout => (TaskCategory::Rescue, 0.0, -0.1),
                ConfirmedInfoKind::FalseRescueClaim => (TaskCategory::Rescue, -0.2, -0.1),
                ConfirmedInfoKind::Delivered => (TaskCategory::Rescue, 0.2, 0.1),
                ConfirmedInfoKind::Removed => (TaskCategory::Search, 0.1, 0.1),
                ConfirmedInfoKind::Collected => (TaskCategory::Rescue, 0.15, 0.1),
            };
            debug!(kind = ?event.kind, subject = ?event.subject, room = ?event.room, "confirmed info");
            self.adjust(task, competence, willingness, "confirmed info event");
        }
    }

    /// Total silence decay at `now`.
    ///
    /// Within the last `window_ticks`, every gap between consecutive
    /// message ticks (and the trailing gap up to `now`) longer than
    /// `max_gap_ticks` accrues `rate_per_tick * gap`. Gaps are measured
    /// from the start of the window, or from the last re-seed if that is
    /// later, so the total never exceeds `rate_per_tick * window_ticks`.
    pub fn silence_decay(&self, now: u64) -> f64 {
        let window_start = now.saturating_sub(self.decay.window_ticks).max(self.origin);
        let mut previous = window_start;
        let mut total = 0.0;
        for &tick in &self.message_ticks {
            if tick <= previous || tick > now {
                continue;
            }
            total += self.gap_decay(tick.saturating_sub(previous));
            previous = tick;
        }
        total + self.gap_decay(now.saturating_sub(previous))
    }

    fn gap_decay(&self, gap: u64) -> f64 {
        if gap > self.decay.max_gap_ticks {
            self.decay.rate_per_tick.max(0.0) * ticks_to_f64(gap)
        } else {
            0.0
        }
    }

    /// Start a new baseline from the current effective beliefs.
    ///
    /// Used when a new search cycle begins: decay accrued so far becomes
    /// permanent and the message timeline starts over at `now`. Messages
    /// already scored stay scored.
    pub fn reseed(&mut self, now: u64) {
        if self.frozen {
            return;
        }
        self.base = self.beliefs(now);
        self.message_ticks.clear();
        self.previous = None;
        self.origin = now;
        info!(
            teammate = %self.base.teammate,
            search_competence = self.base.search.competence,
            rescue_competence = self.base.rescue.competence,
            "trust baseline re-seeded"
        );
    }

    fn adjust(&mut self, task: TaskCategory, competence: f64, willingness: f64, rule: &'static str) {
        if self.base.get_mut(task).adjust(competence, willingness) {
            debug!(%task, competence, willingness, rule, "trust adjusted");
        } else {
            warn!(%task, competence, willingness, rule, "rejected non-finite trust delta");
        }
    }

    fn adjust_all(&mut self, competence: f64, willingness: f64, rule: &'static str) {
        for task in TaskCategory::ALL {
            self.adjust(task, competence, willingness, rule);
        }
    }
}

/// A room counts as unsearched at `tick` when its log is empty or its
/// first search is not strictly earlier.
fn is_unsearched(knowledge: &KnowledgeStore, room: &RoomName, tick: u64) -> bool {
    knowledge
        .search_log(room)
        .first()
        .is_none_or(|first| first.tick >= tick)
}

fn decayed(value: f64, decay: f64, floor: f64) -> f64 {
    if value <= floor {
        value
    } else {
        (value - decay).max(floor)
    }
}

fn ticks_to_f64(ticks: u64) -> f64 {
    u32::try_from(ticks).map_or(f64::from(u32::MAX), f64::from)
}
