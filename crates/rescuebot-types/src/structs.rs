//! Core value types: chat messages, trust beliefs and confirmed events.

use serde::{Deserialize, Serialize};

use crate::enums::{ConfirmedInfoKind, TaskCategory};
use crate::ids::{ObjectId, RoomName, TeammateId, VictimId};

/// Lower bound of every belief scalar.
pub const BELIEF_MIN: f64 = -1.0;

/// Upper bound of every belief scalar.
pub const BELIEF_MAX: f64 = 1.0;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A chat message received from (or sent by) a team member.
///
/// `ordinal` is the message's position in the full conversation, so the
/// pair `(content, ordinal)` identifies a message uniquely even when the
/// same text is sent twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Raw message text.
    pub content: String,
    /// Who sent it.
    pub sender: TeammateId,
    /// Tick at which the message was received.
    pub tick: u64,
    /// Position of the message in the conversation.
    pub ordinal: u64,
}

impl Message {
    /// Construct a message.
    pub fn new(content: impl Into<String>, sender: TeammateId, tick: u64, ordinal: u64) -> Self {
        Self {
            content: content.into(),
            sender,
            tick,
            ordinal,
        }
    }
}

// ---------------------------------------------------------------------------
// Trust
// ---------------------------------------------------------------------------

/// Competence and willingness of the human for one task category.
///
/// Both scalars always lie in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustBelief {
    /// How well the human performs the task.
    pub competence: f64,
    /// How readily the human cooperates on the task.
    pub willingness: f64,
}

impl TrustBelief {
    /// Create a belief, clamping both scalars into range. Non-finite
    /// values become `0.0`.
    pub const fn new(competence: f64, willingness: f64) -> Self {
        Self {
            competence: clamp_scalar(competence),
            willingness: clamp_scalar(willingness),
        }
    }

    /// Apply a delta to both scalars, clamping into `[-1, 1]`.
    ///
    /// Returns `false` and leaves the belief untouched when either delta is
    /// not finite.
    pub fn adjust(&mut self, competence: f64, willingness: f64) -> bool {
        if !competence.is_finite() || !willingness.is_finite() {
            return false;
        }
        self.competence = (self.competence + competence).clamp(BELIEF_MIN, BELIEF_MAX);
        self.willingness = (self.willingness + willingness).clamp(BELIEF_MIN, BELIEF_MAX);
        true
    }

    /// Whether both scalars are finite and within range.
    pub fn is_valid(&self) -> bool {
        in_range(self.competence) && in_range(self.willingness)
    }
}

impl Default for TrustBelief {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

const fn clamp_scalar(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(BELIEF_MIN, BELIEF_MAX)
    }
}

fn in_range(value: f64) -> bool {
    value.is_finite() && (BELIEF_MIN..=BELIEF_MAX).contains(&value)
}

/// The full belief set about one teammate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefSet {
    /// Teammate the beliefs are about.
    pub teammate: TeammateId,
    /// Belief for the search task.
    pub search: TrustBelief,
    /// Belief for the rescue task.
    pub rescue: TrustBelief,
}

impl BeliefSet {
    /// Both tasks initialised to the same belief.
    pub const fn uniform(teammate: TeammateId, belief: TrustBelief) -> Self {
        Self {
            teammate,
            search: belief,
            rescue: belief,
        }
    }

    /// Belief for a task.
    pub const fn get(&self, task: TaskCategory) -> TrustBelief {
        match task {
            TaskCategory::Search => self.search,
            TaskCategory::Rescue => self.rescue,
        }
    }

    /// Mutable belief for a task.
    pub const fn get_mut(&mut self, task: TaskCategory) -> &mut TrustBelief {
        match task {
            TaskCategory::Search => &mut self.search,
            TaskCategory::Rescue => &mut self.rescue,
        }
    }

    /// Mean competence across both tasks.
    pub fn mean_competence(&self) -> f64 {
        (self.search.competence + self.rescue.competence) / 2.0
    }

    /// One persistence row per task.
    pub fn to_records(&self) -> Vec<BeliefRecord> {
        TaskCategory::ALL
            .iter()
            .map(|&task| {
                let belief = self.get(task);
                BeliefRecord {
                    teammate: self.teammate.clone(),
                    task: task.as_str().to_owned(),
                    competence: belief.competence,
                    willingness: belief.willingness,
                }
            })
            .collect()
    }

    /// Rebuild a belief set from persisted rows.
    ///
    /// Rows for other teammates, unknown task labels and out-of-range or
    /// non-finite values are ignored; tasks without a usable row take
    /// `default`. Later rows for the same task win.
    pub fn from_records(teammate: TeammateId, records: &[BeliefRecord], default: TrustBelief) -> Self {
        let mut set = Self::uniform(teammate, default);
        for record in records {
            if record.teammate != set.teammate {
                continue;
            }
            let Some(task) = TaskCategory::parse(&record.task) else {
                continue;
            };
            let belief = TrustBelief {
                competence: record.competence,
                willingness: record.willingness,
            };
            if belief.is_valid() {
                *set.get_mut(task) = belief;
            }
        }
        set
    }
}

/// A single persisted belief row.
///
/// `task` is kept as raw text so rows written by other tools with unknown
/// labels still deserialize and can be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefRecord {
    /// Teammate the row is about.
    pub teammate: TeammateId,
    /// Task label (`search` or `rescue`).
    pub task: String,
    /// Competence scalar.
    pub competence: f64,
    /// Willingness scalar.
    pub willingness: f64,
}

// ---------------------------------------------------------------------------
// Confirmed information
// ---------------------------------------------------------------------------

/// What a confirmed-info event is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EventSubject {
    /// A victim, by descriptor.
    Victim(VictimId),
    /// An obstacle, by world object id.
    Obstacle(ObjectId),
}

/// A ground-truth observation produced by the phase machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfirmedInfoEvent {
    /// What was confirmed.
    pub kind: ConfirmedInfoKind,
    /// The victim or obstacle concerned, if any.
    pub subject: Option<EventSubject>,
    /// Room the observation was made in, if known.
    pub room: Option<RoomName>,
    /// Tick of the observation.
    pub tick: u64,
}

impl ConfirmedInfoEvent {
    /// Event about a victim.
    pub const fn victim(kind: ConfirmedInfoKind, victim: VictimId, room: Option<RoomName>, tick: u64) -> Self {
        Self {
            kind,
            subject: Some(EventSubject::Victim(victim)),
            room,
            tick,
        }
    }

    /// Event about an obstacle.
    pub const fn obstacle(kind: ConfirmedInfoKind, obstacle: ObjectId, room: Option<RoomName>, tick: u64) -> Self {
        Self {
            kind,
            subject: Some(EventSubject::Obstacle(obstacle)),
            room,
            tick,
        }
    }

    /// Whether the subject is an obstacle.
    pub const fn is_about_obstacle(&self) -> bool {
        matches!(self.subject, Some(EventSubject::Obstacle(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn adjust_clamps_into_range() {
        let mut belief = TrustBelief::new(0.9, -0.9);
        assert!(belief.adjust(0.5, -0.5));
        assert!(approx(belief.competence, 1.0));
        assert!(approx(belief.willingness, -1.0));
    }

    #[test]
    fn adjust_rejects_non_finite() {
        let mut belief = TrustBelief::default();
        assert!(!belief.adjust(f64::NAN, 0.1));
        assert!(!belief.adjust(0.1, f64::INFINITY));
        assert!(approx(belief.competence, 0.5));
        assert!(approx(belief.willingness, 0.5));
    }

    #[test]
    fn records_roundtrip() {
        let mut set = BeliefSet::uniform(TeammateId::from("alice"), TrustBelief::default());
        set.search.adjust(0.05, 0.08);
        set.rescue.adjust(-0.3, 0.1);
        let rows = set.to_records();
        assert_eq!(rows.len(), 2);
        let back = BeliefSet::from_records(set.teammate.clone(), &rows, TrustBelief::new(0.0, 0.0));
        assert_eq!(back, set);
    }

    #[test]
    fn from_records_skips_bad_rows() {
        let teammate = TeammateId::from("bob");
        let rows = vec![
            BeliefRecord {
                teammate: teammate.clone(),
                task: "juggling".to_owned(),
                competence: 0.1,
                willingness: 0.1,
            },
            BeliefRecord {
                teammate: teammate.clone(),
                task: "search".to_owned(),
                competence: f64::NAN,
                willingness: 0.1,
            },
            BeliefRecord {
                teammate: TeammateId::from("someone else"),
                task: "rescue".to_owned(),
                competence: -0.7,
                willingness: -0.7,
            },
        ];
        let set = BeliefSet::from_records(teammate, &rows, TrustBelief::default());
        assert_eq!(set.search, TrustBelief::default());
        assert_eq!(set.rescue, TrustBelief::default());
    }
}
