//! The mission state machine.
//!
//! [`RescueAgent::tick`] is called once per simulation tick. It interprets
//! new teammate messages, revises trust, checks whether the human is
//! carrying a victim together with the agent, and then runs phases until
//! one of them ends the tick. Phases are grouped by concern:
//!
//! - `goal` -- choosing what to do next, travelling to rooms, sweeping them.
//! - `obstacle` -- obstacles blocking a door.
//! - `rescue` -- picking up, carrying and delivering victims.
//!
//! The number of phase transitions per tick is bounded by
//! `mission.max_phase_steps`; hitting the bound ends the tick without an
//! action.

mod context;
mod goal;
mod obstacle;
mod rescue;

pub use context::Phase;

use tracing::{debug, info, warn};

use rescuebot_types::{
    Action, BeliefRecord, BeliefSet, ConfirmedInfoEvent, ConfirmedInfoKind, Distance, Message, ObjectId,
    RescueMode, RoomName, Severity, TaskCategory, TeammateId, TrustBelief, VictimId,
};

use crate::belief_store::BeliefStore;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::knowledge::KnowledgeStore;
use crate::message::{ParsedMessage, Reply};
use crate::navigation::{Navigator, StraightLineNavigator};
use crate::trust::TrustModel;
use crate::wait_timer::{WaitWindow, wait_ticks};
use crate::world::{WorldQuery, room_entrance};

use self::context::{Decision, DoorTarget, Flow, MissionContext, Outbox};

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Action for the simulator, if any.
    pub action: Option<Action>,
    /// Chat messages to send to the human.
    pub outbox: Vec<String>,
    /// Effective trust beliefs after the tick.
    pub beliefs: BeliefSet,
    /// Ground-truth observations made this tick.
    pub events: Vec<ConfirmedInfoEvent>,
}

/// The RescueBot decision core for one human teammate.
#[derive(Debug)]
pub struct RescueAgent<N: Navigator = StraightLineNavigator> {
    config: AgentConfig,
    teammate: TeammateId,
    phase: Phase,
    knowledge: KnowledgeStore,
    trust: TrustModel,
    navigator: N,
    ctx: MissionContext,
    outbox: Outbox,
    events: Vec<ConfirmedInfoEvent>,
    now: u64,
}

impl<N: Navigator> RescueAgent<N> {
    /// Create an agent from persisted belief rows (empty for defaults).
    pub fn new(config: AgentConfig, teammate: TeammateId, navigator: N, records: &[BeliefRecord]) -> Self {
        let trust = TrustModel::new(teammate.clone(), records, &config);
        Self {
            config,
            teammate,
            phase: Phase::Intro,
            knowledge: KnowledgeStore::new(),
            trust,
            navigator,
            ctx: MissionContext::default(),
            outbox: Outbox::default(),
            events: Vec::new(),
            now: 0,
        }
    }

    /// Create an agent whose beliefs are loaded from `store`.
    pub fn with_store(
        config: AgentConfig,
        teammate: TeammateId,
        navigator: N,
        store: &dyn BeliefStore,
    ) -> Result<Self, AgentError> {
        let records = store.latest(&teammate)?;
        Ok(Self::new(config, teammate, navigator, &records))
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// What the agent knows about victims and rooms.
    pub const fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    /// Trust beliefs about the human.
    pub const fn trust(&self) -> &TrustModel {
        &self.trust
    }

    /// Carry mode of the current goal.
    pub const fn rescue_mode(&self) -> RescueMode {
        self.ctx.rescue_mode
    }

    /// The victim currently targeted, if any.
    pub const fn goal(&self) -> Option<&VictimId> {
        self.ctx.goal.as_ref()
    }

    /// The running wait for the human, if any.
    pub const fn pending_wait(&self) -> Option<WaitWindow> {
        self.ctx.wait
    }

    /// Effective beliefs as of the last tick.
    pub fn beliefs(&self) -> BeliefSet {
        self.trust.beliefs(self.now)
    }

    /// Persist the effective beliefs as of the last tick.
    pub fn persist(&self, store: &mut dyn BeliefStore) -> Result<(), AgentError> {
        self.trust.persist(store, self.now)
    }

    /// Run one tick.
    pub fn tick<W: WorldQuery + ?Sized>(&mut self, world: &W, messages: &[Message]) -> TickOutcome {
        self.now = world.tick();
        self.update_distance(world);

        let from_teammate: Vec<Message> = messages
            .iter()
            .filter(|message| {
                let ours = message.sender == self.teammate;
                if !ours {
                    debug!(sender = %message.sender, "ignoring message from unknown sender");
                }
                ours
            })
            .cloned()
            .collect();
        let condition = self.trust.condition(self.now);
        let fresh = self.knowledge.ingest(&from_teammate, condition);
        for interpreted in &fresh {
            self.handle_message(world, &interpreted.parsed);
        }
        for interpreted in &fresh {
            self.trust.score_message(&interpreted.message, &self.knowledge);
        }

        let action = if self.joint_carry_in_progress(world) {
            None
        } else {
            self.run_phases(world)
        };

        let events = std::mem::take(&mut self.events);
        self.trust.apply_events(&events);
        TickOutcome {
            action,
            outbox: self.outbox.drain(),
            beliefs: self.trust.beliefs(self.now),
            events,
        }
    }

    fn run_phases<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Option<Action> {
        for _ in 0..self.config.mission.max_phase_steps {
            match self.step(world) {
                Flow::Goto(next) => {
                    debug!(from = ?self.phase, to = ?next, "phase transition");
                    self.phase = next;
                }
                Flow::Yield { action, next } => {
                    self.phase = next;
                    return action;
                }
            }
        }
        warn!(phase = ?self.phase, tick = self.now, "phase step bound reached, no action this tick");
        None
    }

    fn step<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        match self.phase {
            Phase::Intro => self.intro(world),
            Phase::FindNextGoal => self.find_next_goal(world),
            Phase::PickUnsearchedRoom => self.pick_unsearched_room(world),
            Phase::PlanPathToRoom => self.plan_path_to_room(),
            Phase::FollowPathToRoom => self.follow_path_to_room(world),
            Phase::RemoveObstacleIfNeeded => self.remove_obstacle_if_needed(world),
            Phase::EnterRoom => self.enter_room(world),
            Phase::PlanRoomSearchPath => self.plan_room_search_path(world),
            Phase::FollowRoomSearchPath => self.follow_room_search_path(world),
            Phase::PlanPathToVictim => self.plan_path_to_victim(),
            Phase::FollowPathToVictim => self.follow_path_to_victim(world),
            Phase::FixOrderGrab => self.fix_order_grab(),
            Phase::TakeVictim => self.take_victim(world),
            Phase::WaitForHuman => self.wait_for_human(world),
            Phase::WaitAtZone => self.wait_at_zone(),
            Phase::FixOrderDrop => self.fix_order_drop(world),
            Phase::PlanPathToDroppoint => self.plan_path_to_droppoint(),
            Phase::FollowPathToDroppoint => self.follow_path_to_droppoint(world),
            Phase::DropVictim => self.drop_victim(world),
        }
    }

    // -----------------------------------------------------------------------
    // Per-tick bookkeeping
    // -----------------------------------------------------------------------

    /// In view means close. Otherwise compare which half of the map the
    /// agent's last door and the human's last mentioned area are in; with
    /// either unknown the previous estimate stands.
    fn update_distance<W: WorldQuery + ?Sized>(&mut self, world: &W) {
        if world.teammate_in_view() {
            self.ctx.distance = Distance::Close;
            return;
        }
        let agent_area = self.ctx.door.as_ref().and_then(|door| door.room.index());
        if let (Some(agent_area), Some(teammate_area)) = (agent_area, self.knowledge.teammate_area()) {
            let split = self.config.mission.room_split;
            self.ctx.distance = if (agent_area <= split) == (teammate_area <= split) {
                Distance::Close
            } else {
                Distance::Far
            };
        }
    }

    fn handle_message<W: WorldQuery + ?Sized>(&mut self, world: &W, parsed: &ParsedMessage) {
        match parsed {
            ParsedMessage::Reply(reply) => self.handle_reply(*reply),
            ParsedMessage::RemoveRequest { room } => self.answer_remove_request(world, room),
            ParsedMessage::Search { .. }
            | ParsedMessage::Found { .. }
            | ParsedMessage::Collect { .. }
            | ParsedMessage::Unrecognized => {}
        }
    }

    fn handle_reply(&mut self, reply: Reply) {
        match &self.ctx.awaiting {
            Some(decision) if decision.accepts(reply) => {
                debug!(?reply, "reply accepted");
                self.ctx.reply = Some(reply);
            }
            Some(Decision::Obstacle { .. }) | None if reply.is_rescue() => {
                info!(?reply, "rescue reply with no victim decision pending");
                self.events.push(ConfirmedInfoEvent {
                    kind: ConfirmedInfoKind::FalseRescueClaim,
                    subject: None,
                    room: None,
                    tick: self.now,
                });
            }
            _ => debug!(?reply, "reply does not answer a pending question, ignored"),
        }
    }

    fn answer_remove_request<W: WorldQuery + ?Sized>(&mut self, world: &W, room: &RoomName) {
        if self.ctx.carrying || self.ctx.carrying_together {
            let victim = self.ctx.goal.as_ref().map_or_else(|| "the victim".to_owned(), ToString::to_string);
            self.say(format!("Will come to {room} after dropping {victim}."));
            self.ctx.promised_help = Some(room.clone());
            return;
        }
        let Some(door) = door_target(world, room) else {
            warn!(%room, "removal help requested for a room without a door");
            return;
        };
        if self.ctx.wait.is_some() {
            if let Some(victim) = self.ctx.recent_victim.clone() {
                self.knowledge.defer(&victim);
            }
        }
        self.ctx.reset_goal();
        self.ctx.door = Some(door);
        self.ctx.remove_request = true;
        self.navigator.reset();
        self.say(format!("Moving to {room} to help you remove an obstacle."));
        info!(%room, "answering removal request");
        self.phase = Phase::PlanPathToRoom;
    }

    /// The human carries a victim together with the agent: a critical one,
    /// or a mild one while the agent chose a joint rescue and is not
    /// walking somewhere else.
    fn joint_carry_in_progress<W: WorldQuery + ?Sized>(&mut self, world: &W) -> bool {
        let Some(victim) = world.teammate().and_then(|teammate| teammate.carrying.clone()) else {
            self.ctx.carrying_together = false;
            return false;
        };
        let joint = match victim.severity() {
            Some(Severity::Critical) => true,
            Some(Severity::Mild) => self.ctx.rescue_mode == RescueMode::Together && !self.ctx.moving,
            None => false,
        };
        if !joint {
            self.ctx.carrying_together = false;
            return false;
        }
        if !self.ctx.carrying_together {
            info!(%victim, "carrying victim together with the human");
        }
        self.knowledge.mark_collected(&victim);
        self.ctx.carrying_together = true;
        self.ctx.joint_carry_seen = true;
        self.ctx.wait = None;
        true
    }

    // -----------------------------------------------------------------------
    // Helpers shared by the phases
    // -----------------------------------------------------------------------

    fn say(&mut self, text: impl Into<String>) {
        self.outbox.send(text);
    }

    fn belief(&self, task: TaskCategory) -> TrustBelief {
        self.trust.beliefs(self.now).get(task)
    }

    fn start_wait(&mut self, task: TaskCategory, joint: bool) {
        let ticks = wait_ticks(self.ctx.distance, &self.belief(task), joint, &self.config.wait);
        debug!(%task, joint, ticks, distance = ?self.ctx.distance, "waiting for the human");
        self.ctx.wait = Some(WaitWindow::start(self.now, ticks));
    }

    fn wait_is_over(&self) -> bool {
        self.ctx.wait.is_some_and(|wait| wait.is_over(self.now))
    }

    fn current_room(&self) -> Option<RoomName> {
        self.ctx.door.as_ref().map(|door| door.room.clone())
    }

    fn confirm_victim(&mut self, kind: ConfirmedInfoKind, victim: &VictimId) {
        let room = self.current_room();
        self.events
            .push(ConfirmedInfoEvent::victim(kind, victim.clone(), room, self.now));
    }

    fn confirm_obstacle(&mut self, kind: ConfirmedInfoKind, object_id: &ObjectId) {
        let room = self.current_room();
        self.events
            .push(ConfirmedInfoEvent::obstacle(kind, object_id.clone(), room, self.now));
    }

    /// Take one step along the navigator's route, or go to `arrived`.
    fn follow<W: WorldQuery + ?Sized>(&mut self, world: &W, current: Phase, arrived: Phase) -> Flow {
        if let Some(direction) = self.navigator.next_move(world.agent_location()) {
            self.ctx.moving = true;
            Flow::act(Action::Move { direction }, current)
        } else {
            self.ctx.moving = false;
            Flow::Goto(arrived)
        }
    }
}

fn door_target<W: WorldQuery + ?Sized>(world: &W, room: &RoomName) -> Option<DoorTarget> {
    room_entrance(world, room).map(|(location, doormat)| DoorTarget {
        room: room.clone(),
        location,
        doormat,
    })
}
