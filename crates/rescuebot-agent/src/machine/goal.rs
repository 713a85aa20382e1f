//! Goal selection, travel to rooms and room sweeps.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use rescuebot_types::{
    Action, Actor, ConfirmedInfoKind, Coord, Distance, ObjectCategory, ObjectId, ObjectKind, ObstacleKind,
    RescueMode, RoomName, Severity, TaskCategory, VictimId,
};

use super::context::{Decision, Flow, Phase};
use super::{RescueAgent, door_target};
use crate::message::Reply;
use crate::navigation::Navigator;
use crate::world::WorldQuery;

impl<N: Navigator> RescueAgent<N> {
    pub(super) fn intro<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        if !self.ctx.intro_sent {
            self.ctx.intro_sent = true;
            self.say(
                "Hello! My name is RescueBot. Together we will search the areas and carry the victims \
                 to the drop zone. I will tell you where I am going and ask you when I need help.",
            );
        }
        if world.teammate_in_view() {
            Flow::block(Phase::Intro)
        } else {
            Flow::Goto(Phase::FindNextGoal)
        }
    }

    pub(super) fn find_next_goal<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        self.ctx.reset_goal();
        self.navigator.reset();

        let remaining: Vec<&VictimId> = world
            .drop_zones()
            .iter()
            .filter(|slot| !slot.delivered && !self.knowledge.is_collected(&slot.victim))
            .map(|slot| &slot.victim)
            .collect();
        if remaining.is_empty() {
            debug!("no victims left to deliver");
            return Flow::block(Phase::FindNextGoal);
        }

        let knowledge = &self.knowledge;
        let retry = remaining
            .iter()
            .find(|victim| knowledge.explored_is_empty() && knowledge.is_known(victim) && knowledge.is_deferred(victim));
        let pick = retry.or_else(|| {
            remaining
                .iter()
                .find(|victim| knowledge.is_known(victim) && !knowledge.is_deferred(victim))
        });
        let Some(victim) = pick.map(|victim| (*victim).clone()) else {
            return Flow::Goto(Phase::PickUnsearchedRoom);
        };
        let Some(record) = self.knowledge.victim(&victim).cloned() else {
            return Flow::Goto(Phase::PickUnsearchedRoom);
        };
        let Some(door) = door_target(world, &record.room) else {
            info!(%victim, room = %record.room, "victim's room has no door, retrying later");
            self.knowledge.defer(&victim);
            return Flow::Goto(Phase::PickUnsearchedRoom);
        };

        let mode = self.rescue_mode_for(&victim);
        let room = &record.room;
        let announcement = match mode {
            RescueMode::Together => format!(
                "Moving to {room} to pick up {victim}. Please come there as well to help me carry {victim} \
                 to the drop zone."
            ),
            RescueMode::Alone => format!("Moving to {room} to pick up {victim}."),
        };
        self.say(announcement);
        info!(%victim, room = %record.room, ?mode, "new goal");

        self.ctx.rescue_mode = mode;
        self.ctx.goal = Some(victim);
        self.ctx.door = Some(door);
        let next = if record.location.is_some() {
            Phase::PlanPathToVictim
        } else {
            Phase::PlanPathToRoom
        };
        Flow::act(Action::idle(self.config.mission.announce_idle_ticks), next)
    }

    /// Critical victims and victims queued for joint handling are always
    /// rescued together; mild ones together only when the human is trusted
    /// with rescues.
    pub(super) fn rescue_mode_for(&self, victim: &VictimId) -> RescueMode {
        let mission = &self.config.mission;
        let rescue = self.belief(TaskCategory::Rescue);
        let trusted = rescue.competence > mission.rescue_competence_threshold
            && rescue.willingness > mission.rescue_willingness_threshold;
        match victim.severity() {
            Some(Severity::Critical) => RescueMode::Together,
            _ if self.knowledge.is_joint(victim) => RescueMode::Together,
            Some(Severity::Mild) if trusted => RescueMode::Together,
            _ => RescueMode::Alone,
        }
    }

    pub(super) fn pick_unsearched_room<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let rooms = world.rooms();
        if rooms.is_empty() {
            debug!("no rooms in the world");
            return Flow::block(Phase::FindNextGoal);
        }
        let from = self.ctx.current_door.unwrap_or_else(|| world.agent_location());
        let nearest = rooms
            .iter()
            .filter(|room| !self.knowledge.is_explored(room) && !self.knowledge.is_skipped(room))
            .filter_map(|room| door_target(world, room))
            .min_by(|a, b| {
                squared_distance(a.location, from)
                    .cmp(&squared_distance(b.location, from))
                    .then_with(|| a.room.cmp(&b.room))
            });

        let Some(door) = nearest else {
            info!(tick = self.now, "every area searched, starting a new search cycle");
            self.knowledge.start_new_cycle();
            self.ctx.clear_decision();
            self.trust.reseed(self.now);
            self.say("Going to re-search all areas.");
            return Flow::Goto(Phase::FindNextGoal);
        };
        debug!(room = %door.room, "closest unsearched area");
        self.ctx.door = Some(door);
        Flow::Goto(Phase::PlanPathToRoom)
    }

    /// Whether the trip to the current room no longer serves a purpose.
    pub(super) fn should_abandon_room(&self) -> bool {
        let Some(door) = &self.ctx.door else {
            return true;
        };
        match &self.ctx.goal {
            Some(goal) if self.knowledge.is_collected(goal) => {
                debug!(%goal, "goal already collected");
                true
            }
            Some(goal) => match self.knowledge.victim(goal) {
                Some(record) if record.room != door.room => {
                    debug!(%goal, room = %record.room, "goal now reported elsewhere");
                    true
                }
                Some(_) => false,
                None => self.knowledge.is_explored(&door.room) && !self.ctx.remove_request,
            },
            None => self.knowledge.is_explored(&door.room) && !self.ctx.remove_request,
        }
    }

    pub(super) fn plan_path_to_room(&mut self) -> Flow {
        if self.should_abandon_room() {
            return Flow::Goto(Phase::FindNextGoal);
        }
        let Some(door) = self.ctx.door.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        self.navigator.reset();
        self.navigator.add_waypoints(&[door.doormat]);
        if self.ctx.goal.is_none() && !self.ctx.remove_request {
            self.say(format!("Moving to {} because it is the closest unsearched area.", door.room));
        }
        Flow::Goto(Phase::FollowPathToRoom)
    }

    pub(super) fn follow_path_to_room<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        if self.should_abandon_room() {
            return Flow::Goto(Phase::FindNextGoal);
        }
        let Some(door) = self.ctx.door.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };

        let here = world.agent_location();
        let doorways: HashSet<Coord> = world
            .find_by_kind(ObjectCategory::Door)
            .into_iter()
            .flat_map(|object| match &object.kind {
                ObjectKind::Door { doormat, .. } => vec![object.location, *doormat],
                _ => vec![object.location],
            })
            .collect();
        let stones = world.find_by_kind(ObjectCategory::Obstacle).into_iter().find(|object| {
            object.obstacle() == Some(ObstacleKind::Light)
                && object.location.chebyshev(here) <= 1
                && !doorways.contains(&object.location)
        });
        if let Some(stones) = stones {
            self.say(format!(
                "Reaching {} will take a bit longer because I found stones blocking my path.",
                door.room
            ));
            return Flow::act(
                Action::RemoveObstacle {
                    object_id: stones.id.clone(),
                },
                Phase::FollowPathToRoom,
            );
        }

        let flow = self.follow(world, Phase::FollowPathToRoom, Phase::RemoveObstacleIfNeeded);
        if flow == Flow::Goto(Phase::RemoveObstacleIfNeeded) {
            self.ctx.current_door = Some(door.location);
        }
        flow
    }

    pub(super) fn enter_room<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        if self.should_abandon_room() {
            return Flow::Goto(Phase::FindNextGoal);
        }
        let Some(door) = self.ctx.door.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        self.navigator.reset();
        self.navigator.add_waypoints(&[door.location]);
        self.follow(world, Phase::EnterRoom, Phase::PlanRoomSearchPath)
    }

    pub(super) fn plan_room_search_path<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let Some(room) = self.current_room() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        let route = serpentine(&world.room_tiles(&room));
        debug!(%room, waypoints = route.len(), "room sweep planned");
        self.navigator.reset();
        self.navigator.add_waypoints(&route);
        self.ctx.room_victims.clear();
        self.ctx.swept = false;
        Flow::Goto(Phase::FollowRoomSearchPath)
    }

    pub(super) fn follow_room_search_path<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let Some(room) = self.current_room() else {
            return Flow::Goto(Phase::FindNextGoal);
        };

        if let Some(flow) = self.record_room_victims(world, &room) {
            return flow;
        }

        if !self.ctx.swept {
            if let Some(direction) = self.navigator.next_move(world.agent_location()) {
                self.ctx.moving = true;
                return Flow::act(Action::Move { direction }, Phase::FollowRoomSearchPath);
            }
            self.ctx.moving = false;
            self.ctx.swept = true;

            if let Some(goal) = self.ctx.goal.clone() {
                let expected_here = self
                    .knowledge
                    .victim(&goal)
                    .is_some_and(|record| record.room == room && record.location.is_none());
                if expected_here && !self.ctx.room_victims.contains(&goal) {
                    self.say(format!(
                        "{goal} not present in {room} because I searched the whole area without finding {goal}."
                    ));
                    info!(%goal, %room, "reported victim not found");
                    self.confirm_victim(ConfirmedInfoKind::NotFound, &goal);
                    self.knowledge.confirm_absent(&goal);
                    self.knowledge.mark_explored(&room);
                    self.knowledge.log_search(&room, Actor::Agent, self.now);
                    return Flow::Goto(Phase::FindNextGoal);
                }
            }
            self.knowledge.mark_explored(&room);
            self.knowledge.log_search(&room, Actor::Agent, self.now);
        }

        self.resolve_victim_decision(&room)
    }

    /// Record every injured victim on the room's tiles. Returns a flow when
    /// a sighting ends the sweep early.
    fn record_room_victims<W: WorldQuery + ?Sized>(&mut self, world: &W, room: &RoomName) -> Option<Flow> {
        let tiles: HashSet<Coord> = world.room_tiles(room).into_iter().collect();
        let visible: BTreeMap<VictimId, (Coord, ObjectId)> = world
            .find_by_kind(ObjectCategory::Victim)
            .into_iter()
            .filter(|object| tiles.contains(&object.location))
            .filter_map(|object| {
                let victim = object.victim()?;
                victim
                    .is_injured()
                    .then(|| (victim.clone(), (object.location, object.id.clone())))
            })
            .collect();

        for (victim, (location, object_id)) in visible {
            if !self.ctx.room_victims.contains(&victim) {
                self.ctx.room_victims.push(victim.clone());
            }
            if self.knowledge.is_collected(&victim) {
                continue;
            }
            match self.knowledge.victim(&victim).map(|record| record.location.is_some()) {
                Some(true) => {
                    if self.knowledge.found_log(&victim).is_empty() {
                        self.knowledge.log_found(&victim, room, Actor::Agent, self.now);
                    }
                }
                Some(false) => {
                    self.knowledge.record_sighting(&victim, room, location, &object_id);
                    self.knowledge.log_found(&victim, room, Actor::Agent, self.now);
                    if self.ctx.goal.as_ref() == Some(&victim) {
                        self.say(format!(
                            "Found {victim} in {room} because you told me {victim} was located here."
                        ));
                        self.confirm_victim(ConfirmedInfoKind::Found, &victim);
                        self.knowledge.mark_explored(room);
                        return Some(Flow::Goto(Phase::FindNextGoal));
                    }
                }
                None => {
                    self.knowledge.record_sighting(&victim, room, location, &object_id);
                    self.knowledge.log_found(&victim, room, Actor::Agent, self.now);
                    self.ctx.recent_victim = Some(victim.clone());
                    if self.ctx.awaiting.is_none() {
                        self.ask_about_victim(&victim, room);
                    }
                }
            }
        }
        None
    }

    fn ask_about_victim(&mut self, victim: &VictimId, room: &RoomName) {
        let critical = victim.severity() == Some(Severity::Critical);
        if critical {
            self.say(format!(
                "Found {victim} in {room}. Please decide whether to \"Rescue\" or \"Continue\" searching."
            ));
        } else {
            self.say(format!(
                "Found {victim} in {room}. Please decide whether to \"Rescue together\", \"Rescue alone\", \
                 or \"Continue\" searching."
            ));
        }
        self.ctx.awaiting = Some(Decision::Victim(victim.clone()));
        self.ctx.reply = None;
        self.start_wait(TaskCategory::Rescue, critical);
    }

    /// Act on the answer (or the silence) about a victim found in the room.
    fn resolve_victim_decision(&mut self, room: &RoomName) -> Flow {
        let Some(Decision::Victim(victim)) = self.ctx.awaiting.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };

        match self.ctx.reply.take() {
            Some(reply) if reply.is_rescue() => {
                let mut mode = reply.requested_mode().unwrap_or(RescueMode::Together);
                if victim.severity() == Some(Severity::Critical) && mode == RescueMode::Alone {
                    info!(%victim, "critical victim cannot be carried alone, carrying together");
                    mode = RescueMode::Together;
                }
                self.ctx.clear_decision();
                self.ctx.goal = Some(victim.clone());
                self.ctx.rescue_mode = mode;
                let message = match mode {
                    RescueMode::Together if self.ctx.distance == Distance::Far => {
                        format!("Please come to {room} to carry {victim} together.")
                    }
                    RescueMode::Together => {
                        format!("Lets carry {victim} together! Please wait until I moved on top of {victim}.")
                    }
                    RescueMode::Alone => format!("Picking up {victim} in {room}."),
                };
                self.say(message);
                return Flow::Goto(Phase::FixOrderGrab);
            }
            Some(Reply::Continue) => {
                info!(%victim, "human chose to continue searching");
                self.knowledge.defer(&victim);
                self.ctx.clear_decision();
                return Flow::Goto(Phase::FindNextGoal);
            }
            Some(_) | None => {}
        }

        if !self.wait_is_over() {
            return Flow::block(Phase::FollowRoomSearchPath);
        }

        info!(%victim, "no answer in time");
        self.confirm_victim(ConfirmedInfoKind::WaitTimeout, &victim);
        self.ctx.clear_decision();
        if victim.severity() == Some(Severity::Critical) {
            self.say("Waiting is over. Continuing search.");
            self.knowledge.defer(&victim);
            Flow::block(Phase::FindNextGoal)
        } else {
            self.say(format!("Waiting is over. Rescuing {victim} alone."));
            self.ctx.goal = Some(victim);
            self.ctx.rescue_mode = RescueMode::Alone;
            Flow::Goto(Phase::FixOrderGrab)
        }
    }
}

fn squared_distance(a: Coord, b: Coord) -> u64 {
    let dx = u64::from(a.x.abs_diff(b.x));
    let dy = u64::from(a.y.abs_diff(b.y));
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}

/// Sweep waypoints over a room: column by column, alternating between the
/// top and bottom tile of each column.
pub(super) fn serpentine(tiles: &[Coord]) -> Vec<Coord> {
    let mut columns: BTreeMap<i32, (i32, i32)> = BTreeMap::new();
    for tile in tiles {
        columns
            .entry(tile.x)
            .and_modify(|(low, high)| {
                *low = (*low).min(tile.y);
                *high = (*high).max(tile.y);
            })
            .or_insert((tile.y, tile.y));
    }

    let mut route = Vec::new();
    for (column, (x, (low, high))) in columns.into_iter().enumerate() {
        let (first, second) = if column % 2 == 0 { (low, high) } else { (high, low) };
        route.push(Coord::new(x, first));
        if second != first {
            route.push(Coord::new(x, second));
        }
    }
    route
}
