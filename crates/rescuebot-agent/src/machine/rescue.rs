//! Picking up, carrying and delivering victims.

use tracing::{debug, info};

use rescuebot_types::{Action, ConfirmedInfoKind, ObjectCategory, ObjectId, RescueMode, Severity, TaskCategory, VictimId};

use super::context::{Flow, Phase};
use super::{RescueAgent, door_target};
use crate::navigation::Navigator;
use crate::world::WorldQuery;

impl<N: Navigator> RescueAgent<N> {
    pub(super) fn fix_order_grab(&mut self) -> Flow {
        let Some(goal) = self.ctx.goal.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        if goal.severity() == Some(Severity::Critical) && self.ctx.rescue_mode == RescueMode::Alone {
            info!(%goal, "critical victim cannot be carried alone, carrying together");
            self.ctx.rescue_mode = RescueMode::Together;
        }
        Flow::Goto(Phase::PlanPathToVictim)
    }

    pub(super) fn plan_path_to_victim(&mut self) -> Flow {
        let Some(goal) = self.ctx.goal.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        if self.knowledge.is_collected(&goal) {
            debug!(%goal, "goal already collected");
            return Flow::Goto(Phase::FindNextGoal);
        }
        let Some(location) = self.knowledge.victim(&goal).and_then(|record| record.location) else {
            return Flow::Goto(Phase::PlanPathToRoom);
        };
        self.navigator.reset();
        self.navigator.add_waypoints(&[location]);
        Flow::Goto(Phase::FollowPathToVictim)
    }

    pub(super) fn follow_path_to_victim<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let collected = self.ctx.goal.as_ref().is_none_or(|goal| self.knowledge.is_collected(goal));
        if collected {
            return Flow::Goto(Phase::FindNextGoal);
        }
        self.follow(world, Phase::FollowPathToVictim, Phase::TakeVictim)
    }

    /// The goal's world object, if it still lies where it was seen.
    fn victim_in_place<W: WorldQuery + ?Sized>(&self, world: &W, goal: &VictimId) -> Option<ObjectId> {
        let location = self.knowledge.victim(goal)?.location?;
        world
            .find_by_kind(ObjectCategory::Victim)
            .into_iter()
            .find(|object| object.victim() == Some(goal) && object.location == location)
            .map(|object| object.id.clone())
    }

    pub(super) fn take_victim<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let Some(goal) = self.ctx.goal.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        let in_place = self.victim_in_place(world, &goal);

        match (self.ctx.rescue_mode, in_place) {
            (RescueMode::Together, Some(_)) => {
                if self.ctx.wait.is_none() {
                    let critical = goal.severity() == Some(Severity::Critical);
                    self.start_wait(TaskCategory::Rescue, critical);
                }
                self.ctx.moving = false;
                Flow::Goto(Phase::WaitForHuman)
            }
            (RescueMode::Together, None) => self.lifted_together(&goal),
            (RescueMode::Alone, Some(object_id)) => {
                info!(%goal, "carrying victim alone");
                self.knowledge.mark_carried(&goal);
                self.ctx.carrying = true;
                Flow::act(
                    Action::CarryObject {
                        object_id,
                        partner: None,
                    },
                    Phase::FixOrderDrop,
                )
            }
            (RescueMode::Alone, None) => {
                info!(%goal, "victim no longer where it was seen");
                Flow::Goto(Phase::FindNextGoal)
            }
        }
    }

    fn lifted_together(&mut self, goal: &VictimId) -> Flow {
        info!(%goal, "victim lifted together");
        self.knowledge.mark_collected(goal);
        self.confirm_victim(ConfirmedInfoKind::Collected, goal);
        self.ctx.wait = None;
        Flow::Goto(Phase::WaitAtZone)
    }

    pub(super) fn wait_for_human<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let Some(goal) = self.ctx.goal.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        if self.victim_in_place(world, &goal).is_none() {
            return self.lifted_together(&goal);
        }

        if self.ctx.wait.is_none() {
            let critical = goal.severity() == Some(Severity::Critical);
            self.start_wait(TaskCategory::Rescue, critical);
        }
        if !self.wait_is_over() {
            let location = self.knowledge.victim(&goal).and_then(|record| record.location);
            let co_located = match (world.teammate(), location) {
                (Some(teammate), Some(location)) => {
                    teammate.location.chebyshev(location) <= self.config.mission.co_located_distance
                }
                _ => false,
            };
            if co_located {
                debug!(%goal, "human next to the victim, waiting for the lift");
            }
            return Flow::block(Phase::WaitForHuman);
        }

        info!(%goal, "human did not arrive in time");
        self.confirm_victim(ConfirmedInfoKind::WaitTimeout, &goal);
        self.ctx.wait = None;
        if goal.severity() == Some(Severity::Critical) {
            self.say("Waiting is over. Continuing search.");
            self.knowledge.defer(&goal);
            Flow::block(Phase::FindNextGoal)
        } else {
            self.say(format!("Waiting is over. Rescuing {goal} alone."));
            self.ctx.rescue_mode = RescueMode::Alone;
            Flow::Goto(Phase::TakeVictim)
        }
    }

    pub(super) fn wait_at_zone(&mut self) -> Flow {
        if self.ctx.joint_carry_seen {
            Flow::Goto(Phase::DropVictim)
        } else {
            debug!("no joint carry observed after the lift");
            Flow::Goto(Phase::FindNextGoal)
        }
    }

    pub(super) fn fix_order_drop<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let Some(goal) = self.ctx.goal.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        let slot = world
            .drop_zones()
            .iter()
            .find(|slot| slot.victim == goal)
            .map(|slot| slot.location);
        self.ctx.drop_target = Some(slot.unwrap_or_else(|| {
            info!(%goal, "no drop-zone slot for victim, dropping in place");
            world.agent_location()
        }));
        Flow::Goto(Phase::PlanPathToDroppoint)
    }

    pub(super) fn plan_path_to_droppoint(&mut self) -> Flow {
        let Some(target) = self.ctx.drop_target else {
            return Flow::Goto(Phase::FixOrderDrop);
        };
        self.navigator.reset();
        self.navigator.add_waypoints(&[target]);
        if self.ctx.rescue_mode == RescueMode::Alone {
            if let Some(goal) = &self.ctx.goal {
                let message = format!("Transporting {goal} to the drop zone.");
                self.say(message);
            }
        }
        Flow::Goto(Phase::FollowPathToDroppoint)
    }

    pub(super) fn follow_path_to_droppoint<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        self.follow(world, Phase::FollowPathToDroppoint, Phase::DropVictim)
    }

    pub(super) fn drop_victim<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let together = self.ctx.rescue_mode == RescueMode::Together;
        if let Some(goal) = self.ctx.goal.take() {
            if together {
                self.confirm_victim(ConfirmedInfoKind::Delivered, &goal);
            } else {
                self.say(format!("Delivered {goal} at the drop zone."));
            }
            info!(%goal, together, "victim delivered");
            self.knowledge.mark_delivered(&goal);
        }
        self.ctx.carrying = false;
        self.ctx.carrying_together = false;
        self.ctx.joint_carry_seen = false;

        let partner = together.then(|| self.teammate.clone());
        let action = Action::Drop { partner };

        let next = match self.ctx.promised_help.take() {
            Some(room) => match door_target(world, &room) {
                Some(door) => {
                    self.ctx.reset_goal();
                    self.ctx.door = Some(door);
                    self.ctx.remove_request = true;
                    self.say(format!("Moving to {room} to help you remove an obstacle."));
                    Phase::PlanPathToRoom
                }
                None => Phase::FindNextGoal,
            },
            None => Phase::FindNextGoal,
        };
        Flow::act(action, next)
    }
}
