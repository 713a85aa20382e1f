//! Obstacles blocking the door of the target room.
//!
//! Rocks need both team members, trees only the agent, and stones either.
//! The human is asked first; silence is treated as permission to act
//! alone where that is physically possible.

use tracing::{debug, info};

use rescuebot_types::{Action, ConfirmedInfoKind, ObjectCategory, ObjectId, ObstacleKind, TaskCategory};

use super::RescueAgent;
use super::context::{Decision, Flow, Phase};
use crate::message::Reply;
use crate::navigation::Navigator;
use crate::world::WorldQuery;

impl<N: Navigator> RescueAgent<N> {
    pub(super) fn remove_obstacle_if_needed<W: WorldQuery + ?Sized>(&mut self, world: &W) -> Flow {
        let Some(door) = self.ctx.door.clone() else {
            return Flow::Goto(Phase::FindNextGoal);
        };
        let room = door.room;

        let blocking = world
            .find_by_kind(ObjectCategory::Obstacle)
            .into_iter()
            .filter_map(|object| object.obstacle().map(|kind| (object, kind)))
            .filter(|(object, _)| object.location.chebyshev(door.location) <= 1)
            .min_by_key(|(object, _)| object.location.chebyshev(door.location))
            .map(|(object, kind)| (object.id.clone(), kind));

        let Some((object_id, kind)) = blocking else {
            if let Some(removed) = self.ctx.joint_obstacle.take() {
                info!(obstacle = %removed, %room, "obstacle removed together");
                self.confirm_obstacle(ConfirmedInfoKind::Removed, &removed);
            }
            self.ctx.removing = None;
            self.ctx.clear_decision();
            return Flow::Goto(Phase::EnterRoom);
        };
        let label = kind.label();

        if self.ctx.removing.as_ref() == Some(&object_id) {
            return Flow::act(Action::RemoveObstacle { object_id }, Phase::RemoveObstacleIfNeeded);
        }

        if self.ctx.joint_obstacle.as_ref() == Some(&object_id) {
            if world.teammate_in_view() {
                self.say(format!("Lets remove {label} blocking {room}!"));
                return Flow::act(Action::idle(self.config.wait.min_ticks), Phase::RemoveObstacleIfNeeded);
            }
            if self.wait_is_over() {
                info!(obstacle = %object_id, %room, "human did not come to remove the obstacle");
                self.confirm_obstacle(ConfirmedInfoKind::WaitTimeout, &object_id);
                if kind == ObstacleKind::Heavy {
                    return self.give_up_on_room();
                }
                self.ctx.joint_obstacle = None;
                self.say(format!("Removing {label} blocking {room} because waiting took too long."));
                return self.remove_alone(object_id);
            }
            return Flow::block(Phase::RemoveObstacleIfNeeded);
        }

        if self.ctx.awaiting.is_none() {
            if self.ctx.remove_request {
                // The human asked for this removal; no need to ask back.
                let reply = if kind == ObstacleKind::Light {
                    Reply::RemoveTogether
                } else {
                    Reply::Remove
                };
                self.ctx.awaiting = Some(Decision::Obstacle {
                    object_id: object_id.clone(),
                    kind,
                });
                self.ctx.reply = Some(reply);
            } else {
                let options = match kind {
                    ObstacleKind::Light => "\"Remove together\", \"Remove alone\", or \"Continue\"",
                    ObstacleKind::Medium | ObstacleKind::Heavy => "\"Remove\" or \"Continue\"",
                };
                self.say(format!(
                    "Found {label} blocking {room}. Please decide whether to {options} searching."
                ));
                self.ctx.awaiting = Some(Decision::Obstacle {
                    object_id: object_id.clone(),
                    kind,
                });
                self.start_wait(TaskCategory::Search, kind == ObstacleKind::Heavy);
                return Flow::block(Phase::RemoveObstacleIfNeeded);
            }
        }

        match (kind, self.ctx.reply.take()) {
            (_, Some(Reply::Continue)) => {
                info!(%room, obstacle = label, "human chose to continue, skipping area");
                self.give_up_on_room()
            }
            (ObstacleKind::Heavy, Some(Reply::Remove)) | (ObstacleKind::Light, Some(Reply::RemoveTogether)) => {
                self.say(format!("Please come to {room} to remove {label}."));
                self.ctx.clear_decision();
                self.ctx.joint_obstacle = Some(object_id);
                self.start_wait(TaskCategory::Search, true);
                Flow::block(Phase::RemoveObstacleIfNeeded)
            }
            (ObstacleKind::Medium, Some(Reply::Remove)) => {
                self.say(format!("Removing {label} blocking {room} because you asked me to."));
                self.remove_alone(object_id)
            }
            (ObstacleKind::Light, Some(Reply::RemoveAlone)) => {
                self.say(format!("Removing {label} blocking {room}."));
                self.remove_alone(object_id)
            }
            (_, reply) => {
                if let Some(reply) = reply {
                    debug!(?reply, obstacle = label, "reply does not apply to this obstacle");
                }
                if !self.wait_is_over() {
                    return Flow::block(Phase::RemoveObstacleIfNeeded);
                }
                info!(obstacle = %object_id, %room, "no answer in time");
                self.confirm_obstacle(ConfirmedInfoKind::WaitTimeout, &object_id);
                if kind == ObstacleKind::Heavy {
                    return self.give_up_on_room();
                }
                self.say(format!("Removing {label} blocking {room} because waiting took too long."));
                self.remove_alone(object_id)
            }
        }
    }

    fn remove_alone(&mut self, object_id: ObjectId) -> Flow {
        self.ctx.clear_decision();
        self.ctx.removing = Some(object_id.clone());
        Flow::act(Action::RemoveObstacle { object_id }, Phase::RemoveObstacleIfNeeded)
    }

    /// Skip the current room for the rest of the search cycle.
    fn give_up_on_room(&mut self) -> Flow {
        if let Some(room) = self.current_room() {
            self.knowledge.skip_room(&room);
        }
        self.ctx.clear_decision();
        self.ctx.joint_obstacle = None;
        Flow::Goto(Phase::FindNextGoal)
    }
}
