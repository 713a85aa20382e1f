//! End-to-end mission scenarios driven through [`RescueAgent::tick`].
//!
//! A tiny simulator applies the agent's actions to a hand-built snapshot:
//! moves change the agent's tile, carries and removals take the object
//! out of the world. Everything else about the world is scripted per test.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rescuebot_agent::{AgentConfig, JsonlBeliefStore, Phase, RescueAgent, StraightLineNavigator, TickOutcome};
use rescuebot_types::{
    Action, ConfirmedInfoKind, Coord, DropZoneSlot, EventSubject, Message, ObjectId, ObjectKind, ObstacleKind,
    RescueMode, RoomName, TeammateId, TeammateView, VictimId, WorldObject, WorldSnapshot,
};

const HUMAN: &str = "human";

fn object(id: &str, x: i32, y: i32, kind: ObjectKind) -> WorldObject {
    WorldObject {
        id: ObjectId::from(id),
        location: Coord::new(x, y),
        kind,
    }
}

fn door(index: u32, at: (i32, i32), doormat: (i32, i32)) -> WorldObject {
    object(
        &format!("door_{index}"),
        at.0,
        at.1,
        ObjectKind::Door {
            room: RoomName::from_index(index),
            doormat: Coord::new(doormat.0, doormat.1),
        },
    )
}

fn tile(index: u32, x: i32, y: i32) -> WorldObject {
    object(
        &format!("tile_{index}_{x}_{y}"),
        x,
        y,
        ObjectKind::AreaTile {
            room: RoomName::from_index(index),
        },
    )
}

fn victim(name: &str, x: i32, y: i32) -> WorldObject {
    object(
        &format!("victim_{x}_{y}"),
        x,
        y,
        ObjectKind::Victim {
            descriptor: VictimId::from(name),
        },
    )
}

fn msg(content: &str, tick: u64, ordinal: u64) -> Message {
    Message::new(content, TeammateId::from(HUMAN), tick, ordinal)
}

fn agent() -> RescueAgent {
    RescueAgent::new(
        AgentConfig::default(),
        TeammateId::from(HUMAN),
        StraightLineNavigator::new(),
        &[],
    )
}

/// Area 1 behind a door at (2, 2), entered from (2, 3), with tiles (2, 1)
/// and (3, 1). The agent starts on the doormat. Area 2 is far to the east.
struct Sim {
    world: WorldSnapshot,
}

impl Sim {
    fn new(victim_name: &str) -> Self {
        let mut world = WorldSnapshot::empty(0, Coord::new(2, 3));
        world.objects = vec![
            door(1, (2, 2), (2, 3)),
            tile(1, 2, 1),
            tile(1, 3, 1),
            door(2, (10, 2), (10, 3)),
            tile(2, 10, 1),
            victim(victim_name, 3, 1),
        ];
        world.drop_zones = vec![DropZoneSlot {
            victim: VictimId::from(victim_name),
            location: Coord::new(0, 5),
            delivered: false,
        }];
        Self { world }
    }

    fn empty() -> Self {
        Self {
            world: WorldSnapshot::empty(0, Coord::new(0, 0)),
        }
    }

    fn remove(&mut self, id: &ObjectId) {
        self.world.objects.retain(|object| &object.id != id);
    }

    fn step(&mut self, agent: &mut RescueAgent, tick: u64, messages: &[Message]) -> TickOutcome {
        self.world.tick = tick;
        let outcome = agent.tick(&self.world, messages);
        match &outcome.action {
            Some(Action::Move { direction }) => {
                self.world.agent_location = self.world.agent_location.step(*direction);
            }
            Some(Action::CarryObject { object_id, .. } | Action::RemoveObstacle { object_id }) => {
                let id = object_id.clone();
                self.remove(&id);
            }
            Some(Action::Drop { .. } | Action::Idle { .. }) | None => {}
        }
        outcome
    }
}

fn has_event(outcome: &TickOutcome, kind: ConfirmedInfoKind) -> bool {
    outcome.events.iter().any(|event| event.kind == kind)
}

#[test]
fn first_search_report_raises_search_belief() {
    let mut sim = Sim::empty();
    let mut agent = agent();
    let outcome = sim.step(&mut agent, 10, &[msg("Search: area 3", 10, 0)]);
    let search = outcome.beliefs.search;
    assert!((search.competence - 0.55).abs() < 1e-9);
    assert!((search.willingness - 0.58).abs() < 1e-9);
    assert_eq!(outcome.beliefs.rescue, agent.trust().base().rescue);
}

#[test]
fn repeated_message_is_scored_once() {
    let mut sim = Sim::empty();
    let mut agent = agent();
    let once = sim.step(&mut agent, 10, &[msg("Rescue together", 10, 3)]);
    let twice = sim.step(&mut agent, 11, &[msg("Rescue together", 10, 3)]);
    assert_eq!(once.beliefs, twice.beliefs);
}

#[test]
fn rescue_reply_without_question_is_a_false_claim() {
    let mut sim = Sim::empty();
    let mut agent = agent();
    let outcome = sim.step(&mut agent, 5, &[msg("Rescue", 5, 0)]);
    assert!(has_event(&outcome, ConfirmedInfoKind::FalseRescueClaim));
    // +0.12/+0.12 for the offer, then -0.2/-0.1 for the false claim.
    assert!((outcome.beliefs.rescue.competence - 0.42).abs() < 1e-9);
    assert!((outcome.beliefs.rescue.willingness - 0.52).abs() < 1e-9);
}

#[test]
fn mild_victim_without_answer_is_rescued_alone() {
    let cat = VictimId::from("mildly injured cat");
    let mut sim = Sim::new(cat.as_str());
    let mut agent = agent();

    let mut timed_out = false;
    let mut carried = None;
    for tick in 0..40 {
        let outcome = sim.step(&mut agent, tick, &[]);
        if has_event(&outcome, ConfirmedInfoKind::WaitTimeout) {
            timed_out = true;
        }
        if let Some(Action::CarryObject { partner, .. }) = &outcome.action {
            carried = Some((tick, partner.clone(), agent.rescue_mode()));
            break;
        }
    }
    assert!(timed_out, "the wait for an answer never ran out");
    let (carried_at, partner, mode) = carried.unwrap();
    assert_eq!(partner, None);
    assert_eq!(mode, RescueMode::Alone);

    let mut delivered = false;
    for tick in carried_at + 1..carried_at + 40 {
        let outcome = sim.step(&mut agent, tick, &[]);
        if outcome.action == Some(Action::Drop { partner: None }) {
            assert!(
                outcome
                    .outbox
                    .iter()
                    .any(|line| line == "Delivered mildly injured cat at the drop zone.")
            );
            delivered = true;
            break;
        }
    }
    assert!(delivered);
    assert_eq!(sim.world.agent_location, Coord::new(0, 5));
    assert!(!agent.knowledge().is_known(&cat));
}

#[test]
fn critical_victim_timeout_defers_and_never_carries_alone() {
    let girl = VictimId::from("critically injured girl");
    let mut sim = Sim::new(girl.as_str());
    let mut agent = agent();

    let mut timeout_tick = None;
    for tick in 0..60 {
        let outcome = sim.step(&mut agent, tick, &[]);
        if has_event(&outcome, ConfirmedInfoKind::WaitTimeout) {
            assert_eq!(outcome.action, None);
            assert!(
                outcome
                    .outbox
                    .iter()
                    .any(|line| line == "Waiting is over. Continuing search.")
            );
            timeout_tick = Some(tick);
            break;
        }
    }
    let timeout_tick = timeout_tick.unwrap();
    assert_eq!(agent.phase(), Phase::FindNextGoal);
    assert!(agent.knowledge().is_deferred(&girl));

    for tick in timeout_tick + 1..timeout_tick + 120 {
        let outcome = sim.step(&mut agent, tick, &[]);
        assert!(
            !matches!(outcome.action, Some(Action::CarryObject { partner: None, .. })),
            "critical victim picked up alone at tick {tick}"
        );
    }
    // Retried in a later search cycle, always as a joint rescue.
    assert_eq!(agent.rescue_mode(), RescueMode::Together);
}

#[test]
fn joint_rescue_is_delivered_together() {
    let cat = VictimId::from("mildly injured cat");
    let mut sim = Sim::new(cat.as_str());
    let mut agent = agent();

    for tick in 0..5 {
        sim.step(&mut agent, tick, &[]);
    }
    let outcome = sim.step(&mut agent, 5, &[msg("Rescue together", 5, 0)]);
    assert!(
        outcome
            .outbox
            .iter()
            .any(|line| line.starts_with("Lets carry mildly injured cat together!"))
    );
    assert_eq!(agent.phase(), Phase::WaitForHuman);
    assert_eq!(agent.rescue_mode(), RescueMode::Together);

    // The human arrives next to the victim.
    sim.world.teammate = Some(TeammateView {
        location: Coord::new(3, 2),
        carrying: None,
    });
    assert_eq!(sim.step(&mut agent, 6, &[]).action, None);
    assert_eq!(agent.phase(), Phase::WaitForHuman);

    // Joint carry in progress: the agent stays passive.
    sim.world.teammate = Some(TeammateView {
        location: Coord::new(3, 2),
        carrying: Some(cat.clone()),
    });
    sim.remove(&ObjectId::from("victim_3_1"));
    assert_eq!(sim.step(&mut agent, 7, &[]).action, None);
    assert!(agent.knowledge().is_collected(&cat));

    // Carry finished at the drop zone.
    sim.world.teammate = Some(TeammateView {
        location: Coord::new(0, 5),
        carrying: None,
    });
    let outcome = sim.step(&mut agent, 8, &[]);
    assert!(has_event(&outcome, ConfirmedInfoKind::Collected));
    assert!(has_event(&outcome, ConfirmedInfoKind::Delivered));
    assert_eq!(
        outcome.action,
        Some(Action::Drop {
            partner: Some(TeammateId::from(HUMAN))
        })
    );
}

#[test]
fn continue_reply_defers_victim() {
    let cat = VictimId::from("mildly injured cat");
    let mut sim = Sim::new(cat.as_str());
    let mut agent = agent();
    for tick in 0..5 {
        sim.step(&mut agent, tick, &[]);
    }
    sim.step(&mut agent, 5, &[msg("Continue", 5, 0)]);
    assert!(agent.knowledge().is_deferred(&cat));
    assert!(agent.pending_wait().is_none());
}

#[test]
fn heavy_obstacle_timeout_skips_the_area() {
    let mut sim = Sim::new("mildly injured cat");
    sim.world.objects.push(object(
        "rock_1",
        2,
        2,
        ObjectKind::Obstacle {
            obstacle: ObstacleKind::Heavy,
        },
    ));
    let mut agent = agent();

    let first = sim.step(&mut agent, 0, &[]);
    assert!(
        first
            .outbox
            .iter()
            .any(|line| line == "Found rock blocking area 1. Please decide whether to \"Remove\" or \"Continue\" searching.")
    );
    assert_eq!(agent.phase(), Phase::RemoveObstacleIfNeeded);

    let mut timed_out = None;
    for tick in 1..40 {
        let outcome = sim.step(&mut agent, tick, &[]);
        if let Some(event) = outcome
            .events
            .iter()
            .find(|event| event.kind == ConfirmedInfoKind::WaitTimeout)
        {
            assert_eq!(event.subject, Some(EventSubject::Obstacle(ObjectId::from("rock_1"))));
            timed_out = Some(outcome);
            break;
        }
    }
    let outcome = timed_out.unwrap();
    assert!(agent.knowledge().is_skipped(&RoomName::from_index(1)));
    // Off to the other area instead.
    assert!(matches!(outcome.action, Some(Action::Move { .. })));
    assert!(
        outcome
            .outbox
            .iter()
            .any(|line| line == "Moving to area 2 because it is the closest unsearched area.")
    );
}

#[test]
fn heavy_obstacle_removed_together() {
    let mut sim = Sim::new("mildly injured cat");
    sim.world.objects.push(object(
        "rock_1",
        2,
        2,
        ObjectKind::Obstacle {
            obstacle: ObstacleKind::Heavy,
        },
    ));
    let mut agent = agent();
    sim.step(&mut agent, 0, &[]);

    let outcome = sim.step(&mut agent, 2, &[msg("Remove", 2, 0)]);
    assert!(
        outcome
            .outbox
            .iter()
            .any(|line| line == "Please come to area 1 to remove rock.")
    );

    sim.world.teammate_in_view = true;
    let outcome = sim.step(&mut agent, 4, &[]);
    assert_eq!(outcome.action, Some(Action::idle(10)));
    assert!(
        outcome
            .outbox
            .iter()
            .any(|line| line == "Lets remove rock blocking area 1!")
    );

    sim.remove(&ObjectId::from("rock_1"));
    sim.world.teammate_in_view = false;
    let outcome = sim.step(&mut agent, 6, &[]);
    assert!(has_event(&outcome, ConfirmedInfoKind::Removed));
    assert_eq!(agent.phase(), Phase::EnterRoom);
}

#[test]
fn beliefs_survive_save_and_reload() {
    let path = std::env::temp_dir().join(format!("rescuebot-scenario-{}.jsonl", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut sim = Sim::empty();
    let mut first = agent();
    sim.step(&mut first, 10, &[msg("Search: area 3", 10, 0)]);
    sim.step(&mut first, 12, &[msg("Rescue together", 12, 1)]);
    let mut store = JsonlBeliefStore::new(&path);
    first.persist(&mut store).unwrap();

    let second = RescueAgent::with_store(
        AgentConfig::default(),
        TeammateId::from(HUMAN),
        StraightLineNavigator::new(),
        &store,
    )
    .unwrap();
    assert_eq!(second.beliefs(), first.beliefs());
    let _ = std::fs::remove_file(&path);
}

fn sim_with_obstacle(id: &str, kind: ObstacleKind) -> Sim {
    let mut sim = Sim::new("mildly injured cat");
    sim.world
        .objects
        .push(object(id, 2, 2, ObjectKind::Obstacle { obstacle: kind }));
    sim
}

fn said(outcome: &TickOutcome, line: &str) -> bool {
    outcome.outbox.iter().any(|sent| sent == line)
}

#[test]
fn tree_is_removed_alone_when_asked() {
    let mut sim = sim_with_obstacle("tree_1", ObstacleKind::Medium);
    let mut agent = agent();
    let first = sim.step(&mut agent, 0, &[]);
    assert!(said(
        &first,
        "Found tree blocking area 1. Please decide whether to \"Remove\" or \"Continue\" searching."
    ));

    let outcome = sim.step(&mut agent, 2, &[msg("Remove", 2, 0)]);
    assert!(said(&outcome, "Removing tree blocking area 1 because you asked me to."));
    assert_eq!(
        outcome.action,
        Some(Action::RemoveObstacle {
            object_id: ObjectId::from("tree_1")
        })
    );

    sim.step(&mut agent, 3, &[]);
    assert_eq!(agent.phase(), Phase::EnterRoom);
}

#[test]
fn tree_is_removed_alone_after_silence() {
    let mut sim = sim_with_obstacle("tree_1", ObstacleKind::Medium);
    let mut agent = agent();
    sim.step(&mut agent, 0, &[]);

    let removed = (1..60)
        .map(|tick| sim.step(&mut agent, tick, &[]))
        .find(|outcome| matches!(outcome.action, Some(Action::RemoveObstacle { .. })))
        .unwrap();
    assert!(has_event(&removed, ConfirmedInfoKind::WaitTimeout));
    assert!(said(&removed, "Removing tree blocking area 1 because waiting took too long."));
    assert!(!agent.knowledge().is_skipped(&RoomName::from_index(1)));
}

#[test]
fn stones_removed_alone_on_request() {
    let mut sim = sim_with_obstacle("stones_1", ObstacleKind::Light);
    let mut agent = agent();
    let first = sim.step(&mut agent, 0, &[]);
    assert!(said(
        &first,
        "Found stones blocking area 1. Please decide whether to \"Remove together\", \"Remove alone\", or \
         \"Continue\" searching."
    ));

    let outcome = sim.step(&mut agent, 2, &[msg("Remove alone", 2, 0)]);
    assert!(said(&outcome, "Removing stones blocking area 1."));
    assert_eq!(
        outcome.action,
        Some(Action::RemoveObstacle {
            object_id: ObjectId::from("stones_1")
        })
    );
}

#[test]
fn stones_removed_alone_when_human_never_comes() {
    let mut sim = sim_with_obstacle("stones_1", ObstacleKind::Light);
    let mut agent = agent();
    sim.step(&mut agent, 0, &[]);

    let outcome = sim.step(&mut agent, 2, &[msg("Remove together", 2, 0)]);
    assert!(said(&outcome, "Please come to area 1 to remove stones."));
    assert_eq!(outcome.action, None);

    let removed = (3..80)
        .map(|tick| (tick, sim.step(&mut agent, tick, &[])))
        .find(|(_, outcome)| outcome.action.is_some())
        .unwrap();
    let (tick, outcome) = removed;
    assert_eq!(
        outcome.action,
        Some(Action::RemoveObstacle {
            object_id: ObjectId::from("stones_1")
        })
    );
    assert!(has_event(&outcome, ConfirmedInfoKind::WaitTimeout));
    assert!(said(&outcome, "Removing stones blocking area 1 because waiting took too long."));
    assert!(!agent.knowledge().is_skipped(&RoomName::from_index(1)));

    sim.step(&mut agent, tick + 1, &[]);
    assert_eq!(agent.phase(), Phase::EnterRoom);
}

#[test]
fn stones_removed_together_when_human_arrives() {
    let mut sim = sim_with_obstacle("stones_1", ObstacleKind::Light);
    let mut agent = agent();
    sim.step(&mut agent, 0, &[]);
    sim.step(&mut agent, 2, &[msg("Remove together", 2, 0)]);

    sim.world.teammate_in_view = true;
    let outcome = sim.step(&mut agent, 4, &[]);
    assert_eq!(outcome.action, Some(Action::idle(10)));
    assert!(said(&outcome, "Lets remove stones blocking area 1!"));
}

/// Reply "Rescue together" to the cat in area 1, then let the wait run out.
/// Returns the tick that timed out and its outcome.
fn rescue_together_until_timeout(sim: &mut Sim, agent: &mut RescueAgent) -> (u64, TickOutcome) {
    for tick in 0..5 {
        sim.step(agent, tick, &[]);
    }
    sim.step(agent, 5, &[msg("Rescue together", 5, 0)]);
    assert_eq!(agent.phase(), Phase::WaitForHuman);

    (6..80)
        .map(|tick| (tick, sim.step(agent, tick, &[])))
        .find(|(_, outcome)| has_event(outcome, ConfirmedInfoKind::WaitTimeout))
        .unwrap()
}

#[test]
fn joint_rescue_falls_back_to_solo_carry() {
    let mut sim = Sim::new("mildly injured cat");
    let mut agent = agent();
    let (_, outcome) = rescue_together_until_timeout(&mut sim, &mut agent);

    assert!(said(&outcome, "Waiting is over. Rescuing mildly injured cat alone."));
    assert!(matches!(
        outcome.action,
        Some(Action::CarryObject { partner: None, .. })
    ));
    assert_eq!(agent.rescue_mode(), RescueMode::Alone);
}

#[test]
fn teammate_idling_next_to_victim_does_not_stall_the_wait() {
    let mut sim = Sim::new("mildly injured cat");
    sim.world.teammate = Some(TeammateView {
        location: Coord::new(3, 2),
        carrying: None,
    });
    let mut agent = agent();
    let (tick, outcome) = rescue_together_until_timeout(&mut sim, &mut agent);

    assert!(tick < 80);
    assert!(said(&outcome, "Waiting is over. Rescuing mildly injured cat alone."));
    assert!(matches!(
        outcome.action,
        Some(Action::CarryObject { partner: None, .. })
    ));
}

#[test]
fn critical_victim_asked_to_rescue_alone_is_carried_together() {
    let girl = VictimId::from("critically injured girl");
    let mut sim = Sim::new(girl.as_str());
    let mut agent = agent();
    for tick in 0..5 {
        sim.step(&mut agent, tick, &[]);
    }

    let outcome = sim.step(&mut agent, 5, &[msg("Rescue alone", 5, 0)]);
    assert!(said(
        &outcome,
        "Lets carry critically injured girl together! Please wait until I moved on top of critically injured girl."
    ));
    assert!(!outcome.outbox.iter().any(|line| line.starts_with("Picking up")));
    assert_eq!(agent.rescue_mode(), RescueMode::Together);
    assert_eq!(agent.phase(), Phase::WaitForHuman);
}

#[test]
fn reported_victim_is_targeted_before_unsearched_areas() {
    let girl = VictimId::from("critically injured girl");
    let mut sim = Sim::new(girl.as_str());
    let mut agent = agent();

    let outcome = sim.step(&mut agent, 0, &[msg("Found: critically injured girl in area 2", 0, 0)]);
    assert!(said(
        &outcome,
        "Moving to area 2 to pick up critically injured girl. Please come there as well to help me carry \
         critically injured girl to the drop zone."
    ));
    assert_eq!(outcome.action, Some(Action::idle(25)));
    assert_eq!(agent.phase(), Phase::PlanPathToRoom);
    assert_eq!(agent.goal(), Some(&girl));
}

#[test]
fn victim_missing_from_reported_area_is_not_found() {
    let mut sim = Sim::new("critically injured girl");
    let mut agent = agent();
    sim.step(&mut agent, 0, &[msg("Found: critically injured girl in area 2", 0, 0)]);

    let outcome = (1..60)
        .map(|tick| sim.step(&mut agent, tick, &[]))
        .find(|outcome| has_event(outcome, ConfirmedInfoKind::NotFound))
        .unwrap();
    assert!(said(
        &outcome,
        "critically injured girl not present in area 2 because I searched the whole area without finding \
         critically injured girl."
    ));
    assert!(!agent.knowledge().is_known(&VictimId::from("critically injured girl")));
}

#[test]
fn victim_in_reported_area_is_found() {
    let mut sim = Sim::new("critically injured girl");
    let mut agent = agent();
    sim.step(&mut agent, 0, &[msg("Found: critically injured girl in area 1", 0, 0)]);

    let outcome = (1..20)
        .map(|tick| sim.step(&mut agent, tick, &[]))
        .find(|outcome| has_event(outcome, ConfirmedInfoKind::Found))
        .unwrap();
    assert!(said(
        &outcome,
        "Found critically injured girl in area 1 because you told me critically injured girl was located here."
    ));
    assert!(
        agent
            .knowledge()
            .victim(&VictimId::from("critically injured girl"))
            .unwrap()
            .location
            .is_some()
    );
}

#[test]
fn removal_request_sends_the_agent_to_the_area() {
    let mut sim = Sim::new("mildly injured cat");
    sim.world.objects.push(object(
        "tree_2",
        10,
        2,
        ObjectKind::Obstacle {
            obstacle: ObstacleKind::Medium,
        },
    ));
    let mut agent = agent();
    sim.step(&mut agent, 0, &[]);

    let outcome = sim.step(&mut agent, 1, &[msg("Remove: tree blocking area 2", 1, 0)]);
    assert!(said(&outcome, "Moving to area 2 to help you remove an obstacle."));

    let removed = (2..40)
        .map(|tick| sim.step(&mut agent, tick, &[]))
        .find(|outcome| matches!(outcome.action, Some(Action::RemoveObstacle { .. })))
        .unwrap();
    assert!(said(&removed, "Removing tree blocking area 2 because you asked me to."));
    assert_eq!(sim.world.agent_location, Coord::new(10, 3));
}

#[test]
fn removal_request_while_carrying_is_answered_after_the_drop() {
    let mut sim = Sim::new("mildly injured cat");
    sim.world.objects.push(object(
        "tree_2",
        10,
        2,
        ObjectKind::Obstacle {
            obstacle: ObstacleKind::Medium,
        },
    ));
    let mut agent = agent();

    let carried_at = (0..40)
        .find(|tick| {
            let outcome = sim.step(&mut agent, *tick, &[]);
            matches!(outcome.action, Some(Action::CarryObject { .. }))
        })
        .unwrap();

    let request = carried_at + 1;
    let outcome = sim.step(&mut agent, request, &[msg("Remove: tree blocking area 2", request, 0)]);
    assert!(said(&outcome, "Will come to area 2 after dropping mildly injured cat."));

    let dropped = (request + 1..request + 40)
        .map(|tick| (tick, sim.step(&mut agent, tick, &[])))
        .find(|(_, outcome)| matches!(outcome.action, Some(Action::Drop { .. })))
        .unwrap();
    assert!(said(&dropped.1, "Moving to area 2 to help you remove an obstacle."));

    let removed = (dropped.0 + 1..dropped.0 + 60)
        .map(|tick| sim.step(&mut agent, tick, &[]))
        .find(|outcome| matches!(outcome.action, Some(Action::RemoveObstacle { .. })))
        .unwrap();
    assert_eq!(
        removed.action,
        Some(Action::RemoveObstacle {
            object_id: ObjectId::from("tree_2")
        })
    );
}

#[test]
fn every_area_searched_starts_a_new_cycle() {
    let mut sim = Sim::new("mildly injured cat");
    let mut agent = agent();
    let outcome = sim.step(
        &mut agent,
        40,
        &[msg("Search: area 1", 40, 0), msg("Search: area 2", 40, 1)],
    );
    assert!(said(&outcome, "Going to re-search all areas."));
    assert!(!agent.knowledge().is_explored(&RoomName::from_index(2)));
    // The silence before tick 40 is folded into the baseline.
    assert_eq!(agent.trust().base(), &outcome.beliefs);
    assert!(agent.trust().silence_decay(40).abs() < 1e-12);
}
