//! Navigation seam: the phase machine hands waypoints to a [`Navigator`]
//! and asks it for one move per tick.

use std::collections::VecDeque;

use rescuebot_types::{Coord, Direction};

/// Turns a queue of waypoints into single-tile moves.
pub trait Navigator {
    /// Drop every queued waypoint.
    fn reset(&mut self);

    /// Append waypoints to the route.
    fn add_waypoints(&mut self, waypoints: &[Coord]);

    /// The next move from `from`, or `None` once the last waypoint is
    /// reached (or the route is empty).
    fn next_move(&mut self, from: Coord) -> Option<Direction>;
}

/// Walks to each waypoint in a straight line, x first and then y.
///
/// Obstacles are not avoided; it stands in for a real path planner.
#[derive(Debug, Clone, Default)]
pub struct StraightLineNavigator {
    waypoints: VecDeque<Coord>,
}

impl StraightLineNavigator {
    /// Create a navigator with an empty route.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waypoints still to visit.
    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }
}

impl Navigator for StraightLineNavigator {
    fn reset(&mut self) {
        self.waypoints.clear();
    }

    fn add_waypoints(&mut self, waypoints: &[Coord]) {
        self.waypoints.extend(waypoints.iter().copied());
    }

    fn next_move(&mut self, from: Coord) -> Option<Direction> {
        while let Some(&target) = self.waypoints.front() {
            if target == from {
                self.waypoints.pop_front();
                continue;
            }
            let direction = if target.x > from.x {
                Direction::East
            } else if target.x < from.x {
                Direction::West
            } else if target.y > from.y {
                Direction::South
            } else {
                Direction::North
            };
            return Some(direction);
        }
        None
    }
}
