//! Read-only queries over the world the phase machine sees.
//!
//! The machine never touches a [`WorldSnapshot`] directly; it goes through
//! [`WorldQuery`] so tests and alternative simulators can supply their own
//! view of the grid.

use std::collections::BTreeSet;

use rescuebot_types::{Coord, DropZoneSlot, ObjectCategory, ObjectKind, RoomName, TeammateView, WorldObject, WorldSnapshot};

/// Queries the phase machine makes about the current tick's world.
pub trait WorldQuery {
    /// Current tick.
    fn tick(&self) -> u64;

    /// Agent position.
    fn agent_location(&self) -> Coord;

    /// The human's position and carry state, when known.
    fn teammate(&self) -> Option<&TeammateView>;

    /// Whether the human is in the agent's view.
    fn teammate_in_view(&self) -> bool;

    /// Every object of a category.
    fn find_by_kind(&self, category: ObjectCategory) -> Vec<&WorldObject>;

    /// Door objects of a room.
    fn room_doors(&self, room: &RoomName) -> Vec<&WorldObject>;

    /// Walkable tiles of a room.
    fn room_tiles(&self, room: &RoomName) -> Vec<Coord>;

    /// Every room that has a door, sorted by name.
    fn rooms(&self) -> Vec<RoomName>;

    /// Drop-zone slots in delivery order.
    fn drop_zones(&self) -> &[DropZoneSlot];
}

impl WorldQuery for WorldSnapshot {
    fn tick(&self) -> u64 {
        self.tick
    }

    fn agent_location(&self) -> Coord {
        self.agent_location
    }

    fn teammate(&self) -> Option<&TeammateView> {
        self.teammate.as_ref()
    }

    fn teammate_in_view(&self) -> bool {
        self.teammate_in_view
    }

    fn find_by_kind(&self, category: ObjectCategory) -> Vec<&WorldObject> {
        self.objects
            .iter()
            .filter(|object| object.kind.category() == category)
            .collect()
    }

    fn room_doors(&self, room: &RoomName) -> Vec<&WorldObject> {
        self.objects
            .iter()
            .filter(|object| matches!(&object.kind, ObjectKind::Door { room: r, .. } if r == room))
            .collect()
    }

    fn room_tiles(&self, room: &RoomName) -> Vec<Coord> {
        self.objects
            .iter()
            .filter(|object| matches!(&object.kind, ObjectKind::AreaTile { room: r } if r == room))
            .map(|object| object.location)
            .collect()
    }

    fn rooms(&self) -> Vec<RoomName> {
        let rooms: BTreeSet<&RoomName> = self
            .objects
            .iter()
            .filter_map(|object| match &object.kind {
                ObjectKind::Door { room, .. } => Some(room),
                _ => None,
            })
            .collect();
        rooms.into_iter().cloned().collect()
    }

    fn drop_zones(&self) -> &[DropZoneSlot] {
        &self.drop_zones
    }
}

/// The doormat of a room's first door, with the door's own tile.
pub fn room_entrance<W: WorldQuery + ?Sized>(world: &W, room: &RoomName) -> Option<(Coord, Coord)> {
    world.room_doors(room).into_iter().find_map(|door| match &door.kind {
        ObjectKind::Door { doormat, .. } => Some((door.location, *doormat)),
        _ => None,
    })
}
