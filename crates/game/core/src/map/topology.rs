//! Static ship layout: rooms, adjacency, room centers and corridor waypoints.
//!
//! Coordinates live on a normalized 0-100 plane. The graph is fixed at compile
//! time and never mutated.
use strum::{Display, EnumIter, IntoEnumIterator};

/// Continuous position on the normalized 0-100 plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        self.distance_sq(other).sqrt()
    }

    fn distance_sq(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Clamp both axes into `[0, 100]`.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 100.0),
            y: y.clamp(0.0, 100.0),
        }
    }
}

/// Room on the ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoomId {
    #[strum(serialize = "Engine Room")]
    EngineRoom,
    #[strum(serialize = "Weapons (Top)")]
    WeaponsTop,
    #[strum(serialize = "Weapons (Bottom)")]
    WeaponsBottom,
    #[strum(serialize = "MedBay")]
    MedBay,
    Cafeteria,
    Storage,
    Admin,
    Navigation,
    Shields,
    Bridge,
    /// Junction without corridors; only reachable by direct repositioning.
    Hallway,
}

impl RoomId {
    /// Room every agent spawns in.
    pub const SPAWN: RoomId = RoomId::Cafeteria;

    /// Rooms connected to this one. Edges are bidirectional.
    pub fn adjacent(self) -> &'static [RoomId] {
        use RoomId::*;
        match self {
            EngineRoom => &[WeaponsTop, WeaponsBottom, Cafeteria],
            WeaponsTop => &[EngineRoom, Cafeteria, MedBay],
            WeaponsBottom => &[EngineRoom, Storage],
            MedBay => &[WeaponsTop, Cafeteria],
            Cafeteria => &[EngineRoom, WeaponsTop, MedBay, Storage, Admin, Navigation],
            Admin => &[Cafeteria, Storage, Navigation],
            Storage => &[WeaponsBottom, Cafeteria, Admin, Shields],
            Navigation => &[Cafeteria, Admin, Bridge, Shields],
            Bridge => &[Navigation, Shields],
            Shields => &[Storage, Navigation, Bridge],
            Hallway => &[],
        }
    }

    /// Whether tasks can be placed in this room.
    pub fn has_task(self) -> bool {
        self != RoomId::Hallway
    }

    pub fn center(self) -> Position {
        use RoomId::*;
        match self {
            EngineRoom => Position::new(10.0, 50.0),
            WeaponsTop => Position::new(22.0, 22.0),
            WeaponsBottom => Position::new(22.0, 75.0),
            MedBay => Position::new(34.0, 40.0),
            Cafeteria => Position::new(50.0, 20.0),
            Storage => Position::new(48.0, 65.0),
            Admin => Position::new(60.0, 48.0),
            Navigation => Position::new(73.0, 18.0),
            Shields => Position::new(73.0, 72.0),
            Bridge => Position::new(92.0, 50.0),
            Hallway => Position::new(50.0, 50.0),
        }
    }

    /// Room whose center is closest to `pos`. Ties resolve to the room
    /// declared first.
    pub fn nearest(pos: Position) -> RoomId {
        let mut best = RoomId::SPAWN;
        let mut best_dist = f64::INFINITY;
        for room in RoomId::iter() {
            let d = pos.distance_sq(&room.center());
            if d < best_dist {
                best_dist = d;
                best = room;
            }
        }
        best
    }
}

/// Corridor waypoints stored for one direction of every edge.
const CORRIDORS: &[(RoomId, RoomId, &[(f64, f64)])] = {
    use RoomId::*;
    &[
        (EngineRoom, WeaponsTop, &[(13.0, 40.0), (16.0, 28.0)]),
        (EngineRoom, WeaponsBottom, &[(13.0, 60.0), (16.0, 72.0)]),
        (EngineRoom, Cafeteria, &[(15.0, 38.0), (22.0, 15.0), (35.0, 14.0)]),
        (WeaponsTop, MedBay, &[(27.0, 30.0)]),
        (WeaponsTop, Cafeteria, &[(30.0, 16.0), (38.0, 16.0)]),
        (MedBay, Cafeteria, &[(38.0, 30.0), (42.0, 22.0)]),
        (Cafeteria, Storage, &[(48.0, 30.0), (48.0, 45.0), (48.0, 57.0)]),
        (Cafeteria, Admin, &[(50.0, 30.0), (55.0, 42.0)]),
        (Cafeteria, Navigation, &[(58.0, 16.0), (65.0, 16.0)]),
        (WeaponsBottom, Storage, &[(28.0, 78.0), (35.0, 72.0), (42.0, 68.0)]),
        (Storage, Admin, &[(54.0, 58.0)]),
        (Storage, Shields, &[(55.0, 70.0), (63.0, 74.0)]),
        (Admin, Navigation, &[(64.0, 36.0), (67.0, 24.0)]),
        (Navigation, Bridge, &[(80.0, 22.0), (86.0, 35.0)]),
        (Navigation, Shields, &[(72.0, 35.0), (72.0, 50.0), (72.0, 62.0)]),
        (Shields, Bridge, &[(80.0, 65.0), (86.0, 58.0)]),
    ]
};

/// Intermediate corridor points walked from `from` to `to`, excluding both
/// room centers. Empty for rooms without a corridor between them.
pub fn corridor(from: RoomId, to: RoomId) -> Vec<Position> {
    for &(a, b, points) in CORRIDORS {
        let forward = || points.iter().map(|&(x, y)| Position::new(x, y));
        if a == from && b == to {
            return forward().collect();
        }
        if a == to && b == from {
            return forward().rev().collect();
        }
    }
    Vec::new()
}

/// Full walk for a directed edge: `from` center, corridor, `to` center.
pub fn path(from: RoomId, to: RoomId) -> Vec<Position> {
    let mut points = Vec::with_capacity(5);
    points.push(from.center());
    points.extend(corridor(from, to));
    points.push(to.center());
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_symmetric() {
        for room in RoomId::iter() {
            for &other in room.adjacent() {
                assert!(
                    other.adjacent().contains(&room),
                    "{room} -> {other} has no reverse edge"
                );
            }
        }
    }

    #[test]
    fn every_edge_has_a_corridor() {
        for room in RoomId::iter() {
            for &other in room.adjacent() {
                assert!(!corridor(room, other).is_empty(), "{room} -> {other}");
            }
        }
    }

    #[test]
    fn reverse_corridor_is_reversed() {
        let forward = corridor(RoomId::Cafeteria, RoomId::Storage);
        let mut backward = corridor(RoomId::Storage, RoomId::Cafeteria);
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn path_starts_and_ends_at_centers() {
        let p = path(RoomId::EngineRoom, RoomId::Cafeteria);
        assert_eq!(p.first(), Some(&RoomId::EngineRoom.center()));
        assert_eq!(p.last(), Some(&RoomId::Cafeteria.center()));
        assert_eq!(p.len(), 5);
    }

    #[test]
    fn hallway_is_isolated_and_taskless() {
        assert!(RoomId::Hallway.adjacent().is_empty());
        assert!(!RoomId::Hallway.has_task());
        assert!(RoomId::Bridge.has_task());
    }

    #[test]
    fn nearest_resolves_centers_and_points() {
        for room in RoomId::iter() {
            assert_eq!(RoomId::nearest(room.center()), room);
        }
        assert_eq!(RoomId::nearest(Position::new(0.0, 0.0)), RoomId::WeaponsTop);
        assert_eq!(RoomId::nearest(Position::new(100.0, 50.0)), RoomId::Bridge);
    }
}
