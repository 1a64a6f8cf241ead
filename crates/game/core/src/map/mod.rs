//! Ship map: static room graph plus per-agent movement.
mod movement;
mod topology;

pub use movement::MapState;
pub use topology::{Position, RoomId, corridor, path};
