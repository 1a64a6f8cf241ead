//! Per-agent movement along corridor waypoints.
use std::collections::{BTreeMap, VecDeque};

use super::topology::{self, Position, RoomId};
use crate::config::GameConfig;
use crate::rng::{self, RandomSource};
use crate::state::AgentId;

/// How long an agent lingers before picking its next destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Idle {
    Ticks(u32),
    /// Dead agents never re-path.
    Frozen,
}

#[derive(Clone, Debug)]
struct Mover {
    room: RoomId,
    pos: Position,
    path: VecDeque<Position>,
    idle: Idle,
    /// Externally puppeted; skipped by the wander loop.
    controlled: bool,
}

impl Mover {
    fn spawned() -> Self {
        Self {
            room: RoomId::SPAWN,
            pos: RoomId::SPAWN.center(),
            path: VecDeque::new(),
            idle: Idle::Ticks(0),
            controlled: false,
        }
    }
}

/// Movement state for every agent on the ship.
#[derive(Clone, Debug, Default)]
pub struct MapState {
    movers: BTreeMap<AgentId, Mover>,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `id` at the spawn room center with no idle delay.
    pub fn spawn(&mut self, id: AgentId) {
        self.movers.insert(id, Mover::spawned());
    }

    pub fn remove(&mut self, id: &AgentId) {
        self.movers.remove(id);
    }

    pub fn len(&self) -> usize {
        self.movers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movers.is_empty()
    }

    pub fn position(&self, id: &AgentId) -> Position {
        self.movers
            .get(id)
            .map_or_else(|| RoomId::SPAWN.center(), |m| m.pos)
    }

    pub fn room(&self, id: &AgentId) -> RoomId {
        self.movers.get(id).map_or(RoomId::SPAWN, |m| m.room)
    }

    /// Stop `id` permanently. Calling it again changes nothing.
    pub fn freeze(&mut self, id: &AgentId) {
        if let Some(mover) = self.movers.get_mut(id) {
            mover.path.clear();
            mover.idle = Idle::Frozen;
        }
    }

    pub fn is_frozen(&self, id: &AgentId) -> bool {
        self.movers
            .get(id)
            .is_some_and(|m| m.idle == Idle::Frozen)
    }

    pub fn set_controlled(&mut self, id: &AgentId, controlled: bool) {
        if let Some(mover) = self.movers.get_mut(id) {
            mover.controlled = controlled;
        }
    }

    /// Teleport `id` and resolve its room from the new position.
    pub fn set_position(&mut self, id: &AgentId, pos: Position) {
        if let Some(mover) = self.movers.get_mut(id) {
            mover.pos = pos;
            mover.path.clear();
            mover.room = RoomId::nearest(pos);
        }
    }

    /// Advance every free-roaming agent by one movement step.
    pub fn tick<R: RandomSource + ?Sized>(&mut self, rng: &mut R, config: &GameConfig) {
        for mover in self.movers.values_mut() {
            if mover.controlled || mover.idle == Idle::Frozen {
                continue;
            }
            Self::advance(mover, rng, config);
        }
    }

    fn advance<R: RandomSource + ?Sized>(mover: &mut Mover, rng: &mut R, config: &GameConfig) {
        if let Some(&target) = mover.path.front() {
            let dist = mover.pos.distance_to(&target);
            if dist <= config.move_step {
                mover.pos = target;
                mover.path.pop_front();
                if mover.path.is_empty() {
                    mover.room = RoomId::nearest(mover.pos);
                    mover.idle =
                        Idle::Ticks(rng.range(config.idle_min_ticks, config.idle_max_ticks));
                }
            } else {
                let ratio = config.move_step / dist;
                mover.pos.x += (target.x - mover.pos.x) * ratio;
                mover.pos.y += (target.y - mover.pos.y) * ratio;
            }
            return;
        }

        match mover.idle {
            Idle::Ticks(n) if n > 0 => mover.idle = Idle::Ticks(n - 1),
            Idle::Ticks(_) => {
                let Some(&next) = rng::pick(rng, mover.room.adjacent()) else {
                    return;
                };
                mover.path = topology::path(mover.room, next).into_iter().skip(1).collect();
            }
            Idle::Frozen => {}
        }
    }
}
