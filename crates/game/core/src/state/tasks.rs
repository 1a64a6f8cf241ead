//! Crewmate task pool, assignment and per-tick progress.
use std::collections::BTreeMap;

use crate::map::RoomId;
use crate::rng::{self, RandomSource};

use super::AgentId;

/// A chore tied to one room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskDef {
    pub id: &'static str,
    pub name: &'static str,
    pub room: RoomId,
}

impl TaskDef {
    const fn new(id: &'static str, name: &'static str, room: RoomId) -> Self {
        Self { id, name, room }
    }
}

/// Shared pool sampled for every crewmate; one task per task-eligible room.
pub const TASK_POOL: [TaskDef; 10] = [
    TaskDef::new("wires_cafeteria", "Fix Wires", RoomId::Cafeteria),
    TaskDef::new("upload_nav", "Upload Data", RoomId::Navigation),
    TaskDef::new("calibrate_shields", "Calibrate Shields", RoomId::Shields),
    TaskDef::new("refuel_engine", "Refuel Engines", RoomId::EngineRoom),
    TaskDef::new("align_medbay", "Align Extract", RoomId::MedBay),
    TaskDef::new("route_admin", "Route Admin", RoomId::Admin),
    TaskDef::new("repair_storage", "Repair Panel", RoomId::Storage),
    TaskDef::new("navigate_bridge", "Set Course", RoomId::Bridge),
    TaskDef::new("clean_weapons_top", "Clean Weapons", RoomId::WeaponsTop),
    TaskDef::new("clean_weapons_bot", "Clean Weapons", RoomId::WeaponsBottom),
];

/// One assigned task and its progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskSlot {
    pub task: TaskDef,
    pub completed: bool,
    pub ticks_remaining: u32,
}

/// Completed versus assigned tasks across every crewmate, dead or alive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskTally {
    pub completed: usize,
    pub total: usize,
}

#[derive(Clone, Debug, Default)]
pub struct TaskBoard {
    assignments: BTreeMap<AgentId, Vec<TaskSlot>>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all assignments: each crewmate gets an independent shuffle of
    /// the pool truncated to `per_crewmate` tasks.
    pub fn assign<'a, R, I>(&mut self, rng: &mut R, crewmates: I, per_crewmate: usize, duration: u32)
    where
        R: RandomSource + ?Sized,
        I: IntoIterator<Item = &'a AgentId>,
    {
        self.assignments.clear();
        for id in crewmates {
            let mut pool = TASK_POOL;
            rng::shuffle(rng, &mut pool);
            let slots = pool
                .iter()
                .take(per_crewmate)
                .map(|&task| TaskSlot {
                    task,
                    completed: false,
                    ticks_remaining: duration,
                })
                .collect();
            self.assignments.insert(id.clone(), slots);
        }
    }

    pub fn clear(&mut self) {
        self.assignments.clear();
    }

    pub fn tasks_for(&self, id: &AgentId) -> &[TaskSlot] {
        self.assignments.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tasks_for_mut(&mut self, id: &AgentId) -> Option<&mut Vec<TaskSlot>> {
        self.assignments.get_mut(id)
    }

    /// Progress the first incomplete task of `id` located in `room`.
    ///
    /// Returns the task if this tick completed it.
    pub fn progress(&mut self, id: &AgentId, room: RoomId) -> Option<TaskDef> {
        let slot = self
            .assignments
            .get_mut(id)?
            .iter_mut()
            .find(|slot| !slot.completed && slot.task.room == room)?;
        slot.ticks_remaining = slot.ticks_remaining.saturating_sub(1);
        if slot.ticks_remaining == 0 {
            slot.completed = true;
            return Some(slot.task);
        }
        None
    }

    /// Every assigned task is complete. An empty board never counts as done.
    pub fn all_completed(&self) -> bool {
        !self.assignments.is_empty()
            && self
                .assignments
                .values()
                .all(|slots| slots.iter().all(|slot| slot.completed))
    }

    pub fn tally(&self) -> TaskTally {
        self.assignments
            .values()
            .flatten()
            .fold(TaskTally::default(), |mut tally, slot| {
                tally.total += 1;
                if slot.completed {
                    tally.completed += 1;
                }
                tally
            })
    }

    pub fn assignees(&self) -> impl Iterator<Item = &AgentId> {
        self.assignments.keys()
    }
}
