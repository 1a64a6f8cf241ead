//! Timed critical failures that crewmates must repair.
use crate::config::GameConfig;
use crate::map::RoomId;
use crate::rng::{self, RandomSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SabotageDef {
    pub id: &'static str,
    pub name: &'static str,
    /// Room a crewmate must stand in to repair.
    pub room: RoomId,
    /// Countdown in seconds before the impostors win.
    pub duration_secs: u32,
}

impl SabotageDef {
    const fn new(id: &'static str, name: &'static str, room: RoomId, duration_secs: u32) -> Self {
        Self {
            id,
            name,
            room,
            duration_secs,
        }
    }
}

pub const SABOTAGE_POOL: [SabotageDef; 4] = [
    SabotageDef::new("reactor", "Reactor Meltdown", RoomId::EngineRoom, 45),
    SabotageDef::new("oxygen", "O2 Depleted", RoomId::Cafeteria, 40),
    SabotageDef::new("comms", "Comms Sabotaged", RoomId::Navigation, 50),
    SabotageDef::new("lights", "Lights Sabotaged", RoomId::Shields, 55),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveSabotage {
    pub def: SabotageDef,
    pub timer: u32,
}

/// How an active sabotage ended this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SabotageResolution {
    Repaired(SabotageDef),
    Expired(SabotageDef),
}

/// What happened during one sabotage tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SabotageTick {
    pub triggered: Option<SabotageDef>,
    pub resolution: Option<SabotageResolution>,
}

#[cfg(test)]
impl SabotageTick {
    fn expired(&self) -> bool {
        matches!(self.resolution, Some(SabotageResolution::Expired(_)))
    }
}

/// Sabotage lifecycle for one ACTION phase.
///
/// At most one sabotage is active, and once one fires `triggered` stays set
/// until the next [`arm`](Self::arm).
#[derive(Clone, Debug, Default)]
pub struct SabotageState {
    active: Option<ActiveSabotage>,
    repair_ticks: u32,
    triggered: bool,
    grace_ticks: u32,
}

impl SabotageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a fresh ACTION phase with `grace_ticks` before eligibility.
    pub fn arm(&mut self, grace_ticks: u32) {
        *self = Self {
            grace_ticks,
            ..Self::default()
        };
    }

    /// Drop every sabotage record; used when a round ends or resets.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn active(&self) -> Option<&ActiveSabotage> {
        self.active.as_ref()
    }

    pub fn triggered(&self) -> bool {
        self.triggered
    }

    pub fn grace_ticks(&self) -> u32 {
        self.grace_ticks
    }

    pub fn repair_ticks(&self) -> u32 {
        self.repair_ticks
    }

    /// Start `def` with an explicit timer.
    pub fn activate(&mut self, def: SabotageDef, timer: u32) {
        self.active = Some(ActiveSabotage { def, timer });
        self.triggered = true;
        self.repair_ticks = 0;
    }

    /// One logic tick.
    ///
    /// `impostor_alive` gates triggering; `repairer_in` reports whether a live
    /// crewmate stands in the given room.
    pub fn tick<R, F>(
        &mut self,
        rng: &mut R,
        config: &GameConfig,
        impostor_alive: bool,
        repairer_in: F,
    ) -> SabotageTick
    where
        R: RandomSource + ?Sized,
        F: Fn(RoomId) -> bool,
    {
        let mut report = SabotageTick::default();

        self.grace_ticks = self.grace_ticks.saturating_sub(1);

        if !self.triggered
            && self.grace_ticks == 0
            && impostor_alive
            && rng.chance(config.sabotage_chance)
            && let Some(&def) = rng::pick(rng, &SABOTAGE_POOL)
        {
            self.activate(def, def.duration_secs);
            report.triggered = Some(def);
        }

        let Some(active) = self.active.as_mut() else {
            return report;
        };

        if repairer_in(active.def.room) {
            self.repair_ticks += 1;
            if self.repair_ticks >= config.repair_duration_ticks {
                let def = active.def;
                self.active = None;
                self.repair_ticks = 0;
                report.resolution = Some(SabotageResolution::Repaired(def));
                return report;
            }
        }

        active.timer = active.timer.saturating_sub(1);
        if active.timer == 0 {
            let def = active.def;
            self.active = None;
            report.resolution = Some(SabotageResolution::Expired(def));
        }
        report
    }
}
