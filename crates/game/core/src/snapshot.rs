//! Read-only view of a round for spectators.
use crate::map::RoomId;
use crate::state::{Agent, MeetingContext, Outcome, Phase, TaskTally};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SabotageSummary {
    pub name: String,
    pub room: RoomId,
    pub timer: u32,
}

/// Betting window derived from the phase timers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WageringWindow {
    pub open: bool,
    /// Seconds until wagering closes; 0 once closed.
    pub closes_in: u32,
    /// Seconds until wagering reopens; 0 while open.
    pub opens_in: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub game_id: String,
    pub round: u64,
    pub phase: Phase,
    pub timer: u32,
    pub agents: Vec<Agent>,
    pub meeting: MeetingContext,
    /// Human-readable result line, e.g. `"Crewmates Win — Tasks!"`.
    pub winner: Option<String>,
    pub outcome: Option<Outcome>,
    pub task_progress: TaskTally,
    pub sabotage: Option<SabotageSummary>,
    pub wagering: WageringWindow,
}

impl Snapshot {
    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id.as_str() == id)
    }
}
