//! Typed notifications queued by the engine and drained by the scheduler.
use crate::map::RoomId;
use crate::state::{AgentId, Outcome, Phase};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum EngineEvent {
    PhaseChanged {
        round: u64,
        phase: Phase,
    },
    AgentJoined {
        agent: AgentId,
        name: String,
    },
    /// A generated meeting line.
    MeetingChat {
        sender: AgentId,
        content: String,
    },
    AgentKilled {
        killer: AgentId,
        victim: AgentId,
        witnessed: bool,
    },
    AgentEjected {
        agent: AgentId,
    },
    NoEjection,
    TaskCompleted {
        agent: AgentId,
        task: String,
    },
    SabotageTriggered {
        name: String,
        room: RoomId,
        timer: u32,
    },
    SabotageRepaired {
        name: String,
    },
    /// Wagering for `round` is closed; the ACTION phase has begun.
    WageringLocked {
        round: u64,
    },
    RoundEnded {
        round: u64,
        outcome: Outcome,
    },
    /// Roster cleared and a fresh lobby opened.
    RoundReset {
        round: u64,
    },
}
