//! Errors surfaced at the engine boundary.
use crate::state::{AgentId, Phase};

/// Why a lobby join was refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JoinError {
    #[error("joins are only accepted in LOBBY (current phase: {phase})")]
    WrongPhase { phase: Phase },

    #[error("roster is full ({capacity} agents)")]
    RosterFull { capacity: usize },

    #[error("agent {0} already joined")]
    Duplicate(AgentId),
}

/// Why a player command was ignored.
///
/// Rejections never change round state; callers typically log and move on.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandRejection {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("agent {0} is dead")]
    DeadActor(AgentId),

    #[error("{command} is not allowed during {phase}")]
    WrongPhase { command: &'static str, phase: Phase },

    #[error("agent {0} is not an impostor")]
    NotImpostor(AgentId),

    #[error("kill on cooldown for {remaining} more ticks")]
    OnCooldown { remaining: u32 },

    #[error("invalid target {0}")]
    InvalidTarget(AgentId),

    #[error("agent cannot target itself")]
    SelfTarget,

    #[error("target {0} is not in the same room")]
    NotInRoom(AgentId),

    #[error("agent {0} already voted this meeting")]
    AlreadyVoted(AgentId),
}
