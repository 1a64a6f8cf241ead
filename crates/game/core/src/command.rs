//! Inbound intents from an external controller.
use crate::state::{AgentId, VoteTarget};

/// A command issued on behalf of one agent.
///
/// Validation happens in [`GameEngine::apply`](crate::GameEngine::apply);
/// anything invalid is rejected without touching round state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum PlayerCommand {
    /// Teleport to `(x, y)`, clamped to the 0-100 plane. LOBBY or ACTION.
    Move { x: f64, y: f64 },
    /// Kill a crewmate in the same room. ACTION only.
    Kill { target: AgentId },
    /// Cast this meeting's ballot. MEETING only.
    Vote { target: VoteTarget },
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Move { .. } => "move",
            PlayerCommand::Kill { .. } => "kill",
            PlayerCommand::Vote { .. } => "vote",
        }
    }
}
