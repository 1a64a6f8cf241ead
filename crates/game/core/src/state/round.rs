//! The round aggregate: everything that lives for exactly one round.
use std::collections::BTreeMap;

use strum::Display;

use crate::config::GameConfig;
use crate::map::MapState;
use crate::meeting::MeetingLedger;

use super::{Agent, AgentId, Outcome, SabotageState, TaskBoard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    Action,
    Meeting,
    Ended,
}

/// Ballot target: another agent or an abstention.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoteTarget {
    Agent(AgentId),
    Skip,
}

/// Who called the current meeting and how everyone voted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeetingContext {
    pub reporter: Option<AgentId>,
    pub body_found: Option<AgentId>,
    pub votes: BTreeMap<AgentId, VoteTarget>,
}

/// Pacing for generated meeting chat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChatPacing {
    pub cooldown: u32,
    pub count: u32,
}

/// One live round. Created in LOBBY, reset back to a fresh LOBBY after the
/// post-game cooldown.
#[derive(Clone, Debug)]
pub struct Round {
    pub number: u64,
    pub phase: Phase,
    /// Seconds remaining in the current phase.
    pub timer: u32,
    pub agents: BTreeMap<AgentId, Agent>,
    pub map: MapState,
    pub ledger: MeetingLedger,
    pub tasks: TaskBoard,
    pub sabotage: SabotageState,
    pub meeting: MeetingContext,
    pub outcome: Option<Outcome>,
    /// ACTION time left when a meeting interrupted it.
    pub saved_action_timer: u32,
    pub spawn_cooldown: u32,
    pub chat: ChatPacing,
    /// Wagering closed for this round.
    pub wagering_locked: bool,
}

impl Round {
    pub fn new(number: u64, config: &GameConfig) -> Self {
        Self {
            number,
            phase: Phase::Lobby,
            timer: config.lobby_secs,
            agents: BTreeMap::new(),
            map: MapState::new(),
            ledger: MeetingLedger::new(),
            tasks: TaskBoard::new(),
            sabotage: SabotageState::new(),
            meeting: MeetingContext::default(),
            outcome: None,
            saved_action_timer: 0,
            spawn_cooldown: 0,
            chat: ChatPacing::default(),
            wagering_locked: false,
        }
    }

    /// Discard every trace of the current round and open the next lobby.
    pub fn reset(&mut self, config: &GameConfig) {
        *self = Self::new(self.number + 1, config);
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn living(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values().filter(|a| a.alive)
    }

    pub fn live_impostors(&self) -> usize {
        self.agents.values().filter(|a| a.is_live_impostor()).count()
    }

    pub fn live_crewmates(&self) -> usize {
        self.agents.values().filter(|a| a.is_live_crewmate()).count()
    }
}
