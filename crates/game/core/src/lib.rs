//! Deterministic round simulation for an autonomous social-deduction game.
//!
//! `game-core` holds the rules: the ship map and movement, the meeting ledger,
//! round state, and the [`GameEngine`] that drives phases, kills, tasks,
//! sabotage, voting and discussion. It performs no I/O and owns no clocks;
//! the runtime crate schedules ticks and relays commands and events.
pub mod command;
pub mod config;
pub mod engine;
pub mod event;
pub mod map;
pub mod meeting;
pub mod rng;
pub mod snapshot;
pub mod state;

pub use command::PlayerCommand;
pub use config::GameConfig;
pub use engine::{
    CandidateSource, CommandRejection, DiscussionScript, GameEngine, JoinError, NoCandidates,
};
pub use event::EngineEvent;
pub use map::{MapState, Position, RoomId};
pub use meeting::{MeetingLedger, MeetingMessage};
pub use rng::{PcgRng, RandomSource};
pub use snapshot::{SabotageSummary, Snapshot, WageringWindow};
pub use state::{
    Agent, AgentId, AgentProfile, MeetingContext, Outcome, Phase, ProfileMetadata, Role, Round,
    Side, TaskTally, VoteTarget, WinReason,
};
