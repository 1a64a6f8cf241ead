//! Round state: roster, tasks, sabotage, meeting context and outcome.
//!
//! Everything here is plain data with small, local invariants. The engine is
//! the only writer.
mod agent;
mod outcome;
mod round;
mod sabotage;
mod tasks;

pub use agent::{Agent, AgentId, AgentProfile, ProfileMetadata, Role};
pub use outcome::{Outcome, Side, WinReason};
pub use round::{ChatPacing, MeetingContext, Phase, Round, VoteTarget};
pub use sabotage::{
    ActiveSabotage, SABOTAGE_POOL, SabotageDef, SabotageResolution, SabotageState, SabotageTick,
};
pub use tasks::{TASK_POOL, TaskBoard, TaskDef, TaskSlot, TaskTally};
