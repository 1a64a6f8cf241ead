//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the engine; the others react to its events or
//! service the identity feed and never touch round state.

mod ambient;
mod settlement;
mod simulation;

pub use ambient::{AmbientChatWorker, FeedPoller};
pub use settlement::{PipelineOutcome, SettlementWorker, Step, run_pipeline};
pub use simulation::{Cadence, Command, SimulationWorker};
