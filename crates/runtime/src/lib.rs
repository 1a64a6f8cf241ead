//! Runtime orchestration for the round simulation.
//!
//! This crate wires the [`game_core::GameEngine`] to wall-clock timers, the
//! identity feed and the wager ledger, and exposes a cloneable
//! [`RuntimeHandle`] for hosts and transports.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`providers`] defines the identity feed and wager ledger collaborators
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod providers;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{ChatKind, ChatMessage, Event, EventBus, Topic};
pub use providers::{
    ChatLine, FeedError, IdentityFeed, InMemoryLedger, LedgerCall, LedgerError, LedgerOp,
    MarketId, StaticIdentityFeed, WagerLedger,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::{PipelineOutcome, Step, run_pipeline};
