//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and engine-level rejections so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{AgentId, CommandRejection, JoinError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("join rejected")]
    JoinRejected(#[from] JoinError),

    #[error("command rejected")]
    CommandRejected(#[from] CommandRejection),

    #[error("agent {0} is not on the roster")]
    UnknownAgent(AgentId),
}
