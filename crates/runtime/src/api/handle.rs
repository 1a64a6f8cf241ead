//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! joining agents, relaying controller commands and streaming topic events.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{AgentId, AgentProfile, PlayerCommand, Snapshot};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Add an agent to the current lobby.
    pub async fn join(&self, profile: AgentProfile) -> Result<()> {
        self.request(|reply| Command::Join { profile, reply })
            .await?
    }

    /// Relay a controller command for `actor`.
    pub async fn submit(&self, actor: AgentId, command: PlayerCommand) -> Result<()> {
        self.request(|reply| Command::Submit {
            actor,
            command,
            reply,
        })
        .await?
    }

    /// Take `agent` over from the autonomous behaviour.
    pub async fn claim_control(&self, agent: AgentId) -> Result<()> {
        self.set_control(agent, true).await
    }

    /// Hand `agent` back to the autonomous behaviour.
    pub async fn release_control(&self, agent: AgentId) -> Result<()> {
        self.set_control(agent, false).await
    }

    async fn set_control(&self, agent: AgentId, controlled: bool) -> Result<()> {
        self.request(|reply| Command::SetControl {
            agent,
            controlled,
            reply,
        })
        .await?
    }

    /// Current round as spectators see it.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Snapshot` - full snapshot at the movement cadence
    /// - `Topic::Phase` - phase transitions
    /// - `Topic::Chat` - ambient and meeting chat
    /// - `Topic::Game` - every engine event
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut chat = handle.subscribe(Topic::Chat);
    /// while let Ok(event) = chat.recv().await {
    ///     // render chat line
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
