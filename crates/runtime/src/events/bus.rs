//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use game_core::{EngineEvent, Phase, Snapshot};

use super::types::ChatMessage;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Full round snapshots at the movement cadence
    Snapshot,
    /// Phase transitions
    Phase,
    /// Ambient and meeting chat
    Chat,
    /// Raw engine events (kills, tasks, sabotage, results)
    Game,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Snapshot(Box<Snapshot>),
    Phase { round: u64, phase: Phase },
    Chat(ChatMessage),
    Game(EngineEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Snapshot(_) => Topic::Snapshot,
            Event::Phase { .. } => Topic::Phase,
            Event::Chat(_) => Topic::Chat,
            Event::Game(_) => Topic::Game,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing is best-effort: an event with no
/// subscribers is dropped.
#[derive(Clone)]
pub struct EventBus {
    snapshot: broadcast::Sender<Event>,
    phase: broadcast::Sender<Event>,
    chat: broadcast::Sender<Event>,
    game: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshot: broadcast::channel(capacity).0,
            phase: broadcast::channel(capacity).0,
            chat: broadcast::channel(capacity).0,
            game: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Snapshot => &self.snapshot,
            Topic::Phase => &self.phase,
            Topic::Chat => &self.chat,
            Topic::Game => &self.game,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
