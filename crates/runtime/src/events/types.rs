//! Event payloads for the non-engine topics.

use serde::{Deserialize, Serialize};

/// Where a chat line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    /// Streamed from the identity feed regardless of phase.
    Ambient,
    /// Generated during a meeting.
    Meeting,
}

/// One broadcast chat line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Agent id for meeting lines; the author handle for ambient lines.
    pub sender: String,
    /// Display name shown next to the line. Not unique.
    pub sender_name: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
    pub kind: ChatKind,
}

impl ChatMessage {
    /// Stamp a line with the current wall-clock time. The display name
    /// defaults to `sender`.
    pub fn now(sender: impl Into<String>, content: impl Into<String>, kind: ChatKind) -> Self {
        let sender = sender.into();
        Self {
            sender_name: sender.clone(),
            sender,
            content: content.into(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            kind,
        }
    }

    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }
}
