//! Identity feed: the queue of candidate agents and ambient chat lines.
//!
//! The simulation pulls from the feed synchronously inside its tick, so the
//! pull side is plain methods; only refreshing is async.
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use game_core::{AgentId, AgentProfile};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("identity feed unavailable: {0}")]
    Unavailable(String),
}

/// A line for the ambient chat stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub sender: String,
    pub content: String,
}

impl ChatLine {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
        }
    }
}

/// Source of lobby candidates and ambient chat.
#[async_trait]
pub trait IdentityFeed: Send + Sync {
    /// Refresh the queues from upstream. Returns how many candidates are queued.
    async fn poll(&self) -> Result<usize, FeedError>;

    /// Take up to `limit` queued candidates.
    fn pop_candidates(&self, limit: usize) -> Vec<AgentProfile>;

    /// Next ambient line, if any.
    fn next_chat_line(&self) -> Option<ChatLine>;
}

/// Feed backed by fixed lists. Candidates are handed out once; chat lines
/// rotate forever.
#[derive(Debug, Default)]
pub struct StaticIdentityFeed {
    candidates: Mutex<VecDeque<AgentProfile>>,
    chat: Mutex<VecDeque<ChatLine>>,
}

impl StaticIdentityFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidates(self, candidates: impl IntoIterator<Item = AgentProfile>) -> Self {
        self.candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(candidates);
        self
    }

    pub fn with_chat(self, lines: impl IntoIterator<Item = ChatLine>) -> Self {
        self.chat
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(lines);
        self
    }

    /// Queue more candidates, e.g. for the next round.
    pub fn push_candidate(&self, profile: AgentProfile) {
        self.candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(profile);
    }

    /// Attach a new post title to a queued candidate, keeping only the latest
    /// few. Returns `false` if `agent` is not queued.
    pub fn record_post(&self, agent: &AgentId, title: impl Into<String>) -> bool {
        let mut queue = self
            .candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match queue.iter_mut().find(|profile| &profile.id == agent) {
            Some(profile) => {
                profile.metadata.push_post(title);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityFeed for StaticIdentityFeed {
    async fn poll(&self) -> Result<usize, FeedError> {
        Ok(self
            .candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len())
    }

    fn pop_candidates(&self, limit: usize) -> Vec<AgentProfile> {
        let mut queue = self
            .candidates
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let take = limit.min(queue.len());
        queue.drain(..take).collect()
    }

    fn next_chat_line(&self) -> Option<ChatLine> {
        let mut lines = self.chat.lock().unwrap_or_else(PoisonError::into_inner);
        let line = lines.pop_front()?;
        lines.push_back(line.clone());
        Some(line)
    }
}
