//! Per-meeting record of chat lines and votes.
use std::collections::BTreeMap;

use crate::state::{AgentId, VoteTarget};

/// A line spoken during a meeting.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeetingMessage {
    pub sender: AgentId,
    pub content: String,
}

/// Votes and chat for the meeting in progress.
///
/// Writes are ignored while no meeting is active.
#[derive(Clone, Debug, Default)]
pub struct MeetingLedger {
    active: bool,
    messages: Vec<MeetingMessage>,
    votes: BTreeMap<AgentId, VoteTarget>,
}

impl MeetingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear chat and votes and open a new meeting.
    pub fn start(&mut self) {
        self.messages.clear();
        self.votes.clear();
        self.active = true;
    }

    pub fn end(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn add_message(&mut self, sender: AgentId, content: impl Into<String>) {
        if !self.active {
            return;
        }
        self.messages.push(MeetingMessage {
            sender,
            content: content.into(),
        });
    }

    /// Record `voter`'s ballot. Returns `false` when no meeting is active or
    /// the voter has already voted.
    pub fn cast_vote(&mut self, voter: AgentId, target: VoteTarget) -> bool {
        if !self.active || self.votes.contains_key(&voter) {
            return false;
        }
        self.votes.insert(voter, target);
        true
    }

    pub fn has_voted(&self, voter: &AgentId) -> bool {
        self.votes.contains_key(voter)
    }

    pub fn votes(&self) -> &BTreeMap<AgentId, VoteTarget> {
        &self.votes
    }

    pub fn messages(&self) -> &[MeetingMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AgentId {
        AgentId::from(s)
    }

    #[test]
    fn inactive_ledger_ignores_writes() {
        let mut ledger = MeetingLedger::new();
        ledger.add_message(id("a"), "hello");
        assert!(!ledger.cast_vote(id("a"), VoteTarget::Skip));
        assert!(ledger.messages().is_empty());
        assert!(ledger.votes().is_empty());
    }

    #[test]
    fn first_vote_wins() {
        let mut ledger = MeetingLedger::new();
        ledger.start();
        assert!(ledger.cast_vote(id("a"), VoteTarget::Agent(id("b"))));
        assert!(!ledger.cast_vote(id("a"), VoteTarget::Skip));
        assert_eq!(
            ledger.votes().get(&id("a")),
            Some(&VoteTarget::Agent(id("b")))
        );
    }

    #[test]
    fn start_resets_previous_meeting() {
        let mut ledger = MeetingLedger::new();
        ledger.start();
        ledger.add_message(id("a"), "sus");
        ledger.cast_vote(id("a"), VoteTarget::Skip);
        ledger.end();
        assert!(!ledger.is_active());
        // Records survive until the next meeting starts.
        assert_eq!(ledger.messages().len(), 1);

        ledger.start();
        assert!(ledger.is_active());
        assert!(ledger.messages().is_empty());
        assert!(!ledger.has_voted(&id("a")));
    }
}
