use std::fmt;

use strum::Display;

use crate::map::{Position, RoomId};

/// Stable identity of an agent, owned by the identity feed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    #[default]
    Crewmate,
    Impostor,
}

/// Cosmetic data carried through from the identity feed untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileMetadata {
    pub avatar: Option<String>,
    pub color: Option<String>,
    pub owner: Option<String>,
    pub owner_avatar: Option<String>,
    pub owner_followers: u64,
    pub karma: i64,
    /// Most recent post titles, oldest first.
    pub posts: Vec<String>,
}

impl ProfileMetadata {
    /// Post titles kept per profile.
    pub const MAX_POSTS: usize = 10;

    /// Remember `title`, dropping the oldest once [`MAX_POSTS`](Self::MAX_POSTS)
    /// is exceeded. A title already present is ignored.
    pub fn push_post(&mut self, title: impl Into<String>) {
        let title = title.into();
        if self.posts.contains(&title) {
            return;
        }
        self.posts.push(title);
        if self.posts.len() > Self::MAX_POSTS {
            let excess = self.posts.len() - Self::MAX_POSTS;
            self.posts.drain(..excess);
        }
    }

    pub fn with_posts<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for title in titles {
            self.push_post(title);
        }
        self
    }
}

/// A candidate player as supplied by the identity feed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentProfile {
    pub id: AgentId,
    pub name: String,
    pub metadata: ProfileMetadata,
}

impl AgentProfile {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metadata: ProfileMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ProfileMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A player on the roster.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: Role,
    /// One-way: once false it never becomes true again within a round.
    pub alive: bool,
    pub room: RoomId,
    pub position: Position,
    /// Puppeted by an external controller instead of the built-in behaviour.
    pub controlled: bool,
    pub metadata: ProfileMetadata,
    /// Logic ticks until this agent may kill again. Only meaningful for impostors.
    pub kill_cooldown: u32,
}

impl Agent {
    pub fn from_profile(profile: AgentProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            role: Role::Crewmate,
            alive: true,
            room: RoomId::SPAWN,
            position: RoomId::SPAWN.center(),
            controlled: false,
            metadata: profile.metadata,
            kill_cooldown: 0,
        }
    }

    pub fn is_impostor(&self) -> bool {
        self.role == Role::Impostor
    }

    pub fn is_live_impostor(&self) -> bool {
        self.alive && self.is_impostor()
    }

    pub fn is_live_crewmate(&self) -> bool {
        self.alive && self.role == Role::Crewmate
    }
}
