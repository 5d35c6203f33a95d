//! Reader and author profiles, with the social edges between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Result, StoryError};
use crate::story::{AuthorId, StoryId};

/// A user's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: AuthorId,
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub bio: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub liked_stories: BTreeSet<StoryId>,

    /// Reading list.
    #[serde(default)]
    pub saved_stories: BTreeSet<StoryId>,

    #[serde(default)]
    pub following: BTreeSet<AuthorId>,
}

impl Profile {
    pub fn new(id: AuthorId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: None,
            bio: String::new(),
            avatar: None,
            created_at: Utc::now(),
            liked_stories: BTreeSet::new(),
            saved_stories: BTreeSet::new(),
            following: BTreeSet::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    /// Name to show in the UI: display name if set, otherwise username.
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Returns `true` if the like is new.
    pub fn like(&mut self, story: StoryId) -> bool {
        self.liked_stories.insert(story)
    }

    /// Returns `true` if the story was liked.
    pub fn unlike(&mut self, story: StoryId) -> bool {
        self.liked_stories.remove(&story)
    }

    pub fn has_liked(&self, story: StoryId) -> bool {
        self.liked_stories.contains(&story)
    }

    pub fn save_story(&mut self, story: StoryId) -> bool {
        self.saved_stories.insert(story)
    }

    pub fn unsave_story(&mut self, story: StoryId) -> bool {
        self.saved_stories.remove(&story)
    }

    pub fn has_saved(&self, story: StoryId) -> bool {
        self.saved_stories.contains(&story)
    }

    /// Follow another author. Returns `true` if the follow is new.
    pub fn follow(&mut self, author: AuthorId) -> Result<bool> {
        if author == self.id {
            return Err(StoryError::SelfFollow);
        }
        Ok(self.following.insert(author))
    }

    pub fn unfollow(&mut self, author: AuthorId) -> bool {
        self.following.remove(&author)
    }

    pub fn is_following(&self, author: AuthorId) -> bool {
        self.following.contains(&author)
    }
}
