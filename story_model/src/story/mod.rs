//! Story definitions - the root of a branching story graph.

mod editing;
mod scene;

pub use editing::*;
pub use scene::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoryId(pub Uuid);

impl StoryId {
    /// Create a new random story ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user, as resolved by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorId(pub Uuid);

impl AuthorId {
    /// Create a new random author ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for AuthorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication status of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    #[default]
    Draft,
    Published,
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryStatus::Draft => write!(f, "draft"),
            StoryStatus::Published => write!(f, "published"),
        }
    }
}

/// A branching story: metadata plus the scene graph it owns.
///
/// Scenes have no lifecycle outside their story. Choices refer to scenes by
/// id only, so the graph may be cyclic without any ownership cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub author: AuthorId,
    pub created_at: DateTime<Utc>,

    /// Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub status: StoryStatus,

    /// Editorial flag.
    #[serde(default)]
    pub featured: bool,

    /// Entry point of the graph. `None` only while the story has no scenes.
    #[serde(default)]
    pub start_scene_id: Option<SceneId>,

    #[serde(default)]
    pub scenes: Vec<StoryScene>,

    /// Optimistic concurrency token, bumped by the persistence layer on save.
    #[serde(default)]
    pub revision: u64,
}

impl Story {
    /// Create an empty draft story.
    pub fn new(author: AuthorId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: StoryId::new(),
            title: title.into(),
            description: String::new(),
            cover_image: None,
            category: None,
            author,
            created_at: now,
            updated_at: now,
            status: StoryStatus::Draft,
            featured: false,
            start_scene_id: None,
            scenes: Vec::new(),
            revision: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_cover_image(mut self, cover_image: impl Into<String>) -> Self {
        self.cover_image = Some(cover_image.into());
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == StoryStatus::Published
    }

    pub fn is_owned_by(&self, author: AuthorId) -> bool {
        self.author == author
    }

    /// Get scene by ID.
    pub fn scene(&self, id: &SceneId) -> Option<&StoryScene> {
        self.scenes.iter().find(|s| &s.id == id)
    }

    /// Get mutable scene by ID.
    pub fn scene_mut(&mut self, id: &SceneId) -> Option<&mut StoryScene> {
        self.scenes.iter_mut().find(|s| &s.id == id)
    }

    pub fn has_scene(&self, id: &SceneId) -> bool {
        self.scene(id).is_some()
    }

    /// The scene named by `start_scene_id`, if both are present.
    pub fn start_scene(&self) -> Option<&StoryScene> {
        self.start_scene_id.as_ref().and_then(|id| self.scene(id))
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Iterate over every choice in scene order, paired with its scene.
    pub fn choices(&self) -> impl Iterator<Item = (&StoryScene, &StoryChoice)> {
        self.scenes
            .iter()
            .flat_map(|scene| scene.choices.iter().map(move |choice| (scene, choice)))
    }

    /// Choices in other scenes that point at `id`.
    pub fn inbound_references(&self, id: &SceneId) -> Vec<ChoiceRef> {
        self.choices()
            .filter(|(scene, choice)| &scene.id != id && &choice.next_scene_id == id)
            .map(|(scene, choice)| ChoiceRef {
                scene_id: scene.id.clone(),
                choice_id: choice.id.clone(),
            })
            .collect()
    }

    /// Record a modification, keeping `updated_at >= created_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
