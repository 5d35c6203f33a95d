//! Scenes and choices - the nodes and edges of a story graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a scene, unique within its story.
///
/// Scene ids are author-facing strings rather than UUIDs so hand-written
/// stories can use short names like `"intro"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a random scene id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SceneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a choice, unique within its scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceId(String);

impl ChoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a random choice id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChoiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ChoiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Fully qualified address of a choice inside a story.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRef {
    pub scene_id: SceneId,
    pub choice_id: ChoiceId,
}

impl fmt::Display for ChoiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scene_id, self.choice_id)
    }
}

/// A labelled edge from one scene to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChoice {
    pub id: ChoiceId,

    /// Label shown to the reader.
    pub text: String,

    /// Target scene, resolved by lookup in the owning story.
    pub next_scene_id: SceneId,
}

impl StoryChoice {
    pub fn new(
        id: impl Into<ChoiceId>,
        text: impl Into<String>,
        next_scene_id: impl Into<SceneId>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_scene_id: next_scene_id.into(),
        }
    }
}

/// A page of story content with its outgoing choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryScene {
    pub id: SceneId,
    pub title: String,

    #[serde(default)]
    pub content: String,

    /// Optional image reference (URL or storage key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Optional audio reference (URL or storage key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,

    #[serde(default)]
    pub choices: Vec<StoryChoice>,

    /// Ending scenes terminate a reading session.
    #[serde(default)]
    pub is_ending: bool,
}

impl StoryScene {
    /// Create a scene with no content and no choices.
    pub fn new(id: impl Into<SceneId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            image: None,
            audio: None,
            choices: Vec::new(),
            is_ending: false,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Append a choice. Ids are not checked here; use `Story::add_choice`
    /// once the scene belongs to a story.
    pub fn with_choice(mut self, choice: StoryChoice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Mark the scene as an ending.
    pub fn ending(mut self) -> Self {
        self.is_ending = true;
        self
    }

    pub fn choice(&self, id: &ChoiceId) -> Option<&StoryChoice> {
        self.choices.iter().find(|c| &c.id == id)
    }

    pub fn has_choice(&self, id: &ChoiceId) -> bool {
        self.choice(id).is_some()
    }

    /// A scene a reader would be stuck on: no way forward and not an ending.
    pub fn is_dead_end(&self) -> bool {
        self.choices.is_empty() && !self.is_ending
    }
}
