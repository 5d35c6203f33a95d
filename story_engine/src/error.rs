use story_model::{ChoiceId, ChoiceRef, SceneId, StoryError, StoryId};
use thiserror::Error;

use crate::validator::ValidationReport;

/// Errors produced by the engine layer.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A local graph edit failed.
    #[error(transparent)]
    Graph(#[from] StoryError),

    /// The story cannot be read, e.g. its start scene is missing.
    #[error("story {story_id} cannot be read: {reason}")]
    InvalidStory { story_id: StoryId, reason: String },

    /// The choice is not offered by the current scene.
    #[error("choice {choice_id} is not available in scene {scene_id}")]
    InvalidChoice { scene_id: SceneId, choice_id: ChoiceId },

    /// A choice points at a scene that does not exist.
    #[error("dangling reference: {choice} -> {target}")]
    DanglingReference { choice: ChoiceRef, target: SceneId },

    /// Back-navigation with an empty history.
    #[error("no earlier scene to go back to")]
    NoHistory,

    /// The story failed validation; the report lists every problem.
    #[error("story failed validation with {} error(s)", .0.errors.len())]
    Validation(Box<ValidationReport>),

    /// Optimistic concurrency failure in the persistence layer.
    #[error("revision conflict on story {story_id}: expected {expected}, found {found}")]
    Conflict {
        story_id: StoryId,
        expected: u64,
        found: u64,
    },

    #[error("story not found: {0}")]
    StoryNotFound(StoryId),

    /// The current actor may not perform the action.
    #[error("not allowed to {action}")]
    Forbidden { action: String },

    /// A content submission was rejected at the boundary.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn forbidden(action: impl Into<String>) -> Self {
        EngineError::Forbidden {
            action: action.into(),
        }
    }

    /// The validator report, if this is a validation failure.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            EngineError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
