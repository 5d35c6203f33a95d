//! Errors raised by local story and profile edits.

use std::fmt;
use thiserror::Error;

use crate::story::{ChoiceRef, SceneId};

/// Which kind of id an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Scene,
    Choice,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Scene => write!(f, "scene"),
            IdKind::Choice => write!(f, "choice"),
        }
    }
}

/// Errors produced by the scene graph model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoryError {
    /// An id is already taken within its owning collection.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: IdKind, id: String },

    /// A scene or choice id does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: IdKind, id: String },

    /// The scene is still the target of choices in other scenes.
    #[error("scene {scene} is still referenced by {} choice(s)", .referenced_by.len())]
    ReferencedScene {
        scene: SceneId,
        referenced_by: Vec<ChoiceRef>,
    },

    /// The start scene cannot be removed; move the start elsewhere first.
    #[error("scene {0} is the start scene and cannot be removed")]
    StartSceneRemoval(SceneId),

    /// A cascade repoint named a target that is missing or is the removed scene.
    #[error("cannot repoint choices to scene {0}")]
    InvalidRepointTarget(SceneId),

    /// A profile tried to follow itself.
    #[error("a profile cannot follow itself")]
    SelfFollow,
}

impl StoryError {
    pub(crate) fn scene_not_found(id: &SceneId) -> Self {
        StoryError::NotFound {
            kind: IdKind::Scene,
            id: id.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoryError>;
