//! Validation report - every structural problem found in one pass.

use serde::{Deserialize, Serialize};
use std::fmt;

use story_model::{ChoiceId, SceneId};

/// A single structural problem in a story graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ValidationIssue {
    /// No start scene is set, or it names a scene that does not exist.
    MissingStartScene { start_scene_id: Option<SceneId> },

    DuplicateSceneId { scene_id: SceneId },

    DuplicateChoiceId { scene_id: SceneId, choice_id: ChoiceId },

    /// A choice targets a scene that does not exist.
    DanglingReference {
        scene_id: SceneId,
        choice_id: ChoiceId,
        target: SceneId,
    },

    /// A non-ending scene with no choices.
    DeadEnd { scene_id: SceneId },

    NoReachableEnding,

    /// Never visited from the start scene.
    UnreachableScene { scene_id: SceneId },

    /// An ending that still carries choices; they are never offered.
    EndingWithChoices { scene_id: SceneId },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingStartScene { start_scene_id: None } => {
                write!(f, "missing start scene")
            }
            ValidationIssue::MissingStartScene {
                start_scene_id: Some(id),
            } => write!(f, "start scene {} not found", id),
            ValidationIssue::DuplicateSceneId { scene_id } => {
                write!(f, "duplicate scene id: {}", scene_id)
            }
            ValidationIssue::DuplicateChoiceId {
                scene_id,
                choice_id,
            } => write!(f, "duplicate choice id: {} in scene {}", choice_id, scene_id),
            ValidationIssue::DanglingReference {
                choice_id, target, ..
            } => write!(f, "dangling reference: {} -> {}", choice_id, target),
            ValidationIssue::DeadEnd { scene_id } => {
                write!(f, "dead end: scene {} has no choices and is not an ending", scene_id)
            }
            ValidationIssue::NoReachableEnding => {
                write!(f, "no ending is reachable from the start scene")
            }
            ValidationIssue::UnreachableScene { scene_id } => {
                write!(f, "unreachable scene: {}", scene_id)
            }
            ValidationIssue::EndingWithChoices { scene_id } => {
                write!(f, "ending scene {} has choices that are never offered", scene_id)
            }
        }
    }
}

/// Outcome of validating a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,

    /// Number of ending scenes reachable from the start scene.
    pub reachable_endings: usize,

    /// Scenes never visited from the start scene, in story order.
    pub unreachable_scenes: Vec<SceneId>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Error messages, in report order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn has_dangling_references(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, ValidationIssue::DanglingReference { .. }))
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            write!(f, "valid")?;
        } else {
            write!(f, "invalid ({} error(s))", self.errors.len())?;
        }
        if !self.warnings.is_empty() {
            write!(f, ", {} warning(s)", self.warnings.len())?;
        }
        for issue in &self.errors {
            write!(f, "\n  error: {}", issue)?;
        }
        for issue in &self.warnings {
            write!(f, "\n  warning: {}", issue)?;
        }
        Ok(())
    }
}
