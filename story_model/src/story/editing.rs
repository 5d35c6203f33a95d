//! Local, synchronous edits to a story graph.
//!
//! Edits keep ids unique and the start reference intact, but they never run a
//! whole-graph check: an author may leave choices pointing at scenes that do
//! not exist yet. Publishability is decided by the validator in `story_engine`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{ChoiceId, SceneId, Story, StoryChoice, StoryScene};
use crate::error::{IdKind, Result, StoryError};

/// What to do with inbound choices when their target scene is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Refuse to remove a referenced scene.
    #[default]
    Reject,
    /// Point inbound choices at the start scene.
    RepointToStart,
    /// Point inbound choices at the given scene.
    RepointTo(SceneId),
}

/// Partial update of a scene's content. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    /// Remove the image. Wins over `image`.
    #[serde(default)]
    pub clear_image: bool,
    /// Remove the audio. Wins over `audio`.
    #[serde(default)]
    pub clear_audio: bool,
    #[serde(default)]
    pub is_ending: Option<bool>,
}

impl Story {
    /// Add a scene. The first scene of an empty story becomes the start scene.
    pub fn add_scene(&mut self, scene: StoryScene) -> Result<()> {
        if self.has_scene(&scene.id) {
            return Err(StoryError::DuplicateId {
                kind: IdKind::Scene,
                id: scene.id.to_string(),
            });
        }

        let mut choice_ids = HashSet::new();
        if let Some(dup) = scene.choices.iter().find(|c| !choice_ids.insert(&c.id)) {
            return Err(StoryError::DuplicateId {
                kind: IdKind::Choice,
                id: dup.id.to_string(),
            });
        }

        if self.start_scene_id.is_none() {
            self.start_scene_id = Some(scene.id.clone());
        }

        self.scenes.push(scene);
        self.touch();
        Ok(())
    }

    /// Remove a scene, rejecting the removal if any other scene points at it.
    pub fn remove_scene(&mut self, id: &SceneId) -> Result<StoryScene> {
        self.remove_scene_with(id, &RemovalPolicy::Reject)
    }

    /// Remove a scene, handling inbound choices according to `policy`.
    ///
    /// The start scene can never be removed. Choices inside the removed scene
    /// go with it and do not count as inbound references.
    pub fn remove_scene_with(&mut self, id: &SceneId, policy: &RemovalPolicy) -> Result<StoryScene> {
        let index = self
            .scenes
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| StoryError::scene_not_found(id))?;

        if self.start_scene_id.as_ref() == Some(id) {
            return Err(StoryError::StartSceneRemoval(id.clone()));
        }

        let inbound = self.inbound_references(id);
        if !inbound.is_empty() {
            let target = match policy {
                RemovalPolicy::Reject => {
                    return Err(StoryError::ReferencedScene {
                        scene: id.clone(),
                        referenced_by: inbound,
                    });
                }
                RemovalPolicy::RepointToStart => match &self.start_scene_id {
                    Some(start) => start.clone(),
                    None => return Err(StoryError::InvalidRepointTarget(id.clone())),
                },
                RemovalPolicy::RepointTo(target) => target.clone(),
            };

            if &target == id || !self.has_scene(&target) {
                return Err(StoryError::InvalidRepointTarget(target));
            }

            for reference in &inbound {
                if let Some(choice) = self
                    .scene_mut(&reference.scene_id)
                    .and_then(|s| s.choices.iter_mut().find(|c| c.id == reference.choice_id))
                {
                    choice.next_scene_id = target.clone();
                }
            }

            tracing::debug!(
                story_id = %self.id,
                removed = %id,
                target = %target,
                repointed = inbound.len(),
                "Repointed inbound choices before scene removal"
            );
        }

        let removed = self.scenes.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Apply a partial content update to a scene.
    pub fn update_scene(&mut self, id: &SceneId, patch: ScenePatch) -> Result<()> {
        let scene = self
            .scene_mut(id)
            .ok_or_else(|| StoryError::scene_not_found(id))?;

        if let Some(title) = patch.title {
            scene.title = title;
        }
        if let Some(content) = patch.content {
            scene.content = content;
        }
        if patch.clear_image {
            scene.image = None;
        } else if let Some(image) = patch.image {
            scene.image = Some(image);
        }
        if patch.clear_audio {
            scene.audio = None;
        } else if let Some(audio) = patch.audio {
            scene.audio = Some(audio);
        }
        if let Some(is_ending) = patch.is_ending {
            scene.is_ending = is_ending;
        }

        self.touch();
        Ok(())
    }

    /// Add a choice to a scene. The target scene is not checked.
    pub fn add_choice(&mut self, scene_id: &SceneId, choice: StoryChoice) -> Result<()> {
        let scene = self
            .scene_mut(scene_id)
            .ok_or_else(|| StoryError::scene_not_found(scene_id))?;

        if scene.has_choice(&choice.id) {
            return Err(StoryError::DuplicateId {
                kind: IdKind::Choice,
                id: choice.id.to_string(),
            });
        }

        scene.choices.push(choice);
        self.touch();
        Ok(())
    }

    /// Remove a choice from a scene.
    pub fn remove_choice(&mut self, scene_id: &SceneId, choice_id: &ChoiceId) -> Result<StoryChoice> {
        let scene = self
            .scene_mut(scene_id)
            .ok_or_else(|| StoryError::scene_not_found(scene_id))?;

        let index = scene
            .choices
            .iter()
            .position(|c| &c.id == choice_id)
            .ok_or_else(|| choice_not_found(choice_id))?;

        let removed = scene.choices.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Point an existing choice at a different scene.
    pub fn repoint_choice(
        &mut self,
        scene_id: &SceneId,
        choice_id: &ChoiceId,
        next_scene_id: SceneId,
    ) -> Result<()> {
        let scene = self
            .scene_mut(scene_id)
            .ok_or_else(|| StoryError::scene_not_found(scene_id))?;

        let choice = scene
            .choices
            .iter_mut()
            .find(|c| &c.id == choice_id)
            .ok_or_else(|| choice_not_found(choice_id))?;

        choice.next_scene_id = next_scene_id;
        self.touch();
        Ok(())
    }

    /// Set the entry point of the story.
    pub fn set_start_scene(&mut self, id: &SceneId) -> Result<()> {
        if !self.has_scene(id) {
            return Err(StoryError::scene_not_found(id));
        }

        self.start_scene_id = Some(id.clone());
        self.touch();
        Ok(())
    }
}

fn choice_not_found(id: &ChoiceId) -> StoryError {
    StoryError::NotFound {
        kind: IdKind::Choice,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::AuthorId;

    fn branching_story() -> Story {
        let mut story = Story::new(AuthorId::new(), "Crossroads");
        story
            .add_scene(
                StoryScene::new("A", "Crossroads")
                    .with_choice(StoryChoice::new("left", "Go left", "B"))
                    .with_choice(StoryChoice::new("right", "Go right", "C")),
            )
            .unwrap();
        story
            .add_scene(StoryScene::new("B", "Forest").with_choice(StoryChoice::new("on", "Continue", "D")))
            .unwrap();
        story
            .add_scene(StoryScene::new("C", "River").with_choice(StoryChoice::new("swim", "Swim", "D")))
            .unwrap();
        story.add_scene(StoryScene::new("D", "Home").ending()).unwrap();
        story
    }

    #[test]
    fn test_first_scene_becomes_start() {
        let story = branching_story();
        assert_eq!(story.start_scene_id, Some(SceneId::new("A")));
    }

    #[test]
    fn test_add_scene_rejects_duplicate() {
        let mut story = branching_story();
        let err = story.add_scene(StoryScene::new("B", "Again")).unwrap_err();

        assert!(matches!(err, StoryError::DuplicateId { kind: IdKind::Scene, ref id } if id == "B"));
        assert_eq!(story.scene_count(), 4);
    }

    #[test]
    fn test_add_scene_rejects_duplicate_choice_ids() {
        let mut story = branching_story();
        let scene = StoryScene::new("E", "Fork")
            .with_choice(StoryChoice::new("c1", "This way", "A"))
            .with_choice(StoryChoice::new("c1", "That way", "D"));

        let err = story.add_scene(scene).unwrap_err();
        assert!(matches!(err, StoryError::DuplicateId { kind: IdKind::Choice, ref id } if id == "c1"));
        assert!(!story.has_scene(&SceneId::new("E")));
    }

    #[test]
    fn test_remove_referenced_scene_is_rejected() {
        let mut story = branching_story();
        let err = story.remove_scene(&SceneId::new("D")).unwrap_err();

        match err {
            StoryError::ReferencedScene { scene, referenced_by } => {
                assert_eq!(scene, SceneId::new("D"));
                assert_eq!(referenced_by.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(story.has_scene(&SceneId::new("D")));
    }

    #[test]
    fn test_remove_unreferenced_scene() {
        let mut story = branching_story();
        story.add_scene(StoryScene::new("E", "Draft branch")).unwrap();

        let removed = story.remove_scene(&SceneId::new("E")).unwrap();
        assert_eq!(removed.title, "Draft branch");
        assert!(!story.has_scene(&SceneId::new("E")));
    }

    #[test]
    fn test_remove_missing_scene() {
        let mut story = branching_story();
        let err = story.remove_scene(&SceneId::new("nope")).unwrap_err();
        assert!(matches!(err, StoryError::NotFound { kind: IdKind::Scene, .. }));
    }

    #[test]
    fn test_start_scene_cannot_be_removed() {
        let mut story = branching_story();
        let err = story
            .remove_scene_with(&SceneId::new("A"), &RemovalPolicy::RepointToStart)
            .unwrap_err();
        assert_eq!(err, StoryError::StartSceneRemoval(SceneId::new("A")));
    }

    #[test]
    fn test_cascade_repoint_to_named_scene() {
        let mut story = branching_story();
        story
            .remove_scene_with(&SceneId::new("B"), &RemovalPolicy::RepointTo(SceneId::new("C")))
            .unwrap();

        let left = story.scene(&SceneId::new("A")).unwrap().choice(&ChoiceId::new("left")).unwrap();
        assert_eq!(left.next_scene_id, SceneId::new("C"));
        assert!(!story.has_scene(&SceneId::new("B")));
    }

    #[test]
    fn test_cascade_repoint_to_start() {
        let mut story = branching_story();
        story
            .remove_scene_with(&SceneId::new("D"), &RemovalPolicy::RepointToStart)
            .unwrap();

        let swim = story.scene(&SceneId::new("C")).unwrap().choice(&ChoiceId::new("swim")).unwrap();
        assert_eq!(swim.next_scene_id, SceneId::new("A"));
    }

    #[test]
    fn test_cascade_repoint_rejects_bad_target() {
        let mut story = branching_story();

        let err = story
            .remove_scene_with(&SceneId::new("B"), &RemovalPolicy::RepointTo(SceneId::new("B")))
            .unwrap_err();
        assert_eq!(err, StoryError::InvalidRepointTarget(SceneId::new("B")));

        let err = story
            .remove_scene_with(&SceneId::new("B"), &RemovalPolicy::RepointTo(SceneId::new("Z")))
            .unwrap_err();
        assert_eq!(err, StoryError::InvalidRepointTarget(SceneId::new("Z")));
        assert!(story.has_scene(&SceneId::new("B")));
    }

    #[test]
    fn test_add_choice() {
        let mut story = branching_story();
        story
            .add_choice(&SceneId::new("D"), StoryChoice::new("again", "Play again", "A"))
            .unwrap();
        assert!(story.scene(&SceneId::new("D")).unwrap().has_choice(&ChoiceId::new("again")));

        let err = story
            .add_choice(&SceneId::new("A"), StoryChoice::new("left", "Dup", "B"))
            .unwrap_err();
        assert!(matches!(err, StoryError::DuplicateId { kind: IdKind::Choice, .. }));

        let err = story
            .add_choice(&SceneId::new("Q"), StoryChoice::new("x", "X", "A"))
            .unwrap_err();
        assert!(matches!(err, StoryError::NotFound { kind: IdKind::Scene, .. }));
    }

    #[test]
    fn test_add_choice_allows_missing_target() {
        let mut story = branching_story();
        story
            .add_choice(&SceneId::new("A"), StoryChoice::new("up", "Climb", "not-written-yet"))
            .unwrap();
        assert_eq!(story.scene(&SceneId::new("A")).unwrap().choices.len(), 3);
    }

    #[test]
    fn test_remove_and_repoint_choice() {
        let mut story = branching_story();

        story
            .repoint_choice(&SceneId::new("A"), &ChoiceId::new("right"), SceneId::new("D"))
            .unwrap();
        let right = story.scene(&SceneId::new("A")).unwrap().choice(&ChoiceId::new("right")).unwrap();
        assert_eq!(right.next_scene_id, SceneId::new("D"));

        let removed = story
            .remove_choice(&SceneId::new("A"), &ChoiceId::new("left"))
            .unwrap();
        assert_eq!(removed.text, "Go left");

        let err = story
            .remove_choice(&SceneId::new("A"), &ChoiceId::new("left"))
            .unwrap_err();
        assert!(matches!(err, StoryError::NotFound { kind: IdKind::Choice, .. }));
    }

    #[test]
    fn test_set_start_scene() {
        let mut story = branching_story();
        story.set_start_scene(&SceneId::new("C")).unwrap();
        assert_eq!(story.start_scene_id, Some(SceneId::new("C")));

        assert!(story.set_start_scene(&SceneId::new("Z")).is_err());
        assert_eq!(story.start_scene_id, Some(SceneId::new("C")));
    }

    #[test]
    fn test_update_scene() {
        let mut story = branching_story();
        story
            .update_scene(
                &SceneId::new("B"),
                ScenePatch {
                    content: Some("Tall pines.".into()),
                    image: Some("img/pines.jpg".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let scene = story.scene(&SceneId::new("B")).unwrap();
        assert_eq!(scene.title, "Forest");
        assert_eq!(scene.content, "Tall pines.");
        assert_eq!(scene.image.as_deref(), Some("img/pines.jpg"));
    }

    #[test]
    fn test_update_scene_clears_media() {
        let mut story = branching_story();
        story
            .update_scene(
                &SceneId::new("B"),
                ScenePatch {
                    image: Some("img/pines.jpg".into()),
                    audio: Some("audio/wind.ogg".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        story
            .update_scene(
                &SceneId::new("B"),
                ScenePatch {
                    clear_image: true,
                    ..Default::default()
                },
            )
            .unwrap();

        let scene = story.scene(&SceneId::new("B")).unwrap();
        assert!(scene.image.is_none());
        assert_eq!(scene.audio.as_deref(), Some("audio/wind.ogg"));
    }

    #[test]
    fn test_edits_keep_timestamps_ordered() {
        let mut story = branching_story();
        story.add_scene(StoryScene::new("E", "Epilogue").ending()).unwrap();
        assert!(story.updated_at >= story.created_at);
    }
}
