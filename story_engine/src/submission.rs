//! Content submissions - the typed form of every edit a client can send.
//!
//! Submissions arrive as JSON tagged by `kind` and are checked against
//! [`ContentLimits`] before anything touches a story.

use serde::{Deserialize, Serialize};

use story_model::{
    ChoiceId, RemovalPolicy, SceneId, ScenePatch, Story, StoryChoice, StoryId, StoryScene,
};

use crate::config::{ContentLimits, EngineConfig};
use crate::error::{EngineError, Result};

/// Every known kind of content submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ContentSubmission {
    CreateStory {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        cover_image: Option<String>,
    },

    /// Change story metadata. `None` leaves a field unchanged.
    UpdateMetadata {
        story_id: StoryId,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        cover_image: Option<String>,
    },

    AddScene {
        story_id: StoryId,
        scene: StoryScene,
    },

    UpdateScene {
        story_id: StoryId,
        scene_id: SceneId,
        patch: ScenePatch,
    },

    /// Without a policy the configured default applies.
    RemoveScene {
        story_id: StoryId,
        scene_id: SceneId,
        #[serde(default)]
        policy: Option<RemovalPolicy>,
    },

    AddChoice {
        story_id: StoryId,
        scene_id: SceneId,
        choice: StoryChoice,
    },

    RemoveChoice {
        story_id: StoryId,
        scene_id: SceneId,
        choice_id: ChoiceId,
    },

    RepointChoice {
        story_id: StoryId,
        scene_id: SceneId,
        choice_id: ChoiceId,
        next_scene_id: SceneId,
    },

    SetStartScene {
        story_id: StoryId,
        scene_id: SceneId,
    },

    Publish {
        story_id: StoryId,
    },

    Unpublish {
        story_id: StoryId,
    },
}

impl ContentSubmission {
    /// Parse a submission from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSubmission::CreateStory { .. } => "create_story",
            ContentSubmission::UpdateMetadata { .. } => "update_metadata",
            ContentSubmission::AddScene { .. } => "add_scene",
            ContentSubmission::UpdateScene { .. } => "update_scene",
            ContentSubmission::RemoveScene { .. } => "remove_scene",
            ContentSubmission::AddChoice { .. } => "add_choice",
            ContentSubmission::RemoveChoice { .. } => "remove_choice",
            ContentSubmission::RepointChoice { .. } => "repoint_choice",
            ContentSubmission::SetStartScene { .. } => "set_start_scene",
            ContentSubmission::Publish { .. } => "publish",
            ContentSubmission::Unpublish { .. } => "unpublish",
        }
    }

    /// The story this submission targets; `None` for `CreateStory`.
    pub fn story_id(&self) -> Option<StoryId> {
        match self {
            ContentSubmission::CreateStory { .. } => None,
            ContentSubmission::UpdateMetadata { story_id, .. }
            | ContentSubmission::AddScene { story_id, .. }
            | ContentSubmission::UpdateScene { story_id, .. }
            | ContentSubmission::RemoveScene { story_id, .. }
            | ContentSubmission::AddChoice { story_id, .. }
            | ContentSubmission::RemoveChoice { story_id, .. }
            | ContentSubmission::RepointChoice { story_id, .. }
            | ContentSubmission::SetStartScene { story_id, .. }
            | ContentSubmission::Publish { story_id }
            | ContentSubmission::Unpublish { story_id } => Some(*story_id),
        }
    }

    /// Boundary checks on text fields and ids.
    pub fn check(&self, limits: &ContentLimits) -> Result<()> {
        match self {
            ContentSubmission::CreateStory {
                title, description, ..
            } => {
                check_title(title, limits)?;
                check_len("description", description, limits.max_description_len)
            }
            ContentSubmission::UpdateMetadata {
                title, description, ..
            } => {
                if let Some(title) = title {
                    check_title(title, limits)?;
                }
                if let Some(description) = description {
                    check_len("description", description, limits.max_description_len)?;
                }
                Ok(())
            }
            ContentSubmission::AddScene { scene, .. } => {
                check_id("scene id", scene.id.as_str())?;
                check_len("scene title", &scene.title, limits.max_title_len)?;
                check_len("scene content", &scene.content, limits.max_scene_content_len)?;
                scene
                    .choices
                    .iter()
                    .try_for_each(|choice| check_choice(choice, limits))
            }
            ContentSubmission::UpdateScene { patch, .. } => {
                if let Some(title) = &patch.title {
                    check_len("scene title", title, limits.max_title_len)?;
                }
                if let Some(content) = &patch.content {
                    check_len("scene content", content, limits.max_scene_content_len)?;
                }
                Ok(())
            }
            ContentSubmission::AddChoice { choice, .. } => check_choice(choice, limits),
            ContentSubmission::RepointChoice { next_scene_id, .. } => {
                check_id("next scene id", next_scene_id.as_str())
            }
            ContentSubmission::RemoveScene { .. }
            | ContentSubmission::RemoveChoice { .. }
            | ContentSubmission::SetStartScene { .. }
            | ContentSubmission::Publish { .. }
            | ContentSubmission::Unpublish { .. } => Ok(()),
        }
    }

    /// Apply a graph or metadata edit to `story`.
    ///
    /// `CreateStory`, `Publish` and `Unpublish` are workflow steps handled by
    /// the service and are rejected here.
    pub fn apply(self, story: &mut Story, config: &EngineConfig) -> Result<()> {
        match self {
            ContentSubmission::UpdateMetadata {
                title,
                description,
                category,
                cover_image,
                ..
            } => {
                if let Some(title) = title {
                    story.title = title.trim().to_string();
                }
                if let Some(description) = description {
                    story.description = description;
                }
                if category.is_some() {
                    story.category = category;
                }
                if cover_image.is_some() {
                    story.cover_image = cover_image;
                }
                story.touch();
            }
            ContentSubmission::AddScene { scene, .. } => {
                if story.scene_count() >= config.limits.max_scenes {
                    return Err(EngineError::InvalidSubmission(format!(
                        "story already has the maximum of {} scenes",
                        config.limits.max_scenes
                    )));
                }
                story.add_scene(scene)?;
            }
            ContentSubmission::UpdateScene {
                scene_id, patch, ..
            } => story.update_scene(&scene_id, patch)?,
            ContentSubmission::RemoveScene {
                scene_id, policy, ..
            } => {
                let policy = policy.unwrap_or_else(|| config.removal_policy.to_policy());
                story.remove_scene_with(&scene_id, &policy)?;
            }
            ContentSubmission::AddChoice {
                scene_id, choice, ..
            } => story.add_choice(&scene_id, choice)?,
            ContentSubmission::RemoveChoice {
                scene_id,
                choice_id,
                ..
            } => {
                story.remove_choice(&scene_id, &choice_id)?;
            }
            ContentSubmission::RepointChoice {
                scene_id,
                choice_id,
                next_scene_id,
                ..
            } => story.repoint_choice(&scene_id, &choice_id, next_scene_id)?,
            ContentSubmission::SetStartScene { scene_id, .. } => story.set_start_scene(&scene_id)?,
            other @ (ContentSubmission::CreateStory { .. }
            | ContentSubmission::Publish { .. }
            | ContentSubmission::Unpublish { .. }) => {
                return Err(EngineError::InvalidSubmission(format!(
                    "{} is not a story edit",
                    other.kind()
                )));
            }
        }
        Ok(())
    }
}

fn check_title(title: &str, limits: &ContentLimits) -> Result<()> {
    if title.trim().is_empty() {
        return Err(EngineError::InvalidSubmission("title must not be empty".into()));
    }
    check_len("title", title, limits.max_title_len)
}

fn check_choice(choice: &StoryChoice, limits: &ContentLimits) -> Result<()> {
    check_id("choice id", choice.id.as_str())?;
    check_id("next scene id", choice.next_scene_id.as_str())?;
    if choice.text.trim().is_empty() {
        return Err(EngineError::InvalidSubmission(format!(
            "choice {} has no text",
            choice.id
        )));
    }
    check_len("choice text", &choice.text, limits.max_choice_text_len)
}

fn check_id(field: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(EngineError::InvalidSubmission(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(EngineError::InvalidSubmission(format!(
            "{field} is {len} characters, limit is {max}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_model::AuthorId;

    #[test]
    fn test_parse_tagged_json() {
        let story_id = StoryId::new();
        let json = format!(
            r#"{{"kind":"add_choice","storyId":"{story_id}","sceneId":"A",
                "choice":{{"id":"c1","text":"Go","nextSceneId":"B"}}}}"#
        );

        let submission = ContentSubmission::from_json(&json).unwrap();
        assert_eq!(submission.kind(), "add_choice");
        assert_eq!(submission.story_id(), Some(story_id));
        assert!(matches!(
            submission,
            ContentSubmission::AddChoice { ref choice, .. } if choice.next_scene_id == SceneId::new("B")
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = ContentSubmission::from_json(r#"{"kind":"run_script","code":"rm -rf"}"#).unwrap_err();
        assert!(matches!(err, EngineError::Serialization(_)));
    }

    #[test]
    fn test_title_checks() {
        let limits = ContentLimits::default();

        let blank = ContentSubmission::CreateStory {
            title: "   ".into(),
            description: String::new(),
            category: None,
            cover_image: None,
        };
        assert!(matches!(blank.check(&limits), Err(EngineError::InvalidSubmission(_))));

        let long = ContentSubmission::CreateStory {
            title: "x".repeat(limits.max_title_len + 1),
            description: String::new(),
            category: None,
            cover_image: None,
        };
        assert!(long.check(&limits).is_err());
    }

    #[test]
    fn test_choice_checks() {
        let limits = ContentLimits::default();
        let add = |text: &str, next: &str| ContentSubmission::AddChoice {
            story_id: StoryId::new(),
            scene_id: SceneId::new("A"),
            choice: StoryChoice::new("c1", text, next),
        };

        assert!(add("Go", "B").check(&limits).is_ok());
        assert!(add("", "B").check(&limits).is_err());
        assert!(add("Go", "").check(&limits).is_err());
    }

    #[test]
    fn test_apply_remove_scene_uses_configured_policy() {
        let mut story = Story::new(AuthorId::new(), "T");
        story
            .add_scene(StoryScene::new("A", "A").with_choice(StoryChoice::new("c1", "Go", "B")))
            .unwrap();
        story.add_scene(StoryScene::new("B", "B").ending()).unwrap();

        let removal = ContentSubmission::RemoveScene {
            story_id: story.id,
            scene_id: SceneId::new("B"),
            policy: None,
        };

        let config = EngineConfig::default();
        let err = removal.clone().apply(&mut story, &config).unwrap_err();
        assert!(matches!(err, EngineError::Graph(_)));

        let mut config = EngineConfig::default();
        config.removal_policy = crate::config::RemovalPolicySetting::RepointToStart;
        removal.apply(&mut story, &config).unwrap();
        assert!(!story.has_scene(&SceneId::new("B")));
    }

    #[test]
    fn test_apply_update_metadata() {
        let mut story = Story::new(AuthorId::new(), "Old").with_description("Kept as is.");

        ContentSubmission::UpdateMetadata {
            story_id: story.id,
            title: Some("  New  ".into()),
            description: None,
            category: Some("mystery".into()),
            cover_image: Some("covers/new.png".into()),
        }
        .apply(&mut story, &EngineConfig::default())
        .unwrap();

        assert_eq!(story.title, "New");
        assert_eq!(story.description, "Kept as is.");
        assert_eq!(story.category.as_deref(), Some("mystery"));
        assert_eq!(story.cover_image.as_deref(), Some("covers/new.png"));

        ContentSubmission::UpdateMetadata {
            story_id: story.id,
            title: None,
            description: None,
            category: None,
            cover_image: None,
        }
        .apply(&mut story, &EngineConfig::default())
        .unwrap();

        assert_eq!(story.title, "New");
        assert_eq!(story.category.as_deref(), Some("mystery"));
        assert_eq!(story.cover_image.as_deref(), Some("covers/new.png"));
    }

    #[test]
    fn test_update_scene_json_clears_image() {
        let mut story = Story::new(AuthorId::new(), "T");
        story
            .add_scene(StoryScene::new("A", "A").with_image("img/a.png").ending())
            .unwrap();

        let json = format!(
            r#"{{"kind":"update_scene","storyId":"{}","sceneId":"A","patch":{{"clearImage":true}}}}"#,
            story.id
        );
        ContentSubmission::from_json(&json)
            .unwrap()
            .apply(&mut story, &EngineConfig::default())
            .unwrap();

        assert!(story.scene(&SceneId::new("A")).unwrap().image.is_none());
    }

    #[test]
    fn test_apply_rejects_workflow_steps() {
        let mut story = Story::new(AuthorId::new(), "T");
        let publish = ContentSubmission::Publish { story_id: story.id };

        let err = publish.apply(&mut story, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSubmission(_)));
    }

    #[test]
    fn test_apply_enforces_scene_limit() {
        let mut config = EngineConfig::default();
        config.limits.max_scenes = 1;
        let mut story = Story::new(AuthorId::new(), "T");
        story.add_scene(StoryScene::new("A", "A")).unwrap();

        let add = ContentSubmission::AddScene {
            story_id: story.id,
            scene: StoryScene::new("B", "B"),
        };
        assert!(matches!(
            add.apply(&mut story, &config),
            Err(EngineError::InvalidSubmission(_))
        ));
    }
}
