//! Traversal Engine - drives a reader through a story graph.
//!
//! A [`ReadingSession`] holds only the reader's position and a linear history
//! for back-navigation. The story itself is passed in on every call, so one
//! published story can serve any number of sessions. Cycles in the graph are
//! allowed; the session never walks on its own, so it cannot loop.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use story_model::{ChoiceId, ChoiceRef, SceneId, Story, StoryChoice, StoryId, StoryScene};

use crate::error::{EngineError, Result};

/// Configuration for reading sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    /// Maximum back-navigation entries kept; 0 keeps everything.
    /// Env: `TALESCAPES_MAX_HISTORY`
    pub max_history: usize,
}

/// A reader's position in a story.
///
/// Serializable so progress can be stored and resumed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSession {
    story_id: StoryId,
    current_scene_id: SceneId,
    history: VecDeque<SceneId>,
    #[serde(default)]
    max_history: usize,
}

impl ReadingSession {
    /// Begin reading at the story's start scene.
    pub fn start(story: &Story) -> Result<Self> {
        Self::start_with(story, &ReadingConfig::default())
    }

    pub fn start_with(story: &Story, config: &ReadingConfig) -> Result<Self> {
        let start = start_scene_of(story)?;

        tracing::debug!(story_id = %story.id, scene = %start.id, "Reading session started");

        Ok(Self {
            story_id: story.id,
            current_scene_id: start.id.clone(),
            history: VecDeque::new(),
            max_history: config.max_history,
        })
    }

    pub fn story_id(&self) -> StoryId {
        self.story_id
    }

    pub fn current_scene_id(&self) -> &SceneId {
        &self.current_scene_id
    }

    /// Previously visited scenes, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &SceneId> {
        self.history.iter()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Resolve the current scene against `story`.
    pub fn current_scene<'s>(&self, story: &'s Story) -> Result<&'s StoryScene> {
        self.check_story(story)?;
        story
            .scene(&self.current_scene_id)
            .ok_or_else(|| EngineError::InvalidStory {
                story_id: story.id,
                reason: format!("current scene {} no longer exists", self.current_scene_id),
            })
    }

    /// Choices offered to the reader. Empty at an ending.
    pub fn available_choices<'s>(&self, story: &'s Story) -> Result<&'s [StoryChoice]> {
        let scene = self.current_scene(story)?;
        if scene.is_ending {
            Ok(&scene.choices[..0])
        } else {
            Ok(&scene.choices)
        }
    }

    /// Follow a choice of the current scene and return the scene it leads to.
    pub fn choose<'s>(&mut self, story: &'s Story, choice_id: &ChoiceId) -> Result<&'s StoryScene> {
        let current = self.current_scene(story)?;

        let choice = current
            .choice(choice_id)
            .filter(|_| !current.is_ending)
            .ok_or_else(|| EngineError::InvalidChoice {
                scene_id: current.id.clone(),
                choice_id: choice_id.clone(),
            })?;

        let next = story
            .scene(&choice.next_scene_id)
            .ok_or_else(|| EngineError::DanglingReference {
                choice: ChoiceRef {
                    scene_id: current.id.clone(),
                    choice_id: choice.id.clone(),
                },
                target: choice.next_scene_id.clone(),
            })?;

        if self.max_history > 0 && self.history.len() >= self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(current.id.clone());
        self.current_scene_id = next.id.clone();

        tracing::debug!(
            story_id = %story.id,
            from = %current.id,
            choice = %choice.id,
            to = %next.id,
            "Choice taken"
        );

        Ok(next)
    }

    /// Return to the previous scene.
    pub fn back(&mut self) -> Result<&SceneId> {
        let previous = self.history.pop_back().ok_or(EngineError::NoHistory)?;
        self.current_scene_id = previous;
        Ok(&self.current_scene_id)
    }

    /// `true` iff the current scene is an ending.
    pub fn is_at_ending(&self, story: &Story) -> bool {
        self.current_scene(story)
            .map(|scene| scene.is_ending)
            .unwrap_or(false)
    }

    /// Go back to the start scene and forget the history.
    pub fn restart(&mut self, story: &Story) -> Result<()> {
        self.check_story(story)?;
        let start = start_scene_of(story)?;
        self.current_scene_id = start.id.clone();
        self.history.clear();
        Ok(())
    }

    fn check_story(&self, story: &Story) -> Result<()> {
        if story.id != self.story_id {
            return Err(EngineError::InvalidStory {
                story_id: story.id,
                reason: format!("session belongs to story {}", self.story_id),
            });
        }
        Ok(())
    }
}

fn start_scene_of(story: &Story) -> Result<&StoryScene> {
    let start_id = story
        .start_scene_id
        .as_ref()
        .ok_or_else(|| EngineError::InvalidStory {
            story_id: story.id,
            reason: "no start scene".to_string(),
        })?;

    story.scene(start_id).ok_or_else(|| EngineError::InvalidStory {
        story_id: story.id,
        reason: format!("start scene {} not found", start_id),
    })
}
