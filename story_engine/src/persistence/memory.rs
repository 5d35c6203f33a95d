//! In-memory story repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use story_model::{Story, StoryId};

use super::{StoryFilter, StoryRepository};
use crate::error::{EngineError, Result};
use crate::validator::GraphValidator;

/// A [`StoryRepository`] backed by a map, with revision checks on save.
#[derive(Debug, Default)]
pub struct InMemoryStoryRepository {
    stories: RwLock<HashMap<StoryId, Story>>,
    validator: GraphValidator,
}

impl InMemoryStoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `validator` for the publish check on save.
    pub fn with_validator(validator: GraphValidator) -> Self {
        Self {
            stories: RwLock::default(),
            validator,
        }
    }

    pub async fn len(&self) -> usize {
        self.stories.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.stories.read().await.is_empty()
    }
}

#[async_trait]
impl StoryRepository for InMemoryStoryRepository {
    async fn load(&self, id: StoryId) -> Result<Story> {
        self.stories
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::StoryNotFound(id))
    }

    async fn save(&self, story: &Story) -> Result<Story> {
        let mut stories = self.stories.write().await;

        if let Some(stored) = stories.get(&story.id) {
            if stored.revision != story.revision {
                tracing::warn!(
                    story_id = %story.id,
                    expected = story.revision,
                    found = stored.revision,
                    "Rejected stale save"
                );
                return Err(EngineError::Conflict {
                    story_id: story.id,
                    expected: story.revision,
                    found: stored.revision,
                });
            }
        }

        if story.is_published() {
            let report = self.validator.validate(story);
            if !report.valid {
                return Err(EngineError::Validation(Box::new(report)));
            }
        }

        let mut saved = story.clone();
        saved.revision += 1;
        stories.insert(saved.id, saved.clone());

        tracing::debug!(story_id = %saved.id, revision = saved.revision, "Story saved");
        Ok(saved)
    }

    async fn query(&self, filter: &StoryFilter) -> Result<Vec<Story>> {
        let stories = self.stories.read().await;
        let mut found: Vec<Story> = stories
            .values()
            .filter(|story| filter.matches(story))
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(found)
    }

    async fn delete(&self, id: StoryId) -> Result<()> {
        self.stories
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::StoryNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_model::{AuthorId, StoryChoice, StoryScene, StoryStatus};

    fn playable_story(author: AuthorId) -> Story {
        let mut story = Story::new(author, "Playable");
        story
            .add_scene(StoryScene::new("A", "Start").with_choice(StoryChoice::new("c1", "Go", "B")))
            .unwrap();
        story.add_scene(StoryScene::new("B", "End").ending()).unwrap();
        story
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = InMemoryStoryRepository::new();
        let story = playable_story(AuthorId::new());

        let saved = repo.save(&story).await.unwrap();
        assert_eq!(saved.revision, 1);

        let loaded = repo.load(story.id).await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_missing() {
        let repo = InMemoryStoryRepository::new();
        let id = StoryId::new();
        assert!(matches!(repo.load(id).await, Err(EngineError::StoryNotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let repo = InMemoryStoryRepository::new();
        let story = playable_story(AuthorId::new());

        let first = repo.save(&story).await.unwrap();
        let mut session_a = first.clone();
        let mut session_b = first.clone();

        session_a.title = "Edited by A".into();
        repo.save(&session_a).await.unwrap();

        session_b.title = "Edited by B".into();
        let err = repo.save(&session_b).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Conflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
        assert_eq!(repo.load(story.id).await.unwrap().title, "Edited by A");
    }

    #[tokio::test]
    async fn test_invalid_published_story_is_rejected() {
        let repo = InMemoryStoryRepository::new();
        let mut story = Story::new(AuthorId::new(), "Broken");
        story
            .add_scene(StoryScene::new("A", "Start").with_choice(StoryChoice::new("c1", "Go", "Z")))
            .unwrap();
        story.status = StoryStatus::Published;

        let err = repo.save(&story).await.unwrap_err();
        let report = err.report().unwrap();
        assert!(report.has_dangling_references());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_stored() {
        let repo = InMemoryStoryRepository::new();
        let story = Story::new(AuthorId::new(), "Work in progress");

        assert!(repo.save(&story).await.is_ok());
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let repo = InMemoryStoryRepository::new();
        let author = AuthorId::new();

        let mut older = playable_story(author);
        older.status = StoryStatus::Published;
        repo.save(&older).await.unwrap();

        let mut newer = playable_story(author);
        newer.status = StoryStatus::Published;
        newer.updated_at = older.updated_at + chrono::Duration::seconds(10);
        repo.save(&newer).await.unwrap();

        repo.save(&playable_story(AuthorId::new())).await.unwrap();

        let published = repo
            .query(&StoryFilter::new().with_status(StoryStatus::Published))
            .await
            .unwrap();
        let ids: Vec<_> = published.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);

        let by_author = repo.query(&StoryFilter::new().with_author(author)).await.unwrap();
        assert_eq!(by_author.len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryStoryRepository::new();
        let story = playable_story(AuthorId::new());
        repo.save(&story).await.unwrap();

        repo.delete(story.id).await.unwrap();
        assert!(matches!(repo.delete(story.id).await, Err(EngineError::StoryNotFound(_))));
    }
}
