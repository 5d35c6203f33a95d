//! Story service - the publishing workflow on top of a repository.

use story_model::{Story, StoryId, StoryStatus};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::persistence::{StoryFilter, StoryRepository};
use crate::session::{Actor, SessionContext};
use crate::submission::ContentSubmission;
use crate::traversal::ReadingSession;
use crate::validator::{GraphValidator, ValidationReport};

/// Authoring, publishing and reading entry points.
pub struct StoryService<R> {
    repository: R,
    config: EngineConfig,
    validator: GraphValidator,
}

impl<R: StoryRepository> StoryService<R> {
    pub fn new(repository: R, config: EngineConfig) -> Self {
        let validator = GraphValidator::new(config.validator.clone());
        Self {
            repository,
            config,
            validator,
        }
    }

    pub fn with_defaults(repository: R) -> Self {
        Self::new(repository, EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn validator(&self) -> &GraphValidator {
        &self.validator
    }

    /// Apply a content submission on behalf of the session's actor.
    pub async fn submit(&self, session: &SessionContext, submission: ContentSubmission) -> Result<Story> {
        let actor = session.require_actor()?;
        submission.check(&self.config.limits)?;

        tracing::info!(
            user_id = %actor.user_id,
            kind = submission.kind(),
            story_id = ?submission.story_id(),
            "Content submission"
        );

        match submission {
            ContentSubmission::CreateStory {
                title,
                description,
                category,
                cover_image,
            } => {
                if !actor.can_author() {
                    return Err(EngineError::forbidden("create stories"));
                }
                let mut story = Story::new(actor.user_id, title.trim()).with_description(description);
                story.category = category;
                story.cover_image = cover_image;
                self.repository.save(&story).await
            }
            ContentSubmission::Publish { story_id } => self.publish(session, story_id).await,
            ContentSubmission::Unpublish { story_id } => self.unpublish(session, story_id).await,
            edit => {
                let story_id = edit
                    .story_id()
                    .ok_or_else(|| EngineError::InvalidSubmission("missing story id".into()))?;
                let mut story = self.load_for_edit(actor, story_id).await?;
                edit.apply(&mut story, &self.config)?;
                self.save_checked(&story).await
            }
        }
    }

    /// Validate a stored story.
    pub async fn validate(&self, session: &SessionContext, story_id: StoryId) -> Result<ValidationReport> {
        let story = self.load(session, story_id).await?;
        Ok(self.validator.validate(&story))
    }

    /// Publish a story if its graph is sound.
    ///
    /// An invalid story stays in draft and the error carries the full report.
    pub async fn publish(&self, session: &SessionContext, story_id: StoryId) -> Result<Story> {
        let actor = session.require_actor()?;
        let mut story = self.load_for_edit(actor, story_id).await?;

        let report = self.validator.validate(&story);
        if !report.valid {
            tracing::warn!(
                story_id = %story_id,
                errors = report.errors.len(),
                "Publish blocked by validation"
            );
            return Err(EngineError::Validation(Box::new(report)));
        }
        if report.has_warnings() {
            tracing::info!(
                story_id = %story_id,
                warnings = report.warnings.len(),
                "Publishing with warnings"
            );
        }

        story.status = StoryStatus::Published;
        story.touch();
        let saved = self.repository.save(&story).await?;

        tracing::info!(story_id = %story_id, revision = saved.revision, "Story published");
        Ok(saved)
    }

    /// Move a story back to draft.
    pub async fn unpublish(&self, session: &SessionContext, story_id: StoryId) -> Result<Story> {
        let actor = session.require_actor()?;
        let mut story = self.load_for_edit(actor, story_id).await?;

        story.status = StoryStatus::Draft;
        story.featured = false;
        story.touch();
        self.repository.save(&story).await
    }

    /// Set the editorial flag. Editors only, published stories only.
    pub async fn set_featured(&self, session: &SessionContext, story_id: StoryId, featured: bool) -> Result<Story> {
        let actor = session.require_actor()?;
        if !actor.can_feature() {
            return Err(EngineError::forbidden("feature stories"));
        }

        let mut story = self.repository.load(story_id).await?;
        if featured && !story.is_published() {
            return Err(EngineError::InvalidSubmission("only published stories can be featured".into()));
        }

        story.featured = featured;
        story.touch();
        self.save_checked(&story).await
    }

    /// Load a story visible to the session. Other authors' drafts are
    /// reported as missing.
    pub async fn load(&self, session: &SessionContext, story_id: StoryId) -> Result<Story> {
        let story = self.repository.load(story_id).await?;
        if !session.can_view(&story) {
            return Err(EngineError::StoryNotFound(story_id));
        }
        Ok(story)
    }

    /// Published stories matching `filter`, most recently updated first.
    pub async fn browse(&self, filter: StoryFilter) -> Result<Vec<Story>> {
        let filter = filter.with_status(StoryStatus::Published);
        self.repository.query(&filter).await
    }

    /// Every story of the signed-in author, drafts included.
    pub async fn my_stories(&self, session: &SessionContext) -> Result<Vec<Story>> {
        let actor = session.require_actor()?;
        self.repository
            .query(&StoryFilter::new().with_author(actor.user_id))
            .await
    }

    /// Open a reading session at the story's start scene.
    pub async fn start_reading(&self, session: &SessionContext, story_id: StoryId) -> Result<(Story, ReadingSession)> {
        let story = self.load(session, story_id).await?;
        let reading = ReadingSession::start_with(&story, &self.config.reading)?;
        Ok((story, reading))
    }

    /// Save, re-checking a published story with this service's validator.
    async fn save_checked(&self, story: &Story) -> Result<Story> {
        if story.is_published() {
            let report = self.validator.validate(story);
            if !report.valid {
                tracing::warn!(
                    story_id = %story.id,
                    errors = report.errors.len(),
                    "Edit to published story blocked by validation"
                );
                return Err(EngineError::Validation(Box::new(report)));
            }
        }
        self.repository.save(story).await
    }

    async fn load_for_edit(&self, actor: &Actor, story_id: StoryId) -> Result<Story> {
        let story = self.repository.load(story_id).await?;
        if !actor.can_edit(&story) {
            tracing::warn!(user_id = %actor.user_id, story_id = %story_id, "Edit refused");
            return Err(EngineError::forbidden(format!("edit story {story_id}")));
        }
        Ok(story)
    }
}
