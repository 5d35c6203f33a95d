//! Persistence boundary.
//!
//! The backing store is an external content service. The engine talks to it
//! through [`StoryRepository`]; [`InMemoryStoryRepository`] is a reference
//! adapter used by tests and local tooling.

mod memory;

pub use memory::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use story_model::{AuthorId, Story, StoryId, StoryStatus};

use crate::error::Result;

/// Load/save/query operations on stories.
///
/// Implementations never retry on their own; errors go back to the caller.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Fails with `StoryNotFound` if no story has this id.
    async fn load(&self, id: StoryId) -> Result<Story>;

    /// Store a story and return the stored copy with its new revision.
    ///
    /// Fails with `Conflict` if the stored revision differs from
    /// `story.revision`, and with `Validation` if a published story does not
    /// pass the graph validator.
    async fn save(&self, story: &Story) -> Result<Story>;

    async fn query(&self, filter: &StoryFilter) -> Result<Vec<Story>>;

    /// Fails with `StoryNotFound` if no story has this id.
    async fn delete(&self, id: StoryId) -> Result<()>;
}

/// Criteria for [`StoryRepository::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryFilter {
    #[serde(default)]
    pub status: Option<StoryStatus>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub author_id: Option<AuthorId>,
    #[serde(default)]
    pub category: Option<String>,
}

impl StoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StoryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    pub fn with_author(mut self, author: AuthorId) -> Self {
        self.author_id = Some(author);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn matches(&self, story: &Story) -> bool {
        self.status.map_or(true, |s| story.status == s)
            && self.featured.map_or(true, |f| story.featured == f)
            && self.author_id.map_or(true, |a| story.author == a)
            && self
                .category
                .as_ref()
                .map_or(true, |c| story.category.as_ref() == Some(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_all() {
        let story = Story::new(AuthorId::new(), "Any");
        assert!(StoryFilter::new().matches(&story));
    }

    #[test]
    fn test_filter_fields() {
        let author = AuthorId::new();
        let mut story = Story::new(author, "Horror").with_category("horror");
        story.featured = true;

        assert!(StoryFilter::new().with_author(author).matches(&story));
        assert!(!StoryFilter::new().with_author(AuthorId::new()).matches(&story));
        assert!(StoryFilter::new().with_featured(true).matches(&story));
        assert!(!StoryFilter::new().with_status(StoryStatus::Published).matches(&story));
        assert!(StoryFilter::new().with_category("horror").matches(&story));
        assert!(!StoryFilter::new().with_category("romance").matches(&story));
    }
}
