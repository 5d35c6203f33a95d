//! Identity and per-session state, passed explicitly instead of kept global.

use serde::{Deserialize, Serialize};

use story_model::{AuthorId, Story};

use crate::error::{EngineError, Result};

/// Role resolved by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Author,
    /// May also feature other authors' stories.
    Editor,
}

/// An authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: AuthorId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: AuthorId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn reader(user_id: AuthorId) -> Self {
        Self::new(user_id, Role::Reader)
    }

    pub fn author(user_id: AuthorId) -> Self {
        Self::new(user_id, Role::Author)
    }

    pub fn editor(user_id: AuthorId) -> Self {
        Self::new(user_id, Role::Editor)
    }

    pub fn can_author(&self) -> bool {
        matches!(self.role, Role::Author | Role::Editor)
    }

    /// Only the owning author may edit or publish a story.
    pub fn can_edit(&self, story: &Story) -> bool {
        self.can_author() && story.is_owned_by(self.user_id)
    }

    /// Drafts are visible to their author only.
    pub fn can_view(&self, story: &Story) -> bool {
        story.is_published() || story.is_owned_by(self.user_id)
    }

    pub fn can_feature(&self) -> bool {
        self.role == Role::Editor
    }
}

/// State owned by one client session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    actor: Option<Actor>,
    #[serde(default)]
    signup_reminder_seen: bool,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(actor: Actor) -> Self {
        Self {
            actor: Some(actor),
            signup_reminder_seen: false,
        }
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn require_actor(&self) -> Result<&Actor> {
        self.actor
            .as_ref()
            .ok_or_else(|| EngineError::forbidden("do this without signing in"))
    }

    pub fn sign_in(&mut self, actor: Actor) {
        self.actor = Some(actor);
    }

    pub fn sign_out(&mut self) {
        self.actor = None;
    }

    /// Whether an anonymous visitor should be nudged to sign up. True at most
    /// once per session.
    pub fn should_show_signup_reminder(&mut self) -> bool {
        if self.actor.is_some() || self.signup_reminder_seen {
            return false;
        }
        self.signup_reminder_seen = true;
        true
    }

    pub fn can_view(&self, story: &Story) -> bool {
        match &self.actor {
            Some(actor) => actor.can_view(story),
            None => story.is_published(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use story_model::StoryStatus;

    #[test]
    fn test_edit_rights() {
        let owner = AuthorId::new();
        let story = Story::new(owner, "Mine");

        assert!(Actor::author(owner).can_edit(&story));
        assert!(!Actor::author(AuthorId::new()).can_edit(&story));
        assert!(!Actor::reader(owner).can_edit(&story));
        assert!(!Actor::editor(AuthorId::new()).can_edit(&story));
    }

    #[test]
    fn test_draft_visibility() {
        let owner = AuthorId::new();
        let mut story = Story::new(owner, "Draft");

        assert!(SessionContext::signed_in(Actor::author(owner)).can_view(&story));
        assert!(!SessionContext::signed_in(Actor::reader(AuthorId::new())).can_view(&story));
        assert!(!SessionContext::anonymous().can_view(&story));

        story.status = StoryStatus::Published;
        assert!(SessionContext::anonymous().can_view(&story));
    }

    #[test]
    fn test_signup_reminder_shown_once() {
        let mut session = SessionContext::anonymous();
        assert!(session.should_show_signup_reminder());
        assert!(!session.should_show_signup_reminder());

        let mut signed_in = SessionContext::signed_in(Actor::reader(AuthorId::new()));
        assert!(!signed_in.should_show_signup_reminder());
    }

    #[test]
    fn test_require_actor() {
        let mut session = SessionContext::anonymous();
        assert!(matches!(
            session.require_actor(),
            Err(EngineError::Forbidden { .. })
        ));

        let id = AuthorId::new();
        session.sign_in(Actor::author(id));
        assert_eq!(session.require_actor().unwrap().user_id, id);

        session.sign_out();
        assert!(session.actor().is_none());
    }
}
