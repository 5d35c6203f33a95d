//! # Story Model
//!
//! The data crate of Talescapes: branching stories, their scenes and choices,
//! and reader profiles. This crate owns the shape of the story graph and the
//! local edits an author can make to it. Whole-graph checks (reachability,
//! dangling references, endings) live in `story_engine`.
//!
//! ## Graph shape
//!
//! - A [`Story`] owns an ordered list of [`StoryScene`]s.
//! - A scene owns an ordered list of [`StoryChoice`]s.
//! - A choice points at a sibling scene by [`SceneId`]. The pointer is a plain
//!   id, resolved by lookup; edits may leave it dangling until validation.

pub mod error;
pub mod profile;
pub mod story;

pub use error::*;
pub use profile::*;
pub use story::*;
