//! # Story Engine
//!
//! Interprets the story graphs defined in `story_model`. The engine decides
//! whether a story can be published, drives reading sessions through it, and
//! fronts an external persistence service for the publishing workflow.
//!
//! ## Core Components
//!
//! - **validator**: Breadth-first reachability pass producing a full report
//! - **traversal**: Reading sessions with back-navigation history
//! - **persistence**: Repository boundary plus an in-memory adapter
//! - **service**: Ownership checks, typed content submissions, publishing
//!
//! Graph operations are synchronous and pure. Only repository calls are async.

pub mod config;
pub mod error;
pub mod persistence;
pub mod service;
pub mod session;
pub mod submission;
pub mod telemetry;
pub mod traversal;
pub mod validator;

pub use config::*;
pub use error::*;
pub use persistence::*;
pub use service::*;
pub use session::*;
pub use submission::*;
pub use traversal::*;
pub use validator::*;
