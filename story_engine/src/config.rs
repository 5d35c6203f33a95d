//! Engine configuration loaded from TOML, with environment overrides.
//!
//! Every setting has a default so the engine starts with zero configuration.
//!
//! ```toml
//! log_filter = "story_engine=debug"
//! removal_policy = "reject"
//!
//! [validator]
//! unreachable_is_error = false
//!
//! [reading]
//! max_history = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use story_model::RemovalPolicy;

use crate::error::Result;
use crate::traversal::ReadingConfig;
use crate::validator::ValidatorConfig;

/// Default scene removal behaviour for edits that do not name a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicySetting {
    #[default]
    Reject,
    RepointToStart,
}

impl RemovalPolicySetting {
    pub fn to_policy(self) -> RemovalPolicy {
        match self {
            RemovalPolicySetting::Reject => RemovalPolicy::Reject,
            RemovalPolicySetting::RepointToStart => RemovalPolicy::RepointToStart,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "reject" => Some(RemovalPolicySetting::Reject),
            "repoint_to_start" => Some(RemovalPolicySetting::RepointToStart),
            _ => None,
        }
    }
}

/// Size limits enforced on submitted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentLimits {
    pub max_title_len: usize,
    pub max_description_len: usize,
    pub max_scene_content_len: usize,
    pub max_choice_text_len: usize,
    /// Maximum number of scenes in one story.
    pub max_scenes: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_title_len: 200,
            max_description_len: 5_000,
            max_scene_content_len: 20_000,
            max_choice_text_len: 300,
            max_scenes: 500,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `tracing-subscriber` filter used when `RUST_LOG` is unset.
    /// Env: `TALESCAPES_LOG`
    pub log_filter: String,

    /// Env: `TALESCAPES_REMOVAL_POLICY` (`reject` / `repoint_to_start`)
    pub removal_policy: RemovalPolicySetting,

    pub validator: ValidatorConfig,
    pub reading: ReadingConfig,
    pub limits: ContentLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            removal_policy: RemovalPolicySetting::default(),
            validator: ValidatorConfig::default(),
            reading: ReadingConfig::default(),
            limits: ContentLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.apply_env())
    }

    /// Override settings from process environment variables.
    pub fn apply_env(self) -> Self {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override settings using `lookup` as the environment.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(filter) = lookup("TALESCAPES_LOG") {
            if !filter.is_empty() {
                self.log_filter = filter;
            }
        }

        if let Some(val) = lookup("TALESCAPES_STRICT_VALIDATION") {
            self.validator.unreachable_is_error = val != "false" && val != "0";
        }

        if let Some(val) = lookup("TALESCAPES_MAX_HISTORY") {
            match val.parse::<usize>() {
                Ok(n) => self.reading.max_history = n,
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid TALESCAPES_MAX_HISTORY, using default");
                }
            }
        }

        if let Some(val) = lookup("TALESCAPES_REMOVAL_POLICY") {
            match RemovalPolicySetting::parse(&val) {
                Some(policy) => self.removal_policy = policy,
                None => {
                    tracing::warn!(value = %val, "Invalid TALESCAPES_REMOVAL_POLICY, using default");
                }
            }
        }

        self
    }
}
