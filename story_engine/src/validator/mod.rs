//! Graph Validator - decides whether a story can be published.
//!
//! The validator works as follows:
//! 1. **Index**: Map scene ids to scenes, flagging duplicate ids
//! 2. **Local checks**: Dangling choices, dead ends, endings with choices
//! 3. **Reachability**: Breadth-first walk from the start scene; endings stop the walk
//! 4. **Report**: Unreachable scenes become warnings (errors in strict mode),
//!    and at least one reachable ending is required
//!
//! Validation never mutates the story and never fails; every problem is
//! collected into a [`ValidationReport`].

mod report;

pub use report::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use story_model::{SceneId, Story, StoryScene};

/// Configuration for the graph validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Treat unreachable scenes as errors instead of warnings.
    /// Env: `TALESCAPES_STRICT_VALIDATION`
    pub unreachable_is_error: bool,
}

/// Checks story graphs for structural soundness.
#[derive(Debug, Clone, Default)]
pub struct GraphValidator {
    config: ValidatorConfig,
}

impl GraphValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ValidatorConfig::default())
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a story.
    pub fn validate(&self, story: &Story) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let index = index_scenes(story, &mut errors);

        for scene in &story.scenes {
            let mut choice_ids = HashSet::new();
            for choice in &scene.choices {
                if !choice_ids.insert(&choice.id) {
                    errors.push(ValidationIssue::DuplicateChoiceId {
                        scene_id: scene.id.clone(),
                        choice_id: choice.id.clone(),
                    });
                }
                if !index.contains_key(&choice.next_scene_id) {
                    errors.push(ValidationIssue::DanglingReference {
                        scene_id: scene.id.clone(),
                        choice_id: choice.id.clone(),
                        target: choice.next_scene_id.clone(),
                    });
                }
            }

            if scene.is_dead_end() {
                errors.push(ValidationIssue::DeadEnd {
                    scene_id: scene.id.clone(),
                });
            }

            if scene.is_ending && !scene.choices.is_empty() {
                warnings.push(ValidationIssue::EndingWithChoices {
                    scene_id: scene.id.clone(),
                });
            }
        }

        let start = story
            .start_scene_id
            .as_ref()
            .filter(|id| index.contains_key(id));

        let mut reachable_endings = 0;
        let mut unreachable_scenes = Vec::new();

        match start {
            None => errors.push(ValidationIssue::MissingStartScene {
                start_scene_id: story.start_scene_id.clone(),
            }),
            Some(start) => {
                let visited = walk(&index, start);

                reachable_endings = visited
                    .iter()
                    .filter_map(|id| index.get(id))
                    .filter(|scene| scene.is_ending)
                    .count();
                if reachable_endings == 0 {
                    errors.push(ValidationIssue::NoReachableEnding);
                }

                let visited: HashSet<&SceneId> = visited.into_iter().collect();
                let mut reported = HashSet::new();
                for scene in &story.scenes {
                    if visited.contains(&scene.id) || !reported.insert(&scene.id) {
                        continue;
                    }
                    unreachable_scenes.push(scene.id.clone());
                    let issue = ValidationIssue::UnreachableScene {
                        scene_id: scene.id.clone(),
                    };
                    if self.config.unreachable_is_error {
                        errors.push(issue);
                    } else {
                        warnings.push(issue);
                    }
                }
            }
        }

        let report = ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
            reachable_endings,
            unreachable_scenes,
        };

        tracing::debug!(
            story_id = %story.id,
            valid = report.valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validated story graph"
        );

        report
    }

    /// Scene ids reachable from the start scene, in breadth-first order.
    ///
    /// Empty if the start scene is missing.
    pub fn reachable_scenes(&self, story: &Story) -> Vec<SceneId> {
        let mut ignored = Vec::new();
        let index = index_scenes(story, &mut ignored);

        match story.start_scene_id.as_ref().filter(|id| index.contains_key(id)) {
            Some(start) => walk(&index, start).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }
}

/// Validate with the default configuration.
pub fn validate(story: &Story) -> ValidationReport {
    GraphValidator::with_defaults().validate(story)
}

/// Map ids to the first scene carrying them, reporting later duplicates.
fn index_scenes<'a>(
    story: &'a Story,
    errors: &mut Vec<ValidationIssue>,
) -> HashMap<&'a SceneId, &'a StoryScene> {
    let mut index = HashMap::with_capacity(story.scenes.len());
    for scene in &story.scenes {
        if index.contains_key(&scene.id) {
            errors.push(ValidationIssue::DuplicateSceneId {
                scene_id: scene.id.clone(),
            });
        } else {
            index.insert(&scene.id, scene);
        }
    }
    index
}

/// Breadth-first walk over choice edges. Ending scenes are visited but not
/// expanded, since reading stops there.
fn walk<'a>(
    index: &HashMap<&'a SceneId, &'a StoryScene>,
    start: &'a SceneId,
) -> Vec<&'a SceneId> {
    let mut order = vec![start];
    let mut seen: HashSet<&SceneId> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(id) = queue.pop_front() {
        let Some(scene) = index.get(id) else {
            continue;
        };
        if scene.is_ending {
            continue;
        }

        for choice in &scene.choices {
            let Some((target, _)) = index.get_key_value(&choice.next_scene_id) else {
                continue;
            };
            if seen.insert(*target) {
                order.push(*target);
                queue.push_back(*target);
            }
        }
    }

    order
}
