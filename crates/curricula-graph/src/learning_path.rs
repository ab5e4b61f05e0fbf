//! Learning paths: what to study, in order, to reach a target concept.
//!
//! The builder walks `prerequisite` edges backwards from the target, one
//! breadth-first level at a time. Levels are emitted deepest first, so
//! ancestors come before the concepts that need them. Within a level, easier
//! concepts come first, then ids in ascending order.
//!
//! A concept is visited at most once. Prerequisite cycles therefore end the
//! walk instead of looping; `validation` is where cycles get reported.

use crate::{Difficulty, GraphStore, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minutes assumed for a concept without an estimated study time.
pub const DEFAULT_STUDY_MINUTES: u32 = 30;

// ============================================================================
// Types
// ============================================================================

/// One concept in a learning path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    /// 1-based position in the path.
    pub position: usize,
    /// The concept to study.
    pub node: Node,
    /// Distance from the target in prerequisite hops (0 for the target).
    pub depth: usize,
    /// The concept that required this one (`None` for the target).
    pub prerequisite_of: Option<String>,
    /// Why this step is in the path.
    pub reason: String,
    /// Estimated minutes for this step.
    pub minutes: u32,
}

/// An ordered study sequence ending at a target concept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    /// The target concept, `None` when the target was unknown.
    pub target: Option<String>,
    /// Steps in study order; the target is last.
    pub steps: Vec<PathStep>,
    /// Sum of step minutes.
    pub total_minutes: u32,
    /// Hardest step in the path.
    pub difficulty: Option<Difficulty>,
}

impl LearningPath {
    /// Whether the path has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Step node ids, in order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.node.id.as_str()).collect()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds [`LearningPath`]s against a [`GraphStore`].
#[derive(Clone, Copy, Debug)]
pub struct LearningPathBuilder<'a> {
    store: &'a GraphStore,
    default_minutes: u32,
    max_depth: Option<usize>,
}

impl<'a> LearningPathBuilder<'a> {
    /// Create a builder with the default study time and no depth limit.
    pub fn new(store: &'a GraphStore) -> Self {
        Self {
            store,
            default_minutes: DEFAULT_STUDY_MINUTES,
            max_depth: None,
        }
    }

    /// Minutes assumed for concepts without an estimate.
    pub fn with_default_minutes(mut self, minutes: u32) -> Self {
        self.default_minutes = minutes;
        self
    }

    /// Stop walking after `depth` prerequisite hops.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Build the path to `target_id`. Unknown targets give an empty path.
    pub fn build_path(&self, target_id: &str) -> LearningPath {
        let Some(target) = self.store.get_node(target_id) else {
            return LearningPath::default();
        };

        let levels = self.collect_levels(target);

        let mut steps = Vec::new();
        for (depth, level) in levels.iter().enumerate().rev() {
            for (node, parent) in level {
                let (reason, prerequisite_of) = match parent {
                    Some(parent) => (
                        format!("prerequisite of {}", parent.name),
                        Some(parent.id.clone()),
                    ),
                    None => ("target concept".to_string(), None),
                };
                steps.push(PathStep {
                    position: steps.len() + 1,
                    node: (*node).clone(),
                    depth,
                    prerequisite_of,
                    reason,
                    minutes: node.study_minutes(self.default_minutes),
                });
            }
        }

        let total_minutes = steps
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.minutes));
        let difficulty = steps.iter().map(|s| s.node.difficulty).max();

        LearningPath {
            target: Some(target.id.clone()),
            steps,
            total_minutes,
            difficulty,
        }
    }

    /// Reverse breadth-first levels; each entry remembers who pulled it in.
    fn collect_levels(&self, target: &'a Node) -> Vec<Vec<(&'a Node, Option<&'a Node>)>> {
        let mut visited: HashSet<&str> = HashSet::from([target.id.as_str()]);
        let mut levels = vec![vec![(target, None)]];

        loop {
            if self.max_depth.is_some_and(|max| levels.len() > max) {
                break;
            }
            let Some(current) = levels.last() else {
                break;
            };

            let mut next: Vec<(&'a Node, Option<&'a Node>)> = Vec::new();
            for &(node, _) in current {
                for edge in self.store.incoming(&node.id) {
                    if edge.kind != crate::EdgeKind::Prerequisite {
                        continue;
                    }
                    let Some(prerequisite) = self.store.get_node(&edge.source) else {
                        continue;
                    };
                    if visited.insert(prerequisite.id.as_str()) {
                        next.push((prerequisite, Some(node)));
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            next.sort_by(|(a, _), (b, _)| a.difficulty.cmp(&b.difficulty).then_with(|| a.id.cmp(&b.id)));
            levels.push(next);
        }

        levels
    }
}

// ============================================================================
// Tests
// ============================================================================
