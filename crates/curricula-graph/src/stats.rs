//! Graph statistics and analysis.
//!
//! Counts and distributions over a loaded store: domains, chapters,
//! relationship kinds, difficulty levels and degrees.

use crate::{DEFAULT_STUDY_MINUTES, GraphStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket name for nodes without a chapter or domain.
pub const UNASSIGNED: &str = "unassigned";

// ============================================================================
// Types
// ============================================================================

/// Comprehensive statistics about a curriculum graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphStats {
    /// Total number of nodes.
    pub node_count: usize,
    /// Total number of indexed edges.
    pub edge_count: usize,
    /// Number of domains in the catalog.
    pub domain_count: usize,
    /// Nodes per domain tag (a node counts once per tag).
    pub domain_distribution: BTreeMap<String, usize>,
    /// Nodes per chapter.
    pub chapter_distribution: BTreeMap<String, usize>,
    /// Edges per relationship kind.
    pub relationship_distribution: BTreeMap<String, usize>,
    /// Nodes per difficulty level.
    pub difficulty_distribution: BTreeMap<u8, usize>,
    /// Nodes without any edges.
    pub isolated_count: usize,
    /// Average edges per node (in + out).
    pub avg_degree: f32,
    /// Maximum in-degree.
    pub max_in_degree: usize,
    /// Maximum out-degree.
    pub max_out_degree: usize,
    /// Node with highest in-degree.
    pub most_depended_on: Option<String>,
    /// Node with highest out-degree.
    pub most_dependencies: Option<String>,
    /// Mean edge strength, 0 when there are no edges.
    pub avg_strength: f32,
    /// Sum of estimated study minutes, using the default for unestimated nodes.
    pub total_study_minutes: u64,
}

// ============================================================================
// Functions
// ============================================================================

/// Compute statistics, assuming [`DEFAULT_STUDY_MINUTES`] for unestimated nodes.
pub fn compute_stats(store: &GraphStore) -> GraphStats {
    compute_stats_with_minutes(store, DEFAULT_STUDY_MINUTES)
}

/// Compute statistics with a custom default study time.
pub fn compute_stats_with_minutes(store: &GraphStore, default_minutes: u32) -> GraphStats {
    let node_count = store.node_count();
    let edge_count = store.edge_count();

    let mut domain_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut chapter_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut difficulty_distribution: BTreeMap<u8, usize> = BTreeMap::new();
    let mut total_study_minutes: u64 = 0;

    for node in store.all_nodes() {
        if node.domains.is_empty() {
            *domain_distribution.entry(UNASSIGNED.to_string()).or_insert(0) += 1;
        }
        for domain in &node.domains {
            *domain_distribution.entry(domain.clone()).or_insert(0) += 1;
        }
        let chapter = node.chapter.clone().unwrap_or_else(|| UNASSIGNED.to_string());
        *chapter_distribution.entry(chapter).or_insert(0) += 1;
        *difficulty_distribution.entry(node.difficulty.level()).or_insert(0) += 1;
        total_study_minutes += u64::from(node.study_minutes(default_minutes));
    }

    let mut relationship_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut strength_sum = 0.0f32;
    for edge in store.all_edges() {
        *relationship_distribution
            .entry(edge.kind.name().to_string())
            .or_insert(0) += 1;
        strength_sum += edge.strength.value();
    }

    // Degrees, in load order so ties resolve to the earliest node
    let mut isolated_count = 0;
    let mut total_degree = 0;
    let mut most_depended_on: Option<(&str, usize)> = None;
    let mut most_dependencies: Option<(&str, usize)> = None;

    for node in store.all_nodes() {
        let in_degree = store.incoming(&node.id).len();
        let out_degree = store.outgoing(&node.id).len();
        total_degree += in_degree + out_degree;
        if in_degree + out_degree == 0 {
            isolated_count += 1;
        }
        if most_depended_on.is_none_or(|(_, max)| in_degree > max) {
            most_depended_on = Some((node.id.as_str(), in_degree));
        }
        if most_dependencies.is_none_or(|(_, max)| out_degree > max) {
            most_dependencies = Some((node.id.as_str(), out_degree));
        }
    }

    let avg_degree = if node_count > 0 {
        total_degree as f32 / node_count as f32
    } else {
        0.0
    };
    let avg_strength = if edge_count > 0 {
        strength_sum / edge_count as f32
    } else {
        0.0
    };

    let (most_depended_on, max_in_degree) = split_max(most_depended_on);
    let (most_dependencies, max_out_degree) = split_max(most_dependencies);

    GraphStats {
        node_count,
        edge_count,
        domain_count: store.domains().len(),
        domain_distribution,
        chapter_distribution,
        relationship_distribution,
        difficulty_distribution,
        isolated_count,
        avg_degree,
        max_in_degree,
        max_out_degree,
        most_depended_on,
        most_dependencies,
        avg_strength,
        total_study_minutes,
    }
}

/// Get a quick summary of graph size.
pub fn quick_summary(store: &GraphStore) -> String {
    format!("{} nodes, {} edges", store.node_count(), store.edge_count())
}

/// A degree of zero names no node.
fn split_max(max: Option<(&str, usize)>) -> (Option<String>, usize) {
    match max {
        Some((id, degree)) if degree > 0 => (Some(id.to_string()), degree),
        _ => (None, 0),
    }
}

// ============================================================================
// Tests
// ============================================================================
