//! Offline merge utilities for curriculum data files.
//!
//! Content arrives in batches of nodes and edges produced elsewhere. These
//! functions fold a batch into the existing collections without disturbing
//! records already there, and can turn the `prerequisites` lists authored on
//! nodes into explicit prerequisite edges. Every operation is idempotent.

use crate::{Edge, EdgeKind, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Strength given to derived prerequisite edges unless configured otherwise.
pub const DEFAULT_DERIVED_STRENGTH: f32 = 0.8;

// ============================================================================
// Reports
// ============================================================================

/// Added/skipped counts for one collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCounts {
    /// Records appended.
    pub added: usize,
    /// Records left out because they were already present.
    pub skipped: usize,
}

impl MergeCounts {
    /// Whether nothing was added.
    pub fn is_noop(&self) -> bool {
        self.added == 0
    }
}

/// Outcome of a full merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Node merge counts.
    pub nodes: MergeCounts,
    /// Edge merge counts.
    pub edges: MergeCounts,
    /// Derived prerequisite edge counts.
    pub derived: MergeCounts,
}

impl MergeReport {
    /// Whether the merge changed nothing.
    pub fn is_noop(&self) -> bool {
        self.nodes.is_noop() && self.edges.is_noop() && self.derived.is_noop()
    }
}

/// Knobs for [`merge_into`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MergeOptions {
    /// Also derive edges from node `prerequisites` lists.
    pub derive_prerequisites: bool,
    /// Strength for derived edges.
    pub derived_strength: f32,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            derive_prerequisites: false,
            derived_strength: DEFAULT_DERIVED_STRENGTH,
        }
    }
}

impl MergeOptions {
    /// Enable prerequisite derivation at the given strength.
    pub fn with_derived_prerequisites(mut self, strength: f32) -> Self {
        self.derive_prerequisites = true;
        self.derived_strength = strength;
        self
    }
}

// ============================================================================
// Merge functions
// ============================================================================

/// Append incoming nodes whose ids are new. Existing records win.
pub fn merge_nodes(existing: &mut Vec<Node>, incoming: impl IntoIterator<Item = Node>) -> MergeCounts {
    let mut ids: HashSet<String> = existing.iter().map(|n| n.id.clone()).collect();
    let mut counts = MergeCounts::default();

    for node in incoming {
        if ids.insert(node.id.clone()) {
            existing.push(node);
            counts.added += 1;
        } else {
            log::debug!("Skipping node '{}': id already present", node.id);
            counts.skipped += 1;
        }
    }
    counts
}

/// Append incoming edges whose id and (source, target) pair are both new.
///
/// The relationship kind is ignored when comparing pairs.
pub fn merge_edges(existing: &mut Vec<Edge>, incoming: impl IntoIterator<Item = Edge>) -> MergeCounts {
    let mut index = EdgeIndex::new(existing);
    let mut counts = MergeCounts::default();

    for edge in incoming {
        if index.admit(&edge) {
            existing.push(edge);
            counts.added += 1;
        } else {
            log::debug!(
                "Skipping edge '{}' ({} -> {}): already present",
                edge.id,
                edge.source,
                edge.target
            );
            counts.skipped += 1;
        }
    }
    counts
}

/// Add a `p -> node` prerequisite edge for every `p` in each node's
/// `prerequisites` list, unless that pair is already connected.
///
/// Self references and ids that are not among `nodes` are skipped.
pub fn derive_prerequisite_edges(nodes: &[Node], edges: &mut Vec<Edge>, strength: f32) -> MergeCounts {
    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut index = EdgeIndex::new(edges);
    let mut counts = MergeCounts::default();

    for node in nodes {
        for prerequisite in &node.prerequisites {
            if prerequisite == &node.id || !known.contains(prerequisite.as_str()) {
                counts.skipped += 1;
                continue;
            }
            let edge = Edge::between(prerequisite.as_str(), node.id.as_str(), EdgeKind::Prerequisite)
                .with_strength(strength);
            if index.admit(&edge) {
                edges.push(edge);
                counts.added += 1;
            } else {
                counts.skipped += 1;
            }
        }
    }
    counts
}

/// Merge a batch into existing collections.
pub fn merge_into(
    nodes: &mut Vec<Node>,
    edges: &mut Vec<Edge>,
    incoming_nodes: impl IntoIterator<Item = Node>,
    incoming_edges: impl IntoIterator<Item = Edge>,
    options: MergeOptions,
) -> MergeReport {
    let node_counts = merge_nodes(nodes, incoming_nodes);
    let edge_counts = merge_edges(edges, incoming_edges);
    let derived = if options.derive_prerequisites {
        derive_prerequisite_edges(nodes, edges, options.derived_strength)
    } else {
        MergeCounts::default()
    };

    let report = MergeReport {
        nodes: node_counts,
        edges: edge_counts,
        derived,
    };
    log::info!(
        "Merged {} node(s), {} edge(s), {} derived edge(s)",
        report.nodes.added,
        report.edges.added,
        report.derived.added
    );
    report
}

/// Ids and endpoint pairs already taken.
struct EdgeIndex {
    ids: HashSet<String>,
    pairs: HashSet<(String, String)>,
}

impl EdgeIndex {
    fn new(edges: &[Edge]) -> Self {
        Self {
            ids: edges.iter().map(|e| e.id.clone()).collect(),
            pairs: edges
                .iter()
                .map(|e| (e.source.clone(), e.target.clone()))
                .collect(),
        }
    }

    /// Record `edge` if neither its id nor its pair is taken.
    fn admit(&mut self, edge: &Edge) -> bool {
        let pair = (edge.source.clone(), edge.target.clone());
        if self.ids.contains(&edge.id) || self.pairs.contains(&pair) {
            return false;
        }
        self.ids.insert(edge.id.clone());
        self.pairs.insert(pair);
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_nodes_existing_wins() {
        let mut nodes = vec![Node::new("a", "Original")];
        let counts = merge_nodes(
            &mut nodes,
            vec![Node::new("a", "Replacement"), Node::new("b", "B"), Node::new("b", "B2")],
        );

        assert_eq!(counts, MergeCounts { added: 1, skipped: 2 });
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "Original");
        assert_eq!(nodes[1].name, "B");
    }

    #[test]
    fn test_merge_edges_by_id_or_pair() {
        let mut edges = vec![Edge::new("e1", "a", "b", EdgeKind::Prerequisite)];
        let counts = merge_edges(
            &mut edges,
            vec![
                Edge::new("e1", "x", "y", EdgeKind::Related),
                Edge::new("e2", "a", "b", EdgeKind::Related),
                Edge::new("e3", "b", "a", EdgeKind::Related),
            ],
        );

        assert_eq!(counts, MergeCounts { added: 1, skipped: 2 });
        let ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
    }

    #[test]
    fn test_derive_prerequisite_edges() {
        let nodes = vec![
            Node::new("a", "A"),
            Node::new("b", "B").with_prerequisite("a").with_prerequisite("b"),
            Node::new("c", "C")
                .with_prerequisite("a")
                .with_prerequisite("b")
                .with_prerequisite("ghost"),
        ];
        let mut edges = vec![Edge::new("existing", "a", "c", EdgeKind::Related)];

        let counts = derive_prerequisite_edges(&nodes, &mut edges, 0.7);

        assert_eq!(counts.added, 2);
        assert_eq!(counts.skipped, 3);
        assert_eq!(edges[1].id, "a->b");
        assert_eq!(edges[1].kind, EdgeKind::Prerequisite);
        assert!((edges[1].strength.value() - 0.7).abs() < 1e-6);
        assert_eq!(edges[2].id, "b->c");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch_nodes = vec![
            Node::new("a", "A"),
            Node::new("b", "B").with_prerequisite("a"),
        ];
        let batch_edges = vec![Edge::new("r", "b", "a", EdgeKind::Related)];
        let options = MergeOptions::default().with_derived_prerequisites(0.8);

        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let first = merge_into(&mut nodes, &mut edges, batch_nodes.clone(), batch_edges.clone(), options);
        let snapshot = (nodes.clone(), edges.clone());
        let second = merge_into(&mut nodes, &mut edges, batch_nodes, batch_edges, options);

        assert!(!first.is_noop());
        assert_eq!(first.derived.added, 1);
        assert!(second.is_noop());
        assert_eq!((nodes, edges), snapshot);
    }

    #[test]
    fn test_merge_without_derivation() {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let report = merge_into(
            &mut nodes,
            &mut edges,
            vec![Node::new("a", "A"), Node::new("b", "B").with_prerequisite("a")],
            Vec::new(),
            MergeOptions::default(),
        );

        assert_eq!(report.nodes.added, 2);
        assert_eq!(report.derived, MergeCounts::default());
        assert!(edges.is_empty());
    }
}
