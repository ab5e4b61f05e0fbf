//! The in-memory graph store.
//!
//! [`GraphStore`] owns every node, edge and domain for the lifetime of a
//! session. It is built once from already-parsed records and never mutated
//! afterwards, so any number of readers can share it.
//!
//! Loading checks referential integrity: edges pointing at unknown nodes are
//! not indexed, and every such edge is reported together in a single
//! [`DataIntegrityError`] so the data can be fixed in one pass.

use crate::{Domain, Edge, Node};
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Integrity violations
// ============================================================================

/// Which endpoint of an edge failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEndpoint {
    /// Only the source id is unknown.
    Source,
    /// Only the target id is unknown.
    Target,
    /// Neither id is known.
    Both,
}

/// A referential-integrity problem found while loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum IntegrityViolation {
    /// An edge references a node that does not exist; the edge is skipped.
    DanglingEdge {
        /// The offending edge.
        edge_id: String,
        /// Its source id.
        source: String,
        /// Its target id.
        target: String,
        /// Which side is missing.
        missing: MissingEndpoint,
    },
    /// A second node reuses an id; the first record is kept.
    DuplicateNode {
        /// The repeated id.
        node_id: String,
    },
    /// A second edge reuses an id; the first record is kept.
    DuplicateEdge {
        /// The repeated id.
        edge_id: String,
    },
}

impl IntegrityViolation {
    /// The edge involved, if this is an edge-level violation.
    pub fn edge_id(&self) -> Option<&str> {
        match self {
            Self::DanglingEdge { edge_id, .. } | Self::DuplicateEdge { edge_id } => Some(edge_id),
            Self::DuplicateNode { .. } => None,
        }
    }

    /// Whether this is a dangling-reference violation.
    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::DanglingEdge { .. })
    }
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingEdge {
                edge_id,
                source,
                target,
                missing,
            } => {
                let which = match missing {
                    MissingEndpoint::Source => format!("unknown source '{source}'"),
                    MissingEndpoint::Target => format!("unknown target '{target}'"),
                    MissingEndpoint::Both => {
                        format!("unknown source '{source}' and target '{target}'")
                    }
                };
                write!(f, "edge '{edge_id}' ({source} -> {target}): {which}")
            }
            Self::DuplicateNode { node_id } => write!(f, "duplicate node id '{node_id}'"),
            Self::DuplicateEdge { edge_id } => write!(f, "duplicate edge id '{edge_id}'"),
        }
    }
}

/// Aggregate integrity failure returned by [`GraphStore::load`].
///
/// The store built from the records that *did* pass is kept, so a caller can
/// choose to log the violations and carry on with [`into_partial`].
///
/// [`into_partial`]: DataIntegrityError::into_partial
#[derive(Debug, thiserror::Error)]
#[error("{} data integrity violation(s); first: {}", .violations.len(), first_violation(.violations))]
pub struct DataIntegrityError {
    violations: Vec<IntegrityViolation>,
    partial: Box<GraphStore>,
}

fn first_violation(violations: &[IntegrityViolation]) -> String {
    violations
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl DataIntegrityError {
    /// Every violation found, in input order.
    pub fn violations(&self) -> &[IntegrityViolation] {
        &self.violations
    }

    /// Ids of the edges that were dropped for dangling references.
    pub fn dangling_edge_ids(&self) -> Vec<&str> {
        self.violations
            .iter()
            .filter(|v| v.is_dangling())
            .filter_map(IntegrityViolation::edge_id)
            .collect()
    }

    /// The best-effort store built from the valid records.
    pub fn partial(&self) -> &GraphStore {
        &self.partial
    }

    /// Consume the error, keeping the best-effort store.
    pub fn into_partial(self) -> GraphStore {
        *self.partial
    }
}

impl From<DataIntegrityError> for curricula_core::Error {
    fn from(err: DataIntegrityError) -> Self {
        let details: Vec<String> = err.violations.iter().map(ToString::to_string).collect();
        curricula_core::Error::invalid_data(format!(
            "{} integrity violation(s): {}",
            details.len(),
            details.join("; ")
        ))
    }
}

// ============================================================================
// GraphStore
// ============================================================================

/// Indexed, read-only collection of concepts and relationships.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
    graph: DiGraph<Node, Edge>,
    node_indices: HashMap<String, NodeIndex>,
    edge_indices: HashMap<String, EdgeIndex>,
    domains: Vec<Domain>,
}

impl GraphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store, failing if any record violates referential integrity.
    ///
    /// Violations never abort indexing: the error carries the store built
    /// from the valid records.
    pub fn load(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Result<Self, DataIntegrityError> {
        let (store, violations) = Self::build(nodes, edges);
        if violations.is_empty() {
            Ok(store)
        } else {
            Err(DataIntegrityError {
                violations,
                partial: Box::new(store),
            })
        }
    }

    /// Builds a store, returning violations alongside instead of failing.
    pub fn load_lenient(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> (Self, Vec<IntegrityViolation>) {
        let (store, violations) = Self::build(nodes, edges);
        for violation in &violations {
            log::warn!("Skipping record: {violation}");
        }
        (store, violations)
    }

    fn build(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> (Self, Vec<IntegrityViolation>) {
        let mut store = Self::new();
        let mut violations = Vec::new();

        for node in nodes {
            if store.node_indices.contains_key(&node.id) {
                violations.push(IntegrityViolation::DuplicateNode { node_id: node.id });
                continue;
            }
            let id = node.id.clone();
            let idx = store.graph.add_node(node);
            store.node_indices.insert(id, idx);
        }

        for edge in edges {
            if store.edge_indices.contains_key(&edge.id) {
                violations.push(IntegrityViolation::DuplicateEdge { edge_id: edge.id });
                continue;
            }
            let from = store.node_indices.get(&edge.source).copied();
            let to = store.node_indices.get(&edge.target).copied();
            match (from, to) {
                (Some(from_idx), Some(to_idx)) => {
                    let id = edge.id.clone();
                    let idx = store.graph.add_edge(from_idx, to_idx, edge);
                    store.edge_indices.insert(id, idx);
                }
                (from, to) => {
                    let missing = match (from, to) {
                        (None, None) => MissingEndpoint::Both,
                        (None, Some(_)) => MissingEndpoint::Source,
                        _ => MissingEndpoint::Target,
                    };
                    violations.push(IntegrityViolation::DanglingEdge {
                        edge_id: edge.id,
                        source: edge.source,
                        target: edge.target,
                        missing,
                    });
                }
            }
        }

        log::debug!(
            "Indexed {} nodes and {} edges ({} violation(s))",
            store.node_count(),
            store.edge_count(),
            violations.len()
        );

        (store, violations)
    }

    /// Attaches the domain catalog.
    pub fn with_domains(mut self, domains: impl IntoIterator<Item = Domain>) -> Self {
        self.domains = domains.into_iter().collect();
        self
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    /// Gets a node by ID.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.node_indices.get(id).map(|&idx| &self.graph[idx])
    }

    /// Gets an indexed edge by ID.
    pub fn get_edge(&self, id: &str) -> Option<&Edge> {
        self.edge_indices.get(id).map(|&idx| &self.graph[idx])
    }

    /// Load position of an indexed edge.
    pub fn edge_position(&self, id: &str) -> Option<usize> {
        self.edge_indices.get(id).map(|idx| idx.index())
    }

    /// Checks if a node exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of indexed edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes, in load order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// All indexed edges, in load order.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Edges leaving `id`, in load order. Empty for unknown ids.
    pub fn outgoing(&self, id: &str) -> Vec<&Edge> {
        self.edges_directed(id, Direction::Outgoing)
    }

    /// Edges arriving at `id`, in load order. Empty for unknown ids.
    pub fn incoming(&self, id: &str) -> Vec<&Edge> {
        self.edges_directed(id, Direction::Incoming)
    }

    fn edges_directed(&self, id: &str, direction: Direction) -> Vec<&Edge> {
        let Some(&idx) = self.node_indices.get(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency lists newest-first
        let mut refs: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        refs.sort_by_key(|e| e.id().index());
        refs.into_iter().map(|e| e.weight()).collect()
    }

    /// Nodes tagged with `chapter`, in load order.
    pub fn nodes_in_chapter(&self, chapter: &str) -> Vec<&Node> {
        self.all_nodes()
            .filter(|n| n.chapter.as_deref() == Some(chapter))
            .collect()
    }

    /// Nodes carrying the `domain` tag, in load order.
    pub fn nodes_in_domain(&self, domain: &str) -> Vec<&Node> {
        self.all_nodes().filter(|n| n.has_domain(domain)).collect()
    }

    // ------------------------------------------------------------------------
    // Domains
    // ------------------------------------------------------------------------

    /// The domain catalog (empty when none was attached).
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Gets a domain by ID.
    pub fn get_domain(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// The domain whose legacy chapter list contains `chapter`.
    pub fn domain_for_chapter(&self, chapter: &str) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|d| d.chapters.iter().any(|c| c == chapter))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EdgeKind;

    fn abc_nodes() -> Vec<Node> {
        vec![
            Node::new("a", "A").with_chapter("ch1"),
            Node::new("b", "B").with_chapter("ch1").with_domain("algebra"),
            Node::new("c", "C").with_chapter("ch2").with_domain("geometry"),
        ]
    }

    #[test]
    fn test_load_indexes_nodes_and_edges() {
        let edges = vec![
            Edge::new("e1", "a", "b", EdgeKind::Prerequisite),
            Edge::new("e2", "b", "c", EdgeKind::Prerequisite),
        ];
        let store = GraphStore::load(abc_nodes(), edges).unwrap();

        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.get_node("b").unwrap().name, "B");
        assert_eq!(store.get_edge("e2").unwrap().target, "c");
        assert!(store.get_node("zzz").is_none());
        assert!(store.get_edge("zzz").is_none());
    }

    #[test]
    fn test_all_nodes_in_insertion_order() {
        let store = GraphStore::load(abc_nodes(), Vec::new()).unwrap();
        let ids: Vec<&str> = store.all_nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_adjacency_in_load_order() {
        let edges = vec![
            Edge::new("e1", "a", "b", EdgeKind::Prerequisite),
            Edge::new("e2", "a", "c", EdgeKind::Related),
            Edge::new("e3", "c", "b", EdgeKind::Application),
        ];
        let store = GraphStore::load(abc_nodes(), edges).unwrap();

        let out: Vec<&str> = store.outgoing("a").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(out, vec!["e1", "e2"]);
        let inc: Vec<&str> = store.incoming("b").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(inc, vec!["e1", "e3"]);
        assert!(store.outgoing("missing").is_empty());
    }

    #[test]
    fn test_dangling_edges_reported_together() {
        let edges = vec![
            Edge::new("ok", "a", "b", EdgeKind::Prerequisite),
            Edge::new("bad-target", "a", "y", EdgeKind::Prerequisite),
            Edge::new("bad-source", "x", "b", EdgeKind::Related),
            Edge::new("bad-both", "x", "y", EdgeKind::Related),
        ];

        let err = GraphStore::load(abc_nodes(), edges).unwrap_err();
        assert_eq!(
            err.dangling_edge_ids(),
            vec!["bad-target", "bad-source", "bad-both"]
        );
        assert!(matches!(
            err.violations()[2],
            IntegrityViolation::DanglingEdge {
                missing: MissingEndpoint::Both,
                ..
            }
        ));
        assert!(err.to_string().starts_with("3 data integrity violation(s)"));

        let partial = err.into_partial();
        assert_eq!(partial.edge_count(), 1);
        assert!(partial.get_edge("bad-target").is_none());
    }

    #[test]
    fn test_duplicates_keep_first() {
        let nodes = vec![Node::new("a", "First"), Node::new("a", "Second"), Node::new("b", "B")];
        let edges = vec![
            Edge::new("e1", "a", "b", EdgeKind::Prerequisite),
            Edge::new("e1", "b", "a", EdgeKind::Related),
        ];

        let (store, violations) = GraphStore::load_lenient(nodes, edges);
        assert_eq!(store.get_node("a").unwrap().name, "First");
        assert_eq!(store.get_edge("e1").unwrap().source, "a");
        assert_eq!(
            violations,
            vec![
                IntegrityViolation::DuplicateNode {
                    node_id: "a".into()
                },
                IntegrityViolation::DuplicateEdge {
                    edge_id: "e1".into()
                },
            ]
        );
    }

    #[test]
    fn test_integrity_error_into_core_error() {
        let edges = vec![Edge::new("x-y", "x", "y", EdgeKind::Related)];
        let err = GraphStore::load(Vec::new(), edges).unwrap_err();
        let core: curricula_core::Error = err.into();
        assert!(matches!(core, curricula_core::Error::InvalidData(_)));
        assert!(core.to_string().contains("x-y"));
    }

    #[test]
    fn test_chapter_and_domain_filters() {
        let store = GraphStore::load(abc_nodes(), Vec::new())
            .unwrap()
            .with_domains(vec![
                Domain::new("algebra", "Algebra").with_chapter("ch1"),
                Domain::new("geometry", "Geometry").with_chapter("ch2"),
            ]);

        let ch1: Vec<&str> = store
            .nodes_in_chapter("ch1")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ch1, vec!["a", "b"]);
        assert_eq!(store.nodes_in_domain("geometry").len(), 1);
        assert_eq!(store.domains().len(), 2);
        assert_eq!(store.get_domain("algebra").unwrap().name, "Algebra");
        assert_eq!(store.domain_for_chapter("ch2").unwrap().id, "geometry");
        assert!(store.domain_for_chapter("ch9").is_none());
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphStore>();
    }
}
