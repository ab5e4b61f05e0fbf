//! Relationship queries: what leads into and out of a concept.
//!
//! A query about an unknown id is a normal outcome in an exploratory UI,
//! so every method here returns an empty result rather than an error.

use crate::query::{ConceptPath, EdgeInfo, NodeSummary, RelatedConceptsResponse, RelatedGroup};
use crate::{Edge, EdgeKind, GraphStore, Node};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

/// Answers neighbour queries against a [`GraphStore`].
#[derive(Clone, Copy, Debug)]
pub struct RelationshipResolver<'a> {
    store: &'a GraphStore,
}

impl<'a> RelationshipResolver<'a> {
    /// Create a resolver bound to the given store.
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Concepts that must be learned before `node_id`.
    ///
    /// Sources of incoming `prerequisite` edges, strongest first, ties by id.
    /// Self-loops and unresolvable ids are skipped.
    pub fn get_prerequisites(&self, node_id: &str) -> Vec<&'a Node> {
        let candidates = self
            .store
            .incoming(node_id)
            .into_iter()
            .filter(|e| e.kind == EdgeKind::Prerequisite)
            .map(|e| (e, e.source.as_str()));
        self.rank(node_id, candidates)
    }

    /// Concepts that build on `node_id`.
    ///
    /// Targets of outgoing `prerequisite` or `application` edges, in the same
    /// order as [`get_prerequisites`](Self::get_prerequisites).
    pub fn get_successors(&self, node_id: &str) -> Vec<&'a Node> {
        let candidates = self
            .store
            .outgoing(node_id)
            .into_iter()
            .filter(|e| matches!(e.kind, EdgeKind::Prerequisite | EdgeKind::Application))
            .map(|e| (e, e.target.as_str()));
        self.rank(node_id, candidates)
    }

    /// Every edge touching `node_id`, once each, in load order.
    pub fn get_related_edges(&self, node_id: &str) -> Vec<&'a Edge> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut edges: Vec<&'a Edge> = Vec::new();
        for edge in self
            .store
            .outgoing(node_id)
            .into_iter()
            .chain(self.store.incoming(node_id))
        {
            if seen.insert(edge.id.as_str()) {
                edges.push(edge);
            }
        }
        edges.sort_by_key(|e| self.store.edge_position(&e.id).unwrap_or(usize::MAX));
        edges
    }

    /// Neighbours of `node_id` grouped by relationship kind.
    ///
    /// Returns `None` for an unknown id. Kinds without neighbours are omitted.
    pub fn related_by_kind(&self, node_id: &str) -> Option<RelatedConceptsResponse> {
        let source = self.store.get_node(node_id)?;
        let edges = self.get_related_edges(node_id);

        let mut related = Vec::new();
        for kind in EdgeKind::ALL {
            let mut group = RelatedGroup {
                relationship: kind.name().to_string(),
                outgoing: Vec::new(),
                incoming: Vec::new(),
            };
            for edge in edges.iter().filter(|e| e.kind == kind) {
                if edge.source == node_id {
                    if let Some(target) = self.store.get_node(&edge.target) {
                        group.outgoing.push(NodeSummary::from(target));
                    }
                }
                if edge.target == node_id {
                    if let Some(origin) = self.store.get_node(&edge.source) {
                        group.incoming.push(NodeSummary::from(origin));
                    }
                }
            }
            if !group.is_empty() {
                related.push(group);
            }
        }

        let total_count = related.iter().map(RelatedGroup::len).sum();
        Some(RelatedConceptsResponse {
            source: NodeSummary::from(source),
            related,
            total_count,
        })
    }

    /// Shortest directed path (fewest edges, any kind) from `from` to `to`.
    ///
    /// Returns `None` if either id is unknown or `to` is unreachable.
    pub fn find_path(&self, from: &str, to: &str) -> Option<ConceptPath> {
        let start = self.store.get_node(from)?;
        self.store.get_node(to)?;

        let mut came_from: HashMap<&str, &Edge> = HashMap::new();
        let mut visited: HashSet<&str> = HashSet::from([start.id.as_str()]);
        let mut queue: VecDeque<&str> = VecDeque::from([start.id.as_str()]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                break;
            }
            for edge in self.store.outgoing(current) {
                let next = edge.target.as_str();
                if visited.insert(next) {
                    came_from.insert(next, edge);
                    queue.push_back(next);
                }
            }
        }

        if !visited.contains(to) {
            return None;
        }

        let mut edges = Vec::new();
        let mut cursor = to;
        while let Some(&edge) = came_from.get(cursor) {
            edges.push(edge);
            cursor = edge.source.as_str();
        }
        edges.reverse();

        let mut nodes = vec![NodeSummary::from(start)];
        for edge in &edges {
            nodes.extend(self.store.get_node(&edge.target).map(NodeSummary::from));
        }

        Some(ConceptPath {
            nodes,
            edges: edges.into_iter().map(EdgeInfo::from).collect(),
        })
    }

    /// Resolve, deduplicate and order neighbour candidates.
    fn rank(
        &self,
        node_id: &str,
        candidates: impl Iterator<Item = (&'a Edge, &'a str)>,
    ) -> Vec<&'a Node> {
        let mut best: HashMap<&str, (f32, &'a Node)> = HashMap::new();
        for (edge, neighbour_id) in candidates {
            if neighbour_id == node_id {
                continue;
            }
            let Some(neighbour) = self.store.get_node(neighbour_id) else {
                continue;
            };
            let strength = edge.strength.value();
            best.entry(neighbour.id.as_str())
                .and_modify(|entry| {
                    if strength > entry.0 {
                        entry.0 = strength;
                    }
                })
                .or_insert((strength, neighbour));
        }

        let mut ranked: Vec<(f32, &'a Node)> = best.into_values().collect();
        ranked.sort_by(by_strength_then_id);
        ranked.into_iter().map(|(_, node)| node).collect()
    }
}

fn by_strength_then_id(a: &(f32, &Node), b: &(f32, &Node)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id))
}

// ============================================================================
// Tests
// ============================================================================
