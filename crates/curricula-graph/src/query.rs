//! Query response types for graph operations.
//!
//! Plain records returned to the CLI and any other consumer. All types
//! derive `Serialize`/`Deserialize` for JSON output.

use crate::{Edge, Node};
use serde::{Deserialize, Serialize};

// ============================================================================
// Node / Edge summaries
// ============================================================================

/// Summary information about a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    /// Node ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Difficulty level (1–5).
    pub difficulty: u8,
    /// Chapter tag.
    pub chapter: Option<String>,
    /// Domain tags.
    pub domains: Vec<String>,
}

impl From<&Node> for NodeSummary {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            difficulty: node.difficulty.level(),
            chapter: node.chapter.clone(),
            domains: node.domains.clone(),
        }
    }
}

/// Summary information about an edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// Edge ID.
    pub id: String,
    /// Source node ID.
    pub source: String,
    /// Target node ID.
    pub target: String,
    /// Relationship kind.
    pub kind: String,
    /// Relationship strength.
    pub strength: f32,
}

impl From<&Edge> for EdgeInfo {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            kind: edge.kind.name().to_string(),
            strength: edge.strength.value(),
        }
    }
}

// ============================================================================
// Related concepts
// ============================================================================

/// Response for related concepts query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelatedConceptsResponse {
    /// The concept queried.
    pub source: NodeSummary,
    /// Neighbours grouped by relationship kind.
    pub related: Vec<RelatedGroup>,
    /// Total number of neighbour entries across groups.
    pub total_count: usize,
}

/// Neighbours sharing a relationship kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelatedGroup {
    /// The relationship kind.
    pub relationship: String,
    /// Concepts this one points to.
    pub outgoing: Vec<NodeSummary>,
    /// Concepts pointing to this one.
    pub incoming: Vec<NodeSummary>,
}

impl RelatedGroup {
    /// Number of neighbours in both directions.
    pub fn len(&self) -> usize {
        self.outgoing.len() + self.incoming.len()
    }

    /// Whether the group has no neighbours.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Path
// ============================================================================

/// A directed path between two concepts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConceptPath {
    /// Nodes in order, including both ends.
    pub nodes: Vec<NodeSummary>,
    /// Edges traversed, `nodes.len() - 1` of them.
    pub edges: Vec<EdgeInfo>,
}

impl ConceptPath {
    /// Number of edges traversed.
    pub fn length(&self) -> usize {
        self.edges.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
