//! Connectivity analysis over subsets of the graph.
//!
//! Subsets are usually one chapter or one domain. Degrees always count every
//! edge touching a node, including edges whose other end lies outside the
//! subset, so a node is only `isolated` when nothing at all points to or from it.

use crate::{Edge, GraphStore, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Nodes with more edges than this are well connected.
pub const WEAK_MAX_EDGES: usize = 2;

// ============================================================================
// Types
// ============================================================================

/// Connectivity bucket of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectivityClass {
    /// No edges.
    Isolated,
    /// One or two edges.
    Weak,
    /// Three or more edges.
    WellConnected,
}

impl ConnectivityClass {
    /// Bucket for a total edge count.
    pub fn from_degree(total: usize) -> Self {
        match total {
            0 => Self::Isolated,
            1..=WEAK_MAX_EDGES => Self::Weak,
            _ => Self::WellConnected,
        }
    }
}

/// Edge counts for one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDegree {
    /// Node ID.
    pub id: String,
    /// Incoming edge count.
    pub incoming: usize,
    /// Outgoing edge count.
    pub outgoing: usize,
}

impl NodeDegree {
    /// Incoming plus outgoing.
    pub fn total(&self) -> usize {
        self.incoming + self.outgoing
    }

    /// The bucket this degree falls into.
    pub fn class(&self) -> ConnectivityClass {
        ConnectivityClass::from_degree(self.total())
    }
}

/// Result of [`ConnectivityAnalyzer::classify`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConnectivityReport {
    /// Nodes with no edges.
    pub isolated: Vec<NodeDegree>,
    /// Nodes with one or two edges.
    pub weak: Vec<NodeDegree>,
    /// Nodes with three or more edges.
    pub well_connected: Vec<NodeDegree>,
}

impl ConnectivityReport {
    /// Number of classified entries.
    pub fn len(&self) -> usize {
        self.isolated.len() + self.weak.len() + self.well_connected.len()
    }

    /// Whether nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bucket for a class.
    pub fn bucket(&self, class: ConnectivityClass) -> &[NodeDegree] {
        match class {
            ConnectivityClass::Isolated => &self.isolated,
            ConnectivityClass::Weak => &self.weak,
            ConnectivityClass::WellConnected => &self.well_connected,
        }
    }
}

/// Direction of a cross-partition edge relative to the analysed subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossDirection {
    /// Source outside the subset, target inside.
    Into,
    /// Source inside the subset, target outside.
    OutOf,
    /// Both ends inside the subset, in different partitions.
    Within,
}

/// An edge whose endpoints fall in different partitions.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossPartitionEdge<'a, K> {
    /// The edge.
    pub edge: &'a Edge,
    /// Direction relative to the subset.
    pub direction: CrossDirection,
    /// Partition of the source node.
    pub source_partition: Option<K>,
    /// Partition of the target node.
    pub target_partition: Option<K>,
}

// ============================================================================
// Partition keys
// ============================================================================

/// Ready-made partition key functions.
pub mod partition {
    use crate::{GraphStore, Node};

    /// The node's chapter.
    pub fn by_chapter(node: &Node) -> Option<String> {
        node.chapter.clone()
    }

    /// The node's primary (first) domain tag.
    pub fn by_primary_domain(node: &Node) -> Option<String> {
        node.primary_domain().map(String::from)
    }

    /// The domain owning the node's chapter, else its primary domain tag.
    pub fn by_chapter_domain(store: &GraphStore) -> impl Fn(&Node) -> Option<String> + '_ {
        move |node| {
            node.chapter
                .as_deref()
                .and_then(|c| store.domain_for_chapter(c))
                .map(|d| d.id.clone())
                .or_else(|| by_primary_domain(node))
        }
    }
}

// ============================================================================
// Analyzer
// ============================================================================

/// Classifies nodes by connectivity and finds cross-partition edges.
#[derive(Clone, Copy, Debug)]
pub struct ConnectivityAnalyzer<'a> {
    store: &'a GraphStore,
}

impl<'a> ConnectivityAnalyzer<'a> {
    /// Create an analyzer bound to the given store.
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Edge counts for one node. Unknown ids have zero edges.
    pub fn degree(&self, node_id: &str) -> NodeDegree {
        NodeDegree {
            id: node_id.to_string(),
            incoming: self.store.incoming(node_id).len(),
            outgoing: self.store.outgoing(node_id).len(),
        }
    }

    /// Sort every subset entry into exactly one bucket.
    ///
    /// Bucket sizes always sum to `subset.len()`; entries keep subset order.
    pub fn classify<S: AsRef<str>>(&self, subset: &[S]) -> ConnectivityReport {
        let mut report = ConnectivityReport::default();
        for id in subset {
            let degree = self.degree(id.as_ref());
            match degree.class() {
                ConnectivityClass::Isolated => report.isolated.push(degree),
                ConnectivityClass::Weak => report.weak.push(degree),
                ConnectivityClass::WellConnected => report.well_connected.push(degree),
            }
        }
        report
    }

    /// Classify every node of a chapter.
    pub fn classify_chapter(&self, chapter: &str) -> ConnectivityReport {
        self.classify(&ids(self.store.nodes_in_chapter(chapter)))
    }

    /// Classify every node carrying a domain tag.
    pub fn classify_domain(&self, domain: &str) -> ConnectivityReport {
        self.classify(&ids(self.store.nodes_in_domain(domain)))
    }

    /// Classify the whole graph.
    pub fn classify_all(&self) -> ConnectivityReport {
        self.classify(&ids(self.store.all_nodes()))
    }

    /// Edges touching the subset whose endpoints map to different partitions.
    ///
    /// Edges are returned in load order and tagged with their direction
    /// relative to subset membership.
    pub fn find_cross_partition_edges<S, K, F>(
        &self,
        subset: &[S],
        partition_key: F,
    ) -> Vec<CrossPartitionEdge<'a, K>>
    where
        S: AsRef<str>,
        K: PartialEq,
        F: Fn(&Node) -> Option<K>,
    {
        let members: HashSet<&str> = subset.iter().map(|s| s.as_ref()).collect();
        let mut found = Vec::new();

        for edge in self.store.all_edges() {
            let source_in = members.contains(edge.source.as_str());
            let target_in = members.contains(edge.target.as_str());
            let direction = match (source_in, target_in) {
                (false, false) => continue,
                (false, true) => CrossDirection::Into,
                (true, false) => CrossDirection::OutOf,
                (true, true) => CrossDirection::Within,
            };

            let (Some(source), Some(target)) = (
                self.store.get_node(&edge.source),
                self.store.get_node(&edge.target),
            ) else {
                continue;
            };

            let source_partition = partition_key(source);
            let target_partition = partition_key(target);
            if source_partition != target_partition {
                found.push(CrossPartitionEdge {
                    edge,
                    direction,
                    source_partition,
                    target_partition,
                });
            }
        }

        found
    }
}

fn ids<'n>(nodes: impl IntoIterator<Item = &'n Node>) -> Vec<&'n str> {
    nodes.into_iter().map(|n| n.id.as_str()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, EdgeKind};

    fn sample_store() -> GraphStore {
        let nodes = vec![
            Node::new("hub", "Hub").with_chapter("ch1").with_domain("algebra"),
            Node::new("leaf", "Leaf").with_chapter("ch1").with_domain("algebra"),
            Node::new("alone", "Alone").with_chapter("ch1").with_domain("algebra"),
            Node::new("p", "P").with_chapter("ch2").with_domain("geometry"),
            Node::new("q", "Q").with_chapter("ch3").with_domain("calculus"),
        ];
        let edges = vec![
            Edge::new("e1", "hub", "leaf", EdgeKind::Prerequisite),
            Edge::new("e2", "p", "hub", EdgeKind::CrossDomain),
            Edge::new("e3", "hub", "q", EdgeKind::Application),
            Edge::new("e4", "p", "q", EdgeKind::Related),
        ];
        GraphStore::load(nodes, edges).unwrap()
    }

    #[test]
    fn test_class_thresholds() {
        assert_eq!(ConnectivityClass::from_degree(0), ConnectivityClass::Isolated);
        assert_eq!(ConnectivityClass::from_degree(1), ConnectivityClass::Weak);
        assert_eq!(ConnectivityClass::from_degree(2), ConnectivityClass::Weak);
        assert_eq!(
            ConnectivityClass::from_degree(3),
            ConnectivityClass::WellConnected
        );
    }

    #[test]
    fn test_classify_chapter_counts_outside_neighbours() {
        let store = sample_store();
        let analyzer = ConnectivityAnalyzer::new(&store);

        let report = analyzer.classify_chapter("ch1");

        assert_eq!(report.len(), 3);
        assert_eq!(report.isolated[0].id, "alone");
        assert_eq!(report.weak[0].id, "leaf");
        assert_eq!(report.well_connected[0].id, "hub");
        assert_eq!(report.well_connected[0].total(), 3);
    }

    #[test]
    fn test_classify_unknown_id_is_isolated() {
        let store = sample_store();
        let analyzer = ConnectivityAnalyzer::new(&store);

        let report = analyzer.classify(&["ghost", "p"]);
        assert_eq!(report.len(), 2);
        assert_eq!(report.bucket(ConnectivityClass::Isolated)[0].id, "ghost");
        assert_eq!(report.bucket(ConnectivityClass::Weak)[0].id, "p");
    }

    #[test]
    fn test_self_loop_counts_both_directions() {
        let store = GraphStore::load(
            vec![Node::new("x", "X")],
            vec![Edge::new("loop", "x", "x", EdgeKind::Related)],
        )
        .unwrap();
        let degree = ConnectivityAnalyzer::new(&store).degree("x");
        assert_eq!(degree.incoming, 1);
        assert_eq!(degree.outgoing, 1);
    }

    #[test]
    fn test_cross_partition_by_domain_directions() {
        let store = sample_store();
        let analyzer = ConnectivityAnalyzer::new(&store);

        let cross = analyzer.find_cross_partition_edges(&["hub", "leaf", "alone"], |n| {
            partition::by_primary_domain(n)
        });

        let tagged: Vec<(&str, CrossDirection)> = cross
            .iter()
            .map(|c| (c.edge.id.as_str(), c.direction))
            .collect();
        assert_eq!(
            tagged,
            vec![("e2", CrossDirection::Into), ("e3", CrossDirection::OutOf)]
        );
        assert_eq!(cross[0].source_partition.as_deref(), Some("geometry"));
        assert_eq!(cross[0].target_partition.as_deref(), Some("algebra"));
    }

    #[test]
    fn test_cross_partition_within_subset() {
        let store = sample_store();
        let analyzer = ConnectivityAnalyzer::new(&store);

        let cross = analyzer.find_cross_partition_edges(&["p", "q"], partition::by_chapter);
        let e4 = cross.iter().find(|c| c.edge.id == "e4").unwrap();
        assert_eq!(e4.direction, CrossDirection::Within);
    }

    #[test]
    fn test_same_partition_edges_excluded() {
        let store = sample_store();
        let analyzer = ConnectivityAnalyzer::new(&store);

        let cross = analyzer.find_cross_partition_edges(&["hub"], partition::by_chapter);
        assert!(cross.iter().all(|c| c.edge.id != "e1"));
    }

    #[test]
    fn test_partition_by_chapter_domain_uses_catalog() {
        let store = sample_store().with_domains(vec![
            Domain::new("number-theory", "Number theory").with_chapter("ch2"),
        ]);
        let key = partition::by_chapter_domain(&store);

        assert_eq!(key(store.get_node("p").unwrap()).as_deref(), Some("number-theory"));
        assert_eq!(key(store.get_node("q").unwrap()).as_deref(), Some("calculus"));
    }
}
