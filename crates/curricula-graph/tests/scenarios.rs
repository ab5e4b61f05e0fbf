//! End-to-end behaviour of the store and its query components.

use curricula_graph::connectivity::partition;
use curricula_graph::{
    ConnectivityAnalyzer, CrossDirection, Edge, EdgeKind, GraphStore, IntegrityViolation,
    LearningPathBuilder, MissingEndpoint, Node, RelationshipResolver, validate_store,
};

fn curriculum() -> GraphStore {
    let nodes = vec![
        Node::new("sets", "Sets").with_domain("foundations").with_chapter("ch0"),
        Node::new("functions", "Functions")
            .with_domain("foundations")
            .with_chapter("ch0")
            .with_prerequisite("sets"),
        Node::new("limits", "Limits")
            .with_domain("calculus")
            .with_chapter("ch1")
            .with_difficulty(2)
            .with_prerequisite("functions"),
        Node::new("derivatives", "Derivatives")
            .with_domain("calculus")
            .with_chapter("ch1")
            .with_difficulty(3)
            .with_prerequisite("limits"),
        Node::new("kinematics", "Kinematics")
            .with_domain("physics")
            .with_chapter("ch9")
            .with_difficulty(3),
        Node::new("trivia", "Trivia"),
    ];
    let edges = vec![
        Edge::new("e1", "sets", "functions", EdgeKind::Prerequisite),
        Edge::new("e2", "functions", "limits", EdgeKind::Prerequisite),
        Edge::new("e3", "limits", "derivatives", EdgeKind::Prerequisite),
        Edge::new("e4", "derivatives", "kinematics", EdgeKind::Application),
        Edge::new("e5", "sets", "limits", EdgeKind::Related),
    ];
    GraphStore::load(nodes, edges).unwrap()
}

#[test]
fn every_node_round_trips_through_lookup() {
    let store = curriculum();
    for node in store.all_nodes() {
        assert_eq!(store.get_node(&node.id), Some(node));
    }
}

#[test]
fn every_edge_appears_once_at_each_end() {
    let store = curriculum();
    let resolver = RelationshipResolver::new(&store);

    for edge in store.all_edges() {
        for end in [&edge.source, &edge.target] {
            let hits = resolver
                .get_related_edges(end)
                .iter()
                .filter(|e| e.id == edge.id)
                .count();
            assert_eq!(hits, 1, "edge {} at {}", edge.id, end);
        }
    }
}

#[test]
fn prerequisites_never_include_the_node_itself() {
    let store = GraphStore::load(
        vec![Node::new("a", "A"), Node::new("b", "B")],
        vec![
            Edge::new("loop", "a", "a", EdgeKind::Prerequisite),
            Edge::new("ba", "b", "a", EdgeKind::Prerequisite),
        ],
    )
    .unwrap();
    let resolver = RelationshipResolver::new(&store);

    let prereqs = resolver.get_prerequisites("a");
    assert_eq!(prereqs.len(), 1);
    assert_eq!(prereqs[0].id, "b");
}

#[test]
fn learning_path_walks_the_prerequisite_chain() {
    let store = curriculum();
    let builder = LearningPathBuilder::new(&store);

    let path = builder.build_path("derivatives");
    assert_eq!(
        path.node_ids(),
        vec!["sets", "functions", "limits", "derivatives"]
    );
    assert_eq!(path.total_minutes, 4 * 30);
    assert_eq!(path.difficulty.map(|d| d.level()), Some(3));
    assert_eq!(builder.build_path("derivatives"), path);
}

#[test]
fn learning_path_terminates_on_cycles() {
    let store = GraphStore::load(
        vec![Node::new("A", "A"), Node::new("B", "B")],
        vec![
            Edge::new("ab", "A", "B", EdgeKind::Prerequisite),
            Edge::new("ba", "B", "A", EdgeKind::Prerequisite),
        ],
    )
    .unwrap();

    let path = LearningPathBuilder::new(&store).build_path("B");
    assert_eq!(path.node_ids(), vec!["A", "B"]);
}

#[test]
fn dangling_edge_fails_load_but_store_stays_usable() {
    let err = GraphStore::load(
        vec![Node::new("X", "X")],
        vec![Edge::new("xy", "X", "Y", EdgeKind::Related)],
    )
    .unwrap_err();

    assert_eq!(err.dangling_edge_ids(), vec!["xy"]);
    assert_eq!(
        err.violations()[0],
        IntegrityViolation::DanglingEdge {
            edge_id: "xy".into(),
            source: "X".into(),
            target: "Y".into(),
            missing: MissingEndpoint::Target,
        }
    );
    assert!(err.to_string().contains("xy"));

    let store = err.into_partial();
    let resolver = RelationshipResolver::new(&store);
    assert!(resolver.get_related_edges("X").is_empty());
    assert!(store.get_node("X").is_some());
}

#[test]
fn node_without_edges_is_isolated() {
    let store = curriculum();
    let analyzer = ConnectivityAnalyzer::new(&store);

    let report = analyzer.classify(&["trivia", "kinematics", "limits"]);
    assert_eq!(report.isolated.len(), 1);
    assert_eq!(report.isolated[0].id, "trivia");
    assert_eq!(report.weak[0].id, "kinematics");
    assert_eq!(report.well_connected[0].id, "limits");
    assert_eq!(report.len(), 3);
}

#[test]
fn cross_domain_edge_reported_with_direction() {
    let store = curriculum();
    let analyzer = ConnectivityAnalyzer::new(&store);
    let calculus: Vec<String> = store
        .nodes_in_domain("calculus")
        .iter()
        .map(|n| n.id.clone())
        .collect();

    let crossings = analyzer.find_cross_partition_edges(&calculus, partition::by_primary_domain);
    let summary: Vec<(&str, CrossDirection)> = crossings
        .iter()
        .map(|c| (c.edge.id.as_str(), c.direction))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("e2", CrossDirection::Into),
            ("e4", CrossDirection::OutOf),
            ("e5", CrossDirection::Into),
        ]
    );
    assert_eq!(crossings[1].target_partition.as_deref(), Some("physics"));
}

#[test]
fn clean_curriculum_validates() {
    let store = curriculum();
    let result = validate_store(&store, &[]);

    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, "ISOLATED_NODES");
}
