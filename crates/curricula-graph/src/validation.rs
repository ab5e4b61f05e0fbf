//! Graph validation and integrity checking.
//!
//! Queries tolerate messy data; this module is where it gets flagged. Load
//! violations (dangling edges, reused ids) are folded in alongside structural
//! checks on the indexed store: self-loops, isolated concepts, repeated
//! endpoint pairs, prerequisite cycles and unresolved references.

use crate::{EdgeKind, GraphStore, IntegrityViolation};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Types
// ============================================================================

/// Result of graph validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the graph is valid (no errors).
    pub valid: bool,
    /// Issues that should be fixed before the data ships.
    pub errors: Vec<ValidationIssue>,
    /// Suspicious but tolerated.
    pub warnings: Vec<ValidationIssue>,
    /// Informational findings.
    pub info: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Add an error (marks graph as invalid).
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.valid = false;
        self.errors.push(issue);
    }

    /// Add a warning.
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Add an informational finding.
    pub fn add_info(&mut self, issue: ValidationIssue) {
        self.info.push(issue);
    }

    /// Total issue count (errors + warnings).
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// Find an issue by code in any severity.
    pub fn find(&self, code: &str) -> Option<&ValidationIssue> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .chain(&self.info)
            .find(|issue| issue.code == code)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// A validation issue found in the graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue code, e.g. `DANGLING_EDGES`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Affected node IDs.
    pub nodes: Vec<String>,
    /// Affected edge IDs.
    pub edges: Vec<String>,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Attach affected nodes.
    pub fn with_nodes(mut self, nodes: Vec<String>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Attach affected edges.
    pub fn with_edges(mut self, edges: Vec<String>) -> Self {
        self.edges = edges;
        self
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate a store together with the violations reported while loading it.
pub fn validate_store(store: &GraphStore, violations: &[IntegrityViolation]) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_violations(violations, &mut result);
    check_prerequisite_cycles(store, &mut result);
    check_self_loops(store, &mut result);
    check_isolated(store, &mut result);
    check_duplicate_pairs(store, &mut result);
    check_prerequisite_refs(store, &mut result);
    check_domains(store, &mut result);

    log::debug!(
        "Validation: {} error(s), {} warning(s), {} info",
        result.errors.len(),
        result.warnings.len(),
        result.info.len()
    );
    result
}

/// Quick check if a store has any validation errors.
pub fn is_valid(store: &GraphStore, violations: &[IntegrityViolation]) -> bool {
    validate_store(store, violations).valid
}

// ============================================================================
// Individual checks
// ============================================================================

fn check_violations(violations: &[IntegrityViolation], result: &mut ValidationResult) {
    let mut dangling = Vec::new();
    let mut dangling_nodes = Vec::new();
    let mut duplicate_nodes = Vec::new();
    let mut duplicate_edges = Vec::new();

    for violation in violations {
        match violation {
            IntegrityViolation::DanglingEdge {
                edge_id,
                source,
                target,
                ..
            } => {
                dangling.push(edge_id.clone());
                dangling_nodes.push(format!("{source} -> {target}"));
            }
            IntegrityViolation::DuplicateNode { node_id } => duplicate_nodes.push(node_id.clone()),
            IntegrityViolation::DuplicateEdge { edge_id } => duplicate_edges.push(edge_id.clone()),
        }
    }

    if !dangling.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DANGLING_EDGES",
                format!(
                    "{} edge(s) reference unknown nodes: {}",
                    dangling.len(),
                    dangling_nodes.join(", ")
                ),
            )
            .with_edges(dangling),
        );
    }
    if !duplicate_nodes.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DUPLICATE_NODE_IDS",
                format!("{} node id(s) appear more than once", duplicate_nodes.len()),
            )
            .with_nodes(duplicate_nodes),
        );
    }
    if !duplicate_edges.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DUPLICATE_EDGE_IDS",
                format!("{} edge id(s) appear more than once", duplicate_edges.len()),
            )
            .with_edges(duplicate_edges),
        );
    }
}

/// Check for cycles among prerequisite edges (self-loops excluded).
fn check_prerequisite_cycles(store: &GraphStore, result: &mut ValidationResult) {
    let mut prereq_graph: DiGraph<&str, ()> = DiGraph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

    for node in store.all_nodes() {
        indices.insert(node.id.as_str(), prereq_graph.add_node(node.id.as_str()));
    }

    for edge in store.all_edges() {
        if edge.kind != EdgeKind::Prerequisite || edge.is_self_loop() {
            continue;
        }
        if let (Some(&from), Some(&to)) = (
            indices.get(edge.source.as_str()),
            indices.get(edge.target.as_str()),
        ) {
            prereq_graph.add_edge(from, to, ());
        }
    }

    if toposort(&prereq_graph, None).is_ok() {
        return;
    }

    let mut members: Vec<String> = tarjan_scc(&prereq_graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .flatten()
        .map(|idx| prereq_graph[idx].to_string())
        .collect();
    members.sort();

    result.add_error(
        ValidationIssue::new(
            "PREREQUISITE_CYCLE",
            format!(
                "Cycle detected in prerequisite relationships ({} concept(s) involved)",
                members.len()
            ),
        )
        .with_nodes(members),
    );
}

fn check_self_loops(store: &GraphStore, result: &mut ValidationResult) {
    let self_loops: Vec<String> = store
        .all_edges()
        .filter(|edge| edge.is_self_loop())
        .map(|edge| edge.id.clone())
        .collect();

    if !self_loops.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "SELF_LOOPS",
                format!("{} edge(s) are self-loops", self_loops.len()),
            )
            .with_edges(self_loops),
        );
    }
}

fn check_isolated(store: &GraphStore, result: &mut ValidationResult) {
    let isolated: Vec<String> = store
        .all_nodes()
        .filter(|node| store.outgoing(&node.id).is_empty() && store.incoming(&node.id).is_empty())
        .map(|node| node.id.clone())
        .collect();

    if !isolated.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "ISOLATED_NODES",
                format!("{} node(s) have no connections", isolated.len()),
            )
            .with_nodes(isolated),
        );
    }
}

/// Same (source, target) more than once, whatever the kinds.
fn check_duplicate_pairs(store: &GraphStore, result: &mut ValidationResult) {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut duplicates = Vec::new();

    for edge in store.all_edges() {
        if !seen.insert((edge.source.as_str(), edge.target.as_str())) {
            duplicates.push(edge.id.clone());
        }
    }

    if !duplicates.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "DUPLICATE_EDGE_PAIRS",
                format!(
                    "{} edge(s) repeat an existing source/target pair",
                    duplicates.len()
                ),
            )
            .with_edges(duplicates),
        );
    }
}

/// Compare each node's `prerequisites` list against the node set and edges.
fn check_prerequisite_refs(store: &GraphStore, result: &mut ValidationResult) {
    let mut unknown = Vec::new();
    let mut unlinked = Vec::new();

    for node in store.all_nodes() {
        for prerequisite in &node.prerequisites {
            if !store.contains_node(prerequisite) {
                unknown.push(format!("{} -> {}", prerequisite, node.id));
                continue;
            }
            let linked = store
                .incoming(&node.id)
                .iter()
                .any(|e| e.kind == EdgeKind::Prerequisite && &e.source == prerequisite);
            if !linked {
                unlinked.push(format!("{} -> {}", prerequisite, node.id));
            }
        }
    }

    if !unknown.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "UNKNOWN_PREREQUISITE_REFS",
                format!("{} listed prerequisite(s) are not concepts", unknown.len()),
            )
            .with_nodes(unknown),
        );
    }
    if !unlinked.is_empty() {
        result.add_info(
            ValidationIssue::new(
                "PREREQUISITES_WITHOUT_EDGES",
                format!(
                    "{} listed prerequisite(s) have no prerequisite edge",
                    unlinked.len()
                ),
            )
            .with_nodes(unlinked),
        );
    }
}

/// Domain tags missing from the catalog. Skipped when no catalog is loaded.
fn check_domains(store: &GraphStore, result: &mut ValidationResult) {
    if store.domains().is_empty() {
        return;
    }

    let mut unknown: Vec<String> = store
        .all_nodes()
        .flat_map(|node| node.domains.iter())
        .filter(|domain| store.get_domain(domain).is_none())
        .cloned()
        .collect();
    unknown.sort();
    unknown.dedup();

    if !unknown.is_empty() {
        result.add_warning(ValidationIssue::new(
            "UNKNOWN_DOMAINS",
            format!(
                "{} domain tag(s) are not in the catalog: {}",
                unknown.len(),
                unknown.join(", ")
            ),
        ));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Domain, Edge, Node};

    fn prereq(id: &str, from: &str, to: &str) -> Edge {
        Edge::new(id, from, to, EdgeKind::Prerequisite)
    }

    #[test]
    fn test_clean_graph_is_valid() {
        let (store, violations) = GraphStore::load_lenient(
            vec![Node::new("a", "A"), Node::new("b", "B").with_prerequisite("a")],
            vec![prereq("ab", "a", "b")],
        );

        let result = validate_store(&store, &violations);
        assert!(result.valid);
        assert_eq!(result.total_issues(), 0);
        assert!(result.info.is_empty());
        assert!(is_valid(&store, &violations));
    }

    #[test]
    fn test_load_violations_become_errors() {
        let (store, violations) = GraphStore::load_lenient(
            vec![Node::new("a", "A"), Node::new("a", "A again"), Node::new("b", "B")],
            vec![
                prereq("ab", "a", "b"),
                prereq("ab", "b", "a"),
                prereq("gone", "a", "ghost"),
            ],
        );

        let result = validate_store(&store, &violations);
        assert!(!result.valid);
        assert_eq!(result.find("DANGLING_EDGES").unwrap().edges, vec!["gone"]);
        assert_eq!(result.find("DUPLICATE_NODE_IDS").unwrap().nodes, vec!["a"]);
        assert_eq!(result.find("DUPLICATE_EDGE_IDS").unwrap().edges, vec!["ab"]);
    }

    #[test]
    fn test_prerequisite_cycle_reports_members() {
        let (store, violations) = GraphStore::load_lenient(
            vec![Node::new("a", "A"), Node::new("b", "B"), Node::new("c", "C")],
            vec![prereq("ab", "a", "b"), prereq("ba", "b", "a"), prereq("bc", "b", "c")],
        );

        let result = validate_store(&store, &violations);
        let cycle = result.find("PREREQUISITE_CYCLE").unwrap();
        assert_eq!(cycle.nodes, vec!["a", "b"]);
        assert!(!result.valid);
    }

    #[test]
    fn test_related_cycle_is_not_a_prerequisite_cycle() {
        let (store, violations) = GraphStore::load_lenient(
            vec![Node::new("a", "A"), Node::new("b", "B")],
            vec![
                Edge::new("ab", "a", "b", EdgeKind::Related),
                Edge::new("ba", "b", "a", EdgeKind::Related),
            ],
        );

        let result = validate_store(&store, &violations);
        assert!(result.find("PREREQUISITE_CYCLE").is_none());
        assert!(result.find("DUPLICATE_EDGE_PAIRS").is_none());
    }

    #[test]
    fn test_structural_warnings() {
        let (store, violations) = GraphStore::load_lenient(
            vec![Node::new("a", "A"), Node::new("b", "B"), Node::new("lonely", "L")],
            vec![
                prereq("loop", "a", "a"),
                prereq("ab", "a", "b"),
                Edge::new("ab2", "a", "b", EdgeKind::Related),
            ],
        );

        let result = validate_store(&store, &violations);
        assert!(result.valid);
        assert_eq!(result.find("SELF_LOOPS").unwrap().edges, vec!["loop"]);
        assert_eq!(result.find("ISOLATED_NODES").unwrap().nodes, vec!["lonely"]);
        assert_eq!(result.find("DUPLICATE_EDGE_PAIRS").unwrap().edges, vec!["ab2"]);
        assert!(result.find("PREREQUISITE_CYCLE").is_none());
    }

    #[test]
    fn test_prerequisite_list_checks() {
        let (store, violations) = GraphStore::load_lenient(
            vec![
                Node::new("a", "A"),
                Node::new("b", "B")
                    .with_prerequisite("a")
                    .with_prerequisite("missing"),
            ],
            vec![Edge::new("ab", "a", "b", EdgeKind::Related)],
        );

        let result = validate_store(&store, &violations);
        assert_eq!(
            result.find("UNKNOWN_PREREQUISITE_REFS").unwrap().nodes,
            vec!["missing -> b"]
        );
        assert_eq!(result.info[0].code, "PREREQUISITES_WITHOUT_EDGES");
        assert_eq!(result.info[0].nodes, vec!["a -> b"]);
    }

    #[test]
    fn test_unknown_domains_only_with_catalog() {
        let (store, violations) = GraphStore::load_lenient(
            vec![Node::new("a", "A").with_domain("algebra").with_domain("mystery")],
            Vec::new(),
        );
        assert!(validate_store(&store, &violations).find("UNKNOWN_DOMAINS").is_none());

        let store = store.with_domains(vec![Domain::new("algebra", "Algebra")]);
        let result = validate_store(&store, &violations);
        let issue = result.find("UNKNOWN_DOMAINS").unwrap();
        assert!(issue.message.contains("mystery"));
        assert!(!issue.message.contains("algebra"));
    }

    #[test]
    fn test_validation_result_serialization() {
        let mut result = ValidationResult::new();
        result.add_warning(ValidationIssue::new("SELF_LOOPS", "1 edge(s) are self-loops"));

        let json = serde_json::to_string(&result).unwrap();
        let parsed: ValidationResult = serde_json::from_str(&json).unwrap();
        assert!(parsed.valid);
        assert_eq!(parsed.warnings[0].code, "SELF_LOOPS");
    }
}
