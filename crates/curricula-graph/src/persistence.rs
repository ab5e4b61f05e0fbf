//! Reading and writing curriculum data files.
//!
//! Node, edge and domain files are JSON. Each is either a bare array or an
//! object wrapping the array under its collection name (`{"nodes": [...]}`),
//! and is written back in the shape it was read. A combined graph document
//! (`{"nodes", "edges", "domains", "metadata"}`) is supported for snapshots.
//!
//! Parsing is strict: every record is checked against the schema, and all
//! bad records in a file are reported together as one [`Error::Parse`].

use crate::{Domain, Edge, GraphStore, IntegrityViolation, Node};
use curricula_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

// ============================================================================
// Record files
// ============================================================================

/// A record type stored in its own collection file.
pub trait Record: Serialize + DeserializeOwned {
    /// Wrapper key and human-readable collection name.
    const COLLECTION: &'static str;
}

impl Record for Node {
    const COLLECTION: &'static str = "nodes";
}

impl Record for Edge {
    const COLLECTION: &'static str = "edges";
}

impl Record for Domain {
    const COLLECTION: &'static str = "domains";
}

/// How a collection file lays out its records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordShape {
    /// A top-level JSON array.
    #[default]
    Array,
    /// An object with the array under the collection key.
    Wrapped,
}

/// Records parsed from one file, with the layout they came in.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordFile<T> {
    /// Parsed records, in file order.
    pub records: Vec<T>,
    /// The layout to write them back in.
    pub shape: RecordShape,
}

impl<T: Record> RecordFile<T> {
    /// Wrap records that will be written as a bare array.
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            shape: RecordShape::Array,
        }
    }

    /// Render as pretty JSON in this file's shape.
    pub fn to_json(&self) -> Result<String> {
        let rendered = match self.shape {
            RecordShape::Array => serde_json::to_string_pretty(&self.records),
            RecordShape::Wrapped => {
                let mut wrapper = serde_json::Map::new();
                let records = serde_json::to_value(&self.records).map_err(|e| {
                    Error::serialization(format!("Failed to serialize {}: {e}", T::COLLECTION))
                })?;
                wrapper.insert(T::COLLECTION.to_string(), records);
                serde_json::to_string_pretty(&wrapper)
            }
        };
        rendered.map_err(|e| {
            Error::serialization(format!("Failed to serialize {}: {e}", T::COLLECTION))
        })
    }
}

/// Parse a collection from a JSON string.
///
/// `source` names the input in error messages (usually the file path).
pub fn parse_records<T: Record>(json: &str, source: &str) -> Result<RecordFile<T>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::parse(format!("{source}: invalid JSON: {e}")))?;

    let (items, shape) = match value {
        Value::Array(items) => (items, RecordShape::Array),
        Value::Object(mut map) => match map.remove(T::COLLECTION) {
            Some(Value::Array(items)) => (items, RecordShape::Wrapped),
            _ => {
                return Err(Error::parse(format!(
                    "{source}: expected an array of {0} or an object with a \"{0}\" array",
                    T::COLLECTION
                )));
            }
        },
        _ => {
            return Err(Error::parse(format!(
                "{source}: expected an array of {}",
                T::COLLECTION
            )));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut problems = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(e) => problems.push(match id {
                Some(id) => format!("record {index} ('{id}'): {e}"),
                None => format!("record {index}: {e}"),
            }),
        }
    }

    if !problems.is_empty() {
        return Err(Error::parse(format!(
            "{source}: {} invalid {} record(s): {}",
            problems.len(),
            T::COLLECTION,
            problems.join("; ")
        )));
    }

    log::debug!("Parsed {} {} from {source}", records.len(), T::COLLECTION);
    Ok(RecordFile { records, shape })
}

/// Read and parse a collection file.
pub fn load_records<T: Record>(path: impl AsRef<Path>) -> Result<RecordFile<T>> {
    let path = path.as_ref();
    let json = read_file(path)?;
    parse_records(&json, &path.display().to_string())
}

/// Write a collection file in its recorded shape.
pub fn save_records<T: Record>(path: impl AsRef<Path>, file: &RecordFile<T>) -> Result<()> {
    let path = path.as_ref();
    let json = file.to_json()?;
    std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))?;
    log::debug!(
        "Wrote {} {} to {}",
        file.records.len(),
        T::COLLECTION,
        path.display()
    );
    Ok(())
}

/// Parse node records.
pub fn parse_nodes(json: &str, source: &str) -> Result<Vec<Node>> {
    parse_records(json, source).map(|file| file.records)
}

/// Parse edge records.
pub fn parse_edges(json: &str, source: &str) -> Result<Vec<Edge>> {
    parse_records(json, source).map(|file| file.records)
}

/// Parse domain records.
pub fn parse_domains(json: &str, source: &str) -> Result<Vec<Domain>> {
    parse_records(json, source).map(|file| file.records)
}

/// Load node records from a file.
pub fn load_nodes(path: impl AsRef<Path>) -> Result<Vec<Node>> {
    load_records(path).map(|file| file.records)
}

/// Load edge records from a file.
pub fn load_edges(path: impl AsRef<Path>) -> Result<Vec<Edge>> {
    load_records(path).map(|file| file.records)
}

/// Load domain records from a file.
pub fn load_domains(path: impl AsRef<Path>) -> Result<Vec<Domain>> {
    load_records(path).map(|file| file.records)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path)
        } else {
            Error::io_with_path(e, path)
        }
    })
}

// ============================================================================
// Store loading
// ============================================================================

/// A store built from files, with whatever integrity problems it had.
#[derive(Clone, Debug)]
pub struct LoadedGraph {
    /// The store, built from the valid records.
    pub store: GraphStore,
    /// Integrity violations found while indexing.
    pub violations: Vec<IntegrityViolation>,
}

impl LoadedGraph {
    /// Whether indexing found no violations.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Load nodes, edges and (optionally) domains into a store.
///
/// Schema errors fail the load. Integrity violations do not: they are
/// returned alongside the best-effort store. A missing domains file is
/// treated as an empty catalog.
pub fn load_store(
    nodes_path: impl AsRef<Path>,
    edges_path: impl AsRef<Path>,
    domains_path: Option<&Path>,
) -> Result<LoadedGraph> {
    let nodes = load_nodes(nodes_path)?;
    let edges = load_edges(edges_path)?;
    let domains = match domains_path {
        Some(path) => match load_domains(path) {
            Ok(domains) => domains,
            Err(Error::FileNotFound(_)) => {
                log::debug!("No domain catalog at {}", path.display());
                Vec::new()
            }
            Err(e) => return Err(e),
        },
        None => Vec::new(),
    };

    let (store, violations) = GraphStore::load_lenient(nodes, edges);
    Ok(LoadedGraph {
        store: store.with_domains(domains),
        violations,
    })
}

// ============================================================================
// Graph documents
// ============================================================================

/// A whole graph in one JSON document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SerializableGraph {
    /// All nodes.
    pub nodes: Vec<Node>,
    /// All indexed edges.
    pub edges: Vec<Edge>,
    /// The domain catalog.
    #[serde(default)]
    pub domains: Vec<Domain>,
    /// Optional metadata about the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GraphMetadata>,
}

impl From<&GraphStore> for SerializableGraph {
    fn from(store: &GraphStore) -> Self {
        Self {
            nodes: store.all_nodes().cloned().collect(),
            edges: store.all_edges().cloned().collect(),
            domains: store.domains().to_vec(),
            metadata: None,
        }
    }
}

/// Metadata about a persisted graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the snapshot was written (unix timestamp).
    pub built_at: String,
    /// Version of the writer.
    pub builder_version: String,
    /// Node count at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<usize>,
    /// Edge count at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_count: Option<usize>,
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self {
            built_at: timestamp_now(),
            builder_version: env!("CARGO_PKG_VERSION").to_string(),
            node_count: None,
            edge_count: None,
        }
    }
}

impl GraphMetadata {
    /// Metadata stamped now, with counts taken from `store`.
    pub fn for_store(store: &GraphStore) -> Self {
        Self {
            node_count: Some(store.node_count()),
            edge_count: Some(store.edge_count()),
            ..Self::default()
        }
    }
}

fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", duration.as_secs())
}

/// Save a store as a single graph document.
pub fn save_graph(
    store: &GraphStore,
    path: impl AsRef<Path>,
    metadata: Option<GraphMetadata>,
) -> Result<()> {
    let mut document = SerializableGraph::from(store);
    document.metadata = metadata;

    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| Error::serialization(format!("Failed to serialize graph: {e}")))?;

    std::fs::write(path.as_ref(), json).map_err(|e| Error::io_with_path(e, path.as_ref()))?;
    Ok(())
}

/// Load a graph document from a file.
pub fn load_graph(path: impl AsRef<Path>) -> Result<LoadedGraph> {
    let path = path.as_ref();
    let json = read_file(path)?;
    let source = path.display().to_string();
    load_graph_from_str(&json, &source)
}

/// Load a graph document from a JSON string.
pub fn load_graph_from_str(json: &str, source: &str) -> Result<LoadedGraph> {
    let nodes = parse_nodes(json, source)?;
    let edges = parse_edges(json, source)?;
    let document: Value = serde_json::from_str(json)
        .map_err(|e| Error::parse(format!("{source}: invalid JSON: {e}")))?;
    let domains = if document.get("domains").is_some() {
        parse_domains(json, source)?
    } else {
        Vec::new()
    };

    let (store, violations) = GraphStore::load_lenient(nodes, edges);
    Ok(LoadedGraph {
        store: store.with_domains(domains),
        violations,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EdgeKind;
    use tempfile::TempDir;

    const NODES: &str = r#"[
        {"id": "limits", "name": "Limits", "difficulty": 2, "domains": ["calculus"],
         "chapter": "ch1", "estimatedStudyTime": 40, "nameEn": "Limits"},
        {"id": "derivatives", "name": "Derivatives", "difficulty": 3,
         "prerequisites": ["limits"]}
    ]"#;

    const EDGES: &str = r#"{"edges": [
        {"id": "e1", "source": "limits", "target": "derivatives",
         "type": "prerequisite", "strength": 0.9}
    ]}"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_array_and_wrapped() {
        let nodes: RecordFile<Node> = parse_records(NODES, "nodes.json").unwrap();
        assert_eq!(nodes.shape, RecordShape::Array);
        assert_eq!(nodes.records.len(), 2);
        assert_eq!(nodes.records[0].estimated_study_time, Some(40));
        assert_eq!(nodes.records[1].prerequisites, vec!["limits"]);

        let edges: RecordFile<Edge> = parse_records(EDGES, "edges.json").unwrap();
        assert_eq!(edges.shape, RecordShape::Wrapped);
        assert_eq!(edges.records[0].kind, EdgeKind::Prerequisite);
    }

    #[test]
    fn test_edge_kind_alias() {
        let json = r#"[{"id": "e", "source": "a", "target": "b", "kind": "cross-domain", "strength": 0.5}]"#;
        let edges = parse_edges(json, "edges.json").unwrap();
        assert_eq!(edges[0].kind, EdgeKind::CrossDomain);
    }

    #[test]
    fn test_schema_errors_reported_together() {
        let json = r#"[
            {"id": "ok", "name": "Ok", "difficulty": 1},
            {"id": "too-hard", "name": "Hard", "difficulty": 9},
            {"name": "No id", "difficulty": 2}
        ]"#;

        let err = parse_nodes(json, "nodes.json").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, Error::Parse(_)));
        assert!(msg.contains("nodes.json"));
        assert!(msg.contains("2 invalid nodes record(s)"));
        assert!(msg.contains("record 1 ('too-hard')"));
        assert!(msg.contains("record 2:"));
    }

    #[test]
    fn test_strength_out_of_range_rejected() {
        let json = r#"[{"id": "e", "source": "a", "target": "b", "type": "related", "strength": 1.5}]"#;
        assert!(parse_edges(json, "edges.json").is_err());
    }

    #[test]
    fn test_wrong_top_level_shape() {
        let err = parse_nodes(r#"{"edges": []}"#, "nodes.json").unwrap_err();
        assert!(err.to_string().contains("\"nodes\""));
        assert!(parse_nodes("42", "nodes.json").is_err());
        assert!(parse_nodes("not json", "nodes.json").is_err());
    }

    #[test]
    fn test_save_preserves_shape() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "edges.json", EDGES);

        let mut file: RecordFile<Edge> = load_records(&path).unwrap();
        file.records
            .push(Edge::new("e2", "derivatives", "limits", EdgeKind::Related));
        save_records(&path, &file).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["edges"].as_array().unwrap().len(), 2);
        assert_eq!(raw["edges"][1]["type"], "related");
    }

    #[test]
    fn test_load_store_with_missing_domains() {
        let dir = TempDir::new().unwrap();
        let nodes = write(&dir, "nodes.json", NODES);
        let edges = write(&dir, "edges.json", EDGES);
        let domains = dir.path().join("domains.json");

        let loaded = load_store(&nodes, &edges, Some(domains.as_path())).unwrap();
        assert!(loaded.is_clean());
        assert_eq!(loaded.store.node_count(), 2);
        assert_eq!(loaded.store.edge_count(), 1);
        assert!(loaded.store.domains().is_empty());
    }

    #[test]
    fn test_load_store_reports_violations() {
        let dir = TempDir::new().unwrap();
        let nodes = write(&dir, "nodes.json", NODES);
        let edges = write(
            &dir,
            "edges.json",
            r#"[{"id": "bad", "source": "limits", "target": "ghost", "type": "related", "strength": 0.4}]"#,
        );
        let domains = write(
            &dir,
            "domains.json",
            r#"{"domains": [{"id": "calculus", "name": "Calculus", "chapters": ["ch1"]}]}"#,
        );

        let loaded = load_store(&nodes, &edges, Some(domains.as_path())).unwrap();
        assert_eq!(loaded.violations.len(), 1);
        assert_eq!(loaded.store.edge_count(), 0);
        assert_eq!(
            loaded.store.domain_for_chapter("ch1").map(|d| d.id.as_str()),
            Some("calculus")
        );
    }

    #[test]
    fn test_missing_nodes_file() {
        let dir = TempDir::new().unwrap();
        let err = load_nodes(dir.path().join("nodes.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_graph_document_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");

        let store = GraphStore::load(
            parse_nodes(NODES, "nodes").unwrap(),
            parse_edges(EDGES, "edges").unwrap(),
        )
        .unwrap()
        .with_domains(vec![Domain::new("calculus", "Calculus")]);

        save_graph(&store, &path, Some(GraphMetadata::for_store(&store))).unwrap();
        let loaded = load_graph(&path).unwrap();

        assert!(loaded.is_clean());
        assert_eq!(loaded.store.node_count(), 2);
        assert_eq!(loaded.store.edge_count(), 1);
        assert_eq!(loaded.store.domains().len(), 1);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["metadata"]["node_count"], 2);
    }

    #[test]
    fn test_graph_document_without_domains() {
        let json = r#"{"nodes": [], "edges": []}"#;
        let loaded = load_graph_from_str(json, "graph.json").unwrap();
        assert_eq!(loaded.store.node_count(), 0);
        assert!(loaded.store.domains().is_empty());
    }
}
