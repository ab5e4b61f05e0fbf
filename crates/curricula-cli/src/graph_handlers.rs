//! Handler functions for graph CLI commands.
//!
//! These functions implement the logic behind `graph validate`, `graph stats`,
//! `graph query`, `graph learning-path`, `graph connectivity`,
//! `graph cross-partition`, `graph merge` and `graph export`.

use crate::cli::PartitionBy;
use curricula_core::traits::{ConfigProvider, DataFile};
use curricula_core::{Error, Result};
use curricula_graph::connectivity::partition;
use curricula_graph::persistence::{
    GraphMetadata, RecordFile, Record, load_edges, load_nodes, load_records, save_graph,
    save_records,
};
use curricula_graph::stats::compute_stats_with_minutes;
use curricula_graph::{
    ConnectivityAnalyzer, ConnectivityReport, CrossPartitionEdge, Edge, GraphStore,
    LearningPathBuilder, LoadedGraph, MergeOptions, Node, NodeDegree, RelationshipResolver,
    load_store, merge_into, validate_store,
};
use std::path::{Path, PathBuf};

// ============================================================================
// Option types
// ============================================================================

/// Options for graph query operations.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Node ID to query.
    pub id: String,
    /// Type of query: "related", "prerequisites", "successors" or "path".
    pub query_type: String,
    /// Target node for path queries.
    pub to: Option<String>,
}

/// Options for learning path output.
#[derive(Debug, Clone)]
pub struct LearningPathOptions {
    /// Target node ID.
    pub id: String,
    /// Stop after this many prerequisite hops.
    pub max_depth: Option<usize>,
    /// Print JSON instead of text.
    pub json: bool,
    /// Minutes assumed for concepts without an estimate.
    pub default_minutes: u32,
}

/// Which nodes to look at for connectivity and cross-partition reports.
#[derive(Debug, Clone, Default)]
pub struct SubsetOptions {
    /// Nodes in this chapter.
    pub chapter: Option<String>,
    /// Nodes carrying this domain tag.
    pub domain: Option<String>,
}

/// Options for the merge pipeline.
#[derive(Debug, Clone)]
pub struct MergeCliOptions {
    /// File with incoming node records.
    pub nodes: Option<String>,
    /// File with incoming edge records.
    pub edges: Option<String>,
    /// Derive prerequisite edges from node prerequisite lists.
    pub derive_prerequisites: bool,
    /// Report without writing.
    pub dry_run: bool,
    /// Strength for derived edges.
    pub strength: f32,
}

// ============================================================================
// Helper: load data files
// ============================================================================

/// Load the configured node, edge and domain files into a store.
///
/// Integrity violations are kept on the result so `validate` can report them;
/// every other command works on the best-effort store.
pub fn load_data<C: ConfigProvider>(config: &C) -> Result<LoadedGraph> {
    let nodes = config.data_path(DataFile::Nodes)?;
    let edges = config.data_path(DataFile::Edges)?;
    let domains = config.data_path(DataFile::Domains)?;

    log::debug!(
        "Loading graph from {} and {}",
        nodes.display(),
        edges.display()
    );
    load_store(&nodes, &edges, Some(domains.as_path()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Validate data integrity and graph structure.
pub async fn handle_validate<C: ConfigProvider>(config: &C) -> Result<()> {
    let loaded = load_data(config)?;
    let result = validate_store(&loaded.store, &loaded.violations);

    if result.valid {
        println!("Graph is valid.");
    } else {
        println!("Graph has validation issues:");
    }

    for error in &result.errors {
        println!("  ERROR [{}]: {}", error.code, error.message);
        for node in &error.nodes {
            println!("    - {node}");
        }
        for edge in &error.edges {
            println!("    - {edge}");
        }
    }

    for warning in &result.warnings {
        println!("  WARN  [{}]: {}", warning.code, warning.message);
        for node in &warning.nodes {
            println!("    - {node}");
        }
        for edge in &warning.edges {
            println!("    - {edge}");
        }
    }

    for info in &result.info {
        println!("  INFO  [{}]: {}", info.code, info.message);
    }

    println!(
        "\nSummary: {} error(s), {} warning(s), {} info",
        result.errors.len(),
        result.warnings.len(),
        result.info.len()
    );

    if result.valid {
        Ok(())
    } else {
        Err(Error::operation(format!(
            "Graph validation failed with {} error(s)",
            result.errors.len()
        )))
    }
}

/// Show graph statistics.
pub async fn handle_stats<C: ConfigProvider>(config: &C, default_minutes: u32) -> Result<()> {
    let loaded = load_data(config)?;
    let stats = compute_stats_with_minutes(&loaded.store, default_minutes);

    println!("Graph Statistics");
    println!("================");
    println!("Nodes:          {}", stats.node_count);
    println!("  Isolated:     {}", stats.isolated_count);
    println!("Edges:          {}", stats.edge_count);
    println!("Domains:        {}", stats.domain_count);
    println!("Avg degree:     {:.2}", stats.avg_degree);
    println!("Avg strength:   {:.2}", stats.avg_strength);
    println!("Max in-degree:  {}", stats.max_in_degree);
    println!("Max out-degree: {}", stats.max_out_degree);
    println!("Study time:     {} min", stats.total_study_minutes);

    if let Some(ref node_id) = stats.most_depended_on {
        println!(
            "Most depended on: {node_id} (in-degree: {})",
            stats.max_in_degree
        );
    }
    if let Some(ref node_id) = stats.most_dependencies {
        println!(
            "Most dependencies: {node_id} (out-degree: {})",
            stats.max_out_degree
        );
    }

    print_distribution("Domains", stats.domain_distribution.iter());
    print_distribution("Chapters", stats.chapter_distribution.iter());
    print_distribution("Relationships", stats.relationship_distribution.iter());

    if !stats.difficulty_distribution.is_empty() {
        println!("\nDifficulty:");
        for (level, count) in &stats.difficulty_distribution {
            println!("  {level}: {count}");
        }
    }

    if !loaded.is_clean() {
        println!(
            "\n{} integrity violation(s); run `curricula graph validate` for details.",
            loaded.violations.len()
        );
    }

    Ok(())
}

/// Query the graph.
pub async fn handle_query<C: ConfigProvider>(config: &C, options: QueryOptions) -> Result<()> {
    let loaded = load_data(config)?;
    let store = &loaded.store;

    match options.query_type.as_str() {
        "related" => query_related(store, &options.id),
        "prerequisites" => query_prerequisites(store, &options.id),
        "successors" => query_successors(store, &options.id),
        "path" => {
            let to = options
                .to
                .ok_or_else(|| Error::config("--to is required for path queries"))?;
            query_path(store, &options.id, &to)
        }
        other => Err(Error::config(format!("Unknown query type: {other}"))),
    }
}

/// Show the study sequence leading to a concept.
pub async fn handle_learning_path<C: ConfigProvider>(
    config: &C,
    options: LearningPathOptions,
) -> Result<()> {
    let loaded = load_data(config)?;
    let store = &loaded.store;
    if !store.contains_node(&options.id) {
        return Err(Error::not_found("node", &options.id));
    }

    let mut builder = LearningPathBuilder::new(store).with_default_minutes(options.default_minutes);
    if let Some(depth) = options.max_depth {
        builder = builder.with_max_depth(depth);
    }
    let path = builder.build_path(&options.id);

    if options.json {
        let json = serde_json::to_string_pretty(&path)
            .map_err(|e| Error::serialization(format!("Failed to serialize path: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    println!("Learning path to '{}':", options.id);
    for step in &path.steps {
        println!(
            "  {}. {} ({}) [difficulty {}, {} min]",
            step.position,
            step.node.id,
            step.node.name,
            step.node.difficulty.level(),
            step.minutes
        );
        println!("       {}", step.reason);
    }
    println!(
        "\n{} step(s), {} min total",
        path.len(),
        path.total_minutes
    );
    if let Some(difficulty) = path.difficulty {
        println!("Hardest step: difficulty {}", difficulty.level());
    }

    Ok(())
}

/// Bucket nodes by how connected they are.
pub async fn handle_connectivity<C: ConfigProvider>(
    config: &C,
    options: SubsetOptions,
) -> Result<()> {
    let loaded = load_data(config)?;
    let analyzer = ConnectivityAnalyzer::new(&loaded.store);

    let (label, report) = match (&options.chapter, &options.domain) {
        (Some(chapter), _) => (format!("chapter '{chapter}'"), analyzer.classify_chapter(chapter)),
        (None, Some(domain)) => (format!("domain '{domain}'"), analyzer.classify_domain(domain)),
        (None, None) => ("all nodes".to_string(), analyzer.classify_all()),
    };

    println!("Connectivity for {label}:");
    print_report(&report);
    Ok(())
}

/// List edges that cross partition boundaries around a node set.
pub async fn handle_cross_partition<C: ConfigProvider>(
    config: &C,
    options: SubsetOptions,
    by: PartitionBy,
) -> Result<()> {
    let loaded = load_data(config)?;
    let store = &loaded.store;

    let subset: Vec<String> = match (&options.chapter, &options.domain) {
        (Some(chapter), _) => node_ids(store.nodes_in_chapter(chapter)),
        (None, Some(domain)) => node_ids(store.nodes_in_domain(domain)),
        (None, None) => {
            return Err(Error::config(
                "--chapter or --domain is required for cross-partition queries",
            ));
        }
    };

    let analyzer = ConnectivityAnalyzer::new(store);
    let crossings = match by {
        PartitionBy::Chapter => analyzer.find_cross_partition_edges(&subset, partition::by_chapter),
        PartitionBy::Domain => {
            analyzer.find_cross_partition_edges(&subset, partition::by_chapter_domain(store))
        }
    };

    println!(
        "Cross-partition edges around {} node(s):",
        subset.len()
    );
    if crossings.is_empty() {
        println!("  (none)");
    }
    for crossing in &crossings {
        print_crossing(crossing);
    }
    println!("\n{} edge(s)", crossings.len());

    Ok(())
}

/// Merge new records into the configured data files.
pub async fn handle_merge<C: ConfigProvider>(config: &C, options: MergeCliOptions) -> Result<()> {
    if options.nodes.is_none() && options.edges.is_none() && !options.derive_prerequisites {
        return Err(Error::config(
            "Nothing to merge: pass --nodes, --edges or --derive-prerequisites",
        ));
    }

    let nodes_path = config.data_path(DataFile::Nodes)?;
    let edges_path = config.data_path(DataFile::Edges)?;
    let mut nodes: RecordFile<Node> = load_existing(&nodes_path)?;
    let mut edges: RecordFile<Edge> = load_existing(&edges_path)?;

    let incoming_nodes = match options.nodes {
        Some(ref path) => load_nodes(path)?,
        None => Vec::new(),
    };
    let incoming_edges = match options.edges {
        Some(ref path) => load_edges(path)?,
        None => Vec::new(),
    };

    let merge_options = if options.derive_prerequisites {
        MergeOptions::default().with_derived_prerequisites(options.strength)
    } else {
        MergeOptions::default()
    };
    let report = merge_into(
        &mut nodes.records,
        &mut edges.records,
        incoming_nodes,
        incoming_edges,
        merge_options,
    );

    println!("Merge results:");
    println!(
        "  Nodes:   {} added, {} skipped",
        report.nodes.added, report.nodes.skipped
    );
    println!(
        "  Edges:   {} added, {} skipped",
        report.edges.added, report.edges.skipped
    );
    if options.derive_prerequisites {
        println!(
            "  Derived: {} added, {} skipped",
            report.derived.added, report.derived.skipped
        );
    }

    if options.dry_run {
        println!("\nDry run, nothing written.");
        return Ok(());
    }
    if report.is_noop() {
        println!("\nNothing new to write.");
        return Ok(());
    }

    if report.nodes.added > 0 {
        write_records(&nodes_path, &nodes)?;
        println!("\nNodes written to: {}", nodes_path.display());
    }
    if report.edges.added + report.derived.added > 0 {
        write_records(&edges_path, &edges)?;
        println!("Edges written to: {}", edges_path.display());
    }

    Ok(())
}

/// Write the loaded graph as a single JSON document.
pub async fn handle_export<C: ConfigProvider>(config: &C, output: &str) -> Result<()> {
    let loaded = load_data(config)?;
    if !loaded.is_clean() {
        log::warn!(
            "Exporting with {} integrity violation(s); offending records are left out",
            loaded.violations.len()
        );
    }

    let path = PathBuf::from(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let metadata = GraphMetadata::for_store(&loaded.store);
    save_graph(&loaded.store, &path, Some(metadata))?;
    println!(
        "Graph ({} nodes, {} edges) exported to: {}",
        loaded.store.node_count(),
        loaded.store.edge_count(),
        path.display()
    );

    Ok(())
}

// ============================================================================
// Query implementations
// ============================================================================

fn query_related(store: &GraphStore, id: &str) -> Result<()> {
    let resolver = RelationshipResolver::new(store);
    let response = resolver
        .related_by_kind(id)
        .ok_or_else(|| Error::not_found("node", id))?;

    println!("Related to '{}' ({}):", response.source.id, response.source.name);
    if response.related.is_empty() {
        println!("  (no related nodes)");
    }
    for group in &response.related {
        println!("  {}:", group.relationship);
        for node in &group.outgoing {
            println!("    -> {} ({})", node.id, node.name);
        }
        for node in &group.incoming {
            println!("    <- {} ({})", node.id, node.name);
        }
    }
    println!("\n{} related node(s)", response.total_count);

    Ok(())
}

fn query_prerequisites(store: &GraphStore, id: &str) -> Result<()> {
    if !store.contains_node(id) {
        return Err(Error::not_found("node", id));
    }
    let prerequisites = RelationshipResolver::new(store).get_prerequisites(id);

    println!("Prerequisites for '{id}' (strongest first):");
    print_nodes(&prerequisites, "(no prerequisites)");
    Ok(())
}

fn query_successors(store: &GraphStore, id: &str) -> Result<()> {
    if !store.contains_node(id) {
        return Err(Error::not_found("node", id));
    }
    let successors = RelationshipResolver::new(store).get_successors(id);

    println!("Concepts building on '{id}' (strongest first):");
    print_nodes(&successors, "(no successors)");
    Ok(())
}

fn query_path(store: &GraphStore, from: &str, to: &str) -> Result<()> {
    for id in [from, to] {
        if !store.contains_node(id) {
            return Err(Error::not_found("node", id));
        }
    }

    let Some(path) = RelationshipResolver::new(store).find_path(from, to) else {
        println!("No path found from '{from}' to '{to}'.");
        return Ok(());
    };

    println!("Path from '{from}' to '{to}':");
    for (i, node) in path.nodes.iter().enumerate() {
        if i > 0 {
            if let Some(edge) = path.edges.get(i - 1) {
                println!("    --[{}]--> ", edge.kind);
            }
        }
        println!("  {}. {} ({})", i + 1, node.id, node.name);
    }
    println!("\nLength: {} edge(s)", path.length());

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn node_ids(nodes: Vec<&Node>) -> Vec<String> {
    nodes.into_iter().map(|n| n.id.clone()).collect()
}

fn print_nodes(nodes: &[&Node], empty: &str) {
    if nodes.is_empty() {
        println!("  {empty}");
    }
    for (i, node) in nodes.iter().enumerate() {
        println!(
            "  {}. {} ({}) [difficulty {}]",
            i + 1,
            node.id,
            node.name,
            node.difficulty.level()
        );
    }
}

fn print_distribution<'a>(title: &str, entries: impl Iterator<Item = (&'a String, &'a usize)>) {
    let mut entries: Vec<_> = entries.collect();
    if entries.is_empty() {
        return;
    }
    entries.sort_by(|a, b| b.1.cmp(a.1));
    println!("\n{title}:");
    for (key, count) in entries {
        println!("  {key}: {count}");
    }
}

fn print_report(report: &ConnectivityReport) {
    let buckets: [(&str, &[NodeDegree]); 3] = [
        ("Isolated", report.isolated.as_slice()),
        ("Weak", report.weak.as_slice()),
        ("Well connected", report.well_connected.as_slice()),
    ];
    for (title, bucket) in buckets {
        println!("  {title} ({}):", bucket.len());
        for degree in bucket {
            println!(
                "    - {} (in: {}, out: {})",
                degree.id, degree.incoming, degree.outgoing
            );
        }
    }
    println!("\n{} node(s)", report.len());
}

fn print_crossing(crossing: &CrossPartitionEdge<'_, String>) {
    let side = |p: &Option<String>| p.clone().unwrap_or_else(|| "-".to_string());
    println!(
        "  [{:?}] {}: {} ({}) --[{}]--> {} ({})",
        crossing.direction,
        crossing.edge.id,
        crossing.edge.source,
        side(&crossing.source_partition),
        crossing.edge.kind.name(),
        crossing.edge.target,
        side(&crossing.target_partition),
    );
}

/// Load a data file for merging; a missing file starts an empty collection.
fn load_existing<T: Record>(path: &Path) -> Result<RecordFile<T>> {
    match load_records(path) {
        Ok(file) => Ok(file),
        Err(Error::FileNotFound(_)) => {
            log::info!("{} does not exist yet, starting empty", path.display());
            Ok(RecordFile::new(Vec::new()))
        }
        Err(e) => Err(e),
    }
}

fn write_records<T: Record>(path: &Path, file: &RecordFile<T>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    save_records(path, file)
}

// ============================================================================
// Tests
// ============================================================================
