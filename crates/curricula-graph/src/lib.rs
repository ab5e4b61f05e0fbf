//! Knowledge graph for a mathematics curriculum.
//!
//! This crate holds concept nodes and relationship edges in a petgraph
//! `DiGraph` and answers the questions a curriculum viewer asks of them.
//!
//! # Key Abstractions
//!
//! - [`GraphStore`]: immutable, indexed collection; loading reports every
//!   dangling reference at once
//! - [`RelationshipResolver`]: prerequisite, successor and related queries
//! - [`ConnectivityAnalyzer`]: degree buckets and cross-partition edges
//! - [`LearningPathBuilder`]: ordered study sequence towards a concept

#![doc = include_str!("../README.md")]

pub mod connectivity;
pub mod learning_path;
pub mod merge;
pub mod persistence;
pub mod query;
pub mod resolver;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

pub use connectivity::{
    ConnectivityAnalyzer, ConnectivityClass, ConnectivityReport, CrossDirection,
    CrossPartitionEdge, NodeDegree, WEAK_MAX_EDGES,
};
pub use learning_path::{DEFAULT_STUDY_MINUTES, LearningPath, LearningPathBuilder, PathStep};
pub use merge::{
    DEFAULT_DERIVED_STRENGTH, MergeCounts, MergeOptions, MergeReport, derive_prerequisite_edges,
    merge_edges, merge_into, merge_nodes,
};
pub use persistence::{LoadedGraph, load_store};
pub use query::{ConceptPath, EdgeInfo, NodeSummary, RelatedConceptsResponse, RelatedGroup};
pub use resolver::RelationshipResolver;
pub use stats::{GraphStats, compute_stats};
pub use store::{DataIntegrityError, GraphStore, IntegrityViolation, MissingEndpoint};
pub use types::{Difficulty, Domain, Edge, EdgeKind, Node, Strength};
pub use validation::{ValidationIssue, ValidationResult, validate_store};
