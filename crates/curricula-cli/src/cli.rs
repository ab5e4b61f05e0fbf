//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "curricula", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "CURRICULA_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Print version information.
    Version,

    /// Graph operations.
    Graph(GraphCommand),

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "path.default_minutes").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "data.nodes_file").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

/// Graph-specific subcommands.
#[derive(Parser, Debug)]
pub struct GraphCommand {
    /// Graph subcommand to execute.
    #[command(subcommand)]
    pub command: GraphSubcommand,
}

/// Which grouping to compare across.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionBy {
    /// Legacy chapter tag.
    Chapter,
    /// Domain owning the chapter, else the primary domain tag.
    Domain,
}

/// Available graph subcommands.
#[derive(Subcommand, Debug)]
pub enum GraphSubcommand {
    /// Check data integrity and structure.
    Validate,

    /// Show graph statistics.
    Stats,

    /// Query the graph.
    Query {
        /// Node ID to query.
        #[arg(short, long)]
        id: String,

        /// Type of query: related, prerequisites, successors, path.
        #[arg(short = 't', long, default_value = "related")]
        query_type: String,

        /// Target node ID (for path queries).
        #[arg(long)]
        to: Option<String>,
    },

    /// Show the study sequence leading to a concept.
    LearningPath {
        /// Target node ID.
        #[arg(short, long)]
        id: String,

        /// Stop after this many prerequisite hops.
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Bucket nodes by how connected they are.
    Connectivity {
        /// Only nodes in this chapter.
        #[arg(long, conflicts_with = "domain")]
        chapter: Option<String>,

        /// Only nodes carrying this domain tag.
        #[arg(long)]
        domain: Option<String>,
    },

    /// List edges that cross partition boundaries around a node set.
    CrossPartition {
        /// Nodes in this chapter.
        #[arg(long, conflicts_with = "domain", required_unless_present = "domain")]
        chapter: Option<String>,

        /// Nodes carrying this domain tag.
        #[arg(long)]
        domain: Option<String>,

        /// Partition key to compare.
        #[arg(long, value_enum, default_value = "domain")]
        by: PartitionBy,
    },

    /// Merge new nodes and edges into the configured data files.
    Merge {
        /// Incoming node records.
        #[arg(long)]
        nodes: Option<String>,

        /// Incoming edge records.
        #[arg(long)]
        edges: Option<String>,

        /// Also derive prerequisite edges from node prerequisite lists.
        #[arg(long)]
        derive_prerequisites: bool,

        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the loaded graph as a single JSON document.
    Export {
        /// Output file path.
        #[arg(short, long)]
        output: String,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["test"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_flags() {
        let args = CliArgs::parse_from(["test", "--verbose", "--config", "/etc/c.toml"]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("/etc/c.toml"));

        let args = CliArgs::parse_from(["test", "-q"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_version_command() {
        let args = CliArgs::parse_from(["test", "version"]);
        assert!(matches!(args.command, Some(BaseCommand::Version)));
    }

    #[test]
    fn test_graph_query_defaults() {
        let args = CliArgs::parse_from(["test", "graph", "query", "--id", "limits"]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Query { id, query_type, to },
            })) => {
                assert_eq!(id, "limits");
                assert_eq!(query_type, "related");
                assert!(to.is_none());
            }
            _ => panic!("Expected Graph Query command"),
        }
    }

    #[test]
    fn test_graph_query_path() {
        let args = CliArgs::parse_from([
            "test", "graph", "query", "--id", "a", "-t", "path", "--to", "b",
        ]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Query { query_type, to, .. },
            })) => {
                assert_eq!(query_type, "path");
                assert_eq!(to.as_deref(), Some("b"));
            }
            _ => panic!("Expected Graph Query path command"),
        }
    }

    #[test]
    fn test_learning_path_command() {
        let args = CliArgs::parse_from([
            "test",
            "graph",
            "learning-path",
            "--id",
            "derivatives",
            "--max-depth",
            "2",
            "--json",
        ]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::LearningPath { id, max_depth, json },
            })) => {
                assert_eq!(id, "derivatives");
                assert_eq!(max_depth, Some(2));
                assert!(json);
            }
            _ => panic!("Expected Graph LearningPath command"),
        }
    }

    #[test]
    fn test_connectivity_command() {
        let args = CliArgs::parse_from(["test", "graph", "connectivity", "--chapter", "ch1"]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::Connectivity { chapter, domain },
            })) => {
                assert_eq!(chapter.as_deref(), Some("ch1"));
                assert!(domain.is_none());
            }
            _ => panic!("Expected Graph Connectivity command"),
        }
    }

    #[test]
    fn test_connectivity_rejects_both_filters() {
        let result = CliArgs::try_parse_from([
            "test",
            "graph",
            "connectivity",
            "--chapter",
            "ch1",
            "--domain",
            "calculus",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cross_partition_command() {
        let args = CliArgs::parse_from([
            "test",
            "graph",
            "cross-partition",
            "--domain",
            "calculus",
            "--by",
            "chapter",
        ]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command: GraphSubcommand::CrossPartition { chapter, domain, by },
            })) => {
                assert!(chapter.is_none());
                assert_eq!(domain.as_deref(), Some("calculus"));
                assert_eq!(by, PartitionBy::Chapter);
            }
            _ => panic!("Expected Graph CrossPartition command"),
        }
    }

    #[test]
    fn test_cross_partition_requires_subset() {
        let result = CliArgs::try_parse_from(["test", "graph", "cross-partition"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_command() {
        let args = CliArgs::parse_from([
            "test",
            "graph",
            "merge",
            "--nodes",
            "new.json",
            "--derive-prerequisites",
            "--dry-run",
        ]);
        match args.command {
            Some(BaseCommand::Graph(GraphCommand {
                command:
                    GraphSubcommand::Merge {
                        nodes,
                        edges,
                        derive_prerequisites,
                        dry_run,
                    },
            })) => {
                assert_eq!(nodes.as_deref(), Some("new.json"));
                assert!(edges.is_none());
                assert!(derive_prerequisites);
                assert!(dry_run);
            }
            _ => panic!("Expected Graph Merge command"),
        }
    }

    #[test]
    fn test_config_set_command() {
        let args = CliArgs::parse_from(["test", "config", "set", "path.default_minutes", "45"]);
        match args.command {
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Set { key, value },
            })) => {
                assert_eq!(key, "path.default_minutes");
                assert_eq!(value, "45");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_config_init_and_export() {
        let args = CliArgs::parse_from(["test", "config", "init", "--force"]);
        assert!(matches!(
            args.command,
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Init { force: true, .. }
            }))
        ));

        let args = CliArgs::parse_from(["test", "config", "export", "--docker-env"]);
        assert!(matches!(
            args.command,
            Some(BaseCommand::Config(ConfigCommand {
                command: ConfigAction::Export { docker_env: true }
            }))
        ));
    }
}
