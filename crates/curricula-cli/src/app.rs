//! CurriculaCli application framework.
//!
//! Provides the CLI application, generic over the [`ConfigProvider`] it
//! reads data locations from.

use crate::cli::{BaseCommand, CliArgs, GraphSubcommand};
use crate::config::CurriculaConfig;
use crate::graph_handlers::{LearningPathOptions, MergeCliOptions, QueryOptions, SubsetOptions};
use crate::{config_handlers, graph_handlers};
use curricula_core::Result;
use curricula_core::traits::ConfigProvider;
use curricula_graph::{DEFAULT_DERIVED_STRENGTH, DEFAULT_STUDY_MINUTES};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CurriculaCli
// ============================================================================

/// CLI application parameterized over a config provider.
pub struct CurriculaCli<C: ConfigProvider> {
    name: String,
    config: Arc<C>,
    version: String,
    default_minutes: u32,
    merge_strength: f32,
}

impl CurriculaCli<CurriculaConfig> {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = CurriculaConfig::load(args.config.as_deref())?;
        let default_minutes = config.path.default_minutes;
        let merge_strength = config.merge.default_strength;
        Ok(Self::new(name, config)
            .with_default_minutes(default_minutes)
            .with_merge_strength(merge_strength))
    }
}

impl<C: ConfigProvider> CurriculaCli<C> {
    /// Create a new CLI application.
    pub fn new(name: impl Into<String>, config: C) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
            default_minutes: DEFAULT_STUDY_MINUTES,
            merge_strength: DEFAULT_DERIVED_STRENGTH,
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Minutes assumed for concepts without an estimate.
    pub fn with_default_minutes(mut self, minutes: u32) -> Self {
        self.default_minutes = minutes;
        self
    }

    /// Strength given to derived prerequisite edges.
    pub fn with_merge_strength(mut self, strength: f32) -> Self {
        self.merge_strength = strength;
        self
    }

    /// Get a reference to the config provider.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Graph(graph_cmd)) => self.handle_graph(graph_cmd.command).await,
            Some(BaseCommand::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("{} {}: use --help for usage", self.name, self.version);
                Ok(())
            }
        }
    }

    /// Dispatch graph subcommands to handlers.
    async fn handle_graph(&self, command: GraphSubcommand) -> Result<()> {
        tracing::debug!(project = self.config.project_name(), ?command, "dispatching graph command");
        let config = &*self.config;
        match command {
            GraphSubcommand::Validate => graph_handlers::handle_validate(config).await,
            GraphSubcommand::Stats => {
                graph_handlers::handle_stats(config, self.default_minutes).await
            }
            GraphSubcommand::Query { id, query_type, to } => {
                let options = QueryOptions { id, query_type, to };
                graph_handlers::handle_query(config, options).await
            }
            GraphSubcommand::LearningPath { id, max_depth, json } => {
                let options = LearningPathOptions {
                    id,
                    max_depth,
                    json,
                    default_minutes: self.default_minutes,
                };
                graph_handlers::handle_learning_path(config, options).await
            }
            GraphSubcommand::Connectivity { chapter, domain } => {
                graph_handlers::handle_connectivity(config, SubsetOptions { chapter, domain }).await
            }
            GraphSubcommand::CrossPartition {
                chapter,
                domain,
                by,
            } => {
                let subset = SubsetOptions { chapter, domain };
                graph_handlers::handle_cross_partition(config, subset, by).await
            }
            GraphSubcommand::Merge {
                nodes,
                edges,
                derive_prerequisites,
                dry_run,
            } => {
                let options = MergeCliOptions {
                    nodes,
                    edges,
                    derive_prerequisites,
                    dry_run,
                    strength: self.merge_strength,
                };
                graph_handlers::handle_merge(config, options).await
            }
            GraphSubcommand::Export { output } => {
                graph_handlers::handle_export(config, &output).await
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
