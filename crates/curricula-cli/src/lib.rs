//! Command-line tooling for Curricula knowledge graphs.
//!
//! Loads node, edge and domain files from the configured project and runs
//! validation, statistics, queries, learning paths, connectivity reports,
//! merges and exports over them.
//!
//! # Key Abstractions
//!
//! - [`CurriculaCli`]: CLI application generic over a config provider
//! - [`CurriculaConfig`]: TOML/env configuration loaded via `confyg`
//! - [`CliArgs`]: clap argument tree

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod graph_handlers;

pub use app::CurriculaCli;
pub use cli::CliArgs;
pub use config::CurriculaConfig;
