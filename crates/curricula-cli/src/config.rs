//! Configuration for the Curricula CLI.
//!
//! Provides the [`CurriculaConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `CURRICULA_CONFIG` environment variable
//! 3. XDG default: `~/.config/curricula/config.toml`
//! 4. Built-in defaults

use confyg::{Confygery, env};
use curricula_core::traits::{ConfigProvider, DataFile};
use curricula_core::{Error, Result};
use curricula_graph::{DEFAULT_DERIVED_STRENGTH, DEFAULT_STUDY_MINUTES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CURRICULA_CONFIG";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Curricula CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculaConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Base path for all project data.
    pub base_path: Option<String>,

    /// Data file locations.
    pub data: DataConfig,

    /// Learning path settings.
    pub path: PathConfig,

    /// Merge pipeline settings.
    pub merge: MergeConfig,
}

/// Data file locations. Relative paths are resolved against the base path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Node records (default `data/nodes.json`).
    pub nodes_file: Option<String>,
    /// Edge records (default `data/edges.json`).
    pub edges_file: Option<String>,
    /// Domain catalog (default `data/domains.json`).
    pub domains_file: Option<String>,
}

/// Learning path settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Minutes assumed for concepts without an estimate.
    pub default_minutes: u32,
}

/// Merge pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Strength given to derived prerequisite edges.
    pub default_strength: f32,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for CurriculaConfig {
    fn default() -> Self {
        Self {
            project_name: "curricula".to_string(),
            base_path: None,
            data: DataConfig::default(),
            path: PathConfig::default(),
            merge: MergeConfig::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_STUDY_MINUTES,
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_strength: DEFAULT_DERIVED_STRENGTH,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl CurriculaConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let mut env_opts = env::Options::with_top_level("CURRICULA");
        env_opts.add_section("data");
        env_opts.add_section("path");
        env_opts.add_section("merge");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("curricula").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `CURRICULA_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "CURRICULA", &mut vars);
        Ok(vars)
    }

    fn configured_file(&self, file: DataFile) -> Option<&str> {
        match file {
            DataFile::Nodes => self.data.nodes_file.as_deref(),
            DataFile::Edges => self.data.edges_file.as_deref(),
            DataFile::Domains => self.data.domains_file.as_deref(),
        }
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for CurriculaConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    fn data_path(&self, file: DataFile) -> Result<PathBuf> {
        match self.configured_file(file) {
            Some(p) => {
                let path = PathBuf::from(p);
                if path.is_absolute() {
                    Ok(path)
                } else {
                    Ok(self.base_path()?.join(path))
                }
            }
            None => Ok(self
                .base_path()?
                .join("data")
                .join(file.default_file_name())),
        }
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
