//! Configuration abstraction shared by the Curricula crates.
//!
//! The graph tooling never reads configuration files itself. Applications
//! implement [`ConfigProvider`] and pass it down, so the same handlers work
//! against a TOML-backed config, a test fixture, or anything else.

use std::fmt;
use std::path::PathBuf;

use crate::Result;

/// The flat JSON files a curriculum graph is stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataFile {
    /// Concept records.
    Nodes,
    /// Relationship records.
    Edges,
    /// Domain catalog (optional on disk).
    Domains,
}

impl DataFile {
    /// Conventional file name under `<base>/data/`.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Nodes => "nodes.json",
            Self::Edges => "edges.json",
            Self::Domains => "domains.json",
        }
    }

    /// Short lowercase name, used in log and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Edges => "edges",
            Self::Domains => "domains",
        }
    }
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for application configuration.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use curricula_core::traits::{ConfigProvider, DataFile};
/// use curricula_core::Result;
///
/// #[derive(Clone)]
/// struct FixtureConfig {
///     root: PathBuf,
/// }
///
/// impl ConfigProvider for FixtureConfig {
///     fn project_name(&self) -> &str {
///         "fixture"
///     }
///
///     fn base_path(&self) -> Result<PathBuf> {
///         Ok(self.root.clone())
///     }
/// }
///
/// let config = FixtureConfig { root: PathBuf::from("/srv/math") };
/// assert_eq!(
///     config.data_path(DataFile::Edges).unwrap(),
///     PathBuf::from("/srv/math/data/edges.json")
/// );
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for display and default paths.
    fn project_name(&self) -> &str;

    /// Base path for all project data.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined.
    fn base_path(&self) -> Result<PathBuf>;

    /// Path of one of the graph data files.
    ///
    /// Defaults to `<base>/data/<file>.json`; implementations override this
    /// when individual files are configured explicitly.
    fn data_path(&self, file: DataFile) -> Result<PathBuf> {
        Ok(self.base_path()?.join("data").join(file.default_file_name()))
    }
}
