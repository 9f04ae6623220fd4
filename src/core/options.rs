//! core::options
//!
//! Store construction options and the configuration error taxonomy.
//!
//! # Defaults
//!
//! | Option | Default |
//! |---|---|
//! | `branch` | `"master"` |
//! | `init` | `true` (create the repository if missing) |
//! | `bare` | `true` (a newly created repository is bare) |
//! | `committer_name` / `committer_email` | `"gitkv"` |
//!
//! Only the repository directory is required. Configuration problems are
//! surfaced immediately at construction and never retried.
//!
//! # Example
//!
//! ```
//! use gitkv::core::options::Options;
//!
//! let options = Options::new("/tmp/store")
//!     .branch("values")
//!     .bare(false)
//!     .committer("Backup Job", "backup@example.com");
//! assert_eq!(options.branch, "values");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::TypeError;

/// Default committer placeholder, used for both name and email.
pub const DEFAULT_COMMITTER: &str = "gitkv";

/// Default branch the store reads and updates.
pub const DEFAULT_BRANCH: &str = "master";

/// Errors from store configuration.
///
/// All of these are construction-time failures: once a
/// [`Store`](crate::store::Store) is open, configuration can no longer fail.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No repository directory was given.
    #[error("no repository directory specified")]
    MissingDir,

    /// The directory could not be created.
    #[error("cannot create repository directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying filesystem error
        source: std::io::Error,
    },

    /// The location exists but is not a directory.
    #[error("{path} is not a directory")]
    NotADirectory {
        /// The offending path
        path: PathBuf,
    },

    /// The location is not a git repository and `init` is disabled.
    #[error(
        "{path} is not a git repository; enable `init` to initialize one automatically"
    )]
    NotARepository {
        /// The offending path
        path: PathBuf,
    },

    /// The configured branch name is invalid.
    #[error(transparent)]
    InvalidBranch(#[from] TypeError),
}

/// Options for opening a [`Store`](crate::store::Store).
///
/// Built with [`Options::new`] plus chained setters; every field other than
/// `dir` has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Repository directory (required).
    pub dir: PathBuf,
    /// Name of the branch to read and update.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Create the repository if it doesn't exist.
    #[serde(default = "default_true")]
    pub init: bool,
    /// Whether a newly created repository is bare.
    #[serde(default = "default_true")]
    pub bare: bool,
    /// Default committer display name.
    #[serde(default = "default_committer")]
    pub committer_name: String,
    /// Default committer email.
    #[serde(default = "default_committer")]
    pub committer_email: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_committer() -> String {
    DEFAULT_COMMITTER.to_string()
}

fn default_true() -> bool {
    true
}

impl Options {
    /// Create options for the given repository directory, with defaults for
    /// everything else.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            branch: default_branch(),
            init: true,
            bare: true,
            committer_name: default_committer(),
            committer_email: default_committer(),
        }
    }

    /// Set the branch the store reads and updates.
    pub fn branch(mut self, name: impl Into<String>) -> Self {
        self.branch = name.into();
        self
    }

    /// Set whether to create the repository if it doesn't exist.
    pub fn init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    /// Set whether a newly created repository is bare.
    pub fn bare(mut self, bare: bool) -> Self {
        self.bare = bare;
        self
    }

    /// Set the default committer identity.
    pub fn committer(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.committer_name = name.into();
        self.committer_email = email.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::new("/tmp/store");
        assert_eq!(options.branch, "master");
        assert!(options.init);
        assert!(options.bare);
        assert_eq!(options.committer_name, "gitkv");
        assert_eq!(options.committer_email, "gitkv");
    }

    #[test]
    fn setters_chain() {
        let options = Options::new("/tmp/store")
            .branch("values")
            .init(false)
            .bare(false)
            .committer("Job", "job@example.com");
        assert_eq!(options.branch, "values");
        assert!(!options.init);
        assert!(!options.bare);
        assert_eq!(options.committer_name, "Job");
        assert_eq!(options.committer_email, "job@example.com");
    }

    #[test]
    fn deserialize_fills_defaults() {
        let options: Options = serde_json::from_str(r#"{"dir": "/tmp/store"}"#).unwrap();
        assert_eq!(options.branch, "master");
        assert!(options.init);
        assert!(options.bare);
    }
}
