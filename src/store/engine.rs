//! store::engine
//!
//! The store engine: a flat key-value namespace persisted as git objects.
//!
//! # Data Model
//!
//! - Each value is a blob, addressed by content hash
//! - The current key set is one flat tree (keys are opaque entry names)
//! - Every mutation writes one tree and one commit, chained to the prior tip
//! - A single branch ref names the tip; it is the only mutable state
//!
//! Deletion is logical: removing a key drops its tree entry, but the blob
//! stays in the object store, unreachable from the tip. Reachability and
//! garbage collection are out of scope here.
//!
//! # Concurrency
//!
//! The resolve-draft-finalize-commit cycle is **not atomic**. There is no
//! internal locking; a [`Store`] assumes exclusive in-process use, but
//! multiple instances (even in different processes) may share a repository
//! location. Two writers can resolve the same tip and both commit; the
//! branch is force-updated, so the second update wins and the first commit
//! becomes unreachable from the branch. Readers always see a consistent
//! point-in-time snapshot, because everything except the branch ref is
//! immutable once written.

use std::fs;

use thiserror::Error;

use crate::core::options::{ConfigError, Options};
use crate::core::types::{BranchName, Identity, Oid};
use crate::git::{CommitInfo, DraftBase, GitError, Repo};

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Construction-time configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying object-store or ref failure, propagated unmodified.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Per-call overrides for a mutating operation.
///
/// Influences only the commit recorded for the mutation. Anything left
/// unset falls back to the operation's default message and the store's
/// configured committer identity stamped with the current time.
///
/// # Example
///
/// ```
/// use gitkv::core::types::Identity;
/// use gitkv::store::CommitOptions;
///
/// let opts = CommitOptions::default()
///     .message("nightly snapshot")
///     .author(Identity::new("Backup Job", "backup@example.com"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Commit message override.
    pub message: Option<String>,
    /// Author identity override.
    pub author: Option<Identity>,
    /// Committer identity override.
    pub committer: Option<Identity>,
}

impl CommitOptions {
    /// Override the commit message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the author identity.
    pub fn author(mut self, author: Identity) -> Self {
        self.author = Some(author);
        self
    }

    /// Override the committer identity.
    pub fn committer(mut self, committer: Identity) -> Self {
        self.committer = Some(committer);
        self
    }
}

/// A key-value store whose durable state is a chain of git commits.
///
/// Construction fixes the repository location, the branch, and the default
/// committer identity for the lifetime of the instance; the branch is an
/// immutable field, never ambient state.
///
/// # Example
///
/// ```no_run
/// use gitkv::{Options, Store};
///
/// let store = Store::open(Options::new("/var/data/store"))?;
/// store.write("greeting", b"hello")?;
/// assert_eq!(store.read("greeting")?, Some(b"hello".to_vec()));
/// # Ok::<(), gitkv::StoreError>(())
/// ```
///
/// # Lost Updates
///
/// Branch updates are last-writer-wins (see the module docs). If two
/// instances write concurrently, one write can silently lose the race:
/// its commit is preserved in the object store but no longer reachable
/// from the branch. Callers needing stronger guarantees must serialize
/// writers externally.
#[derive(Debug)]
pub struct Store {
    repo: Repo,
    branch: BranchName,
    committer: Identity,
}

impl Store {
    /// Open a store at the location named by `options`.
    ///
    /// Creates the directory path if missing. If the location holds no
    /// repository, one is initialized when `options.init` is set (bare per
    /// `options.bare`); otherwise construction fails.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingDir`] if the directory option is empty
    /// - [`ConfigError::NotARepository`] if the location is not a
    ///   repository and `init` is disabled
    /// - [`ConfigError::InvalidBranch`] if the branch name is malformed
    pub fn open(options: Options) -> Result<Self, StoreError> {
        if options.dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingDir.into());
        }

        fs::create_dir_all(&options.dir).map_err(|source| ConfigError::CreateDir {
            path: options.dir.clone(),
            source,
        })?;
        if !options.dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: options.dir.clone(),
            }
            .into());
        }

        let branch = BranchName::new(&options.branch).map_err(ConfigError::InvalidBranch)?;

        let repo = match Repo::open(&options.dir) {
            Ok(repo) => repo,
            Err(GitError::NotARepo { .. }) if options.init => {
                Repo::init(&options.dir, options.bare)?
            }
            Err(GitError::NotARepo { .. }) => {
                return Err(ConfigError::NotARepository { path: options.dir }.into())
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            repo,
            branch,
            committer: Identity::new(&options.committer_name, &options.committer_email),
        })
    }

    /// The branch this store reads and updates.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Test whether a value exists for the given key.
    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        match self.repo.tip(&self.branch)? {
            Some(tip) => Ok(self.repo.tree_entry(&tip, key)?.is_some()),
            None => Ok(false),
        }
    }

    /// Fetch the value for the given key.
    ///
    /// Returns `Ok(None)` if the key is absent; absence is a normal result,
    /// not an error.
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let tip = match self.repo.tip(&self.branch)? {
            Some(tip) => tip,
            None => return Ok(None),
        };
        let blob = match self.repo.tree_entry(&tip, key)? {
            Some(blob) => blob,
            None => return Ok(None),
        };
        Ok(Some(self.repo.read_blob(&blob)?))
    }

    /// The current tip commit, if any mutation has ever been recorded.
    ///
    /// Exposes the head of the audit trail; each commit's `parents` field
    /// links to the state it superseded.
    pub fn tip(&self) -> Result<Option<CommitInfo>, StoreError> {
        match self.repo.tip(&self.branch)? {
            Some(oid) => Ok(Some(self.repo.commit_info(&oid)?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Mutating Operations
    // =========================================================================

    /// Store a value for the given key, committing `"store <key>"`.
    pub fn write(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.write_with(key, value, CommitOptions::default())
    }

    /// Store a value with per-call commit overrides.
    pub fn write_with(
        &self,
        key: &str,
        value: &[u8],
        opts: CommitOptions,
    ) -> Result<(), StoreError> {
        let tip = self.repo.tip(&self.branch)?;
        let blob = self.repo.write_blob(value)?;

        let mut draft = self.repo.draft(base_of(&tip))?;
        draft.upsert(key, &blob)?;
        let tree = draft.finalize()?;

        self.commit(&tree, tip.as_ref(), format!("store {}", key), opts)?;
        Ok(())
    }

    /// Delete the given key and return the old value, if any.
    ///
    /// Returns `Ok(None)` and records nothing when the key is absent: no
    /// tree, no commit, tip unchanged.
    pub fn remove(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.remove_with(key, CommitOptions::default())
    }

    /// Delete a key with per-call commit overrides.
    pub fn remove_with(
        &self,
        key: &str,
        opts: CommitOptions,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let tip = match self.repo.tip(&self.branch)? {
            Some(tip) => tip,
            None => return Ok(None),
        };
        let blob = match self.repo.tree_entry(&tip, key)? {
            Some(blob) => blob,
            None => return Ok(None),
        };
        let prior = self.repo.read_blob(&blob)?;

        let mut draft = self.repo.draft(DraftBase::Tip(tip.clone()))?;
        draft.remove(key)?;
        let tree = draft.finalize()?;

        self.commit(&tree, Some(&tip), format!("delete {}", key), opts)?;
        Ok(Some(prior))
    }

    /// Delete every key, committing `"clear"`.
    ///
    /// The new tree is built from empty, ignoring the tip's tree entirely;
    /// the prior tip (if any) remains the commit's parent, so history is
    /// preserved. Always commits, even on an already-empty store.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.clear_with(CommitOptions::default())
    }

    /// Delete every key with per-call commit overrides.
    pub fn clear_with(&self, opts: CommitOptions) -> Result<(), StoreError> {
        let tip = self.repo.tip(&self.branch)?;

        let draft = self.repo.draft(DraftBase::Empty)?;
        let tree = draft.finalize()?;

        self.commit(&tree, tip.as_ref(), "clear".to_string(), opts)?;
        Ok(())
    }

    /// Commit a finalized tree, applying identity and message defaults.
    fn commit(
        &self,
        tree: &Oid,
        parent: Option<&Oid>,
        default_message: String,
        opts: CommitOptions,
    ) -> Result<Oid, StoreError> {
        let message = opts.message.unwrap_or(default_message);
        let author = opts.author.unwrap_or_else(|| self.committer.clone());
        let committer = opts.committer.unwrap_or_else(|| self.committer.clone());

        Ok(self
            .repo
            .commit(&self.branch, tree, parent, &message, &author, &committer)?)
    }
}

/// Draft base for "derive from the tip if there is one".
fn base_of(tip: &Option<Oid>) -> DraftBase {
    match tip {
        Some(oid) => DraftBase::Tip(oid.clone()),
        None => DraftBase::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod commit_options {
        use super::*;

        #[test]
        fn default_overrides_nothing() {
            let opts = CommitOptions::default();
            assert!(opts.message.is_none());
            assert!(opts.author.is_none());
            assert!(opts.committer.is_none());
        }

        #[test]
        fn setters_chain() {
            let opts = CommitOptions::default()
                .message("snapshot")
                .author(Identity::new("a", "a@example.com"))
                .committer(Identity::new("c", "c@example.com"));
            assert_eq!(opts.message.as_deref(), Some("snapshot"));
            assert_eq!(opts.author.unwrap().email, "a@example.com");
            assert_eq!(opts.committer.unwrap().email, "c@example.com");
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn empty_dir_is_a_config_error() {
            let result = Store::open(Options::new(""));
            assert!(matches!(
                result,
                Err(StoreError::Config(ConfigError::MissingDir))
            ));
        }

        #[test]
        fn invalid_branch_is_a_config_error() {
            let dir = tempfile::TempDir::new().unwrap();
            let result = Store::open(Options::new(dir.path()).branch("bad..name"));
            assert!(matches!(
                result,
                Err(StoreError::Config(ConfigError::InvalidBranch(_)))
            ));
        }

        #[test]
        fn init_disabled_on_empty_dir_is_a_config_error() {
            let dir = tempfile::TempDir::new().unwrap();
            let result = Store::open(Options::new(dir.path()).init(false));
            assert!(matches!(
                result,
                Err(StoreError::Config(ConfigError::NotARepository { .. }))
            ));
        }
    }

    mod base_of {
        use super::*;

        #[test]
        fn maps_presence_to_draft_base() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(base_of(&Some(oid.clone())), DraftBase::Tip(oid));
            assert_eq!(base_of(&None), DraftBase::Empty);
        }
    }
}
