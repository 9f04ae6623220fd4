//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all git operations in
//! gitkv. Every object and ref interaction flows through [`Repo`], which
//! returns structured results and normalizes errors into typed failure
//! categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: the path does not hold a git repository
//! - [`GitError::ObjectNotFound`]: a referenced object does not exist
//! - [`GitError::InvalidOid`]: malformed object id
//! - [`GitError::Internal`]: any other libgit2 failure (I/O, corruption)
//!
//! An absent branch is *not* an error: [`Repo::tip`] returns `Ok(None)`,
//! because a never-written store is a valid empty state.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, Identity, Oid, TypeError};

/// Tree entry mode for a regular, non-executable blob (decimal 33188).
///
/// Every entry this store writes carries this mode; keys never map to
/// executables, symlinks, or subtrees.
const FILEMODE_BLOB: i32 = 0o100644;

/// Errors from git operations.
///
/// The categorization lets higher layers react to specific failures
/// (construction distinguishes "not a repository" from everything else)
/// while I/O failures propagate unmodified, never retried.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path does not hold a git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Object not found in the repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error (I/O failure, corruption, invalid entry name).
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidBranchName(msg) => GitError::Internal { message: msg },
        }
    }
}

/// The base a tree draft is seeded from.
///
/// A closed variant: either the prior tip's tree is copied in, or the draft
/// starts empty. There is deliberately no "seed from arbitrary object" case;
/// a `Tip` oid that names a non-commit fails fast with
/// [`GitError::ObjectNotFound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftBase {
    /// Seed with every entry of this commit's tree.
    Tip(Oid),
    /// Seed an empty draft, ignoring any prior state.
    Empty,
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// Parent commit OIDs (empty for the first commit, one otherwise)
    pub parents: Vec<Oid>,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    /// Author identity, timestamped
    pub author: Identity,
    /// Committer identity, timestamped
    pub committer: Identity,
}

/// An in-memory tree under construction.
///
/// Mutating a draft performs no I/O; only [`TreeDraft::finalize`] writes
/// anything to the object store.
pub struct TreeDraft<'repo> {
    builder: git2::TreeBuilder<'repo>,
}

impl TreeDraft<'_> {
    /// Add or overwrite an entry pointing at a blob, with regular-file mode.
    pub fn upsert(&mut self, key: &str, blob: &Oid) -> Result<(), GitError> {
        let oid = parse_oid(blob)?;
        self.builder
            .insert(key, oid, FILEMODE_BLOB)
            .map_err(|e| GitError::from_git2(e, key))?;
        Ok(())
    }

    /// Drop an entry. A no-op, not an error, if the entry is absent.
    pub fn remove(&mut self, key: &str) -> Result<(), GitError> {
        let present = self
            .builder
            .get(key)
            .map_err(|e| GitError::from_git2(e, key))?
            .is_some();
        if present {
            self.builder
                .remove(key)
                .map_err(|e| GitError::from_git2(e, key))?;
        }
        Ok(())
    }

    /// Number of entries currently in the draft.
    pub fn len(&self) -> usize {
        self.builder.len()
    }

    /// Whether the draft has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the draft to the object store and return its content address.
    ///
    /// This is the only draft operation that performs I/O.
    pub fn finalize(mut self) -> Result<Oid, GitError> {
        let oid = self
            .builder
            .write()
            .map_err(|e| GitError::from_git2(e, "tree write"))?;
        Ok(Oid::new(oid.to_string())?)
    }
}

/// The git interface.
///
/// This is the **single point of interaction** with git. All object and ref
/// reads and writes flow through this interface. No other module should
/// import `git2` directly.
///
/// # Ref Semantics
///
/// Branch updates in [`Repo::commit`] are unconditional force-updates. The
/// store is an optimistic, lock-free, last-writer-wins design; preserving
/// that means deliberately *not* using compare-and-swap here.
pub struct Repo {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Repo {
    // =========================================================================
    // Opening and Initialization
    // =========================================================================

    /// Open an existing repository at the given path.
    ///
    /// The path must be the repository itself (a bare repository directory
    /// or a worktree root); no upward discovery is performed, since a store
    /// location is always named explicitly.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if the path holds no repository
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Initialize a new repository at the given path.
    pub fn init(path: &Path, bare: bool) -> Result<Self, GitError> {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.bare(bare);
        let repo = git2::Repository::init_opts(path, &opts)
            .map_err(|e| GitError::from_git2(e, &path.display().to_string()))?;
        Ok(Self { repo })
    }

    /// Whether the repository is bare.
    pub fn is_bare(&self) -> bool {
        self.repo.is_bare()
    }

    // =========================================================================
    // Branch Resolution
    // =========================================================================

    /// Resolve the branch to its tip commit.
    ///
    /// Returns `Ok(None)` if the branch does not exist: a repository whose
    /// branch has never been committed to is a valid, empty store, not a
    /// failure. No side effects.
    pub fn tip(&self, branch: &BranchName) -> Result<Option<Oid>, GitError> {
        let found = match self.repo.find_branch(branch.as_str(), git2::BranchType::Local) {
            Ok(b) => b,
            Err(e)
                if e.code() == git2::ErrorCode::NotFound
                    || e.code() == git2::ErrorCode::UnbornBranch =>
            {
                return Ok(None)
            }
            Err(e) => return Err(GitError::from_git2(e, branch.as_str())),
        };

        let commit = found
            .get()
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, branch.as_str()))?;

        Ok(Some(Oid::new(commit.id().to_string())?))
    }

    // =========================================================================
    // Tree Lookup
    // =========================================================================

    /// Look up the blob a key maps to in the given commit's tree.
    ///
    /// Keys are flat opaque entry names; no path semantics apply. Returns
    /// `Ok(None)` if the tree has no entry with that name.
    pub fn tree_entry(&self, commit: &Oid, key: &str) -> Result<Option<Oid>, GitError> {
        let tree = self
            .find_commit(commit)?
            .tree()
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?;

        let result = match tree.get_name(key) {
            Some(entry) => Ok(Some(Oid::new(entry.id().to_string())?)),
            None => Ok(None),
        };
        result
    }

    // =========================================================================
    // Blob Operations
    // =========================================================================

    /// Write content as a blob and return its content address.
    pub fn write_blob(&self, content: &[u8]) -> Result<Oid, GitError> {
        let oid = self
            .repo
            .blob(content)
            .map_err(|e| GitError::from_git2(e, "blob write"))?;
        Ok(Oid::new(oid.to_string())?)
    }

    /// Read a blob's bytes by OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the blob doesn't exist
    pub fn read_blob(&self, oid: &Oid) -> Result<Vec<u8>, GitError> {
        let git_oid = parse_oid(oid)?;
        let blob = self
            .repo
            .find_blob(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        Ok(blob.content().to_vec())
    }

    // =========================================================================
    // Tree Drafts
    // =========================================================================

    /// Start a tree draft from the given base.
    ///
    /// `DraftBase::Tip` copies every entry of that commit's tree into the
    /// draft (a structural copy of references, not data); `DraftBase::Empty`
    /// starts from nothing.
    pub fn draft(&self, base: DraftBase) -> Result<TreeDraft<'_>, GitError> {
        let builder = match base {
            DraftBase::Tip(commit) => {
                let tree = self
                    .find_commit(&commit)?
                    .tree()
                    .map_err(|e| GitError::from_git2(e, commit.as_str()))?;
                self.repo
                    .treebuilder(Some(&tree))
                    .map_err(|e| GitError::from_git2(e, commit.as_str()))?
            }
            DraftBase::Empty => self
                .repo
                .treebuilder(None)
                .map_err(|e| GitError::from_git2(e, "empty draft"))?,
        };
        Ok(TreeDraft { builder })
    }

    // =========================================================================
    // Commit Creation
    // =========================================================================

    /// Write a commit for the given tree and force-update the branch to it.
    ///
    /// The parent list holds the prior tip if present, and is empty for the
    /// first commit. The branch ref is then updated *unconditionally*: if
    /// another writer advanced the branch since `parent` was resolved, its
    /// commit becomes unreachable from the branch (last-writer-wins, by
    /// the store's documented design — not compare-and-swap).
    ///
    /// Returns the new commit id, which is the new tip.
    pub fn commit(
        &self,
        branch: &BranchName,
        tree: &Oid,
        parent: Option<&Oid>,
        message: &str,
        author: &Identity,
        committer: &Identity,
    ) -> Result<Oid, GitError> {
        let tree_oid = parse_oid(tree)?;
        let tree = self
            .repo
            .find_tree(tree_oid)
            .map_err(|e| GitError::from_git2(e, tree.as_str()))?;

        let parent_commit = parent.map(|oid| self.find_commit(oid)).transpose()?;
        let parents: Vec<&git2::Commit<'_>> = parent_commit.iter().collect();

        let author = signature(author)?;
        let committer = signature(committer)?;

        let commit_oid = self
            .repo
            .commit(None, &author, &committer, message, &tree, &parents)
            .map_err(|e| GitError::from_git2(e, message))?;

        // Force-update: the ref moves regardless of what it pointed at.
        self.repo
            .reference(
                &branch.refname(),
                commit_oid,
                true,
                &format!("gitkv: {}", message),
            )
            .map_err(|e| GitError::from_git2(e, branch.as_str()))?;

        Ok(Oid::new(commit_oid.to_string())?)
    }

    // =========================================================================
    // Commit Information
    // =========================================================================

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(oid)?;

        let mut parents = Vec::new();
        for parent in commit.parents() {
            parents.push(Oid::new(parent.id().to_string())?);
        }

        let info = Ok(CommitInfo {
            oid: oid.clone(),
            parents,
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author: identity_of(&commit.author()),
            committer: identity_of(&commit.committer()),
        });
        info
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        let git_oid = parse_oid(oid)?;
        self.repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }
}

/// Parse a validated Oid into its git2 form.
fn parse_oid(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

/// Build a git signature from an identity, stamping "now" when no explicit
/// timestamp was given.
fn signature(identity: &Identity) -> Result<git2::Signature<'static>, GitError> {
    let result = match identity.when {
        Some(when) => git2::Signature::new(
            &identity.name,
            &identity.email,
            &git2::Time::new(when.timestamp(), 0),
        ),
        None => git2::Signature::now(&identity.name, &identity.email),
    };
    result.map_err(|e| GitError::from_git2(e, &identity.email))
}

/// Read a git signature back into an identity.
fn identity_of(sig: &git2::Signature<'_>) -> Identity {
    let when = chrono::DateTime::from_timestamp(sig.when().seconds(), 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH);
    Identity {
        name: sig.name().unwrap_or("").to_string(),
        email: sig.email().unwrap_or("").to_string(),
        when: Some(when),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OID: &str = "abc123def4567890abc123def4567890abc12345";

    mod git_error {
        use super::*;

        #[test]
        fn display_formatting() {
            let err = GitError::NotARepo {
                path: PathBuf::from("/tmp/nowhere"),
            };
            assert!(err.to_string().contains("not a git repository"));

            let err = GitError::ObjectNotFound {
                oid: SAMPLE_OID.to_string(),
            };
            assert!(err.to_string().contains(SAMPLE_OID));
        }

        #[test]
        fn type_error_maps_to_invalid_oid() {
            let err: GitError = TypeError::InvalidOid("bad".to_string()).into();
            assert!(matches!(err, GitError::InvalidOid { .. }));
        }
    }

    mod draft_base {
        use super::*;

        #[test]
        fn closed_variants() {
            let tip = DraftBase::Tip(Oid::new(SAMPLE_OID).unwrap());
            assert_ne!(tip, DraftBase::Empty);
        }
    }

    mod filemode {
        use super::*;

        #[test]
        fn regular_blob_mode_is_33188() {
            // The decimal value git exposes for mode 100644.
            assert_eq!(FILEMODE_BLOB, 33188);
        }
    }
}
