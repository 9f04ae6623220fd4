//! git
//!
//! Single interface for all git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to git. All object and ref reads and
//! writes flow through this interface. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository opening and initialization (bare or not)
//! - Branch tip resolution (absent branch is a valid empty state)
//! - Blob reads and content-addressed blob writes
//! - Tree drafts: seed from a tip's tree or from empty, upsert/remove
//!   entries, finalize into an immutable tree object
//! - Commit creation chained to the prior tip, followed by an unconditional
//!   (force) branch update
//!
//! # Invariants
//!
//! - Tree entries are always written with regular-file mode `0o100644`
//! - Branch updates are force-updates: last-writer-wins, never
//!   compare-and-swap (see [`crate::store::Store`] for the resulting race)
//! - All operations return strong types (Oid, BranchName)
//!
//! # Example
//!
//! ```ignore
//! use gitkv::git::{DraftBase, Repo};
//!
//! let repo = Repo::open(Path::new("/var/data/store"))?;
//! let tip = repo.tip(&branch)?;
//!
//! let blob = repo.write_blob(b"value")?;
//! let mut draft = repo.draft(match &tip {
//!     Some(oid) => DraftBase::Tip(oid.clone()),
//!     None => DraftBase::Empty,
//! })?;
//! draft.upsert("key", &blob)?;
//! let tree = draft.finalize()?;
//! repo.commit(&branch, &tree, tip.as_ref(), "store key", &author, &committer)?;
//! ```

mod interface;

pub use interface::{CommitInfo, DraftBase, GitError, Repo, TreeDraft};
