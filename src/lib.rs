//! gitkv - A key-value store backed by a git object database
//!
//! Every value lives as a blob in a git object store, the current key set is
//! a single flat tree, and every mutation is recorded as a new commit on one
//! branch. Only the branch tip is visible as current state; the commit chain
//! behind it is an implicit audit trail.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`store`] - The public engine (contains, read, write, remove, clear)
//! - [`git`] - Single interface for all git object and ref operations
//! - [`core`] - Domain types and construction options
//!
//! # Correctness Invariants
//!
//! 1. The branch, when present, points at a commit whose tree holds exactly
//!    the visible key set
//! 2. Every commit except the first has exactly one parent: the tip at the
//!    moment the mutation began
//! 3. History is append-only; deletion removes a tree entry, never an object
//!
//! # Concurrency
//!
//! The read-resolve-mutate-commit cycle is not atomic. The branch ref is
//! force-updated on every mutation, so concurrent writers are
//! last-writer-wins; see [`store::Store`] for details.

pub mod core;
pub mod git;
pub mod store;

pub use crate::core::options::{ConfigError, Options};
pub use crate::core::types::{BranchName, Identity, Oid};
pub use crate::store::{CommitOptions, Store, StoreError};
