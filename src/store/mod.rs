//! store
//!
//! The public store engine.
//!
//! # Modules
//!
//! - [`engine`] - The [`Store`] type and its five operations
//!
//! Every mutating operation follows the same shape: resolve the branch tip,
//! build a tree draft derived from it (or from empty), apply one change,
//! finalize the tree, commit with the old tip as parent, and force-update
//! the branch.

pub mod engine;

pub use engine::{CommitOptions, Store, StoreError};
