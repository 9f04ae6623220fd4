//! core
//!
//! Domain types and construction options for gitkv.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, Identity
//! - [`options`] - Store construction options and configuration errors
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Validation happens at construction, never at use

pub mod options;
pub mod types;
