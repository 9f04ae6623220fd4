//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated git branch name
//! - [`Oid`] - Git object identifier (SHA)
//! - [`Identity`] - Commit authorship record (name, email, optional time)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use gitkv::core::types::{BranchName, Oid};
//!
//! let branch = BranchName::new("master").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// A validated git branch name.
///
/// Branch names must conform to git's refname rules (see
/// `git check-ref-format`):
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, spaces, or ASCII control characters
/// - Cannot contain `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// # Example
///
/// ```
/// use gitkv::core::types::BranchName;
///
/// let name = BranchName::new("values/main").unwrap();
/// assert_eq!(name.as_str(), "values/main");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates git's
    /// refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }
        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '.' or '-'".into(),
            ));
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock' or '/'".into(),
            ));
        }
        for forbidden in ["..", "@{", "//"] {
            if name.contains(forbidden) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{}'",
                    forbidden
                )));
            }
        }
        for ch in name.chars() {
            if ch.is_ascii_control()
                || matches!(ch, ' ' | '~' | '^' | ':' | '\\' | '?' | '*' | '[')
            {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{}'",
                    ch.escape_default()
                )));
            }
        }
        // No path component may start with '.' or end with '.lock'
        if name
            .split('/')
            .any(|c| c.starts_with('.') || c.ends_with(".lock"))
        {
            return Err(TypeError::InvalidBranchName(
                "branch name component cannot start with '.' or end with '.lock'".into(),
            ));
        }
        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full ref name for this branch (`refs/heads/<name>`).
    pub fn refname(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

/// A git object identifier: a 40-character lowercase hex SHA-1.
///
/// # Example
///
/// ```
/// use gitkv::core::types::Oid;
///
/// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
/// assert_eq!(oid.short(7), "abc123d");
///
/// assert!(Oid::new("too-short").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` unless the value is exactly 40
    /// lowercase hex characters.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into();
        if oid.len() != 40 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) {
            return Err(TypeError::InvalidOid(
                "object id must be lowercase hex".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An abbreviated prefix of the id.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Oid> for String {
    fn from(value: Oid) -> Self {
        value.0
    }
}

/// Authorship identity attached to a commit.
///
/// When `when` is `None`, the commit is stamped with the current time at
/// the moment it is written.
///
/// # Example
///
/// ```
/// use gitkv::core::types::Identity;
///
/// let id = Identity::new("Backup Job", "backup@example.com");
/// assert!(id.when.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Timestamp; `None` means "now" at commit time.
    pub when: Option<DateTime<Utc>>,
}

impl Identity {
    /// Create an identity stamped at commit time.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when: None,
        }
    }

    /// Create an identity with an explicit timestamp.
    pub fn at(
        name: impl Into<String>,
        email: impl Into<String>,
        when: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when: Some(when),
        }
    }
}
