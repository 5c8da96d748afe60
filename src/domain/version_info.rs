//! Parsed version information
//!
//! A declared requirement such as `^1.2.3` is split into a constraint token
//! (`^`) and a version (`1.2.3`). The constraint vocabulary is closed:
//! - `""` exact match
//! - `^`, `~` compatible / patch ranges
//! - `>=`, `<=`, `>`, `<`, `=` comparisons
//! - `*` any version

use serde::{Deserialize, Serialize};
use std::fmt;

/// The only constraint tokens accepted from configuration
pub const SUPPORTED_CONSTRAINTS: [&str; 9] = ["", "^", "~", ">=", "<=", ">", "<", "=", "*"];

/// Returns true if `token` is one of [`SUPPORTED_CONSTRAINTS`]
pub fn is_supported_constraint(token: &str) -> bool {
    SUPPORTED_CONSTRAINTS.contains(&token)
}

/// Constraint and version of a declared dependency
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Constraint token
    pub constraint: String,
    /// Version without the constraint prefix
    pub version: String,
}

impl VersionInfo {
    /// Creates a new VersionInfo
    pub fn new(constraint: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            version: version.into(),
        }
    }

    /// Creates an exact-match VersionInfo
    pub fn exact(version: impl Into<String>) -> Self {
        Self::new("", version)
    }

    /// Returns a copy with the constraint replaced
    pub fn with_constraint(self, constraint: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            ..self
        }
    }

    /// Returns a copy with the version replaced
    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.constraint, self.version)
    }
}
