//! Package records produced by the manifest parsers

use super::VersionInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared dependency captured by a parser
///
/// `rule`, `group`, `installed_version` and `install_status` are owned by the
/// caller and are always empty straight out of a parser. They are left out
/// of serialized output until the caller fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Package {
    /// Package name as declared in the manifest
    pub name: String,
    /// Parsed version without the constraint prefix
    pub version: String,
    /// Constraint token (`^`, `~`, `>=`, ... or empty for exact)
    pub constraint: String,
    /// Dependency kind label from the manager config (e.g. "prod", "dev")
    #[serde(rename = "type")]
    pub kind: String,
    /// Manager identifier (e.g. "npm", "pip", "nuget")
    pub package_type: String,
    /// Update rule name, assigned by the caller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rule: String,
    /// Manifest file the package was read from
    #[serde(default)]
    pub source: String,
    /// Currently installed version, assigned by the caller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installed_version: String,
    /// Installation status, assigned by the caller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub install_status: String,
    /// Update group, assigned by the caller
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    /// Why the package is excluded from updates (empty when it is not)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ignore_reason: String,
}

impl Package {
    /// Creates a package from parsed version information
    pub fn new(
        name: impl Into<String>,
        info: VersionInfo,
        kind: impl Into<String>,
        package_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: info.version,
            constraint: info.constraint,
            kind: kind.into(),
            package_type: package_type.into(),
            ..Default::default()
        }
    }

    /// Sets the ignore reason (builder pattern)
    pub fn with_ignore_reason(mut self, reason: Option<String>) -> Self {
        if let Some(reason) = reason {
            self.ignore_reason = reason;
        }
        self
    }

    /// Sets the source file (builder pattern)
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Returns true if this package is excluded from updates
    pub fn is_ignored(&self) -> bool {
        !self.ignore_reason.is_empty()
    }

    /// Returns the declared requirement as written (constraint + version)
    pub fn requirement(&self) -> String {
        if self.constraint == "*" && self.version == "*" {
            return "*".to_string();
        }
        format!("{}{}", self.constraint, self.version)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.requirement(), self.kind)?;
        if self.is_ignored() {
            write!(f, " [ignored: {}]", self.ignore_reason)?;
        }
        Ok(())
    }
}

/// Packages found in a single manifest file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageList {
    /// Path of the manifest file
    pub source: String,
    /// Packages declared in the file
    pub packages: Vec<Package>,
}

impl PackageList {
    /// Creates a list and stamps `source` on every package
    pub fn new(source: impl Into<String>, packages: Vec<Package>) -> Self {
        let source = source.into();
        let packages = packages
            .into_iter()
            .map(|p| p.with_source(source.clone()))
            .collect();
        Self { source, packages }
    }

    /// Packages that are not ignored
    pub fn active(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| !p.is_ignored())
    }

    /// Packages that carry an ignore reason
    pub fn ignored(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| p.is_ignored())
    }

    /// Number of packages in the list
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if no package was found
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
