//! Rules configuration
//!
//! A rules file maps rule names to manager configurations:
//!
//! ```yaml
//! rules:
//!   npm:
//!     manager: js
//!     format: json
//!     include: ["package.json"]
//!     fields:
//!       dependencies: prod
//!       devDependencies: dev
//! security:
//!   max_regex_complexity: 2000
//! ```

mod latest;

pub use latest::LatestMapping;

use crate::error::ConfigError;
use crate::pattern::RegexLimits;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Top-level rules file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Manager configurations keyed by rule name
    #[serde(default)]
    pub rules: BTreeMap<String, ManagerConfig>,
    /// Regex safety settings
    #[serde(default)]
    pub security: Option<SecurityConfig>,
}

impl Config {
    /// Parses a rules file from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, PathBuf::from("<inline>"))
    }

    /// Loads a rules file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path.to_path_buf())
    }

    fn parse(content: &str, path: PathBuf) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::yaml(path, e.to_string()))
    }

    /// Returns the rule with the given name
    pub fn rule(&self, name: &str) -> Result<&ManagerConfig, ConfigError> {
        self.rules.get(name).ok_or_else(|| ConfigError::UnknownRule {
            name: name.to_string(),
        })
    }

    /// Returns the first rule (by name) whose `include` globs match the file
    pub fn rule_for_file(&self, path: &Path) -> Option<(&str, &ManagerConfig)> {
        self.rules
            .iter()
            .find(|(_, rule)| rule.matches_file(path))
            .map(|(name, rule)| (name.as_str(), rule))
    }

    /// Regex limits derived from the `security` section
    pub fn regex_limits(&self) -> RegexLimits {
        self.security
            .as_ref()
            .map(SecurityConfig::regex_limits)
            .unwrap_or_default()
    }
}

/// Configuration for one package manager rule
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Manager identifier stamped on packages as `package_type`
    pub manager: String,
    /// Manifest format: json, yaml, xml or raw
    pub format: String,
    /// File-name globs this rule applies to
    pub include: Vec<String>,
    /// Field path to dependency kind label
    pub fields: BTreeMap<String, String>,
    /// Regex patterns matched against package names
    pub ignore: Vec<String>,
    /// Raw constraint token to canonical token
    pub constraint_mapping: BTreeMap<String, String>,
    /// Tokens meaning "latest"
    pub latest_mapping: Option<LatestMapping>,
    /// Per-package overrides keyed by package name
    pub package_overrides: BTreeMap<String, PackageOverride>,
    /// Extraction rules for raw text, image values and XML
    pub extraction: Option<ExtractionConfig>,
}

impl ManagerConfig {
    /// Returns true if any `include` glob matches the file name or path
    pub fn matches_file(&self, path: &Path) -> bool {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let full = path.to_string_lossy();

        self.include.iter().any(|glob| match glob::Pattern::new(glob) {
            Ok(pattern) => pattern.matches(file_name) || pattern.matches(&full),
            Err(e) => {
                warn!(glob = %glob, error = %e, "skipping invalid include glob");
                false
            }
        })
    }

    /// Returns the override configured for `name`, if any
    pub fn package_override(&self, name: &str) -> Option<&PackageOverride> {
        self.package_overrides.get(name)
    }
}

/// Extraction rules for pattern-driven and XML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Single extraction regex, also the fallback for `patterns`
    pub pattern: String,
    /// Conditional patterns applied in declaration order
    pub patterns: Vec<PatternConfig>,
    /// Slash-separated XML path to dependency nodes
    pub path: String,
    /// XML attribute holding the package name
    pub name_attr: String,
    /// XML attribute holding the version
    pub version_attr: String,
    /// XML attribute marking a dev dependency
    pub dev_attr: String,
    /// Value of `dev_attr` that marks a dev dependency
    pub dev_value: String,
    /// XML element (or attribute) marking a dev dependency
    pub dev_element: String,
    /// Value of `dev_element` that marks a dev dependency; empty matches any value
    pub dev_element_value: String,
}

/// One conditional extraction pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Optional identifier used in diagnostics
    pub name: String,
    /// Regex that must match the content for this pattern to apply; empty always applies
    pub detect: String,
    /// Extraction regex with named groups
    pub pattern: String,
}

impl PatternConfig {
    /// Creates a new PatternConfig
    pub fn new(
        name: impl Into<String>,
        detect: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            detect: detect.into(),
            pattern: pattern.into(),
        }
    }
}

/// Per-package override
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackageOverride {
    /// Mark the package as ignored
    pub ignore: bool,
    /// Replacement constraint; `Some("")` forces an exact match
    pub constraint: Option<String>,
    /// Replacement version, applied when non-empty
    pub version: Option<String>,
}

/// Regex safety settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum pattern length; 0 keeps the default
    pub max_regex_complexity: usize,
    /// Skip the shape and quantifier checks
    pub allow_complex_regex: bool,
}

impl SecurityConfig {
    /// Converts the settings into validator limits
    pub fn regex_limits(&self) -> RegexLimits {
        let mut limits = RegexLimits::default();
        if self.max_regex_complexity > 0 {
            limits.max_length = self.max_regex_complexity;
        }
        limits.allow_complex = self.allow_complex_regex;
        limits
    }
}
