//! Scan driver for a set of manifest files
//!
//! This module provides:
//! - Rule resolution per file (explicit rule name or `include` globs)
//! - Parsing with partial continuation: one failing file does not stop the rest
//! - Rule names stamped on the produced packages

use crate::config::Config;
use crate::domain::PackageList;
use crate::error::AppError;
use crate::manifest::parse_manifest;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Resolves rules and parses manifest files
pub struct Scanner<'a> {
    /// Loaded rules configuration
    config: &'a Config,
    /// Rule applied to every file instead of `include` matching
    rule: Option<String>,
}

/// Packages read from one manifest file
#[derive(Debug, Clone)]
pub struct ScannedManifest {
    /// Name of the rule used to parse the file
    pub rule: String,
    /// Manager identifier of that rule
    pub manager: String,
    /// Packages found in the file
    pub list: PackageList,
}

impl ScannedManifest {
    /// Number of packages carrying an ignore reason
    pub fn ignored_count(&self) -> usize {
        self.list.ignored().count()
    }
}

/// Outcome of scanning a set of files
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Successfully parsed manifests, in input order
    pub manifests: Vec<ScannedManifest>,
    /// Files that could not be processed
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    /// Total number of packages across all manifests
    pub fn total_packages(&self) -> usize {
        self.manifests.iter().map(|m| m.list.len()).sum()
    }

    /// Total number of ignored packages across all manifests
    pub fn total_ignored(&self) -> usize {
        self.manifests.iter().map(ScannedManifest::ignored_count).sum()
    }

    /// Returns true if any file failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Per-file failures collected during a scan
#[derive(Error, Debug)]
pub enum ScanError {
    /// No rule's `include` globs match the file
    #[error("no rule matches {}", .path.display())]
    NoMatchingRule { path: PathBuf },

    /// The rule could not be resolved or the file could not be parsed
    #[error("failed to parse {} with rule '{rule}': {source}", .path.display())]
    Failed {
        path: PathBuf,
        rule: String,
        #[source]
        source: AppError,
    },
}

impl ScanError {
    /// Path of the file that failed
    pub fn path(&self) -> &Path {
        match self {
            ScanError::NoMatchingRule { path } | ScanError::Failed { path, .. } => path,
        }
    }

    fn failed(path: &Path, rule: &str, source: impl Into<AppError>) -> Self {
        ScanError::Failed {
            path: path.to_path_buf(),
            rule: rule.to_string(),
            source: source.into(),
        }
    }
}

impl<'a> Scanner<'a> {
    /// Create a scanner that matches files to rules by `include` globs
    pub fn new(config: &'a Config) -> Self {
        Self { config, rule: None }
    }

    /// Use one named rule for every file (builder pattern)
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Scan every file, continuing past failures
    pub fn scan<P: AsRef<Path>>(&self, paths: &[P]) -> ScanResult {
        let mut result = ScanResult::default();

        for path in paths {
            match self.scan_file(path.as_ref()) {
                Ok(manifest) => result.manifests.push(manifest),
                Err(e) => {
                    warn!(error = %e, "skipping manifest");
                    result.errors.push(e);
                }
            }
        }

        result
    }

    /// Scan a single file
    pub fn scan_file(&self, path: &Path) -> Result<ScannedManifest, ScanError> {
        let (rule, cfg) = match &self.rule {
            Some(name) => {
                let cfg = self
                    .config
                    .rule(name)
                    .map_err(|e| ScanError::failed(path, name, e))?;
                (name.as_str(), cfg)
            }
            None => self
                .config
                .rule_for_file(path)
                .ok_or_else(|| ScanError::NoMatchingRule {
                    path: path.to_path_buf(),
                })?,
        };
        debug!(path = %path.display(), rule, manager = %cfg.manager, "resolved rule");

        let mut list = parse_manifest(path, cfg).map_err(|e| ScanError::failed(path, rule, e))?;
        for package in &mut list.packages {
            package.rule = rule.to_string();
        }

        Ok(ScannedManifest {
            rule: rule.to_string(),
            manager: cfg.manager.clone(),
            list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const RULES: &str = r#"
rules:
  npm:
    manager: js
    format: json
    include: ["package.json"]
    fields:
      dependencies: prod
    ignore: ["^@types/"]
  pip:
    manager: python
    format: raw
    include: ["requirements*.txt"]
    fields:
      requirements: prod
    extraction:
      pattern: '(?m)^(?P<name>[\w.-]+)(?P<constraint>[=<>~!]=)(?P<version>[\w.]+)$'
"#;

    fn setup() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies":{"lodash":"^4.17.21","@types/node":"^20.0.0"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("requirements.txt"), "flask==2.0.1\n").unwrap();
        (dir, Config::from_yaml_str(RULES).unwrap())
    }

    #[test]
    fn test_scan_matches_rules_by_glob() {
        let (dir, config) = setup();
        let paths = [
            dir.path().join("package.json"),
            dir.path().join("requirements.txt"),
        ];
        let result = Scanner::new(&config).scan(&paths);

        assert!(!result.has_errors());
        assert_eq!(result.manifests.len(), 2);
        assert_eq!(result.manifests[0].rule, "npm");
        assert_eq!(result.manifests[1].rule, "pip");
        assert_eq!(result.total_packages(), 3);
        assert_eq!(result.total_ignored(), 1);
    }

    #[test]
    fn test_packages_carry_rule_and_source() {
        let (dir, config) = setup();
        let path = dir.path().join("requirements.txt");
        let manifest = Scanner::new(&config).scan_file(&path).unwrap();

        let flask = &manifest.list.packages[0];
        assert_eq!(flask.rule, "pip");
        assert_eq!(flask.source, path.display().to_string());
        assert_eq!(manifest.manager, "python");
    }

    #[test]
    fn test_explicit_rule_overrides_globs() {
        let (dir, config) = setup();
        let path = dir.path().join("deps.json");
        fs::write(&path, r#"{"dependencies":{"react":"18.2.0"}}"#).unwrap();

        let scanner = Scanner::new(&config).with_rule("npm");
        let manifest = scanner.scan_file(&path).unwrap();
        assert_eq!(manifest.list.packages[0].name, "react");
    }

    #[test]
    fn test_partial_failure_continues() {
        let (dir, config) = setup();
        let broken = dir.path().join("package.json");
        fs::write(&broken, "{not json").unwrap();
        let paths = [
            broken.clone(),
            dir.path().join("unknown.lock"),
            dir.path().join("requirements.txt"),
        ];

        let result = Scanner::new(&config).scan(&paths);
        assert_eq!(result.manifests.len(), 1);
        assert_eq!(result.errors.len(), 2);
        assert!(matches!(result.errors[0], ScanError::Failed { .. }));
        assert_eq!(result.errors[0].path(), broken.as_path());
        assert!(matches!(result.errors[1], ScanError::NoMatchingRule { .. }));
    }

    #[test]
    fn test_unknown_rule() {
        let (dir, config) = setup();
        let scanner = Scanner::new(&config).with_rule("cargo");
        let err = scanner.scan_file(&dir.path().join("package.json")).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Failed {
                source: AppError::Config(_),
                ..
            }
        ));
        assert!(err.to_string().contains("rule 'cargo' not found"));
    }
}
