//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: a manifest could not be parsed (structural failures, rejected extraction patterns)
//! - RegexError: a user-supplied pattern was rejected by the safety validator or failed to compile
//! - ConfigError: the rules file could not be loaded
//!
//! Content-level problems (absent fields, wrong-shaped values, unknown constraint tokens)
//! are never errors; parsers degrade and keep going.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest parsing errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors produced while turning manifest bytes into packages
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The document itself is not valid JSON/YAML/XML
    #[error("invalid {format}: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    /// An extraction pattern configured for a field was rejected
    #[error("extraction pattern for field '{field}' rejected: {source}")]
    Pattern {
        field: String,
        #[source]
        source: RegexError,
    },

    /// The configured format name is empty
    #[error("format cannot be empty")]
    EmptyFormat,

    /// The configured format name is not one of json, yaml, xml, raw
    #[error("unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// The rule has no fields configured
    #[error("fields configuration missing for {path}")]
    MissingFields { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the regex safety validator and compiler
#[derive(Error, Debug, Clone)]
pub enum RegexError {
    /// Pattern matches a known catastrophic-backtracking shape or exceeds limits
    #[error("regex pattern too complex: {reason} ({hint})")]
    TooComplex {
        pattern: String,
        reason: String,
        hint: String,
    },

    /// Pattern is not valid regex syntax
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidSyntax {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors related to loading the rules configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML syntax or schema error
    #[error("failed to parse config {path}: {message}")]
    Yaml { path: PathBuf, message: String },

    /// Rule requested by name does not exist
    #[error("rule '{name}' not found in configuration")]
    UnknownRule { name: String },

    /// latest_mapping has an unsupported shape
    #[error("invalid latest_mapping: {message}")]
    InvalidLatestMapping { message: String },
}

impl ManifestError {
    /// Creates a new Malformed error
    pub fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        ManifestError::Malformed {
            format,
            message: message.into(),
        }
    }

    /// Creates a new Pattern error
    pub fn pattern(field: impl Into<String>, source: RegexError) -> Self {
        ManifestError::Pattern {
            field: field.into(),
            source,
        }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Returns true for structural (document-level) failures
    pub fn is_malformed(&self) -> bool {
        matches!(self, ManifestError::Malformed { .. })
    }
}

impl RegexError {
    /// Creates a TooComplex error with the remediation hint
    pub fn too_complex(
        pattern: impl Into<String>,
        reason: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        RegexError::TooComplex {
            pattern: pattern.into(),
            reason: reason.into(),
            hint: hint.into(),
        }
    }

    /// Returns the offending pattern
    pub fn pattern(&self) -> &str {
        match self {
            RegexError::TooComplex { pattern, .. } => pattern,
            RegexError::InvalidSyntax { pattern, .. } => pattern,
        }
    }

    /// Returns true if the validator rejected the pattern
    pub fn is_too_complex(&self) -> bool {
        matches!(self, RegexError::TooComplex { .. })
    }
}

impl ConfigError {
    /// Creates a new Yaml error
    pub fn yaml(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::Yaml {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_malformed() {
        let err = ManifestError::malformed("JSON", "expected value at line 1");
        let msg = format!("{}", err);
        assert!(msg.contains("invalid JSON"));
        assert!(msg.contains("expected value"));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_manifest_error_pattern_keeps_field() {
        let source = RegexError::too_complex("(a+)+", "nested quantifiers detected", "hint");
        let err = ManifestError::pattern("packages", source);
        let msg = format!("{}", err);
        assert!(msg.contains("'packages'"));
        assert!(msg.contains("too complex"));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_manifest_error_unsupported_format() {
        let err = ManifestError::UnsupportedFormat {
            format: "toml".to_string(),
        };
        assert_eq!(format!("{}", err), "unsupported format: toml");
    }

    #[test]
    fn test_regex_error_too_complex() {
        let err = RegexError::too_complex(
            "(a|aa)+",
            "overlapping alternatives with quantifiers detected",
            "set security.allow_complex_regex: true",
        );
        assert!(err.is_too_complex());
        assert_eq!(err.pattern(), "(a|aa)+");
        let msg = format!("{}", err);
        assert!(msg.contains("overlapping alternatives"));
        assert!(msg.contains("allow_complex_regex"));
    }

    #[test]
    fn test_regex_error_invalid_syntax() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = RegexError::InvalidSyntax {
            pattern: "(".to_string(),
            source,
        };
        assert!(!err.is_too_complex());
        assert!(format!("{}", err).contains("invalid regex pattern '('"));
    }

    #[test]
    fn test_config_error_unknown_rule() {
        let err = ConfigError::UnknownRule {
            name: "npm".to_string(),
        };
        assert!(format!("{}", err).contains("rule 'npm' not found"));
    }

    #[test]
    fn test_config_error_invalid_latest_mapping() {
        let err = ConfigError::InvalidLatestMapping {
            message: "packages.react must be a mapping or sequence".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "invalid latest_mapping: packages.react must be a mapping or sequence"
        );
    }

    #[test]
    fn test_app_error_from_manifest_error() {
        let app_err: AppError = ManifestError::EmptyFormat.into();
        assert_eq!(format!("{}", app_err), "format cannot be empty");
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::yaml("rules.yml", "bad indent").into();
        let msg = format!("{}", app_err);
        assert!(msg.contains("rules.yml"));
        assert!(msg.contains("bad indent"));
    }

    #[test]
    fn test_error_debug_trait() {
        let err = ManifestError::EmptyFormat;
        let debug = format!("{:?}", err);
        assert!(debug.contains("EmptyFormat"));
    }
}
