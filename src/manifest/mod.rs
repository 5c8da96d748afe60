//! Manifest parsing
//!
//! This module provides:
//! - One parser per document format (JSON, YAML, XML, raw text)
//! - Dispatch by configured format name
//! - Helpers shared by the parsers (ignore checks, field lookup, INI sections)

mod format;
mod json;
mod raw;
mod xml;
mod xml_tree;
mod yaml;

pub use format::FormatParser;
pub use xml_tree::XmlNode;

use crate::config::ManagerConfig;
use crate::domain::{Package, PackageList, VersionInfo};
use crate::error::ManifestError;
use crate::pattern::compile_safe;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a manifest file and parses it with the rule's format
pub fn parse_manifest(path: &Path, cfg: &ManagerConfig) -> Result<PackageList, ManifestError> {
    let parser = FormatParser::from_name(&cfg.format)?;
    if cfg.fields.is_empty() {
        return Err(ManifestError::MissingFields {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read(path).map_err(|e| ManifestError::read_error(path, e))?;
    let packages = parser.parse(&content, cfg)?;
    debug!(
        path = %path.display(),
        format = %parser,
        count = packages.len(),
        "parsed manifest"
    );

    Ok(PackageList::new(path.display().to_string(), packages))
}

/// Returns why `name` is excluded from updates, if it is
pub fn ignore_reason(name: &str, cfg: &ManagerConfig) -> Option<String> {
    for pattern in &cfg.ignore {
        match compile_safe(pattern) {
            Ok(re) if re.is_match(name) => {
                return Some(format!("matches ignore pattern '{}'", pattern));
            }
            Ok(_) => {}
            Err(e) => warn!(pattern = %pattern, error = %e, "skipping unusable ignore pattern"),
        }
    }

    if cfg.package_override(name).is_some_and(|o| o.ignore) {
        return Some("ignored via package_overrides".to_string());
    }

    None
}

/// Builds a package record, attaching the ignore reason when one applies
pub fn new_package(name: &str, info: VersionInfo, kind: &str, cfg: &ManagerConfig) -> Package {
    Package::new(name, info, kind, cfg.manager.as_str()).with_ignore_reason(ignore_reason(name, cfg))
}

/// Looks up a dot-separated path (`tool.poetry.dependencies`) in a document tree
pub fn get_nested_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, part| match current {
        Value::Object(map) => map.get(part).filter(|v| !v.is_null()),
        _ => None,
    })
}

/// Returns the lines of an INI-style `[section]` block
///
/// Lines are collected from the header up to the next header; the header
/// itself is excluded. Returns an empty string when the section is absent.
///
/// Any trimmed line wrapped in brackets is a header. Its name is the inner
/// text with all surrounding brackets and spaces removed, so `[ packages ]`
/// names `packages` and an array table such as `[[source]]` names `source`.
pub fn extract_section(text: &str, section: &str) -> String {
    let mut current: Option<&str> = None;
    let mut lines = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            current = Some(trimmed.trim_matches(|c| c == '[' || c == ']').trim());
            continue;
        }
        if current == Some(section) {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Converts a scalar to the string form used for versions
///
/// Numbers and booleans are stringified and null becomes empty; containers
/// have no string form.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackageOverride;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn npm_config() -> ManagerConfig {
        ManagerConfig {
            manager: "js".to_string(),
            format: "json".to_string(),
            fields: [("dependencies".to_string(), "prod".to_string())].into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ignore_reason_pattern() {
        let cfg = ManagerConfig {
            ignore: vec!["^@types/".to_string()],
            ..Default::default()
        };
        assert_eq!(
            ignore_reason("@types/node", &cfg).as_deref(),
            Some("matches ignore pattern '^@types/'")
        );
        assert!(ignore_reason("typescript", &cfg).is_none());
    }

    #[test]
    fn test_ignore_reason_is_case_sensitive() {
        let cfg = ManagerConfig {
            ignore: vec!["^React$".to_string()],
            ..Default::default()
        };
        assert!(ignore_reason("react", &cfg).is_none());
    }

    #[test]
    fn test_ignore_reason_override() {
        let mut cfg = ManagerConfig::default();
        cfg.package_overrides.insert(
            "left-pad".to_string(),
            PackageOverride {
                ignore: true,
                ..Default::default()
            },
        );
        assert_eq!(
            ignore_reason("left-pad", &cfg).as_deref(),
            Some("ignored via package_overrides")
        );
    }

    #[test]
    fn test_ignore_reason_skips_invalid_pattern() {
        let cfg = ManagerConfig {
            ignore: vec!["(unclosed".to_string(), "^php$".to_string()],
            ..Default::default()
        };
        assert!(ignore_reason("php", &cfg).is_some());
    }

    #[test]
    fn test_new_package() {
        let cfg = npm_config();
        let pkg = new_package("lodash", VersionInfo::new("^", "4.17.21"), "prod", &cfg);
        assert_eq!(pkg.package_type, "js");
        assert_eq!(pkg.kind, "prod");
        assert!(!pkg.is_ignored());
    }

    #[test]
    fn test_get_nested_field() {
        let doc = json!({"tool": {"poetry": {"dependencies": {"python": "^3.11"}}}, "empty": null});
        let deps = get_nested_field(&doc, "tool.poetry.dependencies").unwrap();
        assert_eq!(deps["python"], "^3.11");

        assert!(get_nested_field(&doc, "tool.missing").is_none());
        assert!(get_nested_field(&doc, "tool.poetry.dependencies.python.deeper").is_none());
        assert!(get_nested_field(&doc, "empty").is_none());
    }

    #[test]
    fn test_extract_section() {
        let text = "[packages]\nflask = \"*\"\n\n[dev-packages]\npytest = \"*\"\n[requires]\npython_version = \"3.11\"\n";
        assert_eq!(extract_section(text, "packages"), "flask = \"*\"\n");
        assert_eq!(extract_section(text, "dev-packages"), "pytest = \"*\"");
        assert_eq!(extract_section(text, "missing"), "");
    }

    #[test]
    fn test_extract_section_indented_header() {
        let text = "  [packages]  \nrequests = \"*\"\n";
        assert_eq!(extract_section(text, "packages"), "requests = \"*\"");
    }

    #[test]
    fn test_extract_section_loose_headers() {
        let text = "[ packages ]\nflask = \"*\"\n[[source]]\nurl = \"https://pypi.org/simple\"\n";
        assert_eq!(extract_section(text, "packages"), "flask = \"*\"");
        assert_eq!(extract_section(text, "source"), "url = \"https://pypi.org/simple\"");
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("1.0")).unwrap(), "1.0");
        assert_eq!(scalar_to_string(&json!(3)).unwrap(), "3");
        assert_eq!(scalar_to_string(&json!(true)).unwrap(), "true");
        assert_eq!(scalar_to_string(&Value::Null).unwrap(), "");
        assert!(scalar_to_string(&json!([1])).is_none());
    }

    #[test]
    fn test_parse_manifest() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"dependencies": {{"lodash": "~1.2.3"}}}}"#).unwrap();

        let list = parse_manifest(file.path(), &npm_config()).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.packages[0].source, file.path().display().to_string());
        assert_eq!(list.source, file.path().display().to_string());
    }

    #[test]
    fn test_parse_manifest_requires_fields() {
        let cfg = ManagerConfig {
            format: "json".to_string(),
            ..Default::default()
        };
        let err = parse_manifest(Path::new("package.json"), &cfg).unwrap_err();
        assert!(matches!(err, ManifestError::MissingFields { .. }));
    }

    #[test]
    fn test_parse_manifest_requires_format() {
        let cfg = ManagerConfig {
            fields: [("dependencies".to_string(), "prod".to_string())].into(),
            ..Default::default()
        };
        let err = parse_manifest(Path::new("package.json"), &cfg).unwrap_err();
        assert!(matches!(err, ManifestError::EmptyFormat));
    }

    #[test]
    fn test_parse_manifest_missing_file() {
        let err = parse_manifest(Path::new("/nonexistent/package.json"), &npm_config()).unwrap_err();
        assert!(matches!(err, ManifestError::ReadError { .. }));
    }
}
