//! YAML manifest parser (pubspec.yaml, docker-compose.yml, ...)
//!
//! Handles dependency shapes:
//! - Map: `name: version`, non-string scalars are stringified
//! - Map with image: `service: {image: "nginx:1.25"}`
//! - Array: `[{name: ..., version: ...}]`
//!
//! The decoded document is converted once into a string-keyed
//! `serde_json::Value` tree before any field lookup.

use super::{get_nested_field, new_package, scalar_to_string};
use crate::config::ManagerConfig;
use crate::domain::Package;
use crate::error::ManifestError;
use crate::pattern::{extract_all_matches, select_patterns};
use crate::version::process_version;
use serde_json::{Map, Value};
use tracing::debug;

pub(super) fn parse(content: &[u8], cfg: &ManagerConfig) -> Result<Vec<Package>, ManifestError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let raw: serde_yaml::Value =
        serde_yaml::from_slice(content).map_err(|e| ManifestError::malformed("YAML", e.to_string()))?;

    let doc = match to_canonical(raw) {
        // An empty document has no dependencies
        Value::Null => return Ok(Vec::new()),
        doc @ Value::Object(_) => doc,
        _ => {
            return Err(ManifestError::malformed(
                "YAML",
                "top-level value must be a mapping",
            ))
        }
    };

    let mut packages = Vec::new();

    for (field, kind) in &cfg.fields {
        match get_nested_field(&doc, field) {
            Some(Value::Object(deps)) => {
                for (name, value) in deps {
                    let Some((name, version)) = map_entry(field, name, value, cfg)? else {
                        continue;
                    };
                    if name.is_empty() {
                        debug!(field = %field, "empty package name, skipping");
                        continue;
                    }
                    let info = process_version(&version, &name, cfg);
                    packages.push(new_package(&name, info, kind, cfg));
                }
            }
            Some(Value::Array(deps)) => {
                for dep in deps {
                    let Some((name, version)) = array_entry(dep) else {
                        continue;
                    };
                    let info = process_version(&version, name, cfg);
                    packages.push(new_package(name, info, kind, cfg));
                }
            }
            _ => debug!(field = %field, "field absent or not a collection, skipping"),
        }
    }

    Ok(packages)
}

/// Resolves `(name, version)` for one entry of a map-shaped field
fn map_entry(
    field: &str,
    name: &str,
    value: &Value,
    cfg: &ManagerConfig,
) -> Result<Option<(String, String)>, ManifestError> {
    match value {
        Value::Object(map) => image_from_map(field, name, map, cfg).map(Some),
        Value::Array(_) => {
            debug!(field, package = name, "sequence version, skipping");
            Ok(None)
        }
        scalar => Ok(scalar_to_string(scalar).map(|v| (name.to_string(), v))),
    }
}

/// Resolves an `{image: "name:tag"}` map; other maps yield an empty version
fn image_from_map(
    field: &str,
    name: &str,
    map: &Map<String, Value>,
    cfg: &ManagerConfig,
) -> Result<(String, String), ManifestError> {
    let image = match map.get("image") {
        None => return Ok((name.to_string(), String::new())),
        Some(Value::String(image)) => image,
        Some(_) => return Ok((name.to_string(), String::new())),
    };

    let mut resolved = name.to_string();
    let mut version = String::new();

    let text = format!("image: {image}");
    for pattern in select_patterns(&text, cfg.extraction.as_ref()) {
        let matches =
            extract_all_matches(&pattern, &text).map_err(|e| ManifestError::pattern(field, e))?;
        if let Some(first) = matches.first() {
            if let Some(n) = first.get("name").filter(|n| !n.is_empty()) {
                resolved = n.clone();
            }
            version = first.get("version").cloned().unwrap_or_default();
            break;
        }
    }

    if version.is_empty() {
        let (image_name, tag) = split_image(image);
        // An image without a name keeps the service key
        if !image_name.is_empty() {
            resolved = image_name.to_string();
        }
        version = tag.to_string();
    }

    Ok((resolved, version))
}

/// Splits `name:tag` on the last colon; a colon inside the registry host is not a tag
fn split_image(image: &str) -> (&str, &str) {
    match image.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => (name, tag),
        _ => (image, ""),
    }
}

/// Reads `{name, version}` from an array element, skipping incomplete entries
fn array_entry(dep: &Value) -> Option<(&str, String)> {
    let name = dep.get("name")?.as_str().filter(|n| !n.is_empty())?;
    let version = scalar_to_string(dep.get("version")?).filter(|v| !v.is_empty())?;
    Some((name, version))
}

/// Converts a YAML tree into a string-keyed JSON tree
///
/// Scalar keys are stringified; mappings used as keys are dropped. Tags are
/// discarded and their values kept.
fn to_canonical(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => number_to_json(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(to_canonical).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                if let Some(key) = key_to_string(key) {
                    map.insert(key, to_canonical(value));
                }
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => to_canonical(tagged.value),
    }
}

fn key_to_string(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => key_to_string(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => None,
    }
}

fn number_to_json(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else if let Some(u) = n.as_u64() {
        Value::from(u)
    } else {
        Value::String(n.to_string())
    }
}
