//! JSON manifest parser (package.json, composer.json, ...)
//!
//! Each configured field names an object of `name -> version` strings.
//! Entries with an empty name or a non-string version are skipped.

use super::{get_nested_field, new_package};
use crate::config::ManagerConfig;
use crate::domain::Package;
use crate::error::ManifestError;
use crate::version::process_version;
use serde_json::Value;
use tracing::debug;

pub(super) fn parse(content: &[u8], cfg: &ManagerConfig) -> Result<Vec<Package>, ManifestError> {
    let doc: Value =
        serde_json::from_slice(content).map_err(|e| ManifestError::malformed("JSON", e.to_string()))?;
    if !doc.is_object() {
        return Err(ManifestError::malformed(
            "JSON",
            "top-level value must be an object",
        ));
    }

    let mut packages = Vec::new();

    for (field, kind) in &cfg.fields {
        // Literal keys win over dot paths so "a.b" keys still resolve
        let deps = doc.get(field).or_else(|| get_nested_field(&doc, field));
        let Some(Value::Object(deps)) = deps else {
            debug!(field = %field, "field absent or not an object, skipping");
            continue;
        };

        for (name, version) in deps {
            if name.is_empty() {
                debug!(field = %field, "empty package name, skipping");
                continue;
            }
            let Some(version) = version.as_str() else {
                debug!(field = %field, package = %name, "non-string version, skipping");
                continue;
            };
            let info = process_version(version, name, cfg);
            packages.push(new_package(name, info, kind, cfg));
        }
    }

    Ok(packages)
}
