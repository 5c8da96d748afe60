//! Plain-text manifest parser (requirements.txt, Pipfile, Dockerfile, ...)
//!
//! Packages are captured with the configured extraction patterns using the
//! named groups `name` (or `n`), `version` (or `version_alt`) and
//! `constraint`. With more than one field the text is split into INI-style
//! `[section]` blocks, one per field.
//!
//! Patterns are selected against the whole file and then applied to each
//! section. Captured constraints go through constraint mapping first; any
//! token still outside the supported set degrades to an exact match.

use super::{extract_section, new_package};
use crate::config::ManagerConfig;
use crate::domain::{Package, VersionInfo};
use crate::error::ManifestError;
use crate::pattern::{extract_all_matches, select_patterns_with_names, Captures};
use crate::version::{apply_policy, validate_constraint, LATEST_SENTINEL};
use tracing::debug;

pub(super) fn parse(content: &[u8], cfg: &ManagerConfig) -> Result<Vec<Package>, ManifestError> {
    let text = String::from_utf8_lossy(content);
    let patterns = select_patterns_with_names(&text, cfg.extraction.as_ref());
    if patterns.is_empty() {
        debug!("no extraction pattern applies, nothing to extract");
        return Ok(Vec::new());
    }

    let sectioned = cfg.fields.len() > 1;
    let mut packages = Vec::new();

    for (field, kind) in &cfg.fields {
        let section = if sectioned {
            extract_section(&text, field)
        } else {
            text.to_string()
        };
        if sectioned && section.is_empty() {
            debug!(section = %field, "section absent, skipping");
            continue;
        }

        for pattern in &patterns {
            let matches = extract_all_matches(&pattern.pattern, &section)
                .map_err(|e| ManifestError::pattern(field.as_str(), e))?;
            debug!(
                field = %field,
                pattern = %pattern.name,
                count = matches.len(),
                "extracted matches"
            );

            for captures in &matches {
                let Some(name) = first_non_empty(captures, &["name", "n"]) else {
                    continue;
                };
                let version =
                    first_non_empty(captures, &["version", "version_alt"]).unwrap_or(LATEST_SENTINEL);
                let constraint = captures.get("constraint").map_or("", String::as_str);

                let info = apply_policy(name, VersionInfo::new(constraint, version), cfg);
                let constraint = validate_constraint(&info.constraint, name);
                let info = info.with_constraint(constraint);
                packages.push(new_package(name, info, kind, cfg));
            }
        }
    }

    Ok(packages)
}

fn first_non_empty<'a>(captures: &'a Captures, groups: &[&str]) -> Option<&'a str> {
    groups
        .iter()
        .filter_map(|group| captures.get(*group))
        .map(String::as_str)
        .find(|value| !value.is_empty())
}
