//! Constraint mapping, package overrides and "latest" normalization
//!
//! Every parser runs a parsed [`VersionInfo`] through the same fixed order:
//! constraint mapping, then package override, then latest normalization.

use super::grammar::parse_version;
use crate::config::ManagerConfig;
use crate::domain::{is_supported_constraint, VersionInfo};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Sentinel used for "latest" when no mapping overrides it
pub const LATEST_SENTINEL: &str = "*";

/// Tokens that always mean "latest"
const BUILTIN_LATEST_TOKENS: [&str; 3] = ["", "#n/a", "latest"];

/// Maps a raw constraint token through `mapping`, passing unknown tokens through
pub fn map_constraint(constraint: &str, mapping: &BTreeMap<String, String>) -> String {
    mapping
        .get(constraint)
        .cloned()
        .unwrap_or_else(|| constraint.to_string())
}

/// Returns `token` if it is a supported constraint, otherwise `""` with a warning
pub fn validate_constraint(token: &str, package_name: &str) -> String {
    if is_supported_constraint(token) {
        return token.to_string();
    }
    warn!(
        constraint = token,
        package = package_name,
        "invalid constraint, using exact match"
    );
    String::new()
}

/// Applies `package_overrides[name]`, if configured
///
/// A configured constraint applies even when empty; a configured version
/// applies only when non-empty.
pub fn apply_package_override(name: &str, info: VersionInfo, cfg: &ManagerConfig) -> VersionInfo {
    let Some(over) = cfg.package_override(name) else {
        return info;
    };

    let mut info = info;
    if let Some(constraint) = &over.constraint {
        info = info.with_constraint(validate_constraint(constraint, name));
    }
    if let Some(version) = over.version.as_deref().filter(|v| !v.is_empty()) {
        info = info.with_version(version);
    }
    debug!(package = name, result = %info, "applied package override");
    info
}

/// Token table for `name` and the sentinel that "latest" resolves to
///
/// The table is seeded with the built-in tokens, then the manager-wide and
/// package-specific mappings are layered on top. A layer that remaps the
/// empty token changes the sentinel for all built-in tokens.
pub fn latest_table(name: &str, cfg: &ManagerConfig) -> (BTreeMap<String, String>, String) {
    let mut sentinel = LATEST_SENTINEL.to_string();
    let mut table: BTreeMap<String, String> = BUILTIN_LATEST_TOKENS
        .iter()
        .map(|t| (t.to_string(), sentinel.clone()))
        .collect();

    if let Some(mapping) = &cfg.latest_mapping {
        let layers = std::iter::once(&mapping.default).chain(mapping.packages.get(name));
        for layer in layers {
            for (token, value) in layer {
                let token = token.trim().to_lowercase();
                if token.is_empty() {
                    sentinel = value.clone();
                }
                table.insert(token, value.clone());
            }
        }
    }

    for token in BUILTIN_LATEST_TOKENS {
        table.insert(token.to_string(), sentinel.clone());
    }

    (table, sentinel)
}

/// Replaces a "latest" token with its mapped value
pub fn normalize_latest(name: &str, info: VersionInfo, cfg: &ManagerConfig) -> VersionInfo {
    let (table, _) = latest_table(name, cfg);
    let key = info.version.trim().to_lowercase();
    match table.get(&key) {
        Some(mapped) => info.with_version(mapped.clone()),
        None => info,
    }
}

/// Returns true if `version` equals the resolved "latest" sentinel (case-insensitive)
pub fn is_latest_indicator(version: &str, name: &str, cfg: &ManagerConfig) -> bool {
    let (_, sentinel) = latest_table(name, cfg);
    version.trim().eq_ignore_ascii_case(sentinel.trim())
}

/// Runs mapping, override and normalization over an already split version
pub fn apply_policy(name: &str, info: VersionInfo, cfg: &ManagerConfig) -> VersionInfo {
    let mapped = map_constraint(&info.constraint, &cfg.constraint_mapping);
    let info = info.with_constraint(mapped);
    let info = apply_package_override(name, info, cfg);
    normalize_latest(name, info, cfg)
}

/// Parses a declared version and applies the full policy
pub fn process_version(raw: &str, name: &str, cfg: &ManagerConfig) -> VersionInfo {
    apply_policy(name, parse_version(raw), cfg)
}
