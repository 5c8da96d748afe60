//! Declared version grammar
//!
//! Handles version formats:
//! - Prefixed: `^1.2.3`, `~1.2`, `>=2.0.0`, `<= 3`, `=1.0`
//! - Wildcard: `*`, `5.*`, `1.x`
//! - Templated: `${NODE_VERSION:-18.17.0}`
//! - Named: `latest`, `next-14.0.3`
//! - Ranges and unions (`1.0.0 - 2.0.0`, `^1 || ^2`) are kept verbatim

use crate::domain::VersionInfo;
use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

static TEMPLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^:}]+:-([^}]+)\}").unwrap());
static CONSTRAINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([~^*]|>=?|<=?|=)?[\s]*(.+)$").unwrap());
static VERSION_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v?(\d+(?:\.\d+)*(?:\.[xX*])?(?:-[\w.]+)?(?:\+[\w.]+)?|latest|[\w-]+(?:[._]\d+(?:\.\d+)*)?)",
    )
    .unwrap()
});

/// Splits a declared version into constraint and version
///
/// Only the first version-shaped token is kept, so trailing qualifiers such
/// as `2.0.0 (beta)` reduce to `2.0.0`.
pub fn parse_version(raw: &str) -> VersionInfo {
    let raw = match TEMPLATE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(default) => default.as_str(),
        None => raw,
    };

    if raw.contains(" - ") || raw.contains("||") {
        return VersionInfo::exact(raw);
    }

    if raw == "*" {
        return VersionInfo::new("*", "*");
    }

    let Some(caps) = CONSTRAINT_RE.captures(raw) else {
        return VersionInfo::exact(raw);
    };

    let constraint = caps.get(1).map_or("", |m| m.as_str());
    let rest = caps.get(2).map_or("", |m| m.as_str()).trim();

    let version = VERSION_TOKEN_RE
        .captures(rest)
        .and_then(|c| c.get(1))
        .map_or(rest, |m| m.as_str());

    VersionInfo::new(constraint, version)
}

/// Returns true if the declared version floats rather than pinning one release
///
/// Single-sided inequalities such as `>1.0.0` are not floating; a manifest
/// line holding one can be rewritten in place.
pub fn is_floating_constraint(version: &str) -> bool {
    let version = version.trim();
    if version.is_empty() {
        return false;
    }

    let floating = version == "*"
        || version.contains(".*")
        || version.contains(".x")
        || version.ends_with('*')
        // NuGet / MSBuild bracket ranges
        || version.starts_with('[')
        || version.starts_with('(')
        || (version.contains('>') && version.contains('<'))
        || version.contains('|');

    trace!(version, floating, "floating constraint check");
    floating
}
