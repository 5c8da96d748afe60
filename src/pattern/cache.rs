//! Process-wide cache of validated, compiled patterns
//!
//! Entries are keyed by the literal pattern string and never evicted; the
//! key set is bounded by the patterns present in configuration. A pattern
//! found in the cache is returned without being validated again.

use super::safety::{validate_regex_safety_with, RegexLimits};
use crate::error::RegexError;
use dashmap::DashMap;
use regex::Regex;
use std::sync::{LazyLock, RwLock};
use tracing::debug;

static CACHE: LazyLock<DashMap<String, Regex>> = LazyLock::new(DashMap::new);

static DEFAULT_LIMITS: RwLock<RegexLimits> = RwLock::new(RegexLimits::DEFAULT);

/// Installs the limits used by [`compile_safe`]
pub fn set_default_limits(limits: RegexLimits) {
    match DEFAULT_LIMITS.write() {
        Ok(mut guard) => *guard = limits,
        Err(poisoned) => *poisoned.into_inner() = limits,
    }
}

/// Returns the limits used by [`compile_safe`]
pub fn default_limits() -> RegexLimits {
    match DEFAULT_LIMITS.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Validates and compiles a pattern using the process-wide limits
pub fn compile_safe(pattern: &str) -> Result<Regex, RegexError> {
    compile_safe_with(pattern, &default_limits())
}

/// Validates and compiles a pattern using explicit limits
pub fn compile_safe_with(pattern: &str, limits: &RegexLimits) -> Result<Regex, RegexError> {
    if let Some(cached) = CACHE.get(pattern) {
        return Ok(cached.value().clone());
    }

    validate_regex_safety_with(pattern, limits)?;

    let compiled = Regex::new(pattern).map_err(|e| RegexError::InvalidSyntax {
        pattern: pattern.to_string(),
        source: e,
    })?;

    // Another caller may have inserted the same pattern meanwhile; keep the first
    let entry = CACHE
        .entry(pattern.to_string())
        .or_insert_with(|| compiled);
    debug!(pattern, "compiled and cached regex");
    Ok(entry.value().clone())
}

/// Returns true if the pattern has already been compiled
pub fn is_cached(pattern: &str) -> bool {
    CACHE.contains_key(pattern)
}
