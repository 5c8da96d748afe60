//! ReDoS heuristics for user-supplied regular expressions
//!
//! Checks run in order and the first failure wins:
//! 1. pattern length against `max_length`
//! 2. quantified groups containing a quantified wildcard, e.g. `(.*)+`
//! 3. quantified groups around a single quantified letter, e.g. `(a+)+`
//! 4. quantified alternations where one branch prefixes the other, e.g. `(a|aa)+`
//! 5. more than [`MAX_REGEX_QUANTIFIERS`] `+`/`*` characters
//!
//! Checks 2-5 are skipped when `allow_complex` is set.

use crate::error::RegexError;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Default maximum pattern length in bytes
pub const DEFAULT_MAX_REGEX_PATTERN_LENGTH: usize = 1000;

/// Maximum number of `+` and `*` characters in one pattern
pub const MAX_REGEX_QUANTIFIERS: usize = 15;

const ALLOW_COMPLEX_HINT: &str =
    "to allow complex regex, set security.allow_complex_regex: true in the root config";

static NESTED_QUANTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\([^)]*(?:\.\*|\.\+|\\w\*|\\w\+|\\s\*|\\s\+)[^)]*\)[+*]").unwrap()
});
static SIMPLE_NESTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([a-zA-Z][+*]\)[+*]").unwrap());
static OVERLAPPING_ALT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^|)]+)\|([^)]+)\)[+*]").unwrap());

/// Limits applied by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegexLimits {
    /// Maximum pattern length in bytes
    pub max_length: usize,
    /// Skip the shape and quantifier checks
    pub allow_complex: bool,
}

impl RegexLimits {
    /// Limits used when nothing is configured
    pub const DEFAULT: RegexLimits = RegexLimits {
        max_length: DEFAULT_MAX_REGEX_PATTERN_LENGTH,
        allow_complex: false,
    };
}

impl Default for RegexLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Validates a pattern against the default limits
pub fn validate_regex_safety(pattern: &str) -> Result<(), RegexError> {
    validate_regex_safety_with(pattern, &RegexLimits::DEFAULT)
}

/// Validates a pattern against explicit limits
pub fn validate_regex_safety_with(pattern: &str, limits: &RegexLimits) -> Result<(), RegexError> {
    let max_length = if limits.max_length == 0 {
        DEFAULT_MAX_REGEX_PATTERN_LENGTH
    } else {
        limits.max_length
    };

    if pattern.len() > max_length {
        return Err(reject(
            pattern,
            format!(
                "pattern length {} exceeds maximum {}",
                pattern.len(),
                max_length
            ),
            format!(
                "to increase this limit, set security.max_regex_complexity: {} in the root config",
                pattern.len() + 100
            ),
        ));
    }

    if limits.allow_complex {
        return Ok(());
    }

    if NESTED_QUANTIFIER_RE.is_match(pattern) {
        return Err(reject(
            pattern,
            "nested quantifiers detected".to_string(),
            ALLOW_COMPLEX_HINT.to_string(),
        ));
    }

    if SIMPLE_NESTED_RE.is_match(pattern) {
        return Err(reject(
            pattern,
            "simple nested quantifiers detected".to_string(),
            ALLOW_COMPLEX_HINT.to_string(),
        ));
    }

    // Only the first quantified alternation is inspected
    if let Some(caps) = OVERLAPPING_ALT_RE.captures(pattern) {
        let first = caps.get(1).map_or("", |m| m.as_str());
        let second = caps.get(2).map_or("", |m| m.as_str());
        if first.starts_with(second) || second.starts_with(first) {
            return Err(reject(
                pattern,
                "overlapping alternatives with quantifiers detected".to_string(),
                ALLOW_COMPLEX_HINT.to_string(),
            ));
        }
    }

    let quantifiers = pattern.matches(['+', '*']).count();
    if quantifiers > MAX_REGEX_QUANTIFIERS {
        return Err(reject(
            pattern,
            format!(
                "excessive quantifiers ({}, max {})",
                quantifiers, MAX_REGEX_QUANTIFIERS
            ),
            ALLOW_COMPLEX_HINT.to_string(),
        ));
    }

    Ok(())
}

fn reject(pattern: &str, reason: String, hint: String) -> RegexError {
    debug!(pattern, reason = %reason, "regex rejected by safety validator");
    RegexError::too_complex(pattern, reason, hint)
}
