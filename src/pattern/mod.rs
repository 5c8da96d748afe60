//! User-supplied regular expressions
//!
//! This module provides:
//! - ReDoS safety validation with configurable limits
//! - A process-wide cache of compiled patterns
//! - Content-driven selection among conditional extraction patterns
//! - Named-group extraction used by the raw and YAML parsers

mod cache;
mod safety;
mod selector;

pub use cache::{compile_safe, compile_safe_with, default_limits, is_cached, set_default_limits};
pub use safety::{
    validate_regex_safety, validate_regex_safety_with, RegexLimits,
    DEFAULT_MAX_REGEX_PATTERN_LENGTH, MAX_REGEX_QUANTIFIERS,
};
pub use selector::{
    extract_all_matches, extract_named_groups, extract_with_patterns, select_patterns,
    select_patterns_with_names, Captures,
};
