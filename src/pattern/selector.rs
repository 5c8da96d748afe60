//! Conditional pattern selection and named-group extraction

use super::cache::compile_safe;
use crate::config::{ExtractionConfig, PatternConfig};
use crate::error::RegexError;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Named capture groups of one match
pub type Captures = BTreeMap<String, String>;

/// Returns every extraction pattern that applies to `content`
///
/// Without a `patterns` list the single `pattern` is returned. Otherwise
/// entries without `detect` always apply, entries with `detect` apply when it
/// matches, and the single `pattern` is the fallback when none applied.
pub fn select_patterns(content: &str, cfg: Option<&ExtractionConfig>) -> Vec<String> {
    select_patterns_with_names(content, cfg)
        .into_iter()
        .map(|p| p.pattern)
        .collect()
}

/// Like [`select_patterns`] but keeps the entry names for diagnostics
///
/// The single pattern is named `default` when used directly and `fallback`
/// when used because no conditional entry applied.
pub fn select_patterns_with_names(
    content: &str,
    cfg: Option<&ExtractionConfig>,
) -> Vec<PatternConfig> {
    let Some(cfg) = cfg else {
        return Vec::new();
    };

    if cfg.patterns.is_empty() {
        if cfg.pattern.is_empty() {
            return Vec::new();
        }
        return vec![PatternConfig::new("default", "", cfg.pattern.clone())];
    }

    let selected: Vec<PatternConfig> = cfg
        .patterns
        .iter()
        .filter(|p| !p.pattern.is_empty())
        .filter(|p| p.detect.is_empty() || matches_detect(content, &p.detect))
        .cloned()
        .collect();

    if selected.is_empty() && !cfg.pattern.is_empty() {
        debug!("no conditional pattern applied, using fallback pattern");
        return vec![PatternConfig::new("fallback", "", cfg.pattern.clone())];
    }

    debug!(
        selected = ?selected.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        "selected extraction patterns"
    );
    selected
}

/// A detect regex that fails validation or compilation counts as no match
fn matches_detect(content: &str, detect: &str) -> bool {
    match compile_safe(detect) {
        Ok(re) => re.is_match(content),
        Err(e) => {
            warn!(detect, error = %e, "ignoring unusable detect pattern");
            false
        }
    }
}

/// Returns the named groups of every match of `pattern` in `text`
///
/// Only groups that took part in a match are recorded; matches with no
/// recorded group are dropped.
pub fn extract_all_matches(pattern: &str, text: &str) -> Result<Vec<Captures>, RegexError> {
    let re = compile_safe(pattern)?;
    let names: Vec<&str> = re.capture_names().flatten().collect();

    let matches = re
        .captures_iter(text)
        .map(|caps| {
            names
                .iter()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect::<Captures>()
        })
        .filter(|groups| !groups.is_empty())
        .collect();

    Ok(matches)
}

/// Returns the named groups of the first match of `pattern` in `text`
pub fn extract_named_groups(pattern: &str, text: &str) -> Result<Option<Captures>, RegexError> {
    let re = compile_safe(pattern)?;
    let Some(caps) = re.captures(text) else {
        return Ok(None);
    };

    let groups = re
        .capture_names()
        .flatten()
        .filter_map(|name| {
            caps.name(name)
                .map(|m| (name.to_string(), m.as_str().to_string()))
        })
        .collect();
    Ok(Some(groups))
}

/// Applies every selected pattern to `content` and concatenates the matches
pub fn extract_with_patterns(
    content: &str,
    cfg: Option<&ExtractionConfig>,
) -> Result<Vec<Captures>, RegexError> {
    let mut all = Vec::new();
    for pattern in select_patterns(content, cfg) {
        all.extend(extract_all_matches(&pattern, content)?);
    }
    Ok(all)
}
