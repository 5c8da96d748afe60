//! `latest_mapping` configuration
//!
//! Each table accepts either a mapping (`{stable: "*"}`) or a sequence whose
//! last element is the value and whose other elements are tokens
//! (`[stable, current, "*"]`). A single-element sequence maps that token to `""`.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Tokens that mean "latest", globally and per package
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLatestMapping")]
pub struct LatestMapping {
    /// Manager-wide token table
    pub default: BTreeMap<String, String>,
    /// Package-specific token tables, layered over `default`
    pub packages: BTreeMap<String, BTreeMap<String, String>>,
}

impl LatestMapping {
    /// Creates an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a manager-wide token (builder pattern)
    pub fn with_default(mut self, token: &str, value: impl Into<String>) -> Self {
        self.default
            .insert(normalize_token(token), value.into().trim().to_string());
        self
    }

    /// Adds a package-specific token (builder pattern)
    pub fn with_package(mut self, name: &str, token: &str, value: impl Into<String>) -> Self {
        self.packages
            .entry(name.trim().to_string())
            .or_default()
            .insert(normalize_token(token), value.into().trim().to_string());
        self
    }
}

/// Lower-cases and trims a latest token
pub fn normalize_token(token: &str) -> String {
    token.trim().to_lowercase()
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLatestMapping {
    #[serde(default)]
    default: Option<TokenTable>,
    #[serde(default)]
    packages: Option<BTreeMap<String, TokenTable>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenTable {
    Map(BTreeMap<String, String>),
    Seq(Vec<String>),
    Scalar(String),
}

impl TokenTable {
    fn into_map(self, context: &str) -> Result<BTreeMap<String, String>, ConfigError> {
        match self {
            TokenTable::Map(map) => Ok(map
                .into_iter()
                .map(|(token, value)| (normalize_token(&token), value.trim().to_string()))
                .collect()),
            TokenTable::Seq(items) => Ok(sequence_to_map(&items)),
            // An empty scalar means "no table"
            TokenTable::Scalar(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            TokenTable::Scalar(_) => Err(ConfigError::InvalidLatestMapping {
                message: format!("{context} must be a mapping or sequence"),
            }),
        }
    }
}

fn sequence_to_map(items: &[String]) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    match items {
        [] => {}
        [token] => {
            result.insert(normalize_token(token), String::new());
        }
        [tokens @ .., value] => {
            let value = value.trim();
            for token in tokens {
                result.insert(normalize_token(token), value.to_string());
            }
        }
    }
    result
}

impl TryFrom<RawLatestMapping> for LatestMapping {
    type Error = ConfigError;

    fn try_from(raw: RawLatestMapping) -> Result<Self, Self::Error> {
        let default = match raw.default {
            Some(table) => table.into_map("default")?,
            None => BTreeMap::new(),
        };

        let mut packages = BTreeMap::new();
        for (name, table) in raw.packages.unwrap_or_default() {
            let name = name.trim().to_string();
            let map = table.into_map(&format!("packages.{name}"))?;
            packages.insert(name, map);
        }

        Ok(LatestMapping { default, packages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<LatestMapping, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[test]
    fn test_mapping_form() {
        let mapping = parse("default:\n  Stable: '*'\n  ' NEXT ': ' ^ '\n").unwrap();
        assert_eq!(mapping.default.get("stable").unwrap(), "*");
        assert_eq!(mapping.default.get("next").unwrap(), "^");
    }

    #[test]
    fn test_sequence_form() {
        let mapping = parse("default: [stable, current, '*']\n").unwrap();
        assert_eq!(mapping.default.get("stable").unwrap(), "*");
        assert_eq!(mapping.default.get("current").unwrap(), "*");
        assert_eq!(mapping.default.len(), 2);
    }

    #[test]
    fn test_single_element_sequence_maps_to_empty() {
        let mapping = parse("default: [nightly]\n").unwrap();
        assert_eq!(mapping.default.get("nightly").unwrap(), "");
    }

    #[test]
    fn test_packages_form() {
        let yaml = "packages:\n  react:\n    canary: '18.3.0'\n  vue: [edge, '3.x']\n";
        let mapping = parse(yaml).unwrap();
        assert!(mapping.default.is_empty());
        assert_eq!(mapping.packages["react"].get("canary").unwrap(), "18.3.0");
        assert_eq!(mapping.packages["vue"].get("edge").unwrap(), "3.x");
    }

    #[test]
    fn test_empty_default_scalar() {
        let mapping = parse("default: ''\n").unwrap();
        assert!(mapping.default.is_empty());
    }

    #[test]
    fn test_rejects_non_empty_scalar() {
        let err = parse("default: latest\n").unwrap_err();
        assert!(err.to_string().contains("default must be a mapping or sequence"));

        let err = parse("packages:\n  react: canary\n").unwrap_err();
        assert!(err
            .to_string()
            .contains("packages.react must be a mapping or sequence"));
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(parse("defaults: {}\n").is_err());
    }

    #[test]
    fn test_builders_normalize() {
        let mapping = LatestMapping::new()
            .with_default(" Stable ", "*")
            .with_package("react", "CANARY", " 18.3.0 ");
        assert_eq!(mapping.default.get("stable").unwrap(), "*");
        assert_eq!(mapping.packages["react"].get("canary").unwrap(), "18.3.0");
    }
}
