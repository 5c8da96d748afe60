//! Format dispatch

use super::{json, raw, xml, yaml};
use crate::config::ManagerConfig;
use crate::domain::Package;
use crate::error::ManifestError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of manifest parsers, selected by format name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatParser {
    /// JSON documents (package.json, composer.json)
    Json,
    /// YAML documents (pubspec.yaml, docker-compose.yml)
    Yaml,
    /// XML documents (.csproj, packages.config, pom.xml)
    Xml,
    /// Plain text scanned with regex patterns (requirements.txt, Pipfile)
    Raw,
}

impl FormatParser {
    /// Resolves a configured format name
    ///
    /// Surrounding whitespace is ignored; names are matched exactly otherwise.
    pub fn from_name(name: &str) -> Result<Self, ManifestError> {
        match name.trim() {
            "" => Err(ManifestError::EmptyFormat),
            "json" => Ok(FormatParser::Json),
            "yaml" => Ok(FormatParser::Yaml),
            "xml" => Ok(FormatParser::Xml),
            "raw" => Ok(FormatParser::Raw),
            other => Err(ManifestError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }

    /// Returns the configuration name of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatParser::Json => "json",
            FormatParser::Yaml => "yaml",
            FormatParser::Xml => "xml",
            FormatParser::Raw => "raw",
        }
    }

    /// Parses manifest bytes into packages
    pub fn parse(&self, content: &[u8], cfg: &ManagerConfig) -> Result<Vec<Package>, ManifestError> {
        match self {
            FormatParser::Json => json::parse(content, cfg),
            FormatParser::Yaml => yaml::parse(content, cfg),
            FormatParser::Xml => xml::parse(content, cfg),
            FormatParser::Raw => raw::parse(content, cfg),
        }
    }
}

impl fmt::Display for FormatParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
