//! JSON output formatter for machine processing
//!
//! Packages are serialized with their full record so the output can be fed
//! to downstream tooling unchanged.

use crate::domain::Package;
use crate::output::{OutputFormatter, Verbosity};
use crate::scanner::{ScanResult, ScannedManifest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full result
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Summary statistics
    summary: JsonSummary<'a>,
    /// Per-manifest results
    manifests: Vec<JsonManifest<'a>>,
    /// Files that failed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<JsonError>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary<'a> {
    /// Number of parsed manifests
    manifests: usize,
    /// Total number of packages
    packages: usize,
    /// Total number of ignored packages
    ignored: usize,
    /// Number of failed files
    failed: usize,
    /// Package counts per manager (only in verbose mode)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    by_manager: BTreeMap<&'a str, usize>,
}

/// JSON representation of one manifest
#[derive(Serialize)]
struct JsonManifest<'a> {
    /// Path to the manifest file
    path: &'a str,
    /// Rule used to parse it
    rule: &'a str,
    /// Manager identifier
    manager: &'a str,
    /// Declared packages
    packages: &'a [Package],
}

/// JSON representation of a failed file
#[derive(Serialize)]
struct JsonError {
    /// Path of the file
    path: String,
    /// Error message
    message: String,
}

impl JsonFormatter {
    fn manifest_to_json(manifest: &ScannedManifest) -> JsonManifest<'_> {
        JsonManifest {
            path: &manifest.list.source,
            rule: &manifest.rule,
            manager: &manifest.manager,
            packages: &manifest.list.packages,
        }
    }

    fn summary_to_json<'a>(&self, result: &'a ScanResult) -> JsonSummary<'a> {
        let mut by_manager = BTreeMap::new();
        if self.verbosity == Verbosity::Verbose {
            for manifest in &result.manifests {
                *by_manager.entry(manifest.manager.as_str()).or_insert(0) += manifest.list.len();
            }
        }

        JsonSummary {
            manifests: result.manifests.len(),
            packages: result.total_packages(),
            ignored: result.total_ignored(),
            failed: result.errors.len(),
            by_manager,
        }
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            summary: self.summary_to_json(result),
            manifests: result.manifests.iter().map(Self::manifest_to_json).collect(),
            errors: result
                .errors
                .iter()
                .map(|e| JsonError {
                    path: e.path().display().to_string(),
                    message: e.to_string(),
                })
                .collect(),
        };

        Self::write_json(&output, writer)
    }

    fn format_summary(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        Self::write_json(&self.summary_to_json(result), writer)
    }

    fn format_manifest(
        &self,
        manifest: &ScannedManifest,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        Self::write_json(&Self::manifest_to_json(manifest), writer)
    }
}
