//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One aligned table per manifest (name, requirement, kind, manager)
//! - Ignored packages shown with their reason
//! - Summary with per-manager breakdown in verbose mode

use crate::domain::Package;
use crate::output::{OutputFormatter, Verbosity};
use crate::scanner::{ScanResult, ScannedManifest};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

/// Minimum width of the name column
const MIN_NAME_WIDTH: usize = 20;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn plural(count: usize, singular: &'static str, plural: &'static str) -> &'static str {
        if count == 1 {
            singular
        } else {
            plural
        }
    }

    /// Column widths for name, requirement and kind
    fn column_widths(packages: &[Package]) -> (usize, usize, usize) {
        packages.iter().fold((MIN_NAME_WIDTH, 0, 0), |(n, r, k), p| {
            (
                n.max(p.name.len()),
                r.max(p.requirement().len()),
                k.max(p.kind.len()),
            )
        })
    }

    /// Format a single package line
    fn format_package_line(
        &self,
        package: &Package,
        widths: (usize, usize, usize),
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let (name_w, req_w, kind_w) = widths;
        let name = format!("{:width$}", package.name, width = name_w);
        let requirement = format!("{:width$}", package.requirement(), width = req_w);
        let kind = format!("{:width$}", package.kind, width = kind_w);

        if self.color {
            if package.is_ignored() {
                writeln!(
                    writer,
                    "  {} {} {} {} {}",
                    name.dimmed(),
                    requirement.dimmed(),
                    kind.dimmed(),
                    package.package_type.dimmed(),
                    format!("(ignored: {})", package.ignore_reason).yellow()
                )
            } else {
                writeln!(
                    writer,
                    "  {} {} {} {}",
                    name,
                    requirement.bright_white().bold(),
                    kind.cyan(),
                    package.package_type.dimmed()
                )
            }
        } else if package.is_ignored() {
            writeln!(
                writer,
                "  {} {} {} {} (ignored: {})",
                name, requirement, kind, package.package_type, package.ignore_reason
            )
        } else {
            writeln!(
                writer,
                "  {} {} {} {}",
                name, requirement, kind, package.package_type
            )
        }
    }

    /// Format manifest header and package table
    fn format_manifest_table(
        &self,
        manifest: &ScannedManifest,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let count = manifest.list.len();
        let ignored = manifest.ignored_count();
        let rule_display = format!("({})", manifest.rule);

        if self.color {
            writeln!(
                writer,
                "{} {}: {} {}, {} ignored",
                manifest.list.source.bold(),
                rule_display.dimmed(),
                count.to_string().green(),
                Self::plural(count, "package", "packages"),
                ignored.to_string().yellow()
            )?;
        } else {
            writeln!(
                writer,
                "{} {}: {} {}, {} ignored",
                manifest.list.source,
                rule_display,
                count,
                Self::plural(count, "package", "packages"),
                ignored
            )?;
        }

        let widths = Self::column_widths(&manifest.list.packages);
        for package in &manifest.list.packages {
            self.format_package_line(package, widths, writer)?;
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Package and ignored counts per manager
    fn count_by_manager(result: &ScanResult) -> BTreeMap<&str, (usize, usize)> {
        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for manifest in &result.manifests {
            let entry = counts.entry(manifest.manager.as_str()).or_default();
            entry.0 += manifest.list.len();
            entry.1 += manifest.ignored_count();
        }
        counts
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(result, writer);
        }

        for manifest in &result.manifests {
            self.format_manifest_table(manifest, writer)?;
        }

        if result.has_errors() {
            if self.color {
                writeln!(writer, "{}:", "Errors".red().bold())?;
            } else {
                writeln!(writer, "Errors:")?;
            }
            for error in &result.errors {
                if self.color {
                    writeln!(writer, "  {} {}", "✗".red(), error)?;
                } else {
                    writeln!(writer, "  - {}", error)?;
                }
            }
            writeln!(writer)?;
        }

        self.format_summary(result, writer)
    }

    fn format_summary(&self, result: &ScanResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let packages = result.total_packages();
        let ignored = result.total_ignored();
        let manifests = result.manifests.len();
        let failed = result.errors.len();

        if self.verbosity == Verbosity::Quiet {
            let line = format!(
                "{} packages ({} ignored) in {} manifests, {} failed",
                packages, ignored, manifests, failed
            );
            if self.color && failed > 0 {
                writeln!(writer, "{}", line.red())?;
            } else {
                writeln!(writer, "{}", line)?;
            }
            return Ok(());
        }

        if self.color {
            writeln!(writer, "{}:", "Summary".bold())?;
            writeln!(
                writer,
                "  {} package(s) in {} manifest(s)",
                packages.to_string().green(),
                manifests
            )?;
            writeln!(writer, "  {} ignored", ignored.to_string().yellow())?;
            if failed > 0 {
                writeln!(writer, "  {} file(s) failed", failed.to_string().red())?;
            }
        } else {
            writeln!(writer, "Summary:")?;
            writeln!(
                writer,
                "  {} package(s) in {} manifest(s)",
                packages, manifests
            )?;
            writeln!(writer, "  {} ignored", ignored)?;
            if failed > 0 {
                writeln!(writer, "  {} file(s) failed", failed)?;
            }
        }

        // Verbose: show breakdown by manager
        if self.verbosity == Verbosity::Verbose && !result.manifests.is_empty() {
            writeln!(writer)?;
            if self.color {
                writeln!(writer, "{}:", "By manager".dimmed())?;
            } else {
                writeln!(writer, "By manager:")?;
            }
            for (manager, (count, ignored)) in Self::count_by_manager(result) {
                if self.color {
                    writeln!(
                        writer,
                        "  {}: {} packages, {} ignored",
                        manager.cyan(),
                        count.to_string().green(),
                        ignored.to_string().dimmed()
                    )?;
                } else {
                    writeln!(
                        writer,
                        "  {}: {} packages, {} ignored",
                        manager, count, ignored
                    )?;
                }
            }
        }

        Ok(())
    }

    fn format_manifest(
        &self,
        manifest: &ScannedManifest,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.format_manifest_table(manifest, writer)
    }
}
