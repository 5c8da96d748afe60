//! CLI argument parsing module for depscan

use clap::Parser;
use std::path::PathBuf;

/// Config-driven dependency extraction
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depscan",
    version,
    about = "Extract declared dependencies from manifest files"
)]
pub struct CliArgs {
    /// Manifest files to scan
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Rules configuration file (YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Parse every file with this rule instead of matching `include` globs
    #[arg(short, long)]
    pub rule: Option<String>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output and debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - summary only
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
