//! depscan - Config-driven dependency extraction CLI tool
//!
//! Reads a rules file, matches each manifest to a rule and prints the
//! declared dependencies as a table or JSON.

use anyhow::Context;
use clap::Parser;
use depscan::cli::CliArgs;
use depscan::config::Config;
use depscan::output::{create_formatter, OutputConfig};
use depscan::pattern::set_default_limits;
use depscan::scanner::Scanner;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "depscan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = Config::load(&args.config)?;
    set_default_limits(config.regex_limits());

    if let Some(rule) = &args.rule {
        config
            .rule(rule)
            .with_context(|| format!("--rule {} is not defined", rule))?;
    }

    let scanner = match &args.rule {
        Some(rule) => Scanner::new(&config).with_rule(rule.as_str()),
        None => Scanner::new(&config),
    };
    let result = scanner.scan(&args.files);

    let mut output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    if args.no_color {
        colored::control::set_override(false);
        output_config = output_config.without_color();
    }
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    if result.has_errors() {
        // Partial success - some files failed
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
