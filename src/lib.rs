//! depscan - Config-driven dependency extraction library
//!
//! This library reads dependency declarations out of manifest files whose
//! layout is described by a rules configuration:
//! - JSON (package.json, composer.json)
//! - YAML (docker-compose.yml, conda environment.yml)
//! - XML (.csproj, packages.config)
//! - Plain text via named-group regexes (requirements.txt, Pipfile, Dockerfile)

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod output;
pub mod pattern;
pub mod scanner;
pub mod version;
