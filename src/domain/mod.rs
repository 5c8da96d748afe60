//! Core domain models for depscan
//!
//! This module contains the fundamental types produced by the parsers:
//! - Package records and per-file package lists
//! - Version information (constraint + version) and the accepted constraint tokens

mod package;
mod version_info;

pub use package::{Package, PackageList};
pub use version_info::{is_supported_constraint, VersionInfo, SUPPORTED_CONSTRAINTS};
