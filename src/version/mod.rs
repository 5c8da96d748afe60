//! Version strings declared in manifests
//!
//! This module provides:
//! - The grammar splitting a declared version into constraint and version
//! - Floating-constraint classification
//! - The override and "latest" normalization policy applied after parsing

mod grammar;
mod policy;

pub use grammar::{is_floating_constraint, parse_version};
pub use policy::{
    apply_package_override, apply_policy, is_latest_indicator, latest_table, map_constraint,
    normalize_latest, process_version, validate_constraint, LATEST_SENTINEL,
};
