//! XML manifest parser (.csproj, packages.config, ...)
//!
//! Candidate nodes come from `extraction.path` when set, otherwise from the
//! field name used as a slash path below the root element. Name and version
//! are read from attributes (`id` / `version` unless configured).

use super::{new_package, XmlNode};
use crate::config::{ExtractionConfig, ManagerConfig};
use crate::domain::Package;
use crate::error::ManifestError;
use crate::version::process_version;
use tracing::debug;

const DEFAULT_NAME_ATTR: &str = "id";
const DEFAULT_VERSION_ATTR: &str = "version";

/// Conventional location of MSBuild package references
const PACKAGE_REFERENCE_PATH: &str = "ItemGroup/PackageReference";

pub(super) fn parse(content: &[u8], cfg: &ManagerConfig) -> Result<Vec<Package>, ManifestError> {
    let root = XmlNode::parse(content)?;
    let extraction = cfg.extraction.as_ref();

    let name_attr = configured(extraction.map(|e| e.name_attr.as_str()), DEFAULT_NAME_ATTR);
    let version_attr = configured(
        extraction.map(|e| e.version_attr.as_str()),
        DEFAULT_VERSION_ATTR,
    );

    let mut packages = Vec::new();

    for (field, kind) in &cfg.fields {
        let path = configured(extraction.map(|e| e.path.as_str()), field);
        for node in root.find_nodes(path) {
            if let Some(pkg) = node_package(node, name_attr, version_attr, kind, cfg) {
                packages.push(pkg);
            }
        }
    }

    if packages.is_empty() && is_dotnet(&cfg.manager) {
        debug!("no packages from configured fields, trying PackageReference fallback");
        for node in root.find_nodes(PACKAGE_REFERENCE_PATH) {
            if let Some(pkg) = node_package(node, "Include", "Version", "prod", cfg) {
                packages.push(pkg);
            }
        }
    }

    Ok(packages)
}

fn configured<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}

fn is_dotnet(manager: &str) -> bool {
    matches!(manager, "nuget" | "dotnet")
}

fn node_package(
    node: &XmlNode,
    name_attr: &str,
    version_attr: &str,
    kind: &str,
    cfg: &ManagerConfig,
) -> Option<Package> {
    let name = node.attr(name_attr).filter(|n| !n.is_empty())?;
    let version = node.attr(version_attr).filter(|v| !v.is_empty())?;

    let kind = match &cfg.extraction {
        Some(extraction) if is_dev_dependency(node, extraction) => "dev",
        _ => kind,
    };

    let info = process_version(version, name, cfg);
    Some(new_package(name, info, kind, cfg))
}

/// Checks the configured dev markers, all compared case-insensitively
///
/// `dev_attr`/`dev_value` is an attribute marker. `dev_element` is looked up
/// first as an attribute and then as a child element, matching MSBuild's two
/// spellings (`PrivateAssets="all"` and `<PrivateAssets>all</PrivateAssets>`).
/// An empty `dev_element_value` accepts any value.
fn is_dev_dependency(node: &XmlNode, extraction: &ExtractionConfig) -> bool {
    if !extraction.dev_attr.is_empty() && !extraction.dev_value.is_empty() {
        let value = node.attr(&extraction.dev_attr).unwrap_or_default();
        if value.eq_ignore_ascii_case(&extraction.dev_value) {
            return true;
        }
    }

    if extraction.dev_element.is_empty() {
        return false;
    }

    let accepts = |value: &str| {
        extraction.dev_element_value.is_empty()
            || value.eq_ignore_ascii_case(&extraction.dev_element_value)
    };

    if let Some(value) = node.attr(&extraction.dev_element).filter(|v| !v.is_empty()) {
        if accepts(value) {
            return true;
        }
    }

    node.children_named(&extraction.dev_element)
        .any(|child| accepts(child.text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackageOverride;

    const PACKAGES_CONFIG: &[u8] = br#"<?xml version="1.0" encoding="utf-8"?>
<packages>
  <package id="Newtonsoft.Json" version="13.0.1" targetFramework="net472" />
  <package id="NUnit" version="3.13.3" developmentDependency="true" />
  <package id="NoVersion" />
</packages>"#;

    const CSPROJ: &[u8] = br#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1" />
    <PackageReference Include="coverlet.collector" Version="6.0.0" PrivateAssets="All" />
    <PackageReference Include="StyleCop.Analyzers" Version="[1.1.118]">
      <PrivateAssets>all</PrivateAssets>
    </PackageReference>
  </ItemGroup>
</Project>"#;

    fn find<'a>(packages: &'a [Package], name: &str) -> &'a Package {
        packages
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("package {name} not found"))
    }

    fn packages_config() -> ManagerConfig {
        ManagerConfig {
            manager: "nuget".to_string(),
            format: "xml".to_string(),
            fields: [("package".to_string(), "prod".to_string())].into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_attributes() {
        let packages = parse(PACKAGES_CONFIG, &packages_config()).unwrap();
        assert_eq!(packages.len(), 2);
        let json = find(&packages, "Newtonsoft.Json");
        assert_eq!(json.version, "13.0.1");
        assert_eq!(json.kind, "prod");
        assert_eq!(json.package_type, "nuget");
    }

    #[test]
    fn test_dev_attribute_marker() {
        let mut cfg = packages_config();
        cfg.extraction = Some(ExtractionConfig {
            dev_attr: "developmentDependency".to_string(),
            dev_value: "TRUE".to_string(),
            ..Default::default()
        });
        let packages = parse(PACKAGES_CONFIG, &cfg).unwrap();
        assert_eq!(find(&packages, "NUnit").kind, "dev");
        assert_eq!(find(&packages, "Newtonsoft.Json").kind, "prod");
    }

    #[test]
    fn test_extraction_path_and_attributes() {
        let cfg = ManagerConfig {
            manager: "msbuild".to_string(),
            fields: [("ignored-when-path-set".to_string(), "prod".to_string())].into(),
            extraction: Some(ExtractionConfig {
                path: "ItemGroup/PackageReference".to_string(),
                name_attr: "Include".to_string(),
                version_attr: "Version".to_string(),
                dev_element: "PrivateAssets".to_string(),
                dev_element_value: "all".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let packages = parse(CSPROJ, &cfg).unwrap();

        assert_eq!(packages.len(), 3);
        assert_eq!(find(&packages, "Serilog").kind, "prod");
        // Attribute spelling, compared case-insensitively
        assert_eq!(find(&packages, "coverlet.collector").kind, "dev");
        // Child element spelling
        let stylecop = find(&packages, "StyleCop.Analyzers");
        assert_eq!(stylecop.kind, "dev");
        assert_eq!(stylecop.version, "[1.1.118]");
    }

    #[test]
    fn test_empty_dev_element_value_matches_any() {
        let cfg = ManagerConfig {
            manager: "msbuild".to_string(),
            fields: [("x".to_string(), "prod".to_string())].into(),
            extraction: Some(ExtractionConfig {
                path: "ItemGroup/PackageReference".to_string(),
                name_attr: "Include".to_string(),
                version_attr: "Version".to_string(),
                dev_element: "PrivateAssets".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let packages = parse(CSPROJ, &cfg).unwrap();
        assert_eq!(packages.iter().filter(|p| p.kind == "dev").count(), 2);
    }

    #[test]
    fn test_dotnet_fallback() {
        let cfg = ManagerConfig {
            manager: "dotnet".to_string(),
            fields: [("Nothing/Here".to_string(), "prod".to_string())].into(),
            ..Default::default()
        };
        let packages = parse(CSPROJ, &cfg).unwrap();
        assert_eq!(packages.len(), 3);
        assert!(packages.iter().all(|p| p.kind == "prod"));
        assert_eq!(find(&packages, "Serilog").version, "3.1.1");
    }

    #[test]
    fn test_no_fallback_for_other_managers() {
        let cfg = ManagerConfig {
            manager: "maven".to_string(),
            fields: [("Nothing/Here".to_string(), "prod".to_string())].into(),
            ..Default::default()
        };
        assert!(parse(CSPROJ, &cfg).unwrap().is_empty());
    }

    #[test]
    fn test_fallback_applies_dev_markers() {
        let cfg = ManagerConfig {
            manager: "nuget".to_string(),
            fields: [("Nothing".to_string(), "prod".to_string())].into(),
            extraction: Some(ExtractionConfig {
                dev_element: "PrivateAssets".to_string(),
                dev_element_value: "all".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let packages = parse(CSPROJ, &cfg).unwrap();
        assert_eq!(find(&packages, "StyleCop.Analyzers").kind, "dev");
        assert_eq!(find(&packages, "Serilog").kind, "prod");
    }

    #[test]
    fn test_ignore_and_override() {
        let mut cfg = packages_config();
        cfg.ignore = vec!["^NUnit$".to_string()];
        cfg.package_overrides.insert(
            "Newtonsoft.Json".to_string(),
            PackageOverride {
                constraint: Some(">=".to_string()),
                ..Default::default()
            },
        );
        let packages = parse(PACKAGES_CONFIG, &cfg).unwrap();

        assert_eq!(packages.len(), 2);
        assert!(find(&packages, "NUnit").is_ignored());
        assert_eq!(find(&packages, "Newtonsoft.Json").constraint, ">=");
    }

    #[test]
    fn test_invalid_xml() {
        let err = parse(b"<packages><package></packages>", &packages_config()).unwrap_err();
        assert!(err.is_malformed());
        assert!(format!("{}", err).starts_with("invalid XML"));
    }
}
