//! Manifest model for the package description dump.
//!
//! The dump is produced by running the package toolchain against the
//! package root; invoking it is the caller's concern. This module only
//! deserializes the bytes into plain data. The model is immutable once
//! parsed and is moved into the resolution session for its lifetime.

use serde::Deserialize;

use crate::error::ManifestError;

/// Role of a declared target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRole {
    Regular,
    Executable,
    Plugin,
    #[serde(rename = "system-target")]
    System,
    Binary,
    Snippet,
    Test,
}

impl TargetRole {
    /// Whether targets of this role live under the sources conventions.
    /// Only `Test` targets use the tests conventions.
    pub fn is_sources_oriented(self) -> bool {
        !matches!(self, TargetRole::Test)
    }
}

/// A dependency reference as it appears in the dump. Only the referenced
/// name is meaningful to this crate; the positional metadata the dump
/// carries alongside it is preserved but unused.
#[derive(Debug, Clone, Deserialize)]
pub enum TargetDependency {
    #[serde(rename = "byName")]
    ByName(Vec<Option<String>>),
    #[serde(rename = "target")]
    Target(Vec<Option<String>>),
    #[serde(rename = "product")]
    Product(Vec<Option<String>>),
}

impl TargetDependency {
    /// The referenced target or product name, when present.
    pub fn name(&self) -> Option<&str> {
        let (Self::ByName(parts) | Self::Target(parts) | Self::Product(parts)) = self;
        parts.iter().flatten().next().map(String::as_str)
    }
}

/// A named, typed unit of source code declared by the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    pub name: String,

    #[serde(rename = "type")]
    pub role: TargetRole,

    /// Explicit directory relative to the package root, when declared.
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<TargetDependency>,
}

/// Tool-version marker carried through from the dump.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsVersion {
    #[serde(rename = "_version")]
    pub version: String,
}

/// Declarative description of a package: its name and declared targets.
///
/// Invariant: target names are unique within a manifest. A `Test` target is
/// conventionally linked to its unit under test via the `<Name>Tests`
/// naming pattern; the link is not structural.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,

    #[serde(default)]
    pub targets: Vec<Target>,

    #[serde(default, rename = "toolsVersion")]
    pub tools_version: Option<ToolsVersion>,
}

impl Manifest {
    /// Look up a declared target by name.
    pub fn target_named(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }
}

/// Deserialize a manifest dump.
///
/// This is the whole deserializer contract: bytes in, `Manifest` or a typed
/// parse error out. No filesystem access, no validation beyond what path
/// resolution needs.
pub fn parse_manifest(bytes: &[u8]) -> Result<Manifest, ManifestError> {
    let text = std::str::from_utf8(bytes)?;
    let manifest = serde_json::from_str(text)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DUMP: &str = r#"{
        "name": "NetKit",
        "toolsVersion": { "_version": "5.9.0" },
        "targets": [
            {
                "name": "NetKit",
                "type": "regular",
                "dependencies": [ { "byName": ["NetKitCore", null] } ]
            },
            {
                "name": "NetKitCore",
                "type": "regular",
                "path": "Internal/Core"
            },
            { "name": "netkit-cli", "type": "executable" },
            { "name": "CSystemShim", "type": "system-target" },
            {
                "name": "NetKitTests",
                "type": "test",
                "dependencies": [ { "target": ["NetKit", null] } ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_dump() {
        let manifest = parse_manifest(SAMPLE_DUMP.as_bytes()).unwrap();
        assert_eq!(manifest.name, "NetKit");
        assert_eq!(manifest.targets.len(), 5);
        assert_eq!(
            manifest.tools_version.as_ref().map(|v| v.version.as_str()),
            Some("5.9.0")
        );
    }

    #[test]
    fn test_role_spellings() {
        let manifest = parse_manifest(SAMPLE_DUMP.as_bytes()).unwrap();
        assert_eq!(manifest.targets[0].role, TargetRole::Regular);
        assert_eq!(manifest.targets[2].role, TargetRole::Executable);
        assert_eq!(manifest.targets[3].role, TargetRole::System);
        assert_eq!(manifest.targets[4].role, TargetRole::Test);
    }

    #[test]
    fn test_explicit_path_is_optional() {
        let manifest = parse_manifest(SAMPLE_DUMP.as_bytes()).unwrap();
        assert_eq!(manifest.targets[0].path, None);
        assert_eq!(manifest.targets[1].path.as_deref(), Some("Internal/Core"));
    }

    #[test]
    fn test_dependency_names() {
        let manifest = parse_manifest(SAMPLE_DUMP.as_bytes()).unwrap();
        let names: Vec<_> = manifest.targets[0]
            .dependencies
            .iter()
            .filter_map(TargetDependency::name)
            .collect();
        assert_eq!(names, vec!["NetKitCore"]);
    }

    #[test]
    fn test_target_named() {
        let manifest = parse_manifest(SAMPLE_DUMP.as_bytes()).unwrap();
        assert!(manifest.target_named("NetKitTests").is_some());
        assert!(manifest.target_named("Absent").is_none());
    }

    #[test]
    fn test_only_test_targets_use_tests_conventions() {
        assert!(TargetRole::Regular.is_sources_oriented());
        assert!(TargetRole::Snippet.is_sources_oriented());
        assert!(TargetRole::System.is_sources_oriented());
        assert!(!TargetRole::Test.is_sources_oriented());
    }

    #[test]
    fn test_malformed_dump_is_a_typed_error() {
        let err = parse_manifest(b"{ not json").unwrap_err();
        assert!(matches!(err, ManifestError::Malformed(_)));
    }
}
