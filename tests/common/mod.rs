//! Shared package-tree builder for integration tests.
//!
//! Builds temporary on-disk trees mirroring manifest-described package
//! layouts, plus the matching `Manifest` value, so tests can create the
//! exact combinations of declared targets and conventional directories a
//! scenario needs.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use testmap_engine::{HostFilesystem, Manifest, PackagePaths, Target, TargetRole};

/// Builder for a package tree with declared targets.
pub struct TestPackage {
    dir: TempDir,
    name: String,
    targets: Vec<Target>,
}

impl TestPackage {
    pub fn new(name: &str) -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            name: name.to_string(),
            targets: Vec::new(),
        }
    }

    /// Package root on disk.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a file or directory under the package root.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Declare a target without creating anything on disk.
    pub fn declare(mut self, name: &str, role: TargetRole) -> Self {
        self.targets.push(Target {
            name: name.to_string(),
            role,
            path: None,
            dependencies: Vec::new(),
        });
        self
    }

    /// Declare a target with an explicit path relative to the package root.
    pub fn declare_at(mut self, name: &str, role: TargetRole, path: &str) -> Self {
        self.targets.push(Target {
            name: name.to_string(),
            role,
            path: Some(path.to_string()),
            dependencies: Vec::new(),
        });
        self
    }

    /// Create a directory under the package root.
    pub fn add_dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.dir.path().join(relative)).expect("Failed to create dir");
        self
    }

    /// Create a file (and its parent directories) under the package root.
    pub fn add_file(self, relative: &str, contents: &str) -> Self {
        let full = self.dir.path().join(relative);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full, contents).expect("Failed to write file");
        self
    }

    /// Drop a manifest file at the package root, marking it discoverable.
    pub fn add_manifest_file(self) -> Self {
        self.add_file("Package.swift", "// swift-tools-version:5.9\n")
    }

    /// The manifest value matching the declared targets.
    pub fn manifest(&self) -> Manifest {
        Manifest {
            name: self.name.clone(),
            targets: self.targets.clone(),
            tools_version: None,
        }
    }

    /// Filesystem capability anchored at the package root.
    pub fn fs(&self) -> Arc<HostFilesystem> {
        Arc::new(HostFilesystem::new(self.root()))
    }

    /// Build the resolution session for this tree.
    pub async fn context(&self) -> PackagePaths<HostFilesystem> {
        PackagePaths::resolve(self.root().to_path_buf(), self.manifest(), self.fs()).await
    }
}
