//! Source/test classification of arbitrary paths.
//!
//! Classification is a pure predicate: it emits no diagnostics. Callers use
//! it to decide whether to proceed or to report their own failure.

use std::path::Path;

use crate::conventions::RootKind;
use crate::fs::FilesystemCapability;
use crate::manifest::TargetRole;
use crate::resolver::{is_strict_descendant, PackagePaths};

impl<F: FilesystemCapability> PackagePaths<F> {
    /// Whether `path` lies inside a source-classified target directory or,
    /// failing that, under a conventional sources root existing on disk.
    pub async fn is_source_file(&self, path: &Path) -> bool {
        self.classify(path, RootKind::Sources).await
    }

    /// Whether `path` lies inside a test target directory or, failing that,
    /// under a conventional tests root existing on disk.
    pub async fn is_test_file(&self, path: &Path) -> bool {
        self.classify(path, RootKind::Tests).await
    }

    async fn classify(&self, path: &Path, kind: RootKind) -> bool {
        // The first containing target decides. Roles outside both families
        // (system, binary, snippet) fall through to the conventional-root
        // probe instead of answering for a family they do not belong to.
        for resolved in self.targets() {
            if !resolved.path_exists_as_directory || !resolved.contains(path) {
                continue;
            }
            match resolved.role() {
                TargetRole::Regular | TargetRole::Executable | TargetRole::Plugin => {
                    return kind == RootKind::Sources;
                }
                TargetRole::Test => return kind == RootKind::Tests,
                TargetRole::System | TargetRole::Binary | TargetRole::Snippet => break,
            }
        }

        for name in kind.search_paths() {
            let root = self.package_root().join(name);
            if is_strict_descendant(&root, path) && self.fs().is_directory(&root).await {
                return true;
            }
        }
        false
    }
}
