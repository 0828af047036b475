//! Target path resolution session.
//!
//! A [`PackagePaths`] context is built once per package root and holds every
//! declared target's effective on-disk directory, resolved by strict
//! priority: explicit path over convention over inference. The context is
//! immutable after construction apart from two compute-once cells, so
//! concurrent per-file work can share it freely.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, trace};

use crate::conventions::RootKind;
use crate::fs::FilesystemCapability;
use crate::manifest::{Manifest, Target, TargetRole};

/// A declared target together with its effective on-disk directory.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub target: Target,

    /// Absolute directory this target occupies, per the resolution priority.
    pub computed_path: PathBuf,

    /// Whether `computed_path` existed as a directory when the session
    /// began. Probed once; never refreshed within a session.
    pub path_exists_as_directory: bool,
}

impl ResolvedTarget {
    pub fn name(&self) -> &str {
        &self.target.name
    }

    pub fn role(&self) -> TargetRole {
        self.target.role
    }

    /// Strict, non-identical descendant test against the computed directory.
    pub fn contains(&self, path: &Path) -> bool {
        is_strict_descendant(&self.computed_path, path)
    }
}

/// Strict descendant test: `path` lies below `dir` and is not `dir` itself.
/// Purely lexical, component-wise; no probing, no normalization.
pub(crate) fn is_strict_descendant(dir: &Path, path: &Path) -> bool {
    path != dir && path.starts_with(dir)
}

/// Compute the effective directory for a single target, independent of any
/// session. Resolution order:
///
/// 1. an explicit path joins the package root directly, with no probing and
///    no existence requirement;
/// 2. otherwise each role-appropriate conventional root is probed in
///    priority order as `root/<Convention>/<TargetName>`, first existing
///    directory wins;
/// 3. otherwise the first convention entry joined with the target name.
///
/// Always produces a path; never fails.
pub async fn computed_path_for<F: FilesystemCapability>(
    package_root: &Path,
    target: &Target,
    fs: &F,
) -> PathBuf {
    if let Some(explicit) = &target.path {
        return package_root.join(explicit);
    }
    let kind = if target.role.is_sources_oriented() {
        RootKind::Sources
    } else {
        RootKind::Tests
    };
    for convention in kind.search_paths() {
        let candidate = package_root.join(convention).join(&target.name);
        if fs.is_directory(&candidate).await {
            return candidate;
        }
    }
    package_root
        .join(kind.search_paths()[0])
        .join(&target.name)
}

/// Resolution session for one package root.
///
/// Owns the manifest and the resolved targets for its lifetime. The two
/// conventional-root lookups are memoized behind compute-once cells: the
/// first caller performs the probes, concurrent first callers wait on the
/// same initialization instead of racing duplicates.
#[derive(Debug)]
pub struct PackagePaths<F> {
    package_root: PathBuf,
    manifest: Manifest,
    targets: Vec<ResolvedTarget>,
    fs: Arc<F>,
    sources_root: OnceCell<Option<PathBuf>>,
    tests_root: OnceCell<Option<PathBuf>>,
}

impl<F: FilesystemCapability> PackagePaths<F> {
    /// Resolve every declared target against the filesystem and return the
    /// session context.
    pub async fn resolve(package_root: impl Into<PathBuf>, manifest: Manifest, fs: Arc<F>) -> Self {
        let package_root = package_root.into();
        let mut targets = Vec::with_capacity(manifest.targets.len());
        for target in &manifest.targets {
            let computed_path = computed_path_for(&package_root, target, fs.as_ref()).await;
            let path_exists_as_directory = fs.is_directory(&computed_path).await;
            trace!(
                target = %target.name,
                path = %computed_path.display(),
                exists = path_exists_as_directory,
                "resolved target directory"
            );
            targets.push(ResolvedTarget {
                target: target.clone(),
                computed_path,
                path_exists_as_directory,
            });
        }
        debug!(
            package = %manifest.name,
            root = %package_root.display(),
            targets = targets.len(),
            "package resolution session ready"
        );
        Self {
            package_root,
            manifest,
            targets,
            fs,
            sources_root: OnceCell::new(),
            tests_root: OnceCell::new(),
        }
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Every declared target with its resolved directory, in manifest order.
    pub fn targets(&self) -> &[ResolvedTarget] {
        &self.targets
    }

    pub fn target_named(&self, name: &str) -> Option<&ResolvedTarget> {
        self.targets.iter().find(|t| t.name() == name)
    }

    /// Effective directory of the named target, as computed for this
    /// session.
    pub fn computed_path_of(&self, name: &str) -> Option<&Path> {
        self.target_named(name).map(|t| t.computed_path.as_path())
    }

    pub(crate) fn fs(&self) -> &F {
        &self.fs
    }

    /// First conventional sources root existing as a directory directly
    /// under the package root, memoized for the session.
    ///
    /// `None` does not imply the package has no source files; targets may
    /// use wholly custom explicit paths.
    pub async fn available_sources_path(&self) -> Option<&Path> {
        self.available_root(RootKind::Sources).await
    }

    /// Tests-side counterpart of [`available_sources_path`].
    ///
    /// [`available_sources_path`]: Self::available_sources_path
    pub async fn available_tests_path(&self) -> Option<&Path> {
        self.available_root(RootKind::Tests).await
    }

    pub(crate) async fn available_root(&self, kind: RootKind) -> Option<&Path> {
        let cell = match kind {
            RootKind::Sources => &self.sources_root,
            RootKind::Tests => &self.tests_root,
        };
        cell.get_or_init(|| async {
            for name in kind.search_paths() {
                let candidate = self.package_root.join(name);
                if self.fs.is_directory(&candidate).await {
                    debug!(kind = ?kind, root = %candidate.display(), "conventional root found");
                    return Some(candidate);
                }
            }
            debug!(kind = ?kind, root = %self.package_root.display(), "no conventional root on disk");
            None
        })
        .await
        .as_deref()
    }
}
