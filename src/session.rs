//! Per-root resolution session cache and package discovery.
//!
//! A batch of file operations touches one or more packages; every distinct
//! package root gets exactly one [`PackagePaths`] context for the batch,
//! built behind a compute-once guard so concurrent first access waits on
//! the same in-flight initialization instead of racing duplicate probes.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::conventions::MANIFEST_FILE;
use crate::diagnostics::{DiagnosticKind, DiagnosticRecord};
use crate::error::ManifestError;
use crate::fs::FilesystemCapability;
use crate::manifest::Manifest;
use crate::resolver::PackagePaths;

/// Supplies the manifest for a package root.
///
/// Implementations typically shell out to the package toolchain or read a
/// cached dump; both stay outside this crate.
pub trait ManifestLoader: Send + Sync {
    fn load(
        &self,
        package_root: &Path,
    ) -> impl Future<Output = Result<Manifest, ManifestError>> + Send;
}

/// Loader over pre-parsed manifests, for hosts that obtain dumps themselves
/// (and for tests).
#[derive(Debug, Default)]
pub struct StaticManifests {
    manifests: AHashMap<PathBuf, Manifest>,
}

impl StaticManifests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package_root: impl Into<PathBuf>, manifest: Manifest) {
        self.manifests.insert(package_root.into(), manifest);
    }
}

impl ManifestLoader for StaticManifests {
    async fn load(&self, package_root: &Path) -> Result<Manifest, ManifestError> {
        self.manifests
            .get(package_root)
            .cloned()
            .ok_or_else(|| ManifestError::Unavailable(package_root.to_path_buf()))
    }
}

/// Walk upward from `path` to the nearest directory containing the package
/// manifest file.
pub async fn find_package_root<F: FilesystemCapability>(fs: &F, path: &Path) -> Option<PathBuf> {
    let mut current = if fs.is_directory(path).await {
        Some(path)
    } else {
        path.parent()
    };
    while let Some(dir) = current {
        if fs.file_exists(&dir.join(MANIFEST_FILE)).await {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

type ContextOutcome<F> = Result<Arc<PackagePaths<F>>, DiagnosticRecord>;

/// Cache of resolution contexts keyed by package root, alive for one batch.
pub struct SessionCache<F, L> {
    fs: Arc<F>,
    loader: L,
    contexts: Mutex<AHashMap<PathBuf, Arc<OnceCell<ContextOutcome<F>>>>>,
}

impl<F: FilesystemCapability, L: ManifestLoader> SessionCache<F, L> {
    pub fn new(fs: Arc<F>, loader: L) -> Self {
        Self {
            fs,
            loader,
            contexts: Mutex::new(AHashMap::new()),
        }
    }

    /// Context for the package owning `file`.
    ///
    /// A missing manifest anywhere up the tree yields a
    /// `PackageManifestNotFound` diagnostic, as does a root whose manifest
    /// cannot be loaded.
    pub async fn context_for_file(&self, file: &Path) -> ContextOutcome<F> {
        let Some(root) = find_package_root(self.fs.as_ref(), file).await else {
            return Err(DiagnosticRecord::for_file(
                DiagnosticKind::PackageManifestNotFound,
                file,
            ));
        };
        self.context_for_root(&root).await
    }

    /// Context for a known package root, built at most once per session.
    pub async fn context_for_root(&self, root: &Path) -> ContextOutcome<F> {
        let cell = {
            let mut contexts = self.contexts.lock();
            contexts.entry(root.to_path_buf()).or_default().clone()
        };
        cell.get_or_init(|| async {
            debug!(root = %root.display(), "building package resolution context");
            match self.loader.load(root).await {
                Ok(manifest) => Ok(Arc::new(
                    PackagePaths::resolve(root.to_path_buf(), manifest, Arc::clone(&self.fs))
                        .await,
                )),
                Err(err) => Err(DiagnosticRecord::new(
                    DiagnosticKind::PackageManifestNotFound,
                    format!("Manifest for {} could not be loaded: {err}", root.display()),
                )),
            }
        })
        .await
        .clone()
    }
}
