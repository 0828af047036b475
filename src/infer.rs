//! Target-name inference for files outside every declared target.

use std::path::{Path, PathBuf};

use crate::conventions::RootKind;
use crate::fs::FilesystemCapability;
use crate::resolver::{is_strict_descendant, PackagePaths};

/// Conventional-root inference outcome: the candidate name plus the root
/// directory it was derived against (`packageRoot/<Convention>`).
#[derive(Debug, Clone)]
pub(crate) struct InferredTarget {
    pub name: String,
    pub base: PathBuf,
}

impl<F: FilesystemCapability> PackagePaths<F> {
    /// Derive a plausible target name for `path`.
    ///
    /// Prefers the owning declared target; otherwise the first conventional
    /// sources root that contains the path and exists on disk names the
    /// candidate; otherwise the first candidate collected in declared
    /// priority order. `None` only when no conventional root contains the
    /// path at all, or the path sits directly under a root with no target
    /// directory in between.
    pub async fn target_name_from_path(&self, path: &Path) -> Option<String> {
        for resolved in self.targets() {
            if resolved.contains(path) {
                return Some(resolved.name().to_string());
            }
        }
        self.infer_from_conventions(path, RootKind::Sources)
            .await
            .map(|inferred| inferred.name)
    }

    /// The conventional-root tiers of inference, shared with the inverse
    /// mapping direction.
    ///
    /// Two-pass by design: a candidate under a root existing on disk wins
    /// immediately, but candidates under missing roots are remembered and
    /// the first one collected (declared order, not existence order) is
    /// returned when no root exists. The two policies differ observably
    /// when convention roots partially exist.
    pub(crate) async fn infer_from_conventions(
        &self,
        path: &Path,
        kind: RootKind,
    ) -> Option<InferredTarget> {
        let mut fallback: Option<InferredTarget> = None;
        for name in kind.search_paths() {
            let root = self.package_root().join(name);
            if !is_strict_descendant(&root, path) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };
            let mut components = relative.components();
            let Some(first) = components.next() else {
                continue;
            };
            // A file directly under the root has no target directory to
            // name a candidate after.
            if components.next().is_none() {
                continue;
            }
            let inferred = InferredTarget {
                name: first.as_os_str().to_string_lossy().into_owned(),
                base: root.clone(),
            };
            if self.fs().is_directory(&root).await {
                return Some(inferred);
            }
            if fallback.is_none() {
                fallback = Some(inferred);
            }
        }
        fallback
    }
}
