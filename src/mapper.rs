//! Bidirectional source/test path transposition.
//!
//! Both directions run the same five-level cascade; each level fixes the
//! relative sub-path to preserve and the destination root together, so the
//! two can never come from different layers of the fallback policy.

use std::path::{Path, PathBuf};

use crate::conventions::{RootKind, TEST_SUFFIX};
use crate::diagnostics::{DiagnosticKind, DiagnosticRecord, MappingResult};
use crate::fs::FilesystemCapability;
use crate::manifest::TargetRole;
use crate::resolver::{is_strict_descendant, PackagePaths, ResolvedTarget};

/// Direction of one transposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    SourceToTest,
    TestToSource,
}

impl Direction {
    fn opposite(self) -> Direction {
        match self {
            Direction::SourceToTest => Direction::TestToSource,
            Direction::TestToSource => Direction::SourceToTest,
        }
    }

    fn input_kind(self) -> RootKind {
        match self {
            Direction::SourceToTest => RootKind::Sources,
            Direction::TestToSource => RootKind::Tests,
        }
    }

    fn output_kind(self) -> RootKind {
        self.input_kind().opposite()
    }

    /// Guard failure: the input does not classify as this direction's
    /// input role.
    fn guard_diagnostic(self) -> DiagnosticKind {
        match self {
            Direction::SourceToTest => DiagnosticKind::FileNotInSourcesFolder,
            Direction::TestToSource => DiagnosticKind::FileNotInTestsFolder,
        }
    }

    /// Level-5 failure: no destination-side root resolvable.
    fn missing_destination_diagnostic(self) -> DiagnosticKind {
        match self {
            Direction::SourceToTest => DiagnosticKind::TestsFolderNotFound,
            Direction::TestToSource => DiagnosticKind::SourcesFolderNotFound,
        }
    }

    /// Level-5 failure on the input side: no root to measure the relative
    /// sub-path from.
    fn missing_base_diagnostic(self) -> DiagnosticKind {
        match self {
            Direction::SourceToTest => DiagnosticKind::SourcesFolderNotFound,
            Direction::TestToSource => DiagnosticKind::TestsFolderNotFound,
        }
    }

    /// Whether a containing target of `role` anchors this direction's
    /// input. Mirrors the classifier's decisive role sets.
    fn owns_input(self, role: TargetRole) -> bool {
        match self {
            Direction::SourceToTest => matches!(
                role,
                TargetRole::Regular | TargetRole::Executable | TargetRole::Plugin
            ),
            Direction::TestToSource => role == TargetRole::Test,
        }
    }

    /// Name of the mirrored target: `Foo` pairs with `FooTests`.
    fn counterpart_name(self, name: &str) -> String {
        match self {
            Direction::SourceToTest => format!("{name}{TEST_SUFFIX}"),
            Direction::TestToSource => {
                name.strip_suffix(TEST_SUFFIX).unwrap_or(name).to_string()
            }
        }
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`, deterministically
/// and order-preserving.
///
/// Applies to the generated scaffold identifier only; file paths keep their
/// original characters.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `A.swift` becomes `ATests.swift`; the inverse strips the suffix and
/// rejects stems that do not carry it.
fn transform_file_name(input: &Path, direction: Direction) -> Result<String, DiagnosticRecord> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = input.extension().map(|e| e.to_string_lossy().into_owned());

    let transformed_stem = match direction {
        Direction::SourceToTest => format!("{stem}{TEST_SUFFIX}"),
        Direction::TestToSource => match stem.strip_suffix(TEST_SUFFIX) {
            Some(base) if !base.is_empty() => base.to_string(),
            _ => {
                return Err(DiagnosticRecord::for_file(
                    DiagnosticKind::UnrecognizedTestFileNamePattern,
                    input,
                ))
            }
        },
    };

    Ok(match extension {
        Some(ext) => format!("{transformed_stem}.{ext}"),
        None => transformed_stem,
    })
}

/// Directory sub-path of `input` beneath `base`; empty when the file sits
/// directly at `base`.
fn relative_dir<'a>(input: &'a Path, base: &Path) -> &'a Path {
    input
        .parent()
        .and_then(|parent| parent.strip_prefix(base).ok())
        .unwrap_or_else(|| Path::new(""))
}

fn join_relative(root: PathBuf, relative: &Path, file_name: &str) -> PathBuf {
    let mut out = root;
    if !relative.as_os_str().is_empty() {
        out.push(relative);
    }
    out.push(file_name);
    out
}

impl<F: FilesystemCapability> PackagePaths<F> {
    /// Mirrored test path for `source_path`.
    pub async fn suggested_test_path_for(&self, source_path: &Path) -> MappingResult {
        self.transpose(source_path, Direction::SourceToTest).await
    }

    /// Inverse of [`suggested_test_path_for`](Self::suggested_test_path_for).
    pub async fn suggested_source_path_for(&self, test_path: &Path) -> MappingResult {
        self.transpose(test_path, Direction::TestToSource).await
    }

    async fn transpose(&self, input: &Path, direction: Direction) -> MappingResult {
        let classified = match direction {
            Direction::SourceToTest => self.is_source_file(input).await,
            Direction::TestToSource => self.is_test_file(input).await,
        };
        if !classified {
            return MappingResult::failure(
                input,
                DiagnosticRecord::for_file(direction.guard_diagnostic(), input),
            );
        }

        let file_name = match transform_file_name(input, direction) {
            Ok(name) => name,
            Err(record) => return MappingResult::failure(input, record),
        };

        // Levels 1-2: an owning declared target fixes the relative base and,
        // through its counterpart, the destination root. An explicit path
        // already dominates the computed directory, so both levels read the
        // same field.
        if let Some(owner) = self.owning_target(input, direction) {
            let relative = relative_dir(input, &owner.computed_path);
            return match self.counterpart_root(input, owner, direction).await {
                Ok(destination) => {
                    MappingResult::success(input, join_relative(destination, relative, &file_name))
                }
                Err(record) => MappingResult::failure(input, record),
            };
        }

        // Level 3: an inferred target name mirrors onto the suffix-linked
        // directory under the destination root.
        if let Some(inferred) = self
            .infer_from_conventions(input, direction.input_kind())
            .await
        {
            let base = inferred.base.join(&inferred.name);
            let relative = relative_dir(input, &base);
            let Some(destination_root) = self.available_root(direction.output_kind()).await else {
                return MappingResult::failure(
                    input,
                    DiagnosticRecord::for_file(direction.missing_destination_diagnostic(), input),
                );
            };
            let destination = destination_root.join(direction.counterpart_name(&inferred.name));
            return MappingResult::success(
                input,
                join_relative(destination, relative, &file_name),
            );
        }

        // Level 4: bare conventional roots on both sides. Level 5 is the
        // absence of either root.
        let Some(base) = self
            .containing_conventional_root(input, direction.input_kind())
            .await
        else {
            return MappingResult::failure(
                input,
                DiagnosticRecord::for_file(direction.missing_base_diagnostic(), input),
            );
        };
        let Some(destination_root) = self.available_root(direction.output_kind()).await else {
            return MappingResult::failure(
                input,
                DiagnosticRecord::for_file(direction.missing_destination_diagnostic(), input),
            );
        };
        let relative = relative_dir(input, &base);
        MappingResult::success(
            input,
            join_relative(destination_root.to_path_buf(), relative, &file_name),
        )
    }

    fn owning_target(&self, path: &Path, direction: Direction) -> Option<&ResolvedTarget> {
        self.targets()
            .iter()
            .find(|t| direction.owns_input(t.role()) && t.contains(path))
    }

    /// Destination root for a target-anchored transposition: the declared
    /// counterpart's computed directory when one exists with the mirrored
    /// role, else the suffix-linked directory under the conventional
    /// destination root.
    async fn counterpart_root(
        &self,
        input: &Path,
        owner: &ResolvedTarget,
        direction: Direction,
    ) -> Result<PathBuf, DiagnosticRecord> {
        let name = direction.counterpart_name(owner.name());
        if let Some(counterpart) = self.target_named(&name) {
            if direction.opposite().owns_input(counterpart.role()) {
                return Ok(counterpart.computed_path.clone());
            }
        }
        match self.available_root(direction.output_kind()).await {
            Some(root) => Ok(root.join(&name)),
            None => Err(DiagnosticRecord::for_file(
                direction.missing_destination_diagnostic(),
                input,
            )),
        }
    }

    /// First conventional root of `kind` that lexically contains `path`,
    /// preferring roots present on disk.
    async fn containing_conventional_root(&self, path: &Path, kind: RootKind) -> Option<PathBuf> {
        let mut fallback = None;
        for name in kind.search_paths() {
            let root = self.package_root().join(name);
            if !is_strict_descendant(&root, path) {
                continue;
            }
            if self.fs().is_directory(&root).await {
                return Some(root);
            }
            if fallback.is_none() {
                fallback = Some(root);
            }
        }
        fallback
    }
}
