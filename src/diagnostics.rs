//! Structured resolution diagnostics.
//!
//! Every resolution failure is reported as data threaded through the
//! operation's return value, never as an error that unwinds a batch. The
//! presentation layer owns rendering, aggregation and user notification;
//! this module only defines the records and the dedup helper it consumes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Closed enumeration of resolution failure classes.
///
/// The presentation layer matches on these exhaustively; adding a variant
/// is a breaking change by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    FileNotInSourcesFolder,
    FileNotInTestsFolder,
    UnrecognizedTestFileNamePattern,
    PackageManifestNotFound,
    SourcesFolderNotFound,
    TestsFolderNotFound,
    IncorrectSearchPattern,
    SpecialCharactersInSearchPattern,
    AlreadyInTestFile,
}

impl DiagnosticKind {
    /// Whether a diagnostic of this kind blocks path transposition.
    ///
    /// `AlreadyInTestFile` is informational: the input needs no mapping at
    /// all, which is not a failure.
    pub fn is_blocking(self) -> bool {
        !matches!(self, DiagnosticKind::AlreadyInTestFile)
    }
}

/// A single, immutable failure record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticRecord {
    pub message: String,
    pub kind: DiagnosticKind,
    pub source_file: Option<PathBuf>,
}

impl DiagnosticRecord {
    /// Record with a caller-supplied message and no file attribution.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            source_file: None,
        }
    }

    /// Record with the canonical message for `kind`, citing `file`.
    pub fn for_file(kind: DiagnosticKind, file: &Path) -> Self {
        let shown = file.display();
        let message = match kind {
            DiagnosticKind::FileNotInSourcesFolder => {
                format!("File {shown} is not inside any recognized sources directory")
            }
            DiagnosticKind::FileNotInTestsFolder => {
                format!("File {shown} is not inside any recognized tests directory")
            }
            DiagnosticKind::UnrecognizedTestFileNamePattern => {
                format!("Test file name {shown} does not follow the <Name>Tests pattern")
            }
            DiagnosticKind::PackageManifestNotFound => {
                format!("No package manifest found for {shown}")
            }
            DiagnosticKind::SourcesFolderNotFound => {
                format!("No sources directory could be resolved for {shown}")
            }
            DiagnosticKind::TestsFolderNotFound => {
                format!("No tests directory could be resolved for {shown}")
            }
            DiagnosticKind::IncorrectSearchPattern => {
                format!("Search pattern {shown} is not a valid glob")
            }
            DiagnosticKind::SpecialCharactersInSearchPattern => {
                format!("Search pattern {shown} contains unsupported characters")
            }
            DiagnosticKind::AlreadyInTestFile => {
                format!("File {shown} is already a test file")
            }
        };
        Self {
            message,
            kind,
            source_file: Some(file.to_path_buf()),
        }
    }
}

/// Outcome of one source/test path transposition.
///
/// Invariant: `transformed_path` is `None` iff at least one blocking
/// diagnostic is present. A diagnostic never accompanies a `Some` path
/// unless it is informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingResult {
    pub original_path: PathBuf,
    pub transformed_path: Option<PathBuf>,
    pub diagnostics: Vec<DiagnosticRecord>,
}

impl MappingResult {
    /// Successful transposition with no diagnostics.
    pub fn success(original: &Path, transformed: PathBuf) -> Self {
        Self {
            original_path: original.to_path_buf(),
            transformed_path: Some(transformed),
            diagnostics: Vec::new(),
        }
    }

    /// Blocked transposition explained by `diagnostic`.
    pub fn failure(original: &Path, diagnostic: DiagnosticRecord) -> Self {
        debug_assert!(diagnostic.kind.is_blocking());
        Self {
            original_path: original.to_path_buf(),
            transformed_path: None,
            diagnostics: vec![diagnostic],
        }
    }

    /// Whether a blocking diagnostic is present.
    pub fn is_blocked(&self) -> bool {
        self.diagnostics.iter().any(|d| d.kind.is_blocking())
    }
}

/// Drop exact repeats of earlier records, preserving first-occurrence
/// order. An aggregate call may legitimately describe one file several
/// times; the presentation layer only wants each story once.
pub fn dedupe_diagnostics(records: &[DiagnosticRecord]) -> Vec<DiagnosticRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert((*record).clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_already_in_test_file_is_informational() {
        let blocking = [
            DiagnosticKind::FileNotInSourcesFolder,
            DiagnosticKind::FileNotInTestsFolder,
            DiagnosticKind::UnrecognizedTestFileNamePattern,
            DiagnosticKind::PackageManifestNotFound,
            DiagnosticKind::SourcesFolderNotFound,
            DiagnosticKind::TestsFolderNotFound,
            DiagnosticKind::IncorrectSearchPattern,
            DiagnosticKind::SpecialCharactersInSearchPattern,
        ];
        for kind in blocking {
            assert!(kind.is_blocking(), "{kind:?} should block");
        }
        assert!(!DiagnosticKind::AlreadyInTestFile.is_blocking());
    }

    #[test]
    fn test_failure_upholds_the_null_iff_blocking_invariant() {
        let record = DiagnosticRecord::for_file(
            DiagnosticKind::FileNotInSourcesFolder,
            Path::new("/pkg/README.md"),
        );
        let result = MappingResult::failure(Path::new("/pkg/README.md"), record);
        assert!(result.transformed_path.is_none());
        assert!(result.is_blocked());
    }

    #[test]
    fn test_success_carries_no_diagnostics() {
        let result = MappingResult::success(
            Path::new("/pkg/Sources/A.swift"),
            PathBuf::from("/pkg/Tests/ATests.swift"),
        );
        assert!(result.transformed_path.is_some());
        assert!(!result.is_blocked());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_dedupe_preserves_first_occurrence_order() {
        let a = DiagnosticRecord::for_file(
            DiagnosticKind::FileNotInSourcesFolder,
            Path::new("/pkg/a.swift"),
        );
        let b = DiagnosticRecord::for_file(
            DiagnosticKind::TestsFolderNotFound,
            Path::new("/pkg/b.swift"),
        );
        let deduped = dedupe_diagnostics(&[a.clone(), b.clone(), a.clone()]);
        assert_eq!(deduped, vec![a, b]);
    }
}
