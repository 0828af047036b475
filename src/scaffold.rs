//! Batch test-scaffold generation.
//!
//! The aggregate form of the path mapper: one suggested test file per input
//! source document, resolved concurrently against a shared session context,
//! with per-file failures collected as diagnostics instead of aborting the
//! batch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, DiagnosticRecord};
use crate::error::Result;
use crate::fs::{validate_search_pattern, FilesystemCapability};
use crate::mapper::sanitize_identifier;
use crate::resolver::PackagePaths;

/// Cooperative cancellation flag shared between a batch and its caller.
///
/// Checked between per-file units of work. Cancelled units issue no further
/// filesystem probes; results produced before the signal are returned as-is.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One input document for batch generation.
///
/// The editor layer supplies the text; the filesystem capability has no
/// read operation. Inputs without text still map, with no imports carried
/// over.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub path: PathBuf,
    pub text: Option<String>,
}

impl SourceInput {
    pub fn path_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            text: None,
        }
    }

    pub fn with_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: Some(text.into()),
        }
    }
}

/// A generated test-file suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFileDescriptor {
    /// File name of the suggested test file.
    pub name: String,
    /// Full destination path.
    pub path: PathBuf,
    /// Generated boilerplate contents.
    pub contents: String,
    /// The source file this suggestion mirrors.
    pub original_file: PathBuf,
    /// Whether the destination already exists on disk.
    pub exists_on_disk: bool,
    /// Module names the source file imports, order-preserving, duplicates
    /// surfaced as-is.
    pub suggested_imports: Vec<String>,
}

/// Result of one batch generation call.
#[derive(Debug, Clone, Default)]
pub struct SuggestedTestBatch {
    pub files: Vec<TestFileDescriptor>,
    pub diagnostics: Vec<DiagnosticRecord>,
}

/// Import token for the generated suite when no target name resolves.
pub const PLACEHOLDER_TARGET: &str = "<#Target#>";

const TEST_FRAMEWORK_IMPORT: &str = "import XCTest";

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:@testable\s+)?import\s+(?:(?:typealias|struct|class|enum|protocol|let|var|func)\s+)?([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("import pattern compiles")
});

/// Module names imported by `text`, in order of appearance.
pub fn scan_imports(text: &str) -> Vec<String> {
    IMPORT_RE
        .captures_iter(text)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Boilerplate for an empty suite: framework import, import of the unit
/// under test, empty suite declaration.
fn scaffold_contents(suite: &str, target: Option<&str>) -> String {
    let target = target.unwrap_or(PLACEHOLDER_TARGET);
    format!(
        "{TEST_FRAMEWORK_IMPORT}\n\n@testable import {target}\n\nfinal class {suite}: XCTestCase {{\n}}\n"
    )
}

enum PerFile {
    Descriptor(Box<TestFileDescriptor>),
    Diagnostics(Vec<DiagnosticRecord>),
}

async fn suggest_one<F: FilesystemCapability>(
    ctx: &PackagePaths<F>,
    input: &SourceInput,
) -> PerFile {
    // An input already on the tests side needs no scaffold; report it
    // informationally rather than as a sources-folder miss.
    if ctx.is_test_file(&input.path).await {
        return PerFile::Diagnostics(vec![DiagnosticRecord::for_file(
            DiagnosticKind::AlreadyInTestFile,
            &input.path,
        )]);
    }

    let mapping = ctx.suggested_test_path_for(&input.path).await;
    let Some(destination) = mapping.transformed_path else {
        return PerFile::Diagnostics(mapping.diagnostics);
    };

    let target_name = ctx.target_name_from_path(&input.path).await;
    let suite = destination
        .file_stem()
        .map(|stem| sanitize_identifier(&stem.to_string_lossy()))
        .unwrap_or_default();
    let contents = scaffold_contents(&suite, target_name.as_deref());
    let exists_on_disk = ctx.fs().file_exists(&destination).await;
    let suggested_imports = input
        .text
        .as_deref()
        .map(scan_imports)
        .unwrap_or_default();

    PerFile::Descriptor(Box::new(TestFileDescriptor {
        name: destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: destination,
        contents,
        original_file: input.path.clone(),
        exists_on_disk,
        suggested_imports,
    }))
}

/// Suggest one test file per input.
///
/// Inputs resolve concurrently against the shared context; descriptor order
/// follows input order regardless of completion order. Inputs that fail
/// classification contribute diagnostics instead of descriptors, and one
/// input's failure never blocks its siblings.
pub async fn suggest_test_files<F: FilesystemCapability>(
    ctx: &PackagePaths<F>,
    inputs: &[SourceInput],
    cancel: &CancelFlag,
) -> SuggestedTestBatch {
    let outcomes = join_all(inputs.iter().map(|input| async move {
        if cancel.is_cancelled() {
            return None;
        }
        Some(suggest_one(ctx, input).await)
    }))
    .await;

    let mut batch = SuggestedTestBatch::default();
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            PerFile::Descriptor(descriptor) => batch.files.push(*descriptor),
            PerFile::Diagnostics(records) => batch.diagnostics.extend(records),
        }
    }
    debug!(
        files = batch.files.len(),
        diagnostics = batch.diagnostics.len(),
        cancelled = cancel.is_cancelled(),
        "test suggestion batch finished"
    );
    batch
}

/// Expand `pattern` under the capability's base and suggest tests for every
/// match.
///
/// Pattern problems surface as diagnostics; only environmental failures of
/// the search itself are errors.
pub async fn suggest_test_files_matching<F: FilesystemCapability>(
    ctx: &PackagePaths<F>,
    pattern: &str,
    exclude: Option<&str>,
    cancel: &CancelFlag,
) -> Result<SuggestedTestBatch> {
    if let Err(problem) = validate_search_pattern(pattern) {
        return Ok(SuggestedTestBatch {
            files: Vec::new(),
            diagnostics: vec![DiagnosticRecord::new(
                problem.diagnostic_kind(),
                problem.to_string(),
            )],
        });
    }

    let found = ctx.fs().find_files(pattern, exclude).await?;
    let inputs: Vec<SourceInput> = found.into_iter().map(SourceInput::path_only).collect();
    Ok(suggest_test_files(ctx, &inputs, cancel).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_imports_preserves_order_and_duplicates() {
        let text = "import Foundation\nimport NetKit\nimport Foundation\n";
        assert_eq!(scan_imports(text), vec!["Foundation", "NetKit", "Foundation"]);
    }

    #[test]
    fn test_scan_imports_handles_testable_and_scoped_forms() {
        let text = "@testable import NetKit\nimport struct Geometry.Size\n";
        assert_eq!(scan_imports(text), vec!["NetKit", "Geometry"]);
    }

    #[test]
    fn test_scan_imports_ignores_mid_line_mentions() {
        let text = "// import Nothing is discussed here\nlet s = \"import Fake\"\nimport Real\n";
        assert_eq!(scan_imports(text), vec!["Real"]);
    }

    #[test]
    fn test_scaffold_contents_with_target() {
        let contents = scaffold_contents("ATests", Some("NetKit"));
        assert!(contents.starts_with("import XCTest\n"));
        assert!(contents.contains("@testable import NetKit"));
        assert!(contents.contains("final class ATests: XCTestCase {"));
    }

    #[test]
    fn test_scaffold_contents_placeholder_when_unresolved() {
        let contents = scaffold_contents("CTests", None);
        assert!(contents.contains("@testable import <#Target#>"));
    }

    #[test]
    fn test_cancel_flag_round_trip() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        let observer = flag.clone();
        flag.cancel();
        assert!(observer.is_cancelled());
    }
}
