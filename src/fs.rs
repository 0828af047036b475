//! Filesystem capability boundary.
//!
//! The engine consumes the filesystem exclusively through
//! [`FilesystemCapability`]; it performs no direct OS calls anywhere else.
//! Host editors supply their own implementation over their workspace API.
//! [`HostFilesystem`] is the production implementation for standalone use,
//! backed by `tokio::fs` probes and an `ignore`-based walker for globbing.

use std::future::Future;
use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use thiserror::Error;
use tracing::trace;

use crate::diagnostics::DiagnosticKind;
use crate::error::{Result, TestMapError};

/// Read-only filesystem probes the engine is allowed to make.
///
/// All probes are fallible in the degenerate sense only: a path that cannot
/// be inspected reads as absent. `find_files` is the one operation that can
/// fail environmentally.
pub trait FilesystemCapability: Send + Sync {
    /// Does `path` exist and is it a directory?
    fn is_directory(&self, path: &Path) -> impl Future<Output = bool> + Send;

    /// Does `path` exist and is it a regular file?
    fn file_exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    /// All files matching `pattern`, minus those matching `exclude`, in a
    /// stable order. Patterns use glob syntax relative to the capability's
    /// base directory.
    fn find_files(
        &self,
        pattern: &str,
        exclude: Option<&str>,
    ) -> impl Future<Output = Result<Vec<PathBuf>>> + Send;
}

/// A search pattern the engine refuses to expand.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("search pattern `{0}` is not a valid glob")]
    Invalid(String),

    #[error("search pattern `{0}` contains characters that cannot occur in paths")]
    SpecialCharacters(String),
}

impl PatternError {
    /// Diagnostic kind this pattern problem surfaces as.
    pub fn diagnostic_kind(&self) -> DiagnosticKind {
        match self {
            PatternError::Invalid(_) => DiagnosticKind::IncorrectSearchPattern,
            PatternError::SpecialCharacters(_) => {
                DiagnosticKind::SpecialCharactersInSearchPattern
            }
        }
    }
}

/// Characters no walkable path can contain; a pattern carrying one can
/// never match and usually indicates text pasted from somewhere else.
const FORBIDDEN_PATTERN_CHARS: &[char] = &['<', '>', '"', '|', '\0'];

/// Validate a caller-supplied search pattern before expansion.
pub fn validate_search_pattern(pattern: &str) -> std::result::Result<(), PatternError> {
    if pattern
        .chars()
        .any(|c| FORBIDDEN_PATTERN_CHARS.contains(&c) || c.is_control())
    {
        return Err(PatternError::SpecialCharacters(pattern.to_string()));
    }
    let mut probe = OverrideBuilder::new("/");
    if probe.add(pattern).is_err() {
        return Err(PatternError::Invalid(pattern.to_string()));
    }
    Ok(())
}

/// Production [`FilesystemCapability`] backed by the local filesystem.
///
/// `find_files` patterns are interpreted relative to the base directory the
/// instance was created with, typically a package root.
#[derive(Debug, Clone)]
pub struct HostFilesystem {
    base: PathBuf,
}

impl HostFilesystem {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn walk(&self, pattern: &str, exclude: Option<&str>) -> Result<Vec<PathBuf>> {
        let search_error = |message: String| TestMapError::Search {
            path: self.base.clone(),
            message,
        };

        let mut overrides = OverrideBuilder::new(&self.base);
        overrides
            .add(pattern)
            .map_err(|e| search_error(e.to_string()))?;
        if let Some(exclude) = exclude {
            overrides
                .add(&format!("!{exclude}"))
                .map_err(|e| search_error(e.to_string()))?;
        }
        let overrides = overrides.build().map_err(|e| search_error(e.to_string()))?;

        let mut matches = Vec::new();
        let walker = WalkBuilder::new(&self.base)
            .overrides(overrides)
            .standard_filters(false)
            .build();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // Per-entry failures (permissions, broken links) read as
                    // absent files, not batch failures.
                    trace!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_some_and(|t| t.is_file()) {
                matches.push(entry.into_path());
            }
        }
        matches.sort();
        Ok(matches)
    }
}

impl FilesystemCapability for HostFilesystem {
    async fn is_directory(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn file_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn find_files(&self, pattern: &str, exclude: Option<&str>) -> Result<Vec<PathBuf>> {
        let fs = self.clone();
        let pattern = pattern.to_string();
        let exclude = exclude.map(str::to_string);
        tokio::task::spawn_blocking(move || fs.walk(&pattern, exclude.as_deref()))
            .await
            .map_err(|e| TestMapError::Search {
                path: self.base.clone(),
                message: e.to_string(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let full = root.join(relative);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, "").unwrap();
    }

    #[test]
    fn test_validate_accepts_ordinary_globs() {
        assert!(validate_search_pattern("Sources/**/*.swift").is_ok());
        assert!(validate_search_pattern("**/*Tests.swift").is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_globs() {
        let err = validate_search_pattern("Sources/[").unwrap_err();
        assert!(matches!(err, PatternError::Invalid(_)));
        assert_eq!(
            err.diagnostic_kind(),
            DiagnosticKind::IncorrectSearchPattern
        );
    }

    #[test]
    fn test_validate_rejects_impossible_characters() {
        let err = validate_search_pattern("Sources/<#Target#>/*.swift").unwrap_err();
        assert!(matches!(err, PatternError::SpecialCharacters(_)));
        assert_eq!(
            err.diagnostic_kind(),
            DiagnosticKind::SpecialCharactersInSearchPattern
        );
    }

    #[tokio::test]
    async fn test_is_directory_distinguishes_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Sources/A.swift");
        let fs = HostFilesystem::new(dir.path());
        assert!(fs.is_directory(&dir.path().join("Sources")).await);
        assert!(!fs.is_directory(&dir.path().join("Sources/A.swift")).await);
        assert!(!fs.is_directory(&dir.path().join("Missing")).await);
    }

    #[tokio::test]
    async fn test_file_exists_distinguishes_directories() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Sources/A.swift");
        let fs = HostFilesystem::new(dir.path());
        assert!(fs.file_exists(&dir.path().join("Sources/A.swift")).await);
        assert!(!fs.file_exists(&dir.path().join("Sources")).await);
    }

    #[tokio::test]
    async fn test_find_files_is_sorted_and_scoped() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Sources/Net/B.swift");
        touch(dir.path(), "Sources/Net/A.swift");
        touch(dir.path(), "Sources/Net/notes.md");
        touch(dir.path(), "Tests/NetTests/ATests.swift");

        let fs = HostFilesystem::new(dir.path());
        let found = fs.find_files("Sources/**/*.swift", None).await.unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Sources/Net/A.swift", "Sources/Net/B.swift"]);
    }

    #[tokio::test]
    async fn test_find_files_honors_exclude() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "Sources/A.swift");
        touch(dir.path(), "Sources/Generated/G.swift");

        let fs = HostFilesystem::new(dir.path());
        let found = fs
            .find_files("Sources/**/*.swift", Some("Sources/Generated/**"))
            .await
            .unwrap();
        assert_eq!(found, vec![dir.path().join("Sources/A.swift")]);
    }
}
