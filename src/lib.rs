//! testmap-engine: source/test path mapping for manifest-described packages
//!
//! This library deduces, for any file in a component-based package tree,
//! which declared target owns it and where its mirrored unit-test file
//! lives (and vice versa), even when the manifest omits explicit paths and
//! leaves layout to convention. Resolution failures are structured
//! diagnostics, never errors: one file's failure cannot abort a batch.
//!
//! # Resolution priority
//!
//! - explicit target path over conventional layout over inference
//! - conventional roots probed in declared priority order
//! - resolution is total: every target gets a directory, existing or not
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use testmap_engine::{parse_manifest, HostFilesystem, PackagePaths};
//!
//! let manifest = parse_manifest(&dump_bytes)?;
//! let fs = Arc::new(HostFilesystem::new("/path/to/pkg"));
//! let ctx = PackagePaths::resolve("/path/to/pkg", manifest, fs).await;
//!
//! let mapping = ctx.suggested_test_path_for(source_path).await;
//! match mapping.transformed_path {
//!     Some(test_path) => println!("{}", test_path.display()),
//!     None => eprintln!("{:?}", mapping.diagnostics),
//! }
//! ```

pub mod conventions;
pub mod diagnostics;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod mapper;
pub mod resolver;
pub mod scaffold;
pub mod session;

mod classify;
mod infer;

// Re-export commonly used types
pub use conventions::{RootKind, SOURCES_SEARCH_PATHS, TESTS_SEARCH_PATHS, TEST_SUFFIX};
pub use diagnostics::{dedupe_diagnostics, DiagnosticKind, DiagnosticRecord, MappingResult};
pub use error::{ManifestError, Result, TestMapError};
pub use fs::{FilesystemCapability, HostFilesystem, PatternError};
pub use manifest::{parse_manifest, Manifest, Target, TargetDependency, TargetRole};
pub use mapper::sanitize_identifier;
pub use resolver::{computed_path_for, PackagePaths, ResolvedTarget};
pub use scaffold::{
    suggest_test_files, suggest_test_files_matching, CancelFlag, SourceInput, SuggestedTestBatch,
    TestFileDescriptor, PLACEHOLDER_TARGET,
};
pub use session::{find_package_root, ManifestLoader, SessionCache, StaticManifests};
