//! Conventional directory layout tables.
//!
//! When the manifest omits explicit path information, resolution probes
//! these directory names in declared priority order. The head entry is the
//! primary convention; the remaining entries are legacy aliases still found
//! in older package trees.

/// Conventional sources roots, highest priority first.
pub const SOURCES_SEARCH_PATHS: &[&str] = &["Sources", "Source", "src", "srcs"];

/// Conventional tests roots, highest priority first.
pub const TESTS_SEARCH_PATHS: &[&str] = &["Tests", "Test"];

/// Manifest file name marking a package root.
pub const MANIFEST_FILE: &str = "Package.swift";

/// Suffix linking a test target (and a test file stem) to the unit under
/// test: target `Foo` pairs with `FooTests`, file `A.swift` with
/// `ATests.swift`.
pub const TEST_SUFFIX: &str = "Tests";

/// The two sides of the source/test mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Sources,
    Tests,
}

impl RootKind {
    /// Convention list for this side, highest priority first.
    pub fn search_paths(self) -> &'static [&'static str] {
        match self {
            RootKind::Sources => SOURCES_SEARCH_PATHS,
            RootKind::Tests => TESTS_SEARCH_PATHS,
        }
    }

    /// The mirrored side.
    pub fn opposite(self) -> RootKind {
        match self {
            RootKind::Sources => RootKind::Tests,
            RootKind::Tests => RootKind::Sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_heads_are_primary_conventions() {
        assert_eq!(RootKind::Sources.search_paths()[0], "Sources");
        assert_eq!(RootKind::Tests.search_paths()[0], "Tests");
    }

    #[test]
    fn test_opposite_is_an_involution() {
        assert_eq!(RootKind::Sources.opposite(), RootKind::Tests);
        assert_eq!(RootKind::Tests.opposite().opposite(), RootKind::Tests);
    }
}
