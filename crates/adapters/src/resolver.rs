// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Module name resolution.
//!
//! A [`UnitResolver`] maps a dotted module name such as
//! `nested_dir.helpers` onto a suite file, searching its roots most
//! recent first. Discovery pushes the benchmark directory for the
//! duration of one pass through a [`ResolverScope`]; the entry is removed
//! when the scope drops, on success and on error alike.

use crate::suite::{suite_stem, SUITE_SUFFIXES};
use std::ops::{Deref, DerefMut};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Ordered set of directories module names are resolved against.
#[derive(Debug, Clone, Default)]
pub struct UnitResolver {
    search_paths: Vec<PathBuf>,
}

impl UnitResolver {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a permanent search path with the lowest precedence so far.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.insert(0, path.into());
        self
    }

    /// Current search paths, highest precedence last.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Push `root` with the highest precedence until the returned scope drops.
    pub fn scoped(&mut self, root: impl Into<PathBuf>) -> ResolverScope<'_> {
        let depth = self.search_paths.len();
        let root = root.into();
        debug!(root = %root.display(), "entering resolution scope");
        self.search_paths.push(root);
        ResolverScope {
            resolver: self,
            depth,
        }
    }

    /// Locate the suite file for `module`.
    pub fn resolve(&self, module: &str) -> Option<PathBuf> {
        let relative = module_path(module)?;
        self.search_paths.iter().rev().find_map(|root| {
            SUITE_SUFFIXES
                .iter()
                .map(|suffix| {
                    let mut file = root.join(&relative).into_os_string();
                    file.push(suffix);
                    PathBuf::from(file)
                })
                .find(|candidate| candidate.is_file())
        })
    }
}

/// Relative path for a dotted module name, or `None` if it is malformed.
fn module_path(module: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for part in module.split('.') {
        if part.is_empty()
            || part.contains(['/', '\\'])
            || !matches!(Path::new(part).components().next(), Some(Component::Normal(_)))
        {
            return None;
        }
        path.push(part);
    }
    Some(path)
}

/// Derive the module name of `path` relative to `root`.
///
/// The suite suffix is stripped and path separators become `.`, so
/// `root/nested_dir/testy.semtest.toml` is `nested_dir.testy`. Returns
/// `None` for files outside `root` or without a suite suffix.
pub fn module_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let stem = suite_stem(relative)?;
    let mut parts: Vec<&str> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    parts.push(stem);
    Some(parts.join("."))
}

/// Guard holding a pushed search path.
#[derive(Debug)]
pub struct ResolverScope<'a> {
    resolver: &'a mut UnitResolver,
    depth: usize,
}

impl Deref for ResolverScope<'_> {
    type Target = UnitResolver;

    fn deref(&self) -> &UnitResolver {
        self.resolver
    }
}

impl DerefMut for ResolverScope<'_> {
    fn deref_mut(&mut self) -> &mut UnitResolver {
        self.resolver
    }
}

impl Drop for ResolverScope<'_> {
    fn drop(&mut self) {
        self.resolver.search_paths.truncate(self.depth);
        debug!(depth = self.depth, "left resolution scope");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_module_name() {
        let root = Path::new("/suite");
        assert_eq!(
            module_name(root, Path::new("/suite/mock_test.semtest.toml")).as_deref(),
            Some("mock_test")
        );
        assert_eq!(
            module_name(root, Path::new("/suite/nested_dir/testy.semtest.json")).as_deref(),
            Some("nested_dir.testy")
        );
        assert_eq!(module_name(root, Path::new("/elsewhere/x.semtest.toml")), None);
        assert_eq!(module_name(root, Path::new("/suite/Cargo.toml")), None);
    }

    #[test]
    fn test_module_names_can_collide() {
        let root = Path::new("/suite");
        assert_eq!(
            module_name(root, Path::new("/suite/a/b.semtest.toml")),
            module_name(root, Path::new("/suite/a.b.semtest.toml"))
        );
    }

    #[test]
    fn test_scope_pops_on_drop() {
        let mut resolver = UnitResolver::new().with_search_path("/base");
        {
            let scope = resolver.scoped("/suite");
            assert_eq!(scope.search_paths().len(), 2);
        }
        assert_eq!(resolver.search_paths(), &[PathBuf::from("/base")]);
    }

    #[test]
    fn test_scope_pops_on_early_return() {
        fn failing(resolver: &mut UnitResolver) -> Result<(), String> {
            let _scope = resolver.scoped("/suite");
            Err("import failed".into())
        }

        let mut resolver = UnitResolver::new();
        assert!(failing(&mut resolver).is_err());
        assert!(resolver.search_paths().is_empty());
    }

    #[test]
    fn test_resolve_prefers_innermost_scope() {
        let base = tempfile::tempdir().unwrap();
        let suite = tempfile::tempdir().unwrap();
        fs::write(base.path().join("helpers.semtest.toml"), "").unwrap();
        fs::create_dir(suite.path().join("nested_dir")).unwrap();
        fs::write(suite.path().join("helpers.semtest.json"), "{}").unwrap();
        fs::write(suite.path().join("nested_dir/testy.semtest.toml"), "").unwrap();
        fs::write(suite.path().join("plain.toml"), "").unwrap();

        let mut resolver = UnitResolver::new().with_search_path(base.path());
        assert_eq!(resolver.resolve("helpers"), Some(base.path().join("helpers.semtest.toml")));

        let scope = resolver.scoped(suite.path());
        assert_eq!(scope.resolve("helpers"), Some(suite.path().join("helpers.semtest.json")));
        assert_eq!(
            scope.resolve("nested_dir.testy"),
            Some(suite.path().join("nested_dir/testy.semtest.toml"))
        );
        assert_eq!(scope.resolve("plain"), None);
        assert_eq!(scope.resolve("missing"), None);
    }

    #[test]
    fn test_malformed_module_names() {
        assert!(module_path("a..b").is_none());
        assert!(module_path("").is_none());
        assert_eq!(module_path("a.b"), Some(PathBuf::from("a/b")));
    }
}
