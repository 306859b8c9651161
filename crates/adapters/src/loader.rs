// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark discovery.
//!
//! The [`Loader`] walks a directory tree, derives a logical module name for
//! every suite file (`*.semtest.toml` or `*.semtest.json`), rejects name
//! collisions for the whole batch, then imports each unit in traversal order
//! and registers its benchmarks.
//! Any failure aborts the pass; no partial registry is returned.

use crate::resolver::{module_name, UnitResolver};
use crate::responder::build_responder;
use crate::suite::{ResponderRef, ResponderSpec, SuiteFormat, SuiteUnit};
use semtest_benchmarks::{BenchmarkRegistry, BoundBenchmark, EntryPointSource};
use semtest_core::comparator::{comparator_by_name, Comparator, DEFAULT_COMPARATOR};
use semtest_core::{BenchmarkDefinition, DiscoveryError, EmbeddingProvider, Error, Result, Settings};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// A suite file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredUnit {
    /// Dotted module name.
    pub module: String,
    /// File path.
    pub path: PathBuf,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// List suite files under `root` in deterministic order.
///
/// Hidden entries and anything under `exclude` are skipped. Fails with
/// [`DiscoveryError::DuplicateModuleName`] before returning if two files
/// share a module name.
pub fn discover_units(root: &Path, exclude: &[PathBuf]) -> Result<Vec<DiscoveredUnit>> {
    let exclude: Vec<PathBuf> = exclude.iter().filter_map(|p| p.canonicalize().ok()).collect();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !is_hidden(entry)
                && !(entry.file_type().is_dir()
                    && entry
                        .path()
                        .canonicalize()
                        .is_ok_and(|path| exclude.contains(&path)))
        });

    let mut units = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() || SuiteFormat::from_path(entry.path()).is_none() {
            continue;
        }
        let Some(module) = module_name(root, entry.path()) else {
            continue;
        };

        if let Some(first) = seen.get(&module) {
            return Err(DiscoveryError::DuplicateModuleName {
                name: module,
                first: first.clone(),
                second: entry.into_path(),
            }
            .into());
        }
        debug!(module = %module, path = %entry.path().display(), "found suite unit");
        seen.insert(module.clone(), entry.path().to_path_buf());
        units.push(DiscoveredUnit {
            module,
            path: entry.into_path(),
        });
    }
    Ok(units)
}

fn import_error(module: &str, reason: impl ToString) -> DiscoveryError {
    DiscoveryError::Import {
        module: module.to_string(),
        reason: reason.to_string(),
    }
}

/// Parsed units, each read at most once per pass.
#[derive(Debug, Default)]
struct UnitCache {
    units: HashMap<String, Rc<SuiteUnit>>,
}

impl UnitCache {
    fn get(&self, module: &str) -> Option<Rc<SuiteUnit>> {
        self.units.get(module).cloned()
    }

    fn load(&mut self, module: &str, path: &Path) -> std::result::Result<Rc<SuiteUnit>, DiscoveryError> {
        if let Some(unit) = self.get(module) {
            debug!(module, "unit cache hit");
            return Ok(unit);
        }
        let format = SuiteFormat::from_path(path)
            .ok_or_else(|| import_error(module, format!("unsupported file {}", path.display())))?;
        let contents = fs::read_to_string(path).map_err(|e| import_error(module, e))?;
        let unit = Rc::new(SuiteUnit::parse(&contents, format).map_err(|e| import_error(module, e))?);
        self.units.insert(module.to_string(), Rc::clone(&unit));
        Ok(unit)
    }
}

/// State of one discovery pass.
struct Importer<'a> {
    resolver: &'a UnitResolver,
    settings: &'a Settings,
    embedding_provider: &'a Arc<dyn EmbeddingProvider>,
    cache: UnitCache,
    comparators: HashMap<String, Arc<dyn Comparator>>,
}

impl Importer<'_> {
    fn resolve_module(&mut self, module: &str, from: &str) -> std::result::Result<Rc<SuiteUnit>, DiscoveryError> {
        if let Some(unit) = self.cache.get(module) {
            return Ok(unit);
        }
        let path = self
            .resolver
            .resolve(module)
            .ok_or_else(|| DiscoveryError::UnresolvedModule {
                module: module.to_string(),
                from: from.to_string(),
            })?;
        self.cache.load(module, &path)
    }

    fn responder_spec(
        &mut self,
        unit: &SuiteUnit,
        module: &str,
        reference: &ResponderRef,
    ) -> std::result::Result<ResponderSpec, DiscoveryError> {
        let name = match reference {
            ResponderRef::Inline(spec) => return Ok(spec.clone()),
            ResponderRef::Named(name) => name,
        };

        let unknown = |binding: &str, module: &str| DiscoveryError::UnknownResponder {
            name: binding.to_string(),
            module: module.to_string(),
        };
        match ResponderRef::split(name) {
            (Some(target), binding) if target != module => {
                let other = self.resolve_module(target, module)?;
                let spec = other.responders.get(binding).cloned();
                spec.ok_or_else(|| unknown(binding, target))
            }
            (_, binding) => unit
                .responders
                .get(binding)
                .cloned()
                .ok_or_else(|| unknown(binding, module)),
        }
    }

    fn comparator(&mut self, name: Option<&str>) -> std::result::Result<Arc<dyn Comparator>, DiscoveryError> {
        let name = name.unwrap_or(DEFAULT_COMPARATOR);
        if let Some(comparator) = self.comparators.get(name) {
            return Ok(Arc::clone(comparator));
        }
        let comparator =
            comparator_by_name(name).ok_or_else(|| DiscoveryError::UnknownComparator(name.to_string()))?;
        self.comparators.insert(name.to_string(), Arc::clone(&comparator));
        Ok(comparator)
    }

    /// Import `unit` and register its benchmarks, returning how many.
    fn import(&mut self, unit: &DiscoveredUnit, registry: &mut BenchmarkRegistry) -> Result<usize> {
        let module = unit.module.as_str();
        let suite = self.cache.load(module, &unit.path)?;

        let mut bindings = HashSet::new();
        for (index, spec) in suite.benchmarks.iter().enumerate() {
            let binding = spec.name.clone().unwrap_or_else(|| format!("bench_{index}"));
            if !bindings.insert(binding.clone()) {
                return Err(DiscoveryError::DuplicateBenchmarkName {
                    name: binding,
                    module: module.to_string(),
                }
                .into());
            }
            let responder_spec = self.responder_spec(&suite, module, &spec.responder)?;
            let responder = build_responder(&responder_spec, self.settings).map_err(|e| import_error(module, e))?;
            let comparator = self.comparator(spec.comparator.as_deref())?;

            let definition = BenchmarkDefinition::builder()
                .name(format!("{module}.{binding}"))
                .boxed_responder(responder)
                .expectation(spec.expectation.as_str())
                .iterations(spec.iterations)
                .comparator(comparator)
                .embedding_provider(Arc::clone(self.embedding_provider))
                .build()
                .map_err(|e| match e {
                    Error::Embedding(_) => e,
                    other => import_error(module, other).into(),
                })?;

            registry.register(BoundBenchmark::with_args(definition, spec.args.clone()));
        }

        info!(module, path = %unit.path.display(), benchmarks = suite.benchmarks.len(), "imported suite unit");
        Ok(suite.benchmarks.len())
    }
}

/// Discovers suite units under a root directory and builds their benchmarks.
pub struct Loader {
    root: PathBuf,
    settings: Settings,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    resolver: UnitResolver,
    exclude: Vec<PathBuf>,
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("root", &self.root)
            .field("resolver", &self.resolver)
            .field("exclude", &self.exclude)
            .finish_non_exhaustive()
    }
}

impl Loader {
    /// Loader for `root`, embedding with `embedding_provider`.
    pub fn new(root: impl Into<PathBuf>, settings: Settings, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            root: root.into(),
            settings,
            embedding_provider,
            resolver: UnitResolver::new(),
            exclude: Vec::new(),
        }
    }

    /// Also resolve qualified references against `path`.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolver = self.resolver.with_search_path(path);
        self
    }

    /// Skip the directory `path` during the walk.
    pub fn with_exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude.push(path.into());
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Search paths outside any discovery pass.
    pub fn resolver(&self) -> &UnitResolver {
        &self.resolver
    }

    /// Discover and import every unit, returning their benchmarks in
    /// traversal order.
    pub fn load(&mut self) -> Result<BenchmarkRegistry> {
        if !self.root.is_dir() {
            return Err(DiscoveryError::InvalidDirectory(self.root.clone()).into());
        }

        let units = discover_units(&self.root, &self.exclude)?;
        info!(root = %self.root.display(), units = units.len(), "discovered suite units");

        let scope = self.resolver.scoped(self.root.as_path());
        let mut importer = Importer {
            resolver: &scope,
            settings: &self.settings,
            embedding_provider: &self.embedding_provider,
            cache: UnitCache::default(),
            comparators: HashMap::new(),
        };

        let mut registry = BenchmarkRegistry::new();
        for unit in &units {
            importer.import(unit, &mut registry)?;
        }
        Ok(registry)
    }
}

impl EntryPointSource for Loader {
    fn load(&mut self) -> Result<BenchmarkRegistry> {
        Loader::load(self)
    }
}
