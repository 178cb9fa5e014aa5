//! Builder pattern API and pass runner.
//!
//! Provides a fluent interface for configuring and running a check over a
//! directory of unit files:
//!
//! ```rust,ignore
//! use exhaustive_core::prelude::*;
//!
//! let result = Exhaustive::new("/path/to/units")
//!     .with_config(AnalysisConfig::default())
//!     .with_cache(true)
//!     .analyze()?;
//!
//! for d in &result.diagnostics {
//!     println!("{}", d);
//! }
//! ```

#[cfg(feature = "cache")]
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::analyzer::analyze_unit;
#[cfg(feature = "cache")]
use crate::cache::{self, CacheMetadata, FactCache};
use crate::catalog::build_catalog;
use crate::config::AnalysisConfig;
use crate::diagnostic::{sort_diagnostics, Diagnostic};
use crate::error::{ExhaustiveError, ExhaustiveResult};
use crate::facts::{FactRecord, FactStore};
use crate::graph::schedule_units;
use crate::scan::{gather_unit_files, load_units};
use crate::unit::{CompilationUnit, UnitId};

/// Builder for configuring a check.
#[derive(Debug, Clone)]
pub struct Exhaustive {
    /// Directory searched for unit files
    root: PathBuf,

    config: AnalysisConfig,

    /// Whether to read and write the fact cache
    use_cache: bool,

    /// Extra directory names to prune
    excluded_dirs: Vec<String>,
}

impl Exhaustive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: AnalysisConfig::default(),
            use_cache: true,
            excluded_dirs: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable the fact cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Add directories to exclude from scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run the check and return its results.
    pub fn analyze(&self) -> Result<AnalysisResult> {
        // 1. Gather and load unit files
        let excludes: Vec<&str> = self.excluded_dirs.iter().map(String::as_str).collect();
        let files = gather_unit_files(&self.root, &excludes).context("Failed to gather unit files")?;
        let loaded = load_units(&files);

        #[cfg(feature = "cache")]
        let sources: HashMap<UnitId, (PathBuf, String)> = loaded
            .units
            .iter()
            .map(|l| (l.unit.id.clone(), (l.path.clone(), l.hash.clone())))
            .collect();
        let units: Vec<CompilationUnit> = loaded.units.into_iter().map(|l| l.unit).collect();

        // 2. Seed facts of units outside this run
        let store = FactStore::new();
        #[cfg(feature = "cache")]
        let fact_cache = self.seed_from_cache(&store, &units);

        // 3. Run the pass
        let output = run_pass(&units, &store, &self.config).context("Failed to schedule units")?;

        // 4. Persist what this run published
        #[cfg(feature = "cache")]
        self.update_cache(fact_cache, &units, &sources, &output, &store);

        let mut failures: Vec<String> = loaded.failed.iter().map(ToString::to_string).collect();
        failures.extend(output.failed.iter().map(|(_, e)| e.to_string()));

        let result = AnalysisResult {
            root: self.root.clone(),
            units_total: files.len(),
            units_checked: output.units_checked,
            units_failed: failures.len(),
            enums_published: output.enums_published,
            diagnostics: output.diagnostics,
            failures,
            facts: store.records().iter().map(|r| (**r).clone()).collect(),
        };

        info!(
            root = %self.root.display(),
            units = result.units_total,
            checked = result.units_checked,
            failed = result.units_failed,
            enums = result.enums_published,
            diagnostics = result.diagnostics.len(),
            "analysis complete"
        );
        Ok(result)
    }

    #[cfg(feature = "cache")]
    fn seed_from_cache(&self, store: &FactStore, units: &[CompilationUnit]) -> Option<FactCache> {
        if !self.use_cache {
            return None;
        }
        let cache = cache::load_cache(&self.root).unwrap_or_default();
        let in_run: HashSet<&UnitId> = units.iter().map(|u| &u.id).collect();
        let seeded = cache.seed(&self.root, store, &in_run);
        debug!(seeded, "seeded facts from cache");
        Some(cache)
    }

    #[cfg(feature = "cache")]
    fn update_cache(
        &self,
        cache: Option<FactCache>,
        units: &[CompilationUnit],
        sources: &HashMap<UnitId, (PathBuf, String)>,
        output: &PassOutput,
        store: &FactStore,
    ) {
        let Some(mut cache) = cache else {
            return;
        };
        cache.metadata = CacheMetadata::current();
        for unit in units {
            if output.failed.iter().any(|(id, _)| id == &unit.id) {
                cache.units.remove(&unit.id);
                continue;
            }
            let enums: Vec<_> = store
                .records_of(&unit.id)
                .into_iter()
                .map(|r| r.definition)
                .collect();
            if let Some((path, hash)) = sources.get(&unit.id) {
                cache.record(&self.root, &unit.id, path, hash, enums);
            }
        }
        if let Err(e) = cache::save_cache(&self.root, &cache) {
            tracing::warn!(error = %e, "fact cache save failed");
        }
    }
}

/// Result of a check over a directory.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub root: PathBuf,

    /// Sorted by file, position and message
    pub diagnostics: Vec<Diagnostic>,

    /// Unit files found
    pub units_total: usize,

    /// Units whose constructs were analysed
    pub units_checked: usize,

    /// Unit files that failed to load, or units aborted during the pass
    pub units_failed: usize,

    /// Enums published by units of this run
    pub enums_published: usize,

    pub failures: Vec<String>,

    /// Every fact in the store after the run, including seeded ones
    pub facts: Vec<FactRecord>,
}

impl AnalysisResult {
    pub fn has_findings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// What one pass over a set of units produced.
#[derive(Debug, Default)]
pub struct PassOutput {
    pub diagnostics: Vec<Diagnostic>,
    pub units_checked: usize,
    pub enums_published: usize,
    /// Units aborted by a publish failure
    pub failed: Vec<(UnitId, ExhaustiveError)>,
}

enum UnitOutcome {
    Checked {
        published: usize,
        diagnostics: Vec<Diagnostic>,
    },
    PublishedOnly {
        published: usize,
    },
    Failed(UnitId, ExhaustiveError),
}

fn process_unit(unit: &CompilationUnit, store: &FactStore, config: &AnalysisConfig) -> UnitOutcome {
    let catalog = build_catalog(unit);
    let published = match store.publish_catalog(&unit.id, &catalog) {
        Ok(n) => n,
        Err(e) => {
            error!(unit = %unit.id, error = %e, "aborting unit");
            return UnitOutcome::Failed(unit.id.clone(), e);
        }
    };

    if unit.generated && !config.check_generated {
        debug!(unit = %unit.id, published, "generated unit published only");
        return UnitOutcome::PublishedOnly { published };
    }

    let diagnostics = analyze_unit(unit, &catalog, store, config);
    debug!(unit = %unit.id, published, findings = diagnostics.len(), "unit checked");
    UnitOutcome::Checked {
        published,
        diagnostics,
    }
}

/// Runs the pass over `units` in dependency waves.
///
/// Units of one wave run in parallel; every wave sees all facts published
/// by earlier waves. Fails when the units cannot be scheduled or the fact
/// store itself breaks; a unit whose enums collide with existing facts is
/// only recorded in [`PassOutput::failed`].
pub fn run_pass(
    units: &[CompilationUnit],
    store: &FactStore,
    config: &AnalysisConfig,
) -> ExhaustiveResult<PassOutput> {
    let waves = schedule_units(units)?;
    let mut output = PassOutput::default();

    for (i, wave) in waves.iter().enumerate() {
        debug!(wave = i, units = wave.len(), "running wave");
        let outcomes: Vec<UnitOutcome> = wave
            .par_iter()
            .map(|unit| process_unit(unit, store, config))
            .collect();

        for outcome in outcomes {
            match outcome {
                UnitOutcome::Checked {
                    published,
                    diagnostics,
                } => {
                    output.units_checked += 1;
                    output.enums_published += published;
                    output.diagnostics.extend(diagnostics);
                }
                UnitOutcome::PublishedOnly { published } => {
                    output.enums_published += published;
                }
                UnitOutcome::Failed(_, e) if !e.is_recoverable() => return Err(e),
                UnitOutcome::Failed(id, e) => output.failed.push((id, e)),
            }
        }
    }

    sort_diagnostics(&mut output.diagnostics);
    Ok(output)
}
