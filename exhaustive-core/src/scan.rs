//! Discovery and loading of `*.unit.json` files.
//!
//! Performance optimizations:
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel filtering via Rayon's `par_bridge`
//! - Read-once loading: each file is read once, then hashed and decoded

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{ExhaustiveError, ExhaustiveResult, IoResultExt};
use crate::unit::CompilationUnit;

/// Suffix of files holding one resolved compilation unit.
pub const UNIT_SUFFIX: &str = ".unit.json";

/// Directories never searched for unit files.
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", ".exhaustive"];

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn is_unit_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(UNIT_SUFFIX))
}

/// Gathers every unit file below `root`, sorted by path.
///
/// `target/`, `.git/`, `node_modules/` and `.exhaustive/` are always pruned;
/// `extra_excludes` adds more directory names.
pub fn gather_unit_files(root: &Path, extra_excludes: &[&str]) -> Result<Vec<PathBuf>> {
    let excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(extra_excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) if is_unit_file(e.path()) => Some(Ok(e.into_path())),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather unit files from {}", root.display()))?;

    files.sort();
    Ok(files)
}

/// SHA-256 of `bytes` as lowercase hex.
#[inline]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut sha = Sha256::new();
    sha.update(bytes);
    format!("{:x}", sha.finalize())
}

/// A decoded unit together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedUnit {
    pub path: PathBuf,
    /// SHA-256 of the file content
    pub hash: String,
    pub unit: CompilationUnit,
}

/// Reads, hashes and decodes one unit file.
///
/// A unit without a `file` falls back to the path of its JSON file so
/// diagnostics always carry a location.
pub fn load_unit(path: &Path) -> ExhaustiveResult<LoadedUnit> {
    let content = fs::read_to_string(path).with_path(path)?;
    let hash = hash_bytes(content.as_bytes());
    let mut unit = CompilationUnit::from_json(&content)
        .map_err(|e| ExhaustiveError::parse(path, e.to_string()))?;
    if unit.file.is_empty() {
        unit.file = path.display().to_string();
    }
    Ok(LoadedUnit {
        path: path.to_path_buf(),
        hash,
        unit,
    })
}

/// Units that loaded, and the files that did not.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub units: Vec<LoadedUnit>,
    pub failed: Vec<ExhaustiveError>,
}

/// Loads unit files in parallel. Failures are logged and collected, never fatal.
pub fn load_units(files: &[PathBuf]) -> LoadOutcome {
    let results: Vec<ExhaustiveResult<LoadedUnit>> =
        files.par_iter().map(|f| load_unit(f)).collect();

    let mut outcome = LoadOutcome::default();
    for result in results {
        match result {
            Ok(loaded) => outcome.units.push(loaded),
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "skipping unit file");
                outcome.failed.push(e);
            }
        }
    }
    outcome
}
