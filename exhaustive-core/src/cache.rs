//! Persistent enum fact cache in `.exhaustive/facts.json`.
//!
//! Each entry stores the path and SHA-256 of a unit file together with the
//! enums that unit published. When only part of a project is analysed, the
//! cached facts of units outside the run are seeded into the [`FactStore`] so
//! imports of those units still resolve. An entry whose file still exists but
//! no longer hashes the same is stale and is not seeded.
//!
//! # Cache Versioning
//!
//! The cache carries version metadata and is discarded when:
//! - the cache format version differs
//! - the major tool version differs
//! - the file cannot be decoded

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::EnumDefinition;
use crate::error::{ExhaustiveError, ExhaustiveResult, IoResultExt};
use crate::facts::FactStore;
use crate::scan::hash_bytes;
use crate::unit::UnitId;

/// Maximum cache file size (50MB)
const MAX_CACHE_SIZE_BYTES: usize = 50_000_000;

/// Current cache format version. Increment when the format changes.
const CACHE_VERSION: u32 = 2;

const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cache location relative to the analysed root.
pub const CACHE_DIR: &str = ".exhaustive";
pub const CACHE_FILE: &str = "facts.json";

/// Cache metadata for version checking.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CacheMetadata {
    pub cache_version: u32,
    /// Tool version that wrote the cache
    pub tool_version: String,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: String,
}

impl CacheMetadata {
    pub fn current() -> Self {
        Self {
            cache_version: CACHE_VERSION,
            tool_version: TOOL_VERSION.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_compatible(&self) -> bool {
        if self.cache_version != CACHE_VERSION {
            return false;
        }
        let current_major = TOOL_VERSION.split('.').next().unwrap_or("0");
        let cached_major = self.tool_version.split('.').next().unwrap_or("0");
        current_major == cached_major
    }
}

/// Cached facts of one unit.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CachedUnit {
    /// Unit file, relative to the analysed root
    pub path: PathBuf,
    /// SHA-256 of the unit file the facts were taken from
    pub hash: String,
    pub enums: Vec<EnumDefinition>,
}

/// The whole cache file.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FactCache {
    #[serde(default)]
    pub metadata: CacheMetadata,
    pub units: BTreeMap<UnitId, CachedUnit>,
}

impl FactCache {
    pub fn new() -> Self {
        Self {
            metadata: CacheMetadata::current(),
            units: BTreeMap::new(),
        }
    }

    /// Seeds `store` with the facts of every cached unit not in `skip`.
    ///
    /// Returns the number of enums seeded. A cached enum that is already in
    /// the store is left alone, and so is every enum of a stale entry.
    pub fn seed(&self, root: &Path, store: &FactStore, skip: &HashSet<&UnitId>) -> usize {
        let mut seeded = 0;
        for (unit, cached) in &self.units {
            if skip.contains(unit) {
                continue;
            }
            if cached.is_stale(root) {
                warn!(
                    unit = %unit,
                    path = %cached.path.display(),
                    "unit file changed since cached, facts not seeded"
                );
                continue;
            }
            for def in &cached.enums {
                match store.publish(unit, def.clone()) {
                    Ok(()) => seeded += 1,
                    Err(e) => warn!(unit = %unit, error = %e, "cached fact not seeded"),
                }
            }
        }
        seeded
    }

    /// Records what `unit`, read from `path` below `root`, published in this run.
    pub fn record(
        &mut self,
        root: &Path,
        unit: &UnitId,
        path: &Path,
        hash: &str,
        enums: Vec<EnumDefinition>,
    ) {
        let path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        self.units.insert(
            unit.clone(),
            CachedUnit {
                path,
                hash: hash.to_string(),
                enums,
            },
        );
    }
}

impl CachedUnit {
    /// True when the unit file still exists below `root` with other content.
    ///
    /// A missing or unreadable file is not stale: the cached facts are the
    /// only ones left for that unit.
    pub fn is_stale(&self, root: &Path) -> bool {
        match fs::read(root.join(&self.path)) {
            Ok(bytes) => hash_bytes(&bytes) != self.hash,
            Err(_) => false,
        }
    }
}

/// Loads the cache of `root`.
///
/// Returns `None` when the file is missing, corrupt or incompatible.
pub fn load_cache(root: &Path) -> Option<FactCache> {
    let path = root.join(CACHE_DIR).join(CACHE_FILE);
    if !path.exists() {
        return None;
    }

    let text = fs::read_to_string(&path).ok()?;
    let cache: FactCache = match serde_json::from_str(&text) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding corrupt fact cache");
            let _ = fs::remove_file(&path);
            return None;
        }
    };

    if !cache.metadata.is_compatible() {
        info!(
            cached_version = cache.metadata.cache_version,
            cached_tool = %cache.metadata.tool_version,
            "fact cache version mismatch, rebuilding"
        );
        let _ = fs::remove_file(&path);
        return None;
    }

    Some(cache)
}

/// Writes the cache atomically (temp file + rename).
///
/// A cache over the size limit is dropped instead of written.
pub fn save_cache(root: &Path, cache: &FactCache) -> ExhaustiveResult<()> {
    let dir = root.join(CACHE_DIR);
    fs::create_dir_all(&dir).with_path(&dir)?;

    let path = dir.join(CACHE_FILE);
    let json = serde_json::to_string_pretty(cache)
        .map_err(|e| ExhaustiveError::cache(format!("serialize failed: {}", e)))?;

    if json.len() > MAX_CACHE_SIZE_BYTES {
        warn!(
            limit_mb = MAX_CACHE_SIZE_BYTES / 1_000_000,
            "fact cache exceeds size limit, clearing"
        );
        let _ = fs::remove_file(&path);
        return Ok(());
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = dir.join(format!("{}.{}.{}.tmp", CACHE_FILE, std::process::id(), nanos));

    fs::write(&temp_path, &json).with_path(&temp_path)?;
    if let Err(e) = fs::rename(&temp_path, &path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ExhaustiveError::io(&path, e));
    }
    Ok(())
}
