//! Analysis settings and `exhaustive.toml` loading.
//!
//! Precedence, lowest first: built-in defaults, `exhaustive.toml` in the
//! analysed root, command-line flags (applied by the CLI on top).

use std::fmt;
use std::str::FromStr;
use std::{fs, path::Path};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ExhaustiveError, ExhaustiveResult};
use crate::unit::TypeId;

/// Name of the per-project configuration file.
pub const CONFIG_FILE: &str = "exhaustive.toml";

/// Construct kinds the pass can check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructKind {
    Switch,
    Map,
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch => write!(f, "switch"),
            Self::Map => write!(f, "map"),
        }
    }
}

impl FromStr for ConstructKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "switch" => Ok(Self::Switch),
            "map" => Ok(Self::Map),
            other => Err(format!("unknown construct kind {:?} (expected switch or map)", other)),
        }
    }
}

/// How a covered member satisfies the checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SatisfyStrategy {
    /// A member satisfies every member sharing its value
    #[default]
    ByValue,
    /// A member satisfies only itself
    ByName,
}

impl FromStr for SatisfyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "by-value" => Ok(Self::ByValue),
            "by-name" => Ok(Self::ByName),
            other => Err(format!("unknown strategy {:?} (expected by-value or by-name)", other)),
        }
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub check_switch: bool,
    pub check_map: bool,
    /// Only check switches carrying an `enforce` directive
    pub explicit_switch: bool,
    /// Only check map literals carrying an `enforce` directive
    pub explicit_map: bool,
    pub check_generated: bool,
    /// A default clause alone satisfies exhaustiveness
    pub default_signifies_exhaustive: bool,
    /// Switches must carry a default clause
    pub default_case_required: bool,
    /// Foreign enums also require their non-public members
    pub include_non_public: bool,
    /// Only unit-scope enums are considered
    pub package_scope_only: bool,
    /// Members whose `<unit id>.<name>` matches are never required
    pub ignore_members: Option<Regex>,
    /// Enums whose `<unit id>.<name>` matches are not checked
    pub ignore_types: Option<Regex>,
    pub strategy: SatisfyStrategy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            check_switch: true,
            check_map: true,
            explicit_switch: false,
            explicit_map: false,
            check_generated: false,
            default_signifies_exhaustive: false,
            default_case_required: false,
            include_non_public: false,
            package_scope_only: false,
            ignore_members: None,
            ignore_types: None,
            strategy: SatisfyStrategy::ByValue,
        }
    }
}

fn compile_pattern(pattern: &str) -> ExhaustiveResult<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|e| ExhaustiveError::invalid_pattern(pattern, e.to_string()))
}

impl AnalysisConfig {
    /// Whether constructs of `kind` are analysed at all.
    pub fn checks(&self, kind: ConstructKind) -> bool {
        match kind {
            ConstructKind::Switch => self.check_switch,
            ConstructKind::Map => self.check_map,
        }
    }

    /// Whether `kind` is in explicit (opt-in) mode.
    pub fn explicit(&self, kind: ConstructKind) -> bool {
        match kind {
            ConstructKind::Switch => self.explicit_switch,
            ConstructKind::Map => self.explicit_map,
        }
    }

    /// Restricts checking to the given construct kinds.
    pub fn with_checks(mut self, kinds: &[ConstructKind]) -> Self {
        self.check_switch = kinds.contains(&ConstructKind::Switch);
        self.check_map = kinds.contains(&ConstructKind::Map);
        self
    }

    pub fn with_strategy(mut self, strategy: SatisfyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_ignore_members(mut self, pattern: &str) -> ExhaustiveResult<Self> {
        self.ignore_members = compile_pattern(pattern)?;
        Ok(self)
    }

    pub fn with_ignore_types(mut self, pattern: &str) -> ExhaustiveResult<Self> {
        self.ignore_types = compile_pattern(pattern)?;
        Ok(self)
    }

    /// True when an enum type is excluded from checking.
    pub fn type_ignored(&self, id: &TypeId) -> bool {
        if self.package_scope_only && !id.scope.is_unit() {
            return true;
        }
        self.ignore_types
            .as_ref()
            .is_some_and(|re| re.is_match(&id.to_string()))
    }

    /// Overlays the values present in a config file.
    pub fn apply_file(&mut self, file: &FileConfig) -> ExhaustiveResult<()> {
        if let Some(kinds) = &file.check {
            self.check_switch = kinds.contains(&ConstructKind::Switch);
            self.check_map = kinds.contains(&ConstructKind::Map);
        }
        let flags = [
            (&mut self.explicit_switch, file.explicit_switch),
            (&mut self.explicit_map, file.explicit_map),
            (&mut self.check_generated, file.check_generated),
            (
                &mut self.default_signifies_exhaustive,
                file.default_signifies_exhaustive,
            ),
            (&mut self.default_case_required, file.default_case_required),
            (&mut self.include_non_public, file.include_non_public),
            (&mut self.package_scope_only, file.package_scope_only),
        ];
        for (slot, value) in flags {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(p) = &file.ignore_members {
            self.ignore_members = compile_pattern(p)?;
        }
        if let Some(p) = &file.ignore_types {
            self.ignore_types = compile_pattern(p)?;
        }
        if let Some(s) = file.strategy {
            self.strategy = s;
        }
        Ok(())
    }
}

/// Contents of `exhaustive.toml`. Every field is optional.
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub check: Option<Vec<ConstructKind>>,
    pub explicit_switch: Option<bool>,
    pub explicit_map: Option<bool>,
    pub check_generated: Option<bool>,
    pub default_signifies_exhaustive: Option<bool>,
    pub default_case_required: Option<bool>,
    pub include_non_public: Option<bool>,
    pub package_scope_only: Option<bool>,
    pub ignore_members: Option<String>,
    pub ignore_types: Option<String>,
    pub strategy: Option<SatisfyStrategy>,
    /// Extra directory names pruned while searching for unit files
    pub exclude_dirs: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

/// Loads configuration from `exhaustive.toml` if it exists.
pub fn load_config(root: &Path) -> ExhaustiveResult<Option<FileConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| ExhaustiveError::io(&path, e))?;
    let cfg = toml::from_str(&content)
        .map_err(|e| ExhaustiveError::config(&path, format!("Invalid {}: {}", CONFIG_FILE, e)))?;
    Ok(Some(cfg))
}
