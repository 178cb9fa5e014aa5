//! Typed error handling for the exhaustiveness pass.
//!
//! Findings about analysed code (missing members, missing default clauses,
//! bad directives) are diagnostics, not errors. The errors here describe
//! problems with the inputs or the run itself.

use std::path::PathBuf;
use thiserror::Error;

use crate::unit::{TypeId, UnitId};

/// Main error type for exhaustiveness runs.
#[derive(Error, Debug)]
pub enum ExhaustiveError {
    /// I/O error when reading/writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A unit file could not be decoded
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A user-supplied regular expression does not compile
    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// The same enum type was published twice
    #[error("Duplicate publish of {type_name} by unit {unit}")]
    DuplicatePublish { unit: String, type_name: String },

    /// Units import each other in a cycle
    #[error("Dependency cycle between units: {}", .units.join(" -> "))]
    DependencyCycle { units: Vec<String> },

    /// Fact cache errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ExhaustiveError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error for a unit file.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate publish error.
    pub fn duplicate_publish(unit: &UnitId, ty: &TypeId) -> Self {
        Self::DuplicatePublish {
            unit: unit.to_string(),
            type_name: ty.to_string(),
        }
    }

    /// Create a dependency cycle error.
    pub fn cycle(units: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::DependencyCycle {
            units: units.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors that only affect a single unit; the run can continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Cache { .. } | Self::DuplicatePublish { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Parse { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for results of this crate.
pub type ExhaustiveResult<T> = Result<T, ExhaustiveError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> ExhaustiveResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> ExhaustiveResult<T> {
        self.map_err(|e| ExhaustiveError::io(path, e))
    }
}
