//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use exhaustive_core::prelude::*;
//! ```

// Core types
pub use crate::error::{ExhaustiveError, ExhaustiveResult};
pub use crate::unit::{CompilationUnit, TypeId, UnitId};

// Configuration
pub use crate::config::{load_config, AnalysisConfig, ConstructKind, SatisfyStrategy};

// Checking
pub use crate::analyzer::analyze_unit;
pub use crate::catalog::{build_catalog, EnumDefinition};
pub use crate::diagnostic::Diagnostic;
pub use crate::facts::FactStore;

// Builder API
pub use crate::builder::{run_pass, AnalysisResult, Exhaustive};
