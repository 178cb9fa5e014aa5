//! exhaustive-core: enum exhaustiveness checking for tag-dispatch constructs
//!
//! This library checks that every switch over an enum-like type, and every
//! map literal keyed by one, names all of the type's members. It works on
//! resolved compilation units produced by an external parser and type
//! resolver.
//!
//! # Features
//!
//! - **Enum discovery**: named integer, float and string types with their constants
//! - **Cross-unit facts**: enums published by one unit are checked in its importers
//! - **Value grouping**: members sharing a value satisfy each other
//! - **Directives**: `//exhaustive:ignore`, `enforce` and default-clause overrides
//! - **Generic dispatch**: union-constrained type parameters cover every constituent
//! - **Fact cache**: facts persist between runs in `.exhaustive/facts.json`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use exhaustive_core::prelude::*;
//!
//! let result = Exhaustive::new("/path/to/units")
//!     .with_cache(true)
//!     .analyze()?;
//!
//! for d in &result.diagnostics {
//!     println!("{}", d);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`unit`]: Resolved syntax model consumed by the pass
//! - [`value`]: Exact constant values
//! - [`catalog`]: Enum discovery per unit
//! - [`facts`]: Cross-unit enum registry
//! - [`directive`]: Control comment parsing
//! - [`checklist`]: Coverage tracking per construct
//! - [`analyzer`]: Construct checking
//! - [`diagnostic`]: Findings and message rendering
//! - [`graph`]: Unit dependency waves
//! - [`builder`]: Fluent builder API and pass runner
//!
//! # Cargo Features
//!
//! - `cache` (default): Persist enum facts between runs
//! - `full`: Enable all optional features

pub mod analyzer;
pub mod builder;
pub mod catalog;
pub mod checklist;
pub mod config;
pub mod diagnostic;
pub mod directive;
pub mod error;
pub mod facts;
pub mod graph;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod unit;
pub mod value;

#[cfg(feature = "cache")]
pub mod cache;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{ExhaustiveError, ExhaustiveResult, IoResultExt};

// Builder API
pub use builder::{run_pass, AnalysisResult, Exhaustive, PassOutput};

// Configuration
pub use config::{
    load_config, AnalysisConfig, ConstructKind, FileConfig, OutputConfig, SatisfyStrategy,
    CONFIG_FILE,
};

// Syntax model
pub use unit::{
    BasicKind, CaseClause, CompilationUnit, ConstDecl, DeclGroup, Dispatch, Expr, KeyedEntry,
    KeyedLiteral, Node, ObjectRef, ScopeId, Span, TypeDecl, TypeId, TypeRef, UnitId,
};
pub use value::{ConstValue, ValueError};

// Enum model and facts
pub use catalog::{build_catalog, EnumCatalog, EnumDefinition, EnumMember};
pub use facts::{FactRecord, FactStore};

// Checking
pub use analyzer::{analyze_unit, Outcome, SkipReason, UnitAnalyzer};
pub use checklist::{Checklist, Remaining};
pub use diagnostic::{sort_diagnostics, Diagnostic, DiagnosticKind};
pub use directive::{parse_directives, Directive, DirectiveError, DirectiveSet};

// Scheduling and scanning
pub use graph::{build_unit_graph, schedule_units};
pub use scan::{gather_unit_files, hash_bytes, load_unit, load_units, LoadOutcome, LoadedUnit};

// Logging
pub use logging::init_structured_logging;

// Reporting
pub use report::{print_json, print_plain, render_plain};

#[cfg(feature = "cache")]
pub use cache::{load_cache, save_cache, CacheMetadata, CachedUnit, FactCache};

#[cfg(test)]
mod tests;
