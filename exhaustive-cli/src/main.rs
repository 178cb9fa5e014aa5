//! exhaustive CLI - enum exhaustiveness checker for resolved compilation units.
//!
//! Features:
//! - Recursive discovery of `*.unit.json` files
//! - Dependency-ordered, parallel checking of units
//! - Layered configuration: defaults, `exhaustive.toml`, command-line flags
//! - Incremental fact cache for partial runs
//! - Plain or JSON diagnostics

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use exhaustive_core::{
    init_structured_logging, load_config, print_json, print_plain, AnalysisConfig, ConstructKind,
    Exhaustive, FileConfig, SatisfyStrategy,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Checks that enum switches and map literals list every member")]
pub struct Cli {
    /// Directory containing the *.unit.json files
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Construct kinds to check (comma-separated: switch,map)
    #[arg(long, value_delimiter = ',', value_name = "KINDS")]
    check: Option<Vec<ConstructKind>>,

    /// Only check switches that carry an enforce directive
    #[arg(long)]
    explicit_exhaustive_switch: bool,

    /// Only check map literals that carry an enforce directive
    #[arg(long)]
    explicit_exhaustive_map: bool,

    /// Also check units marked as generated
    #[arg(long)]
    check_generated: bool,

    /// Treat a default clause as covering every member
    #[arg(long)]
    default_signifies_exhaustive: bool,

    /// Require a default clause in every checked switch
    #[arg(long)]
    default_case_required: bool,

    /// Require non-public members of enums from other units
    #[arg(long)]
    include_non_public: bool,

    /// Members matching this regex are never required
    #[arg(long, value_name = "RE")]
    ignore_enum_members: Option<String>,

    /// Enums matching this regex are not checked
    #[arg(long, value_name = "RE")]
    ignore_enum_types: Option<String>,

    /// Only consider enums declared at unit scope
    #[arg(long)]
    package_scope_only: bool,

    /// How a listed member satisfies its siblings (by-value or by-name)
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<SatisfyStrategy>,

    /// Do not read or write the fact cache
    #[arg(long)]
    no_cache: bool,

    /// Export every published enum fact to a JSON file
    #[arg(long, value_name = "FILE")]
    export_facts: Option<String>,
}

impl Cli {
    /// Overlays the flags given on the command line onto `config`.
    fn apply(&self, config: &mut AnalysisConfig) -> Result<()> {
        if let Some(kinds) = &self.check {
            config.check_switch = kinds.contains(&ConstructKind::Switch);
            config.check_map = kinds.contains(&ConstructKind::Map);
        }

        let flags = [
            (&mut config.explicit_switch, self.explicit_exhaustive_switch),
            (&mut config.explicit_map, self.explicit_exhaustive_map),
            (&mut config.check_generated, self.check_generated),
            (
                &mut config.default_signifies_exhaustive,
                self.default_signifies_exhaustive,
            ),
            (&mut config.default_case_required, self.default_case_required),
            (&mut config.include_non_public, self.include_non_public),
            (&mut config.package_scope_only, self.package_scope_only),
        ];
        for (slot, set) in flags {
            if set {
                *slot = true;
            }
        }

        if let Some(pattern) = &self.ignore_enum_members {
            *config = config.clone().with_ignore_members(pattern)?;
        }
        if let Some(pattern) = &self.ignore_enum_types {
            *config = config.clone().with_ignore_types(pattern)?;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        Ok(())
    }
}

/// Builds the effective configuration: defaults, then the config file, then flags.
fn build_config(cli: &Cli, file: Option<&FileConfig>) -> Result<AnalysisConfig> {
    let mut config = AnalysisConfig::default();
    if let Some(file) = file {
        config
            .apply_file(file)
            .context("Invalid configuration file")?;
    }
    cli.apply(&mut config)?;
    Ok(config)
}

/// Whether the config file asks for JSON output.
fn file_wants_json(file: Option<&FileConfig>) -> bool {
    file.and_then(|f| f.output.as_ref())
        .and_then(|o| o.format.as_deref())
        .is_some_and(|f| f.eq_ignore_ascii_case("json"))
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    let normalized = path.replace('\\', "/");
    let traverses = p
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
        || normalized.split('/').any(|part| part == "..");
    if traverses {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

fn export_facts(path: &str, facts: &[exhaustive_core::FactRecord]) -> Result<()> {
    let out = validate_output_path(path)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&serde_json::json!({ "facts": facts }))?;
    fs::write(&out, json).with_context(|| format!("Failed to write {}", out.display()))?;
    eprintln!("Exported {} enum fact(s) to {}", facts.len(), out.display());
    Ok(())
}

fn main() -> Result<()> {
    // Global panic guard: internal errors exit with code 2
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] exhaustive internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
        std::process::exit(2);
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();
    let root = Path::new(&cli.path);
    if !root.is_dir() {
        return Err(anyhow!("Not a directory: {}", cli.path));
    }

    let file = load_config(root)
        .with_context(|| format!("Failed to load configuration from: {}", cli.path))?;
    let config = build_config(&cli, file.as_ref())?;
    let excluded = file
        .as_ref()
        .and_then(|f| f.exclude_dirs.clone())
        .unwrap_or_default();

    let result = Exhaustive::new(root)
        .with_config(config)
        .with_cache(!cli.no_cache)
        .exclude_dirs(excluded)
        .analyze()
        .with_context(|| format!("Failed to analyze: {}", cli.path))?;

    for failure in &result.failures {
        eprintln!("WARN: {}", failure);
    }

    if cli.json || file_wants_json(file.as_ref()) {
        print_json(&result.diagnostics);
    } else {
        print_plain(&result.diagnostics);
    }

    if let Some(path) = &cli.export_facts {
        export_facts(path, &result.facts)?;
    }

    std::process::exit(if result.has_findings() { 1 } else { 0 });
}
