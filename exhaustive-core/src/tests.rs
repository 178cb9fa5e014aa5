//! End-to-end tests for exhaustive-core.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: &str) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_project() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("exhaustive_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

const DIRECTION_UNIT: &str = r#"{
    "id": "example.com/dir",
    "name": "dir",
    "file": "dir/dir.go",
    "types": [{ "name": "Direction", "underlying": "int" }],
    "consts": [
        { "name": "N", "ty": { "kind": "named", "id": { "unit": "example.com/dir", "name": "Direction" } }, "value": { "int": 1 } },
        { "name": "E", "ty": { "kind": "named", "id": { "unit": "example.com/dir", "name": "Direction" } }, "value": { "int": 2 } },
        { "name": "S", "ty": { "kind": "named", "id": { "unit": "example.com/dir", "name": "Direction" } }, "value": { "int": 3 } },
        { "name": "W", "ty": { "kind": "named", "id": { "unit": "example.com/dir", "name": "Direction" } }, "value": { "int": 4 } },
        { "name": "invalid", "public": false, "ty": { "kind": "named", "id": { "unit": "example.com/dir", "name": "Direction" } }, "value": { "int": 5 } }
    ]
}"#;

/// Importer with one switch over `dir.Direction` naming `cases`.
fn compass_unit(cases: &[&str], comments: &[&str], has_default: bool) -> String {
    let exprs: Vec<String> = cases
        .iter()
        .map(|c| {
            format!(
                r#"{{ "kind": "ident", "object": {{ "unit": "example.com/dir", "name": "{}" }} }}"#,
                c
            )
        })
        .collect();
    let mut clauses = vec![format!(r#"{{ "exprs": [{}] }}"#, exprs.join(", "))];
    if has_default {
        clauses.push(r#"{ "exprs": [] }"#.to_string());
    }
    let comments: Vec<String> = comments.iter().map(|c| format!("{:?}", c)).collect();
    format!(
        r#"{{
    "id": "example.com/compass",
    "name": "compass",
    "file": "compass/compass.go",
    "imports": ["example.com/dir"],
    "body": [
        {{ "kind": "switch",
          "span": {{ "file": "compass/compass.go", "line": 12, "column": 2 }},
          "tag_type": {{ "kind": "named", "id": {{ "unit": "example.com/dir", "name": "Direction" }} }},
          "clauses": [{}],
          "comments": [{}] }}
    ]
}}"#,
        clauses.join(", "),
        comments.join(", ")
    )
}

fn setup_compass(cases: &[&str], comments: &[&str], has_default: bool) -> PathBuf {
    let root = setup_temp_project();
    write_file(&root.join("dir/dir.unit.json"), DIRECTION_UNIT);
    write_file(
        &root.join("compass/compass.unit.json"),
        &compass_unit(cases, comments, has_default),
    );
    root
}

fn check(root: &Path, config: AnalysisConfig) -> AnalysisResult {
    Exhaustive::new(root)
        .with_config(config)
        .with_cache(false)
        .analyze()
        .unwrap()
}

fn messages(result: &AnalysisResult) -> Vec<String> {
    result.diagnostics.iter().map(|d| d.message.clone()).collect()
}

// Core Test 1: Missing members of an imported enum
#[test]
fn test_imported_enum_missing_members() {
    let root = setup_compass(&["N", "W"], &[], false);
    let result = check(&root, AnalysisConfig::default());

    assert_eq!(result.units_total, 2);
    assert_eq!(result.units_checked, 2);
    assert_eq!(result.enums_published, 1);
    assert_eq!(
        messages(&result),
        vec!["missing cases in switch of type dir.Direction: dir.E, dir.S"]
    );
    assert_eq!(
        result.diagnostics[0].to_string(),
        "compass/compass.go:12:2: missing cases in switch of type dir.Direction: dir.E, dir.S"
    );

    fs::remove_dir_all(&root).ok();
}

// Core Test 2: Non-public members of foreign enums
#[test]
fn test_foreign_non_public_members() {
    let root = setup_compass(&["N", "E", "S", "W"], &[], false);
    assert!(check(&root, AnalysisConfig::default()).diagnostics.is_empty());

    let config = AnalysisConfig {
        include_non_public: true,
        ..AnalysisConfig::default()
    };
    assert_eq!(
        messages(&check(&root, config)),
        vec!["missing cases in switch of type dir.Direction: dir.invalid"]
    );

    fs::remove_dir_all(&root).ok();
}

// Core Test 3: Conflicting directives are reported, never checked
#[test]
fn test_conflicting_directives() {
    let root = setup_compass(&["N"], &["//exhaustive:ignore", "//exhaustive:enforce"], false);
    let result = check(&root, AnalysisConfig::default());

    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(
        result.diagnostics[0].kind,
        DiagnosticKind::InvalidDirectives { .. }
    ));
    assert!(result.diagnostics[0]
        .message
        .starts_with("failed to parse directives: "));

    fs::remove_dir_all(&root).ok();
}

// Core Test 4: Explicit mode
#[test]
fn test_explicit_mode_needs_enforce() {
    let config = AnalysisConfig {
        explicit_switch: true,
        ..AnalysisConfig::default()
    };

    let root = setup_compass(&["N"], &[], false);
    assert!(check(&root, config.clone()).diagnostics.is_empty());
    fs::remove_dir_all(&root).ok();

    let root = setup_compass(&["N"], &["//exhaustive:enforce"], false);
    assert_eq!(check(&root, config).diagnostics.len(), 1);
    fs::remove_dir_all(&root).ok();
}

// Core Test 5: Default clause policies
#[test]
fn test_default_policies() {
    let root = setup_compass(&["N"], &[], true);

    assert_eq!(
        messages(&check(&root, AnalysisConfig::default())),
        vec!["missing cases in switch of type dir.Direction: dir.E, dir.S, dir.W"]
    );

    let signifies = AnalysisConfig {
        default_signifies_exhaustive: true,
        ..AnalysisConfig::default()
    };
    assert!(check(&root, signifies).diagnostics.is_empty());
    fs::remove_dir_all(&root).ok();

    let required = AnalysisConfig {
        default_case_required: true,
        ..AnalysisConfig::default()
    };
    let root = setup_compass(&["N", "E", "S", "W"], &[], false);
    assert_eq!(
        messages(&check(&root, required.clone())),
        vec!["missing default in switch of type dir.Direction"]
    );
    fs::remove_dir_all(&root).ok();

    let root = setup_compass(
        &["N", "E", "S", "W"],
        &["//exhaustive:ignore-default-case-required"],
        false,
    );
    assert!(check(&root, required).diagnostics.is_empty());
    fs::remove_dir_all(&root).ok();
}

// Core Test 6: Config file overlay
#[test]
fn test_config_file_overlay() {
    let root = setup_compass(&["N", "W"], &[], false);
    write_file(
        &root.join(config::CONFIG_FILE),
        "check = [\"map\"]\nexclude_dirs = [\"vendor\"]\n\n[output]\nformat = \"json\"\n",
    );

    let file = load_config(&root).unwrap().unwrap();
    let mut config = AnalysisConfig::default();
    config.apply_file(&file).unwrap();
    assert!(!config.checks(ConstructKind::Switch));
    assert_eq!(file.exclude_dirs.as_deref(), Some(&["vendor".to_string()][..]));
    assert_eq!(file.output.and_then(|o| o.format).as_deref(), Some("json"));

    assert!(check(&root, config).diagnostics.is_empty());

    fs::remove_dir_all(&root).ok();
}

// Core Test 7: Import cycles fail the run
#[test]
fn test_import_cycle_fails() {
    let root = setup_temp_project();
    write_file(
        &root.join("a.unit.json"),
        r#"{ "id": "a", "name": "a", "imports": ["b"] }"#,
    );
    write_file(
        &root.join("b.unit.json"),
        r#"{ "id": "b", "name": "b", "imports": ["a"] }"#,
    );

    let err = Exhaustive::new(&root).with_cache(false).analyze().unwrap_err();
    assert!(format!("{:#}", err).contains("a -> b -> a"));

    fs::remove_dir_all(&root).ok();
}

// Core Test 8: Diagnostics come out ordered
#[test]
fn test_diagnostics_sorted_across_units() {
    let root = setup_compass(&["N"], &[], false);
    let local = CompilationUnit::new("example.com/aaa", "aaa")
        .with_file("aaa/aaa.go")
        .with_import("example.com/dir")
        .with_node(Node::Map(
            KeyedLiteral::new(
                Span::new("aaa/aaa.go", 3, 5),
                TypeRef::named(TypeId::new("example.com/dir", "Direction")),
            )
            .with_key(Expr::constant("example.com/dir", "S")),
        ));
    write_file(
        &root.join("aaa/aaa.unit.json"),
        &serde_json::to_string(&local).unwrap(),
    );

    let result = check(&root, AnalysisConfig::default());
    let files: Vec<&str> = result
        .diagnostics
        .iter()
        .map(|d| d.span.file.as_str())
        .collect();
    assert_eq!(files, vec!["aaa/aaa.go", "compass/compass.go"]);
    assert_eq!(
        result.diagnostics[0].message,
        "missing cases in map of type dir.Direction: dir.N, dir.E, dir.W"
    );

    fs::remove_dir_all(&root).ok();
}

// Core Test 9: By-name strategy over shared values
#[test]
fn test_strategies_over_shared_values() {
    let id = TypeId::new("example.com/lvl", "Level");
    let ty = TypeRef::named(id.clone());
    let unit = CompilationUnit::new("example.com/lvl", "lvl")
        .with_file("lvl.go")
        .with_type(TypeDecl::new("Level", BasicKind::String))
        .with_const(ConstDecl::new("Warn", ty.clone(), ConstValue::text("warn")))
        .with_const(ConstDecl::new("Warning", ty.clone(), ConstValue::text("warn")))
        .with_const(ConstDecl::new("Error", ty.clone(), ConstValue::text("error")))
        .with_node(Node::Switch(
            Dispatch::new(Span::new("lvl.go", 9, 2), ty).with_clause(CaseClause::case(vec![
                Expr::constant("example.com/lvl", "Warn"),
                Expr::constant("example.com/lvl", "Error"),
            ])),
        ));
    let units = vec![unit];

    let store = FactStore::new();
    let out = run_pass(&units, &store, &AnalysisConfig::default()).unwrap();
    assert!(out.diagnostics.is_empty());

    let store = FactStore::new();
    let by_name = AnalysisConfig::default().with_strategy(SatisfyStrategy::ByName);
    let out = run_pass(&units, &store, &by_name).unwrap();
    assert_eq!(
        out.diagnostics[0].message,
        "missing cases in switch of type Level: Warning"
    );
    assert!(store.lookup(&id).is_some());
}

// Core Test 10: JSON report shape
#[test]
fn test_report_json_shape() {
    let root = setup_compass(&["N", "W"], &[], false);
    let result = check(&root, AnalysisConfig::default());

    let value = serde_json::to_value(&result.diagnostics[0]).unwrap();
    assert_eq!(value["kind"], "missing_cases");
    assert_eq!(value["construct"], "switch");
    assert_eq!(value["unit"], "example.com/compass");
    assert_eq!(value["missing"], serde_json::json!(["dir.E", "dir.S"]));
    assert_eq!(
        render_plain(&result.diagnostics),
        "compass/compass.go:12:2: missing cases in switch of type dir.Direction: dir.E, dir.S\n"
    );

    fs::remove_dir_all(&root).ok();
}

// Core Test 11: Float enums with values outside machine range still publish
#[test]
fn test_tiny_float_members_publish() {
    let root = setup_temp_project();
    let ty = r#"{ "kind": "named", "id": { "unit": "example.com/eps", "name": "Epsilon" } }"#;
    write_file(
        &root.join("eps.unit.json"),
        &format!(
            r#"{{
    "id": "example.com/eps",
    "name": "eps",
    "types": [{{ "name": "Epsilon", "underlying": "float" }}],
    "consts": [
        {{ "name": "Tiny", "ty": {ty}, "value": {{ "float": "1e-40" }} }},
        {{ "name": "Tinier", "ty": {ty}, "value": {{ "float": "1e-400" }} }},
        {{ "name": "Same", "ty": {ty}, "value": {{ "float": "0.0000000000000000000000000000000000000001" }} }},
        {{ "name": "None", "ty": {ty}, "value": {{ "float": "0e400" }} }}
    ]
}}"#
        ),
    );
    let user = CompilationUnit::new("example.com/use", "use")
        .with_file("use.go")
        .with_import("example.com/eps")
        .with_node(Node::Switch(
            Dispatch::new(
                Span::new("use.go", 4, 2),
                TypeRef::named(TypeId::new("example.com/eps", "Epsilon")),
            )
            .with_clause(CaseClause::case(vec![Expr::constant("example.com/eps", "Tiny")])),
        ));
    write_file(&root.join("use.unit.json"), &serde_json::to_string(&user).unwrap());

    let result = check(&root, AnalysisConfig::default());
    assert_eq!(result.units_failed, 0);
    assert_eq!(result.enums_published, 1);
    assert_eq!(
        messages(&result),
        vec!["missing cases in switch of type eps.Epsilon: eps.Tinier, eps.None"]
    );

    fs::remove_dir_all(&root).ok();
}
