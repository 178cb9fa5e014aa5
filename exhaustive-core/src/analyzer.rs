//! Exhaustiveness checking of dispatch constructs and keyed literals.
//!
//! Each construct runs through the same decision sequence:
//!
//! ```text
//! Start ──type not an enum / type ignored──────────────▶ Skip
//!   │
//!   ▼
//! Gathering ──directives invalid or conflicting────────▶ ReportConflict
//!   │        ──ignore (normal) / no enforce (explicit)─▶ Skip
//!   ▼
//! walk cases, apply default policy ────────────────────▶ Decide
//! ```
//!
//! Nodes nested inside clause bodies and literal values are always walked,
//! whatever the outcome for the enclosing construct.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::{EnumCatalog, EnumDefinition};
use crate::checklist::Checklist;
use crate::config::{AnalysisConfig, ConstructKind};
use crate::diagnostic::{missing_groups, type_display, union_display, Diagnostic};
use crate::directive::{parse_directives, Directive, DirectiveSet};
use crate::facts::{FactRecord, FactStore};
use crate::unit::{CompilationUnit, Dispatch, Expr, KeyedLiteral, Node, ScopeId, Span, TypeId, TypeRef};
use crate::value::ConstValue;

/// Why a construct was not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Construct kind disabled in the configuration
    Disabled,
    /// Dispatched type is not a known enum
    NotEnum,
    /// Enum excluded by `ignore_types` or `package_scope_only`
    IgnoredType,
    /// `ignore` directive, or no `enforce` directive in explicit mode
    Directive,
}

/// Terminal state reached for one construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skip(SkipReason),
    ReportConflict,
    Decide { findings: usize },
}

/// An enum definition from this unit's catalog or from the fact store.
#[derive(Debug, Clone)]
enum Resolved<'a> {
    Local(&'a EnumDefinition),
    Imported(Arc<FactRecord>),
}

impl Deref for Resolved<'_> {
    type Target = EnumDefinition;

    fn deref(&self) -> &EnumDefinition {
        match self {
            Resolved::Local(def) => def,
            Resolved::Imported(record) => &record.definition,
        }
    }
}

/// What a case or key expression covers.
#[derive(Debug, Clone, PartialEq)]
enum Covered {
    Member(TypeId, String),
    Value(TypeId, ConstValue),
}

/// Checks every construct of one unit.
pub struct UnitAnalyzer<'a> {
    unit: &'a CompilationUnit,
    catalog: &'a EnumCatalog,
    store: &'a FactStore,
    config: &'a AnalysisConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> UnitAnalyzer<'a> {
    pub fn new(
        unit: &'a CompilationUnit,
        catalog: &'a EnumCatalog,
        store: &'a FactStore,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            unit,
            catalog,
            store,
            config,
            diagnostics: Vec::new(),
        }
    }

    /// Walks the unit body and returns the diagnostics found.
    pub fn run(mut self) -> Vec<Diagnostic> {
        let unit = self.unit;
        for node in &unit.body {
            self.walk(node);
        }
        self.diagnostics
    }

    fn walk(&mut self, node: &Node) {
        match node {
            Node::Switch(dispatch) => {
                let outcome = self.check_dispatch(dispatch);
                debug!(unit = %self.unit.id, at = %dispatch.span, ?outcome, "switch");
                for clause in &dispatch.clauses {
                    for child in &clause.body {
                        self.walk(child);
                    }
                }
            }
            Node::Map(literal) => {
                let outcome = self.check_literal(literal);
                debug!(unit = %self.unit.id, at = %literal.span, ?outcome, "map");
                for entry in &literal.entries {
                    for child in &entry.value {
                        self.walk(child);
                    }
                }
            }
            Node::Block { body } => {
                for child in body {
                    self.walk(child);
                }
            }
            Node::Other => {}
        }
    }

    fn enum_of(&self, id: &TypeId) -> Option<Resolved<'a>> {
        if id.unit == self.unit.id {
            self.catalog.get(id).map(Resolved::Local)
        } else {
            self.store.lookup(id).map(Resolved::Imported)
        }
    }

    /// Resolves the dispatched type to its constituent enums.
    ///
    /// A type parameter resolves to the enums of its union constraint; every
    /// constituent must be an enum. Ignored constituents are dropped.
    fn resolve_type(&self, ty: Option<&TypeRef>) -> Result<Vec<Resolved<'a>>, SkipReason> {
        let mut ids = Vec::new();
        match ty {
            Some(ty) => collect_named(ty, &mut ids)?,
            None => return Err(SkipReason::NotEnum),
        }

        let mut defs: Vec<Resolved<'a>> = Vec::new();
        for id in ids {
            let def = self.enum_of(id).ok_or(SkipReason::NotEnum)?;
            if defs.iter().any(|d| d.id() == def.id()) {
                continue;
            }
            defs.push(def);
        }
        defs.retain(|d| !self.config.type_ignored(d.id()));
        if defs.is_empty() {
            return Err(SkipReason::IgnoredType);
        }
        Ok(defs)
    }

    /// Directive gate shared by both construct kinds.
    fn gate(
        &mut self,
        kind: ConstructKind,
        span: &Span,
        comments: &[String],
    ) -> Result<DirectiveSet, Outcome> {
        let directives = match parse_directives(comments) {
            Ok(d) => d,
            Err(err) => {
                self.diagnostics
                    .push(Diagnostic::invalid_directives(&self.unit.id, span, kind, &err));
                return Err(Outcome::ReportConflict);
            }
        };

        let skip = if self.config.explicit(kind) {
            !directives.has(Directive::Enforce)
        } else {
            directives.has(Directive::Ignore)
        };
        if skip {
            return Err(Outcome::Skip(SkipReason::Directive));
        }
        Ok(directives)
    }

    fn checklist<'d>(&self, defs: &'d [Resolved<'a>]) -> Checklist<'d> {
        let mut list = Checklist::new(self.config.strategy);
        for def in defs {
            let same_unit = def.id().unit == self.unit.id;
            list.add(
                def,
                same_unit || self.config.include_non_public,
                self.config.ignore_members.as_ref(),
            );
        }
        list
    }

    fn type_name(&self, defs: &[Resolved<'a>]) -> String {
        match defs {
            [single] => type_display(single, &self.unit.id),
            _ => union_display(defs.iter().map(|d| d.deref()), &self.unit.id),
        }
    }

    fn cover(&self, list: &mut Checklist<'_>, defs: &[Resolved<'a>], expr: &Expr) {
        let mut seen = HashSet::new();
        match self.resolve_member(expr, defs, &mut seen) {
            Some(Covered::Member(ty, name)) => list.satisfy(&ty, &name),
            Some(Covered::Value(ty, value)) => list.satisfy_value(&ty, &value),
            None => {}
        }
    }

    /// Traces a case or key expression back to an enum member.
    ///
    /// Parentheses and conversions to one of the constituent types are
    /// stripped, constants of this unit are followed through their
    /// initializers, and anything else with a known constant value of a
    /// constituent type counts by value. Literals and calls count as nothing.
    fn resolve_member(
        &self,
        expr: &Expr,
        defs: &[Resolved<'a>],
        seen: &mut HashSet<(ScopeId, String)>,
    ) -> Option<Covered> {
        let is_constituent = |id: &TypeId| defs.iter().any(|d| d.id() == id);

        match expr.unparen() {
            Expr::Convert { ty, expr } => match ty.as_named() {
                Some(id) if is_constituent(id) => self.resolve_member(expr, defs, seen),
                _ => None,
            },
            Expr::Ident { object, ty, value } => {
                if let Some(obj) = object {
                    let owner = defs.iter().find(|d| {
                        d.id().unit == obj.unit && d.id().scope == obj.scope && d.contains(&obj.name)
                    });
                    if let Some(def) = owner {
                        return Some(Covered::Member(def.id().clone(), obj.name.clone()));
                    }

                    if obj.unit == self.unit.id && seen.insert((obj.scope, obj.name.clone())) {
                        let init = self
                            .unit
                            .const_decl(obj.scope, &obj.name)
                            .and_then(|c| c.init.as_ref());
                        if let Some(found) = init.and_then(|e| self.resolve_member(e, defs, seen)) {
                            return Some(found);
                        }
                    }
                }

                match (ty.as_ref().and_then(TypeRef::as_named), value) {
                    (Some(id), Some(v)) if is_constituent(id) => {
                        Some(Covered::Value(id.clone(), v.clone()))
                    }
                    _ => None,
                }
            }
            Expr::Paren { .. } | Expr::Call { .. } | Expr::Literal { .. } | Expr::Opaque => None,
        }
    }

    fn check_dispatch(&mut self, dispatch: &Dispatch) -> Outcome {
        let kind = ConstructKind::Switch;
        if !self.config.checks(kind) {
            return Outcome::Skip(SkipReason::Disabled);
        }
        let defs = match self.resolve_type(dispatch.tag_type.as_ref()) {
            Ok(defs) => defs,
            Err(reason) => return Outcome::Skip(reason),
        };
        let directives = match self.gate(kind, &dispatch.span, &dispatch.comments) {
            Ok(d) => d,
            Err(outcome) => return outcome,
        };

        let mut list = self.checklist(&defs);
        for clause in dispatch.clauses.iter().filter(|c| !c.is_default()) {
            for expr in &clause.exprs {
                self.cover(&mut list, &defs, expr);
            }
        }

        let has_default = dispatch.has_default();
        let default_required = if directives.has(Directive::EnforceDefaultCaseRequired) {
            true
        } else if directives.has(Directive::IgnoreDefaultCaseRequired) {
            false
        } else {
            self.config.default_case_required
        };

        let mut findings = 0;
        if default_required && !has_default {
            self.diagnostics.push(Diagnostic::missing_default(
                &self.unit.id,
                &dispatch.span,
                kind,
                self.type_name(&defs),
            ));
            findings += 1;
        }

        let default_suffices = has_default && self.config.default_signifies_exhaustive;
        if !default_suffices && !list.is_satisfied() {
            self.report_missing(&list, &defs, kind, &dispatch.span);
            findings += 1;
        }
        Outcome::Decide { findings }
    }

    fn check_literal(&mut self, literal: &KeyedLiteral) -> Outcome {
        let kind = ConstructKind::Map;
        if !self.config.checks(kind) {
            return Outcome::Skip(SkipReason::Disabled);
        }
        let defs = match self.resolve_type(literal.key_type.as_ref()) {
            Ok(defs) => defs,
            Err(reason) => return Outcome::Skip(reason),
        };
        if let Err(outcome) = self.gate(kind, &literal.span, &literal.comments) {
            return outcome;
        }

        let mut list = self.checklist(&defs);
        for entry in &literal.entries {
            self.cover(&mut list, &defs, &entry.key);
        }

        if list.is_satisfied() {
            return Outcome::Decide { findings: 0 };
        }
        self.report_missing(&list, &defs, kind, &literal.span);
        Outcome::Decide { findings: 1 }
    }

    fn report_missing(
        &mut self,
        list: &Checklist<'_>,
        defs: &[Resolved<'a>],
        kind: ConstructKind,
        span: &Span,
    ) {
        let missing = missing_groups(&list.remaining(), &self.unit.id);
        self.diagnostics.push(Diagnostic::missing_cases(
            &self.unit.id,
            span,
            kind,
            self.type_name(defs),
            missing,
        ));
    }
}

/// Flattens a (possibly union-constrained) type into named types.
fn collect_named<'t>(ty: &'t TypeRef, out: &mut Vec<&'t TypeId>) -> Result<(), SkipReason> {
    match ty {
        TypeRef::Named { id } => {
            out.push(id);
            Ok(())
        }
        TypeRef::Param { constraint, .. } if !constraint.is_empty() => {
            for term in constraint {
                collect_named(term, out)?;
            }
            Ok(())
        }
        _ => Err(SkipReason::NotEnum),
    }
}

/// Runs the pass over one unit whose catalog has already been built.
///
/// Generated units yield nothing unless `check_generated` is set.
pub fn analyze_unit(
    unit: &CompilationUnit,
    catalog: &EnumCatalog,
    store: &FactStore,
    config: &AnalysisConfig,
) -> Vec<Diagnostic> {
    if unit.generated && !config.check_generated {
        debug!(unit = %unit.id, "skipping generated unit");
        return Vec::new();
    }
    UnitAnalyzer::new(unit, catalog, store, config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::config::SatisfyStrategy;
    use crate::unit::{BasicKind, CaseClause, ConstDecl, ObjectRef, TypeDecl};

    const DIR: &str = "example.com/direction";

    fn dir_id() -> TypeId {
        TypeId::new(DIR, "Direction")
    }

    fn dir_ty() -> TypeRef {
        TypeRef::named(dir_id())
    }

    fn n(name: &str) -> Expr {
        Expr::constant(DIR, name)
    }

    /// Untyped constant initialised from another identifier.
    fn alias(name: &str, target: &str, value: i128) -> ConstDecl {
        ConstDecl {
            ty: None,
            ..ConstDecl::new(name, dir_ty(), ConstValue::int(value)).with_init(n(target))
        }
    }

    fn direction_unit() -> CompilationUnit {
        CompilationUnit::new(DIR, "direction")
            .with_file("direction.go")
            .with_type(TypeDecl::new("Direction", BasicKind::Int))
            .with_const(ConstDecl::new("N", dir_ty(), ConstValue::int(1)))
            .with_const(ConstDecl::new("E", dir_ty(), ConstValue::int(2)))
            .with_const(ConstDecl::new("S", dir_ty(), ConstValue::int(3)))
            .with_const(ConstDecl::new("W", dir_ty(), ConstValue::int(4)))
    }

    fn switch(exprs: Vec<Expr>) -> Dispatch {
        Dispatch::new(Span::new("direction.go", 20, 2), dir_ty())
            .with_clause(CaseClause::case(exprs))
    }

    fn run(unit: &CompilationUnit, config: &AnalysisConfig) -> Vec<Diagnostic> {
        let catalog = build_catalog(unit);
        let store = FactStore::new();
        analyze_unit(unit, &catalog, &store, config)
    }

    fn messages(diags: &[Diagnostic]) -> Vec<&str> {
        diags.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_missing_members_reported() {
        let unit = direction_unit().with_node(Node::Switch(switch(vec![n("N"), n("W")])));
        let diags = run(&unit, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["missing cases in switch of type Direction: E, S"]
        );
    }

    #[test]
    fn test_complete_switch_is_clean() {
        let unit = direction_unit()
            .with_node(Node::Switch(switch(vec![n("N"), n("E"), n("S"), n("W")])));
        assert!(run(&unit, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_non_enum_tag_skipped() {
        let unit = direction_unit().with_node(Node::Switch(Dispatch::new(
            Span::default(),
            TypeRef::Basic {
                basic: BasicKind::Int,
            },
        )));
        assert!(run(&unit, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_parens_and_conversions_stripped() {
        let unit = direction_unit().with_node(Node::Switch(switch(vec![
            Expr::paren(n("N")),
            Expr::convert(dir_ty(), Expr::paren(n("E"))),
            Expr::convert(
                TypeRef::Basic {
                    basic: BasicKind::Int,
                },
                n("S"),
            ),
            n("W"),
        ])));
        let diags = run(&unit, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["missing cases in switch of type Direction: S"]
        );
    }

    #[test]
    fn test_aliases_followed_transitively() {
        let unit = direction_unit()
            .with_const(alias("North", "N", 1))
            .with_const(alias("Up", "North", 1))
            .with_node(Node::Switch(switch(vec![n("E"), n("S"), n("W")])))
            .with_node(Node::Switch(switch(vec![n("Up"), n("E"), n("S"), n("W")])));
        let diags = run(&unit, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["missing cases in switch of type Direction: N"]
        );
    }

    #[test]
    fn test_alias_cycle_terminates() {
        let unit = direction_unit()
            .with_const(alias("A", "B", 9))
            .with_const(alias("B", "A", 9))
            .with_node(Node::Switch(switch(vec![n("A"), n("N"), n("E"), n("S"), n("W")])));
        assert!(run(&unit, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_literals_and_calls_count_as_nothing() {
        let unit = direction_unit().with_node(Node::Switch(switch(vec![
            Expr::Literal {
                value: ConstValue::int(2),
            },
            Expr::Call {
                callee: "next".into(),
                args: vec![],
            },
            Expr::Opaque,
            n("N"),
            n("S"),
            n("W"),
        ])));
        let diags = run(&unit, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["missing cases in switch of type Direction: E"]
        );
    }

    #[test]
    fn test_value_fallback_only_by_value() {
        let foreign_const = Expr::Ident {
            object: Some(ObjectRef::new("example.com/other", "MyEast")),
            ty: Some(dir_ty()),
            value: Some(ConstValue::int(2)),
        };
        let unit = direction_unit().with_node(Node::Switch(switch(vec![
            n("N"),
            foreign_const,
            n("S"),
            n("W"),
        ])));
        assert!(run(&unit, &AnalysisConfig::default()).is_empty());

        let by_name = AnalysisConfig::default().with_strategy(SatisfyStrategy::ByName);
        assert_eq!(
            messages(&run(&unit, &by_name)),
            vec!["missing cases in switch of type Direction: E"]
        );
    }

    #[test]
    fn test_directive_conflict_wins() {
        let dispatch = switch(vec![n("N")])
            .with_comment("//exhaustive:ignore")
            .with_comment("//exhaustive:enforce");
        let unit = direction_unit().with_node(Node::Switch(dispatch));
        let diags = run(&unit, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["failed to parse directives: conflicting directives \"ignore\" and \"enforce\""]
        );
    }

    #[test]
    fn test_invalid_directive_reported() {
        let dispatch = switch(vec![n("N")]).with_comment("//exhaustive:sometimes");
        let unit = direction_unit().with_node(Node::Switch(dispatch));
        let diags = run(&unit, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["failed to parse directives: invalid directive \"sometimes\""]
        );
    }

    #[test]
    fn test_ignore_and_explicit_modes() {
        let ignored = switch(vec![n("N")]).with_comment("//exhaustive:ignore");
        let enforced = switch(vec![n("E")]).with_comment("//exhaustive:enforce");
        let plain = switch(vec![n("S")]);
        let unit = direction_unit()
            .with_node(Node::Switch(ignored))
            .with_node(Node::Switch(enforced))
            .with_node(Node::Switch(plain));

        assert_eq!(run(&unit, &AnalysisConfig::default()).len(), 2);

        let explicit = AnalysisConfig {
            explicit_switch: true,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            messages(&run(&unit, &explicit)),
            vec!["missing cases in switch of type Direction: N, S, W"]
        );
    }

    #[test]
    fn test_default_policy() {
        let with_default = switch(vec![n("N"), n("E")]).with_clause(CaseClause::default_clause());
        let unit = direction_unit().with_node(Node::Switch(with_default));

        // a default clause alone does not satisfy by default
        assert_eq!(
            messages(&run(&unit, &AnalysisConfig::default())),
            vec!["missing cases in switch of type Direction: S, W"]
        );

        let satisfies = AnalysisConfig {
            default_signifies_exhaustive: true,
            ..AnalysisConfig::default()
        };
        assert!(run(&unit, &satisfies).is_empty());
    }

    #[test]
    fn test_default_required() {
        let complete = switch(vec![n("N"), n("E"), n("S"), n("W")]);
        let unit = direction_unit()
            .with_node(Node::Switch(complete.clone().with_comment(
                "//exhaustive:enforce-default-case-required",
            )));
        assert_eq!(
            messages(&run(&unit, &AnalysisConfig::default())),
            vec!["missing default in switch of type Direction"]
        );

        let required = AnalysisConfig {
            default_case_required: true,
            ..AnalysisConfig::default()
        };
        let opted_out = direction_unit().with_node(Node::Switch(
            complete.with_comment("//exhaustive:ignore-default-case-required"),
        ));
        assert!(run(&opted_out, &required).is_empty());

        let partial = direction_unit().with_node(Node::Switch(switch(vec![n("N")])));
        assert_eq!(
            messages(&run(&partial, &required)),
            vec![
                "missing default in switch of type Direction",
                "missing cases in switch of type Direction: E, S, W",
            ]
        );
    }

    #[test]
    fn test_map_literal_checked() {
        let literal = KeyedLiteral::new(Span::new("direction.go", 30, 9), dir_ty())
            .with_key(n("N"))
            .with_key(n("E"));
        let unit = direction_unit().with_node(Node::Map(literal));
        assert_eq!(
            messages(&run(&unit, &AnalysisConfig::default())),
            vec!["missing cases in map of type Direction: S, W"]
        );

        let switch_only = AnalysisConfig::default().with_checks(&[ConstructKind::Switch]);
        assert!(run(&unit, &switch_only).is_empty());
    }

    #[test]
    fn test_map_literal_directives() {
        let literal = || {
            KeyedLiteral::new(Span::new("direction.go", 30, 9), dir_ty())
                .with_key(n("N"))
                .with_key(n("E"))
        };
        let missing = vec!["missing cases in map of type Direction: S, W"];

        let ignored = direction_unit()
            .with_node(Node::Map(literal().with_comment("//exhaustive:ignore")));
        assert!(run(&ignored, &AnalysisConfig::default()).is_empty());

        let conflicted = direction_unit().with_node(Node::Map(
            literal()
                .with_comment("//exhaustive:ignore")
                .with_comment("//exhaustive:enforce"),
        ));
        let diags = run(&conflicted, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["failed to parse directives: conflicting directives \"ignore\" and \"enforce\""]
        );
        assert_eq!(diags[0].construct, ConstructKind::Map);

        let explicit = AnalysisConfig {
            explicit_map: true,
            ..AnalysisConfig::default()
        };
        let plain = direction_unit().with_node(Node::Map(literal()));
        assert!(run(&plain, &explicit).is_empty());
        assert_eq!(messages(&run(&plain, &AnalysisConfig::default())), missing);

        let enforced = direction_unit()
            .with_node(Node::Map(literal().with_comment("//exhaustive:enforce")));
        assert_eq!(messages(&run(&enforced, &explicit)), missing);

        // explicit mode for maps leaves switches alone
        let switched = direction_unit().with_node(Node::Switch(switch(vec![n("N")])));
        assert_eq!(run(&switched, &explicit).len(), 1);
    }

    #[test]
    fn test_nested_constructs_walked() {
        let inner = switch(vec![n("N")]);
        let outer = Dispatch::new(Span::new("direction.go", 10, 1), dir_ty())
            .with_clause(CaseClause::case(vec![n("N"), n("E"), n("S"), n("W")]).with_body(
                Node::Block {
                    body: vec![Node::Switch(inner)],
                },
            ))
            .with_comment("//exhaustive:ignore");
        let unit = direction_unit().with_node(Node::Switch(outer));
        assert_eq!(
            messages(&run(&unit, &AnalysisConfig::default())),
            vec!["missing cases in switch of type Direction: E, S, W"]
        );
    }

    #[test]
    fn test_foreign_enum_from_store() {
        let upstream = direction_unit()
            .with_const(ConstDecl::new("hidden", dir_ty(), ConstValue::int(5)).private());
        let store = FactStore::new();
        store
            .publish_catalog(&upstream.id, &build_catalog(&upstream))
            .unwrap();

        let app = CompilationUnit::new("example.com/app", "app")
            .with_import(DIR)
            .with_node(Node::Switch(switch(vec![n("N"), n("W")])));
        let catalog = build_catalog(&app);
        let diags = analyze_unit(&app, &catalog, &store, &AnalysisConfig::default());
        assert_eq!(
            messages(&diags),
            vec!["missing cases in switch of type direction.Direction: direction.E, direction.S"]
        );

        let cfg = AnalysisConfig {
            include_non_public: true,
            ..AnalysisConfig::default()
        };
        let diags = analyze_unit(&app, &catalog, &store, &cfg);
        assert!(diags[0].message.ends_with("direction.hidden"));
    }

    #[test]
    fn test_union_type_param() {
        let color_id = TypeId::new(DIR, "Color");
        let color = TypeRef::named(color_id.clone());
        let unit = direction_unit()
            .with_type(TypeDecl::new("Color", BasicKind::String))
            .with_const(ConstDecl::new("Red", color.clone(), ConstValue::text("r")))
            .with_const(ConstDecl::new("Blue", color.clone(), ConstValue::text("b")));
        let param = TypeRef::param("T", [dir_ty(), color]);
        let dispatch = Dispatch::new(Span::new("direction.go", 40, 2), param)
            .with_clause(CaseClause::case(vec![n("N"), n("E"), n("S"), n("W"), n("Red")]));
        let unit = unit.with_node(Node::Switch(dispatch));
        assert_eq!(
            messages(&run(&unit, &AnalysisConfig::default())),
            vec!["missing cases in switch of type Direction|Color: Blue"]
        );
    }

    #[test]
    fn test_union_with_non_enum_skipped() {
        let param = TypeRef::param(
            "T",
            [
                dir_ty(),
                TypeRef::Basic {
                    basic: BasicKind::String,
                },
            ],
        );
        let unit = direction_unit().with_node(Node::Switch(Dispatch::new(Span::default(), param)));
        assert!(run(&unit, &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_ignored_types_and_members() {
        let unit = direction_unit().with_node(Node::Switch(switch(vec![n("N"), n("E")])));
        let cfg = AnalysisConfig::default()
            .with_ignore_types(r"^example\.com/direction\.Direction$")
            .unwrap();
        assert!(run(&unit, &cfg).is_empty());

        let cfg = AnalysisConfig::default()
            .with_ignore_members(r"\.(S|W)$")
            .unwrap();
        assert!(run(&unit, &cfg).is_empty());
    }

    #[test]
    fn test_generated_unit_skipped() {
        let unit = direction_unit()
            .generated(true)
            .with_node(Node::Switch(switch(vec![n("N")])));
        assert!(run(&unit, &AnalysisConfig::default()).is_empty());
        let cfg = AnalysisConfig {
            check_generated: true,
            ..AnalysisConfig::default()
        };
        assert_eq!(run(&unit, &cfg).len(), 1);
    }

    #[test]
    fn test_local_scope_enum_checked_separately() {
        let scope = ScopeId(3);
        let local_id = TypeId::local(DIR, scope, "Direction");
        let local_ty = TypeRef::named(local_id);
        let unit = direction_unit()
            .with_type(TypeDecl::new("Direction", BasicKind::Int).in_scope(scope))
            .with_const(ConstDecl::new("Left", local_ty.clone(), ConstValue::int(1)).in_scope(scope))
            .with_const(ConstDecl::new("Right", local_ty.clone(), ConstValue::int(2)).in_scope(scope))
            .with_node(Node::Switch(
                Dispatch::new(Span::new("direction.go", 50, 3), local_ty).with_clause(
                    CaseClause::case(vec![
                        Expr::ident(ObjectRef::new(DIR, "Left").in_scope(scope)),
                        // the unit-scope N is a different enum's member
                        n("N"),
                    ]),
                ),
            ));
        assert_eq!(
            messages(&run(&unit, &AnalysisConfig::default())),
            vec!["missing cases in switch of type Direction: Right"]
        );

        let scoped = AnalysisConfig {
            package_scope_only: true,
            ..AnalysisConfig::default()
        };
        assert!(run(&unit, &scoped).is_empty());
    }
}
