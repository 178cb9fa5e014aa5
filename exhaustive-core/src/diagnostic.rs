//! Diagnostic records and message rendering.
//!
//! Remaining members are shown in value groups: members sharing one value
//! are joined with `|`, groups are ordered by the declaration index of their
//! first member and separated by `, `. Names from another unit are
//! qualified with that unit's display name.

use std::fmt;

use serde::Serialize;

use crate::catalog::EnumDefinition;
use crate::checklist::Remaining;
use crate::config::ConstructKind;
use crate::directive::DirectiveError;
use crate::unit::{Span, UnitId};
use crate::value::ConstValue;

/// What a diagnostic reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingCases {
        type_name: String,
        missing: Vec<String>,
    },
    MissingDefault {
        type_name: String,
    },
    InvalidDirectives {
        detail: String,
    },
}

/// One finding about one construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub unit: UnitId,
    pub span: Span,
    pub construct: ConstructKind,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn missing_cases(
        unit: &UnitId,
        span: &Span,
        construct: ConstructKind,
        type_name: String,
        missing: Vec<String>,
    ) -> Self {
        let message = format!(
            "missing cases in {} of type {}: {}",
            construct,
            type_name,
            missing.join(", ")
        );
        Self {
            unit: unit.clone(),
            span: span.clone(),
            construct,
            kind: DiagnosticKind::MissingCases { type_name, missing },
            message,
        }
    }

    pub fn missing_default(
        unit: &UnitId,
        span: &Span,
        construct: ConstructKind,
        type_name: String,
    ) -> Self {
        let message = format!("missing default in {} of type {}", construct, type_name);
        Self {
            unit: unit.clone(),
            span: span.clone(),
            construct,
            kind: DiagnosticKind::MissingDefault { type_name },
            message,
        }
    }

    pub fn invalid_directives(
        unit: &UnitId,
        span: &Span,
        construct: ConstructKind,
        err: &DirectiveError,
    ) -> Self {
        Self {
            unit: unit.clone(),
            span: span.clone(),
            construct,
            kind: DiagnosticKind::InvalidDirectives {
                detail: err.to_string(),
            },
            message: format!("failed to parse directives: {}", err),
        }
    }

    /// Sort key giving a stable order across parallel runs.
    pub fn sort_key(&self) -> (&str, u32, u32, &str) {
        (
            &self.span.file,
            self.span.line,
            self.span.column,
            &self.message,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}

/// Sorts diagnostics by file, position and message.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

fn qualify(def: &EnumDefinition, name: &str, current: &UnitId) -> String {
    if &def.id().unit == current {
        name.to_string()
    } else {
        format!("{}.{}", def.unit_name(), name)
    }
}

/// Display name of an enum type as seen from unit `current`.
pub fn type_display(def: &EnumDefinition, current: &UnitId) -> String {
    qualify(def, &def.id().name, current)
}

/// Display name of a union of enum types, constituents joined with `|`.
pub fn union_display<'a>(
    defs: impl IntoIterator<Item = &'a EnumDefinition>,
    current: &UnitId,
) -> String {
    defs.into_iter()
        .map(|d| type_display(d, current))
        .collect::<Vec<_>>()
        .join("|")
}

/// Renders the uncovered members of one enum as display groups.
///
/// `names` must be in declaration order, which [`Remaining`] guarantees.
pub fn format_groups(def: &EnumDefinition, names: &[&str], current: &UnitId) -> Vec<String> {
    let mut groups: Vec<(&ConstValue, Vec<String>)> = Vec::new();
    for name in names {
        let Some(value) = def.value_of(name) else {
            continue;
        };
        let rendered = qualify(def, name, current);
        match groups.iter_mut().find(|(v, _)| *v == value) {
            Some((_, members)) => members.push(rendered),
            None => groups.push((value, vec![rendered])),
        }
    }
    groups.into_iter().map(|(_, m)| m.join("|")).collect()
}

/// Display groups for every constituent, constituents in checklist order.
pub fn missing_groups(remaining: &[Remaining<'_>], current: &UnitId) -> Vec<String> {
    remaining
        .iter()
        .flat_map(|r| format_groups(r.def, &r.names, current))
        .collect()
}
