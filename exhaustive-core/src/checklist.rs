//! Per-construct tracking of enum members still to be covered.
//!
//! A checklist starts from the required members of one enum (or of several,
//! for a dispatch over a union-constrained type parameter) and only ever
//! shrinks. Value grouping is computed within each constituent enum; equal
//! values in two different enums are never merged.

use std::collections::BTreeSet;

use regex::Regex;

use crate::catalog::{is_placeholder, EnumDefinition};
use crate::config::SatisfyStrategy;
use crate::unit::TypeId;
use crate::value::ConstValue;

#[derive(Debug, Clone)]
struct Entry<'d> {
    def: &'d EnumDefinition,
    /// Indices into `def.members()` still uncovered
    required: BTreeSet<usize>,
}

/// Uncovered members of one constituent enum, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Remaining<'d> {
    pub def: &'d EnumDefinition,
    pub names: Vec<&'d str>,
}

/// Mutable coverage state for a single construct.
#[derive(Debug, Clone)]
pub struct Checklist<'d> {
    strategy: SatisfyStrategy,
    entries: Vec<Entry<'d>>,
}

impl<'d> Checklist<'d> {
    /// An empty checklist; add constituents with [`Checklist::add`].
    pub fn new(strategy: SatisfyStrategy) -> Self {
        Self {
            strategy,
            entries: Vec::new(),
        }
    }

    /// Checklist over a single enum.
    pub fn init(
        def: &'d EnumDefinition,
        include_non_public: bool,
        exclude: Option<&Regex>,
        strategy: SatisfyStrategy,
    ) -> Self {
        let mut list = Self::new(strategy);
        list.add(def, include_non_public, exclude);
        list
    }

    /// Adds the required members of `def`. Adding the same enum twice is a no-op.
    pub fn add(&mut self, def: &'d EnumDefinition, include_non_public: bool, exclude: Option<&Regex>) {
        if self.entries.iter().any(|e| e.def.id() == def.id()) {
            return;
        }
        let required = def
            .members()
            .iter()
            .enumerate()
            .filter(|(_, m)| !is_placeholder(&m.name))
            .filter(|(_, m)| include_non_public || m.public)
            .filter(|(_, m)| {
                exclude.map_or(true, |re| !re.is_match(&def.qualified_member(&m.name)))
            })
            .map(|(i, _)| i)
            .collect();
        self.entries.push(Entry { def, required });
    }

    fn entry_mut(&mut self, ty: &TypeId) -> Option<&mut Entry<'d>> {
        self.entries.iter_mut().find(|e| e.def.id() == ty)
    }

    /// Marks `name` of enum `ty` as covered.
    ///
    /// Under [`SatisfyStrategy::ByValue`] every member sharing its value is
    /// covered too. Names that are not members of `ty` change nothing.
    pub fn satisfy(&mut self, ty: &TypeId, name: &str) {
        let strategy = self.strategy;
        let Some(entry) = self.entry_mut(ty) else {
            return;
        };
        let def = entry.def;
        let Some(index) = def.index_of(name) else {
            return;
        };
        match strategy {
            SatisfyStrategy::ByName => {
                entry.required.remove(&index);
            }
            SatisfyStrategy::ByValue => {
                let value = &def.members()[index].value;
                for sibling in def.names_of_value(value) {
                    if let Some(i) = def.index_of(sibling) {
                        entry.required.remove(&i);
                    }
                }
            }
        }
    }

    /// Marks every member of `ty` holding `value` as covered.
    ///
    /// Only meaningful under [`SatisfyStrategy::ByValue`]; a bare value does
    /// not name a member, so by-name checking ignores it.
    pub fn satisfy_value(&mut self, ty: &TypeId, value: &ConstValue) {
        if self.strategy != SatisfyStrategy::ByValue {
            return;
        }
        let Some(entry) = self.entry_mut(ty) else {
            return;
        };
        let def = entry.def;
        for name in def.names_of_value(value) {
            if let Some(i) = def.index_of(name) {
                entry.required.remove(&i);
            }
        }
    }

    /// Uncovered members per constituent; constituents with nothing left are omitted.
    pub fn remaining(&self) -> Vec<Remaining<'d>> {
        self.entries
            .iter()
            .filter(|e| !e.required.is_empty())
            .map(|e| Remaining {
                def: e.def,
                names: e
                    .required
                    .iter()
                    .map(|&i| e.def.members()[i].name.as_str())
                    .collect(),
            })
            .collect()
    }

    /// Flattened uncovered member names.
    pub fn remaining_names(&self) -> Vec<&'d str> {
        self.remaining().into_iter().flat_map(|r| r.names).collect()
    }

    pub fn is_satisfied(&self) -> bool {
        self.entries.iter().all(|e| e.required.is_empty())
    }

    pub fn constituents(&self) -> impl Iterator<Item = &'d EnumDefinition> + '_ {
        self.entries.iter().map(|e| e.def)
    }
}
