//! Unit dependency graph and wave scheduling.
//!
//! An edge runs from an imported unit to the unit importing it, so a
//! unit's enums are always published before any importer is checked.
//! Units are scheduled in waves: every unit in a wave only imports units of
//! earlier waves, so the units of one wave can run in parallel.
//!
//! Complexity: O(|V| + |E|) for both graph build and scheduling.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::error::{ExhaustiveError, ExhaustiveResult};
use crate::unit::CompilationUnit;

/// Builds the import graph over the units of one run.
///
/// Imports of units outside the run are left out; their enums can only come
/// from the fact cache.
pub fn build_unit_graph(units: &[CompilationUnit]) -> DiGraphMap<&str, ()> {
    let mut g = DiGraphMap::new();

    for unit in units {
        g.add_node(unit.id.as_str());
    }

    for unit in units {
        for import in &unit.imports {
            if g.contains_node(import.as_str()) {
                g.add_edge(import.as_str(), unit.id.as_str(), ());
            }
        }
    }

    g
}

/// Orders units into dependency waves.
///
/// Units within a wave are sorted by id. Fails on duplicate unit ids and on
/// import cycles.
pub fn schedule_units(units: &[CompilationUnit]) -> ExhaustiveResult<Vec<Vec<&CompilationUnit>>> {
    let mut by_id: HashMap<&str, &CompilationUnit> = HashMap::with_capacity(units.len());
    for unit in units {
        if let Some(first) = by_id.insert(unit.id.as_str(), unit) {
            return Err(ExhaustiveError::parse(
                &unit.file,
                format!("unit {} is also defined in {}", unit.id, first.file),
            ));
        }
    }

    let g = build_unit_graph(units);
    let mut pending: HashMap<&str, usize> = g
        .nodes()
        .map(|n| (n, g.neighbors_directed(n, Direction::Incoming).count()))
        .collect();

    let mut waves = Vec::new();
    let mut ready: Vec<&str> = pending
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(&n, _)| n)
        .collect();

    while !ready.is_empty() {
        ready.sort_unstable();
        let mut next = Vec::new();
        for &id in &ready {
            pending.remove(id);
            for importer in g.neighbors_directed(id, Direction::Outgoing) {
                if let Some(deg) = pending.get_mut(importer) {
                    *deg -= 1;
                    if *deg == 0 {
                        next.push(importer);
                    }
                }
            }
        }
        waves.push(ready.iter().map(|id| by_id[id]).collect());
        ready = next;
    }

    if !pending.is_empty() {
        return Err(cycle_error(&g));
    }
    Ok(waves)
}

fn cycle_error(g: &DiGraphMap<&str, ()>) -> ExhaustiveError {
    let mut cycle = tarjan_scc(g)
        .into_iter()
        .find(|scc| scc.len() > 1 || scc.iter().any(|&n| g.contains_edge(n, n)))
        .unwrap_or_default();
    cycle.sort_unstable();
    if let Some(&first) = cycle.first() {
        cycle.push(first);
    }
    ExhaustiveError::cycle(cycle)
}
