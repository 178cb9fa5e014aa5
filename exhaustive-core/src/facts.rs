//! Cross-unit registry of enum definitions.
//!
//! The owning unit publishes each of its enums once; any later unit may look
//! them up. Entries are write-once: a second publish for the same type is an
//! error rather than an overwrite, so diagnostics cannot depend on which of
//! two racing writers won.
//!
//! Reads vastly outnumber writes (one write per enum, one read per checked
//! construct), so a single `RwLock` around the map is all the locking needed.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{EnumCatalog, EnumDefinition};
use crate::error::{ExhaustiveError, ExhaustiveResult};
use crate::unit::{TypeId, UnitId};

/// Snapshot of one published enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    /// Unit that published the definition
    pub unit: UnitId,
    pub definition: EnumDefinition,
}

impl FactRecord {
    pub fn type_id(&self) -> &TypeId {
        self.definition.id()
    }
}

/// Shared, write-once map from type identity to its enum definition.
#[derive(Debug, Default)]
pub struct FactStore {
    records: RwLock<HashMap<TypeId, Arc<FactRecord>>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `definition` on behalf of `unit`.
    ///
    /// Fails with [`ExhaustiveError::DuplicatePublish`] if the type has
    /// already been published.
    pub fn publish(&self, unit: &UnitId, definition: EnumDefinition) -> ExhaustiveResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ExhaustiveError::internal("fact store lock poisoned"))?;

        let key = definition.id().clone();
        if records.contains_key(&key) {
            return Err(ExhaustiveError::duplicate_publish(unit, &key));
        }

        debug!(unit = %unit, enum_type = %key, "published enum fact");
        records.insert(
            key,
            Arc::new(FactRecord {
                unit: unit.clone(),
                definition,
            }),
        );
        Ok(())
    }

    /// Publishes every enum of a unit's catalog, stopping at the first failure.
    pub fn publish_catalog(&self, unit: &UnitId, catalog: &EnumCatalog) -> ExhaustiveResult<usize> {
        let mut published = 0;
        for def in catalog.iter() {
            self.publish(unit, def.clone())?;
            published += 1;
        }
        Ok(published)
    }

    /// Looks up an enum by type. Unknown types yield `None` ("not an enum").
    pub fn lookup(&self, id: &TypeId) -> Option<Arc<FactRecord>> {
        let records = self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.get(id).cloned()
    }

    /// Looks up an enum definition by type.
    pub fn definition(&self, id: &TypeId) -> Option<EnumDefinition> {
        self.lookup(id).map(|r| r.definition.clone())
    }

    /// All records, sorted by type for deterministic output.
    pub fn records(&self) -> Vec<Arc<FactRecord>> {
        let records = self
            .records
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut out: Vec<_> = records.values().cloned().collect();
        out.sort_by(|a, b| a.type_id().cmp(b.type_id()));
        out
    }

    /// Records published by `unit`.
    pub fn records_of(&self, unit: &UnitId) -> Vec<FactRecord> {
        self.records()
            .into_iter()
            .filter(|r| &r.unit == unit)
            .map(|r| (*r).clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .map(|r| r.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
