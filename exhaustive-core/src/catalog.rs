//! Enum discovery for one compilation unit.
//!
//! An enum here is a named type backed by an integer, float or string
//! primitive together with the constants of that type declared in the same
//! scope as the type. Members keep their declaration order; members that
//! share a constant value form a value group.
//!
//! ```text
//! type Direction int          members:       [N, E, S, W, Up]
//! const (                     value_of:      N→1 E→2 S→3 W→4 Up→1
//!     N Direction = 1         names_of_value 1→[N, Up] 2→[E] 3→[S] 4→[W]
//!     E = 2 ...
//!     Up = N
//! )
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directive::declaration_ignored;
use crate::unit::{CompilationUnit, TypeDecl, TypeId};
use crate::value::ConstValue;

/// Name used to discard a value without naming it.
pub const PLACEHOLDER: &str = "_";

/// True for the placeholder name, which never takes part in checking.
pub fn is_placeholder(name: &str) -> bool {
    name == PLACEHOLDER
}

/// One named constant of an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub public: bool,
    pub value: ConstValue,
}

/// All members of one enum type, with value grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EnumSnapshot", into = "EnumSnapshot")]
pub struct EnumDefinition {
    id: TypeId,
    unit_name: String,
    members: Vec<EnumMember>,
    index_of: HashMap<String, usize>,
    names_of_value: HashMap<ConstValue, Vec<String>>,
}

/// Serialized form; the lookup tables are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct EnumSnapshot {
    id: TypeId,
    unit_name: String,
    members: Vec<EnumMember>,
}

impl From<EnumSnapshot> for EnumDefinition {
    fn from(s: EnumSnapshot) -> Self {
        let mut def = EnumDefinition::new(s.id, s.unit_name);
        for m in s.members {
            def.push_member(m);
        }
        def
    }
}

impl From<EnumDefinition> for EnumSnapshot {
    fn from(d: EnumDefinition) -> Self {
        Self {
            id: d.id,
            unit_name: d.unit_name,
            members: d.members,
        }
    }
}

impl EnumDefinition {
    pub fn new(id: TypeId, unit_name: impl Into<String>) -> Self {
        Self {
            id,
            unit_name: unit_name.into(),
            members: Vec::new(),
            index_of: HashMap::new(),
            names_of_value: HashMap::new(),
        }
    }

    /// Appends a member. Placeholders and repeated names are refused.
    pub fn push_member(&mut self, member: EnumMember) -> bool {
        if is_placeholder(&member.name) || self.index_of.contains_key(&member.name) {
            return false;
        }
        self.index_of
            .insert(member.name.clone(), self.members.len());
        self.names_of_value
            .entry(member.value.clone())
            .or_default()
            .push(member.name.clone());
        self.members.push(member);
        true
    }

    pub fn id(&self) -> &TypeId {
        &self.id
    }

    /// Display name of the owning unit.
    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.index_of.get(name).map(|&i| &self.members[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of.contains_key(name)
    }

    /// Declaration index of a member.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_of.get(name).copied()
    }

    pub fn value_of(&self, name: &str) -> Option<&ConstValue> {
        self.member(name).map(|m| &m.value)
    }

    /// Members sharing `value`, in declaration order.
    pub fn names_of_value(&self, value: &ConstValue) -> &[String] {
        self.names_of_value
            .get(value)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct values.
    pub fn value_count(&self) -> usize {
        self.names_of_value.len()
    }

    /// `<unit id>.<member>`, the form exclusion patterns match against.
    pub fn qualified_member(&self, name: &str) -> String {
        format!("{}.{}", self.id.unit, name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Enums discovered in one unit, keyed by type.
#[derive(Debug, Clone, Default)]
pub struct EnumCatalog {
    definitions: BTreeMap<TypeId, EnumDefinition>,
}

impl EnumCatalog {
    pub fn get(&self, id: &TypeId) -> Option<&EnumDefinition> {
        self.definitions.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl IntoIterator for EnumCatalog {
    type Item = EnumDefinition;
    type IntoIter = std::collections::btree_map::IntoValues<TypeId, EnumDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.into_values()
    }
}

/// Builds the enum catalog of `unit`.
///
/// Best effort: declarations that do not fit the enum shape are skipped,
/// never reported.
pub fn build_catalog(unit: &CompilationUnit) -> EnumCatalog {
    let candidates: HashMap<TypeId, &TypeDecl> = unit
        .types
        .iter()
        .filter(|t| t.underlying.is_enum_candidate())
        .filter(|t| !declaration_ignored(&t.comments, &t.name))
        .map(|t| (unit.type_id(t), t))
        .collect();

    let mut definitions: BTreeMap<TypeId, EnumDefinition> = BTreeMap::new();

    for c in &unit.consts {
        let Some(id) = c.ty.as_ref().and_then(|t| t.as_named()) else {
            continue;
        };
        if !candidates.contains_key(id) || id.scope != c.scope {
            continue;
        }
        if declaration_ignored(&c.comments, &c.name) {
            continue;
        }
        if let Some(group) = c.group {
            if declaration_ignored(unit.group_comments(group), &c.name) {
                continue;
            }
        }

        definitions
            .entry(id.clone())
            .or_insert_with(|| EnumDefinition::new(id.clone(), unit.name.clone()))
            .push_member(EnumMember {
                name: c.name.clone(),
                public: c.public,
                value: c.value.clone(),
            });
    }

    definitions.retain(|_, def| !def.is_empty());

    for def in definitions.values() {
        debug!(
            unit = %unit.id,
            enum_type = %def.id().name,
            members = def.len(),
            values = def.value_count(),
            "discovered enum"
        );
    }

    EnumCatalog { definitions }
}
