//! Resolved syntax model consumed by the pass.
//!
//! The parser and type resolver live outside this crate. They hand over one
//! [`CompilationUnit`] per unit with every identifier already bound to its
//! declaration and every constant already evaluated. Only the node kinds the
//! exhaustiveness pass cares about are modelled; everything else collapses
//! into `Other`/`Opaque`.
//!
//! Units are usually read from `*.unit.json` files, but the builder methods
//! below let callers (and tests) assemble them in memory.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::ConstValue;

/// Identity of a compilation unit (its import path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Lexical scope of a declaration. `0` is the unit's top-level scope.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const UNIT: ScopeId = ScopeId(0);

    pub fn is_unit(self) -> bool {
        self == Self::UNIT
    }
}

/// Identity of a named type: owning unit, declaring scope and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId {
    pub unit: UnitId,
    #[serde(default)]
    pub scope: ScopeId,
    pub name: String,
}

impl TypeId {
    /// A type declared at unit scope.
    pub fn new(unit: impl Into<UnitId>, name: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            scope: ScopeId::UNIT,
            name: name.into(),
        }
    }

    /// A type declared in a local scope.
    pub fn local(unit: impl Into<UnitId>, scope: ScopeId, name: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            scope,
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.unit, self.name)
    }
}

impl From<String> for UnitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Underlying representation kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Int,
    Uint,
    Float,
    String,
    Bool,
    Complex,
    Other,
}

impl BasicKind {
    /// Integer, floating-point and text types can back an enum.
    pub fn is_enum_candidate(self) -> bool {
        matches!(self, Self::Int | Self::Uint | Self::Float | Self::String)
    }
}

/// Resolved static type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeRef {
    Named { id: TypeId },
    /// Generic type parameter whose constraint is a union of types
    Param {
        name: String,
        #[serde(default)]
        constraint: Vec<TypeRef>,
    },
    Basic { basic: BasicKind },
    Other,
}

impl TypeRef {
    pub fn named(id: TypeId) -> Self {
        Self::Named { id }
    }

    pub fn param(name: impl Into<String>, constraint: impl IntoIterator<Item = TypeRef>) -> Self {
        Self::Param {
            name: name.into(),
            constraint: constraint.into_iter().collect(),
        }
    }

    pub fn as_named(&self) -> Option<&TypeId> {
        match self {
            Self::Named { id } => Some(id),
            _ => None,
        }
    }
}

/// Declaration an identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub unit: UnitId,
    #[serde(default)]
    pub scope: ScopeId,
    pub name: String,
}

impl ObjectRef {
    pub fn new(unit: impl Into<UnitId>, name: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            scope: ScopeId::UNIT,
            name: name.into(),
        }
    }

    pub fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = scope;
        self
    }
}

/// Source position of a construct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

fn default_public() -> bool {
    true
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub scope: ScopeId,
    pub underlying: BasicKind,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, underlying: BasicKind) -> Self {
        Self {
            name: name.into(),
            scope: ScopeId::UNIT,
            underlying,
            comments: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

/// A constant declaration with its evaluated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: String,
    #[serde(default)]
    pub scope: ScopeId,
    /// Resolved type; `None` for untyped constants
    #[serde(default)]
    pub ty: Option<TypeRef>,
    pub value: ConstValue,
    #[serde(default = "default_public")]
    pub public: bool,
    /// Declaration block this constant belongs to
    #[serde(default)]
    pub group: Option<u32>,
    #[serde(default)]
    pub comments: Vec<String>,
    /// Initializer, kept so aliases of other constants can be followed
    #[serde(default)]
    pub init: Option<Expr>,
    #[serde(default)]
    pub span: Span,
}

impl ConstDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef, value: ConstValue) -> Self {
        Self {
            name: name.into(),
            scope: ScopeId::UNIT,
            ty: Some(ty),
            value,
            public: true,
            group: None,
            comments: Vec::new(),
            init: None,
            span: Span::default(),
        }
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = scope;
        self
    }

    pub fn in_group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }
}

/// A declaration block (`const ( ... )`) and the comments attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclGroup {
    pub id: u32,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Expression shapes that can appear as a case value or literal key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Expr {
    Ident {
        #[serde(default)]
        object: Option<ObjectRef>,
        #[serde(default)]
        ty: Option<TypeRef>,
        #[serde(default)]
        value: Option<ConstValue>,
    },
    Paren {
        expr: Box<Expr>,
    },
    Convert {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Literal {
        value: ConstValue,
    },
    Opaque,
}

impl Expr {
    /// Identifier bound to `object`, without type or value annotations.
    pub fn ident(object: ObjectRef) -> Self {
        Self::Ident {
            object: Some(object),
            ty: None,
            value: None,
        }
    }

    /// Identifier naming a unit-scope constant of `unit`.
    pub fn constant(unit: impl Into<UnitId>, name: impl Into<String>) -> Self {
        Self::ident(ObjectRef::new(unit, name))
    }

    pub fn paren(inner: Expr) -> Self {
        Self::Paren {
            expr: Box::new(inner),
        }
    }

    pub fn convert(ty: TypeRef, inner: Expr) -> Self {
        Self::Convert {
            ty,
            expr: Box::new(inner),
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut e = self;
        while let Self::Paren { expr } = e {
            e = expr;
        }
        e
    }
}

/// Syntax nodes walked by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    /// Tag-dispatch construct
    Switch(Dispatch),
    /// Keyed-literal construct
    Map(KeyedLiteral),
    Block {
        #[serde(default)]
        body: Vec<Node>,
    },
    Other,
}

/// A branch statement selecting a clause by the value of its tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub tag_type: Option<TypeRef>,
    #[serde(default)]
    pub clauses: Vec<CaseClause>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Dispatch {
    pub fn new(span: Span, tag_type: TypeRef) -> Self {
        Self {
            span,
            tag_type: Some(tag_type),
            clauses: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_clause(mut self, clause: CaseClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.clauses.iter().any(CaseClause::is_default)
    }
}

/// One clause of a dispatch. An empty expression list is the default clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    #[serde(default)]
    pub exprs: Vec<Expr>,
    #[serde(default)]
    pub body: Vec<Node>,
}

impl CaseClause {
    pub fn case(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            exprs: exprs.into_iter().collect(),
            body: Vec::new(),
        }
    }

    pub fn default_clause() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, node: Node) -> Self {
        self.body.push(node);
        self
    }

    pub fn is_default(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// A literal mapping whose keys may be enum members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedLiteral {
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub key_type: Option<TypeRef>,
    #[serde(default)]
    pub entries: Vec<KeyedEntry>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl KeyedLiteral {
    pub fn new(span: Span, key_type: TypeRef) -> Self {
        Self {
            span,
            key_type: Some(key_type),
            entries: Vec::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: Expr) -> Self {
        self.entries.push(KeyedEntry {
            key,
            value: Vec::new(),
        });
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedEntry {
    pub key: Expr,
    /// Nodes nested in the value expression (closures, nested literals)
    #[serde(default)]
    pub value: Vec<Node>,
}

/// One compilation unit as produced by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub id: UnitId,
    /// Display name used to qualify foreign names in messages
    pub name: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub imports: Vec<UnitId>,
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub consts: Vec<ConstDecl>,
    #[serde(default)]
    pub groups: Vec<DeclGroup>,
    #[serde(default)]
    pub body: Vec<Node>,
}

impl CompilationUnit {
    pub fn new(id: impl Into<UnitId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file: String::new(),
            imports: Vec::new(),
            generated: false,
            types: Vec::new(),
            consts: Vec::new(),
            groups: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Parses a unit from its JSON form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_import(mut self, unit: impl Into<UnitId>) -> Self {
        self.imports.push(unit.into());
        self
    }

    pub fn generated(mut self, generated: bool) -> Self {
        self.generated = generated;
        self
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn with_const(mut self, decl: ConstDecl) -> Self {
        self.consts.push(decl);
        self
    }

    pub fn with_group(mut self, id: u32, comments: impl IntoIterator<Item = String>) -> Self {
        self.groups.push(DeclGroup {
            id,
            comments: comments.into_iter().collect(),
        });
        self
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.body.push(node);
        self
    }

    /// Type identity for a type declared in this unit.
    pub fn type_id(&self, decl: &TypeDecl) -> TypeId {
        TypeId::local(self.id.clone(), decl.scope, decl.name.clone())
    }

    /// Looks up a constant declared in this unit.
    pub fn const_decl(&self, scope: ScopeId, name: &str) -> Option<&ConstDecl> {
        self.consts
            .iter()
            .find(|c| c.scope == scope && c.name == name)
    }

    pub fn group_comments(&self, id: u32) -> &[String] {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.comments.as_slice())
            .unwrap_or(&[])
    }
}
