//! Control comments attached to dispatch constructs and declarations.
//!
//! A directive is a comment line of the form `//exhaustive:<keyword>`; any
//! text after the first whitespace is free-form commentary. Which comments
//! belong to which node is decided by the resolver, so this module only ever
//! sees the comments already attributed to one node.

use std::fmt;

use thiserror::Error;

/// Prefix shared by every directive comment.
pub const DIRECTIVE_PREFIX: &str = "//exhaustive:";

/// A single directive kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Skip this construct
    Ignore,
    /// Check this construct even in explicit mode
    Enforce,
    /// A default clause is not required here
    IgnoreDefaultCaseRequired,
    /// A default clause is required here
    EnforceDefaultCaseRequired,
}

impl Directive {
    const ALL: [Directive; 4] = [
        Directive::Ignore,
        Directive::Enforce,
        Directive::IgnoreDefaultCaseRequired,
        Directive::EnforceDefaultCaseRequired,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Enforce => "enforce",
            Self::IgnoreDefaultCaseRequired => "ignore-default-case-required",
            Self::EnforceDefaultCaseRequired => "enforce-default-case-required",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.keyword() == keyword)
    }

    fn bit(self) -> u8 {
        match self {
            Self::Ignore => 1,
            Self::Enforce => 1 << 1,
            Self::IgnoreDefaultCaseRequired => 1 << 2,
            Self::EnforceDefaultCaseRequired => 1 << 3,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Set of directives present on one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectiveSet(u8);

impl DirectiveSet {
    pub fn insert(&mut self, d: Directive) {
        self.0 |= d.bit();
    }

    pub fn has(&self, d: Directive) -> bool {
        self.0 & d.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Directive> + '_ {
        Directive::ALL.into_iter().filter(|d| self.has(*d))
    }

    /// Rejects sets holding both halves of an opposing pair.
    pub fn validate(&self) -> Result<(), DirectiveError> {
        const OPPOSING: [(Directive, Directive); 2] = [
            (Directive::Ignore, Directive::Enforce),
            (
                Directive::IgnoreDefaultCaseRequired,
                Directive::EnforceDefaultCaseRequired,
            ),
        ];
        for (a, b) in OPPOSING {
            if self.has(a) && self.has(b) {
                return Err(DirectiveError::Conflict { a, b });
            }
        }
        Ok(())
    }
}

impl FromIterator<Directive> for DirectiveSet {
    fn from_iter<I: IntoIterator<Item = Directive>>(iter: I) -> Self {
        let mut set = Self::default();
        for d in iter {
            set.insert(d);
        }
        set
    }
}

/// Directive problems on a single node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("conflicting directives \"{a}\" and \"{b}\"")]
    Conflict { a: Directive, b: Directive },

    #[error("invalid directive \"{keyword}\"")]
    Invalid { keyword: String },
}

/// Parses the directives among `comments`.
///
/// Comments without the [`DIRECTIVE_PREFIX`] are ignored.
pub fn parse_directives<S: AsRef<str>>(comments: &[S]) -> Result<DirectiveSet, DirectiveError> {
    let mut out = DirectiveSet::default();
    for comment in comments {
        let line = comment.as_ref().trim();
        let Some(rest) = line.strip_prefix(DIRECTIVE_PREFIX) else {
            continue;
        };
        let keyword = rest
            .split(|c: char| c == ' ' || c == '\t')
            .next()
            .unwrap_or_default();
        match Directive::from_keyword(keyword) {
            Some(d) => out.insert(d),
            None => {
                return Err(DirectiveError::Invalid {
                    keyword: keyword.to_string(),
                })
            }
        }
    }
    out.validate()?;
    Ok(out)
}

/// True when a declaration carries `//exhaustive:ignore`.
///
/// Malformed directive comments on declarations are logged and treated as
/// absent so a typo never drops members silently.
pub fn declaration_ignored<S: AsRef<str>>(comments: &[S], what: &str) -> bool {
    match parse_directives(comments) {
        Ok(set) => set.has(Directive::Ignore),
        Err(e) => {
            tracing::warn!(declaration = %what, error = %e, "ignoring malformed directive");
            false
        }
    }
}
