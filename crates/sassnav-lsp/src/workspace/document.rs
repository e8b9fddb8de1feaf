//! Document records and the symbols and module links they carry.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use tower_lsp::lsp_types::{Location, Position, Url};

use super::line_index::LineIndex;
use super::parser::Dialect;
use super::sassdoc::SassDoc;

/// Whether a declared name is private to its module (`$-x`, `_x`)
pub fn is_private_name(name: &str) -> bool {
    let bare = name.strip_prefix('$').unwrap_or(name);
    bare.starts_with('-') || bare.starts_with('_')
}

/// Mixin or function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallableKind {
    Mixin,
    Function,
}

/// The signature a parameter or callable-local variable belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallableRef {
    pub kind: CallableKind,
    pub name: String,
}

/// A declared variable, parameter, or callable-local variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSymbol {
    /// Name including the `$` sigil
    pub name: String,
    /// Raw value expression; for parameters the default, None when absent
    pub value: Option<String>,
    /// Byte offset of the name
    pub offset: usize,
    pub position: Position,
    /// Set for parameters and variables declared inside a callable body
    pub owner: Option<CallableRef>,
    pub doc: Option<SassDoc>,
    pub is_private: bool,
    pub is_default: bool,
    pub is_global: bool,
    /// Rest parameter (`$args...`)
    pub is_rest: bool,
}

/// A declared mixin or function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableSymbol {
    pub name: String,
    pub kind: CallableKind,
    pub parameters: Vec<VariableSymbol>,
    /// Variables declared inside the body
    pub locals: Vec<VariableSymbol>,
    pub offset: usize,
    pub position: Position,
    /// Byte range of the body, when the declaration has one
    pub body: Option<Range<usize>>,
    pub doc: Option<SassDoc>,
    pub is_private: bool,
}

pub type MixinSymbol = CallableSymbol;
pub type FunctionSymbol = CallableSymbol;

impl CallableSymbol {
    pub fn callable_ref(&self) -> CallableRef {
        CallableRef {
            kind: self.kind,
            name: self.name.clone(),
        }
    }

    /// Whether `offset` is inside the signature's scope (parameter list or body)
    pub fn scope_contains(&self, offset: usize) -> bool {
        match &self.body {
            Some(body) => self.offset <= offset && offset <= body.end,
            None => false,
        }
    }

    /// `name($a, $b: 1)` rendering of the signature
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| {
                let rest = if p.is_rest { "..." } else { "" };
                match &p.value {
                    Some(default) => format!("{}{}: {}", p.name, rest, default),
                    None => format!("{}{}", p.name, rest),
                }
            })
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// Namespace a `@use` binds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    Named(String),
    /// `as *`: members are visible unqualified
    Wildcard,
}

impl Namespace {
    pub fn as_str(&self) -> &str {
        match self {
            Namespace::Named(name) => name,
            Namespace::Wildcard => "*",
        }
    }
}

/// `@use "path" [as ns] [with (...)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseLink {
    pub link: String,
    pub target: Option<Url>,
    pub namespace: Namespace,
    pub is_aliased: bool,
    /// Raw `with (...)` configuration
    pub configuration: Option<String>,
    /// Byte span of the reference string, quotes excluded
    pub span: Range<usize>,
}

/// `@forward "path" [as prefix-*] [hide|show names] [with (...)]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardLink {
    pub link: String,
    pub target: Option<Url>,
    pub prefix: Option<String>,
    /// Names never exposed through this forward (variables keep `$`)
    pub hide: BTreeSet<String>,
    /// When present, the only names exposed through this forward
    pub show: Option<BTreeSet<String>>,
    pub configuration: Option<String>,
    pub span: Range<usize>,
}

impl ForwardLink {
    /// Whether a name (as seen at this hop) passes the hide/show filter
    pub fn exposes(&self, name: &str) -> bool {
        if self.hide.contains(name) {
            return false;
        }
        match &self.show {
            Some(show) => show.contains(name),
            None => true,
        }
    }
}

/// Legacy `@import "path"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLink {
    pub link: String,
    pub target: Option<Url>,
    pub span: Range<usize>,
}

/// A module link of any kind, borrowed from a record
#[derive(Debug, Clone, Copy)]
pub enum LinkRef<'a> {
    Use(&'a UseLink),
    Forward(&'a ForwardLink),
    Import(&'a ImportLink),
}

impl<'a> LinkRef<'a> {
    pub fn link(&self) -> &'a str {
        match self {
            LinkRef::Use(l) => &l.link,
            LinkRef::Forward(l) => &l.link,
            LinkRef::Import(l) => &l.link,
        }
    }

    pub fn target(&self) -> Option<&'a Url> {
        match self {
            LinkRef::Use(l) => l.target.as_ref(),
            LinkRef::Forward(l) => l.target.as_ref(),
            LinkRef::Import(l) => l.target.as_ref(),
        }
    }

    pub fn span(&self) -> Range<usize> {
        match self {
            LinkRef::Use(l) => l.span.clone(),
            LinkRef::Forward(l) => l.span.clone(),
            LinkRef::Import(l) => l.span.clone(),
        }
    }
}

/// Everything known about one stylesheet
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub uri: Url,
    /// Editor version for open documents, None for files read from disk
    pub version: Option<i32>,
    pub text: String,
    pub dialect: Dialect,
    pub line_index: LineIndex,
    pub variables: HashMap<String, VariableSymbol>,
    pub mixins: HashMap<String, MixinSymbol>,
    pub functions: HashMap<String, FunctionSymbol>,
    pub imports: Vec<ImportLink>,
    /// Keyed by resolved target URI, or by the raw reference when unresolved
    pub uses: HashMap<String, UseLink>,
    pub forwards: HashMap<String, ForwardLink>,
}

impl DocumentRecord {
    /// Identity key for a link in `uses` / `forwards`
    pub fn link_key(target: Option<&Url>, link: &str) -> String {
        target
            .map(|t| t.to_string())
            .unwrap_or_else(|| link.to_string())
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position(&self.text, offset)
    }

    pub fn offset_at(&self, position: Position) -> usize {
        self.line_index.offset(&self.text, position)
    }

    /// Location of `len` bytes starting at `offset`
    pub fn location(&self, offset: usize, len: usize) -> Location {
        Location::new(
            self.uri.clone(),
            self.line_index.range(&self.text, offset, offset + len),
        )
    }

    /// Mixins and functions
    pub fn callables(&self) -> impl Iterator<Item = &CallableSymbol> {
        self.mixins.values().chain(self.functions.values())
    }

    /// The callable whose scope contains `offset`
    pub fn callable_at(&self, offset: usize) -> Option<&CallableSymbol> {
        self.callables().find(|c| c.scope_contains(offset))
    }

    /// Every link: uses, forwards, then imports
    pub fn links(&self) -> impl Iterator<Item = LinkRef<'_>> {
        self.uses
            .values()
            .map(LinkRef::Use)
            .chain(self.forwards.values().map(LinkRef::Forward))
            .chain(self.imports.iter().map(LinkRef::Import))
    }

    /// Resolved link targets, duplicates included
    pub fn link_targets(&self) -> impl Iterator<Item = &Url> {
        self.links().filter_map(|l| l.target())
    }
}
