//! Cross-file symbol resolution
//!
//! Visibility is derived from the store on every call. Walks over the
//! forward and import graphs use an explicit stack whose frames carry the
//! URIs on the current path. A URI already on the path contributes
//! nothing, so cyclic module graphs terminate.

use std::collections::HashSet;

use tower_lsp::lsp_types::{Position, Url};

use crate::workspace::document::{
    CallableKind, CallableSymbol, DocumentRecord, ForwardLink, Namespace, VariableSymbol,
};
use crate::workspace::sassdoc::SassDoc;
use crate::workspace::DocumentStore;

/// Kind of a resolved symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Variable,
    Mixin,
    Function,
}

impl From<CallableKind> for SymbolKind {
    fn from(kind: CallableKind) -> Self {
        match kind {
            CallableKind::Mixin => SymbolKind::Mixin,
            CallableKind::Function => SymbolKind::Function,
        }
    }
}

/// The declaration a resolved symbol points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Variable(VariableSymbol),
    Callable(CallableSymbol),
}

/// Identity of a declaration, shared by every path that reaches it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolId {
    pub origin: Url,
    pub kind: SymbolKind,
    pub offset: usize,
}

/// A symbol as seen from one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub kind: SymbolKind,
    /// Document that declares the symbol
    pub origin: Url,
    /// Namespace it is reached through; None when visible unqualified
    pub namespace: Option<String>,
    /// Accumulated `@forward ... as prefix-*` prefixes
    pub prefix: Option<String>,
    pub declaration: Declaration,
}

/// Apply a forward prefix, keeping the `$` sigil first
pub fn prefixed(name: &str, prefix: &str) -> String {
    match name.strip_prefix('$') {
        Some(bare) => format!("${}{}", prefix, bare),
        None => format!("{}{}", prefix, name),
    }
}

impl ResolvedSymbol {
    fn variable(origin: &Url, variable: &VariableSymbol) -> Self {
        Self {
            kind: SymbolKind::Variable,
            origin: origin.clone(),
            namespace: None,
            prefix: None,
            declaration: Declaration::Variable(variable.clone()),
        }
    }

    fn callable(origin: &Url, callable: &CallableSymbol) -> Self {
        Self {
            kind: callable.kind.into(),
            origin: origin.clone(),
            namespace: None,
            prefix: None,
            declaration: Declaration::Callable(callable.clone()),
        }
    }

    /// Name as declared (`$` kept for variables)
    pub fn name(&self) -> &str {
        match &self.declaration {
            Declaration::Variable(v) => &v.name,
            Declaration::Callable(c) => &c.name,
        }
    }

    /// Name with the forward prefix applied, without namespace
    pub fn visible_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => prefixed(self.name(), prefix),
            None => self.name().to_string(),
        }
    }

    /// Name as written at the use site (`ns.$color-c`, `ns.mixin`)
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.visible_name()),
            None => self.visible_name(),
        }
    }

    pub fn offset(&self) -> usize {
        match &self.declaration {
            Declaration::Variable(v) => v.offset,
            Declaration::Callable(c) => c.offset,
        }
    }

    pub fn position(&self) -> Position {
        match &self.declaration {
            Declaration::Variable(v) => v.position,
            Declaration::Callable(c) => c.position,
        }
    }

    pub fn doc(&self) -> Option<&SassDoc> {
        match &self.declaration {
            Declaration::Variable(v) => v.doc.as_ref(),
            Declaration::Callable(c) => c.doc.as_ref(),
        }
    }

    pub fn is_private(&self) -> bool {
        match &self.declaration {
            Declaration::Variable(v) => v.is_private,
            Declaration::Callable(c) => c.is_private,
        }
    }

    /// Parameter or variable local to a mixin/function body
    pub fn is_scoped(&self) -> bool {
        matches!(&self.declaration, Declaration::Variable(v) if v.owner.is_some())
    }

    pub fn id(&self) -> SymbolId {
        SymbolId {
            origin: self.origin.clone(),
            kind: self.kind,
            offset: self.offset(),
        }
    }
}

fn local_symbols(doc: &DocumentRecord) -> impl Iterator<Item = ResolvedSymbol> + '_ {
    let variables = doc
        .variables
        .values()
        .map(|v| ResolvedSymbol::variable(&doc.uri, v));
    let callables = doc
        .callables()
        .map(|c| ResolvedSymbol::callable(&doc.uri, c));
    variables.chain(callables)
}

/// Pass a symbol through forward hops, innermost first.
///
/// Returns None when a hop's hide/show filter drops it.
fn through_hops(mut symbol: ResolvedSymbol, hops: &[&ForwardLink]) -> Option<ResolvedSymbol> {
    let mut prefix = String::new();
    for hop in hops.iter().rev() {
        if !hop.exposes(&prefixed(symbol.name(), &prefix)) {
            return None;
        }
        if let Some(p) = &hop.prefix {
            prefix.insert_str(0, p);
        }
    }
    symbol.prefix = (!prefix.is_empty()).then_some(prefix);
    Some(symbol)
}

struct ForwardFrame<'a> {
    doc: &'a DocumentRecord,
    /// Forwards taken from the walk root, outermost first
    hops: Vec<&'a ForwardLink>,
    path: Vec<&'a Url>,
}

/// Symbol resolution over a borrowed store snapshot
pub struct SymbolResolver<'a> {
    store: &'a DocumentStore,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Every document-level declaration, private included
    pub fn resolve_local(&self, uri: &Url) -> Vec<ResolvedSymbol> {
        self.store
            .document(uri)
            .map(|doc| local_symbols(doc).collect())
            .unwrap_or_default()
    }

    /// What the document offers to `@use`: public locals plus forwarded members
    pub fn resolve_exports(&self, uri: &Url) -> Vec<ResolvedSymbol> {
        let mut out = Vec::new();
        if let Some(doc) = self.store.document(uri) {
            self.walk_forwards(doc, false, &mut out);
        }
        dedup(out)
    }

    /// Everything visible at `offset` in the document
    pub fn resolve_visible(&self, uri: &Url, offset: usize) -> Vec<ResolvedSymbol> {
        let Some(doc) = self.store.document(uri) else {
            return Vec::new();
        };
        let mut out = Vec::new();

        // Signature scope shadows document scope
        if let Some(callable) = doc.callable_at(offset) {
            out.extend(
                callable
                    .parameters
                    .iter()
                    .chain(callable.locals.iter())
                    .map(|v| ResolvedSymbol::variable(&doc.uri, v)),
            );
        }

        out.extend(local_symbols(doc));

        for link in doc.uses.values() {
            let Some(target) = link.target.as_ref().and_then(|t| self.store.document(t)) else {
                continue;
            };
            let namespace = match &link.namespace {
                Namespace::Named(ns) => Some(ns.clone()),
                Namespace::Wildcard => None,
            };
            let mut exported = Vec::new();
            self.walk_forwards(target, false, &mut exported);
            out.extend(exported.into_iter().map(|mut s| {
                s.namespace = namespace.clone();
                s
            }));
        }

        self.collect_imports(doc, &mut out);

        dedup(out)
    }

    /// The visible symbol a reference names, innermost scope first.
    ///
    /// `kind` None matches mixins and functions alike.
    pub fn lookup(
        &self,
        uri: &Url,
        offset: usize,
        namespace: Option<&str>,
        name: &str,
        kind: Option<SymbolKind>,
    ) -> Option<ResolvedSymbol> {
        let visible = self.resolve_visible(uri, offset);
        find_symbol(&visible, namespace, name, kind).cloned()
    }

    /// Locals of `root` (private ones only when `include_private`) and,
    /// transitively, everything its forwards expose
    fn walk_forwards(
        &self,
        root: &'a DocumentRecord,
        include_private: bool,
        out: &mut Vec<ResolvedSymbol>,
    ) {
        let mut stack = vec![ForwardFrame {
            doc: root,
            hops: Vec::new(),
            path: vec![&root.uri],
        }];

        while let Some(frame) = stack.pop() {
            let is_root = frame.hops.is_empty();
            out.extend(
                local_symbols(frame.doc)
                    .filter(|s| !s.is_private() || (is_root && include_private))
                    .filter_map(|s| through_hops(s, &frame.hops)),
            );

            for forward in frame.doc.forwards.values() {
                let Some(target) = &forward.target else {
                    continue;
                };
                if frame.path.contains(&target) {
                    continue;
                }
                let Some(doc) = self.store.document(target) else {
                    continue;
                };

                let mut hops = frame.hops.clone();
                hops.push(forward);
                let mut path = frame.path.clone();
                path.push(target);
                stack.push(ForwardFrame { doc, hops, path });
            }
        }
    }

    /// Members merged by legacy `@import`, recursively and unqualified
    fn collect_imports(&self, root: &'a DocumentRecord, out: &mut Vec<ResolvedSymbol>) {
        let mut stack: Vec<(&DocumentRecord, Vec<&Url>)> = vec![(root, vec![&root.uri])];

        while let Some((doc, path)) = stack.pop() {
            for import in &doc.imports {
                let Some(target) = &import.target else {
                    continue;
                };
                if path.contains(&target) {
                    continue;
                }
                let Some(imported) = self.store.document(target) else {
                    continue;
                };

                self.walk_forwards(imported, true, out);

                let mut path = path.clone();
                path.push(target);
                stack.push((imported, path));
            }
        }
    }
}

/// First symbol in `symbols` that a reference `namespace.name` denotes.
///
/// `kind` None matches mixins and functions alike.
pub fn find_symbol<'s>(
    symbols: &'s [ResolvedSymbol],
    namespace: Option<&str>,
    name: &str,
    kind: Option<SymbolKind>,
) -> Option<&'s ResolvedSymbol> {
    let is_variable = name.starts_with('$');
    symbols.iter().find(|s| {
        let kind_matches = match kind {
            Some(kind) => s.kind == kind,
            None => (s.kind == SymbolKind::Variable) == is_variable,
        };
        kind_matches && s.namespace.as_deref() == namespace && s.visible_name() == name
    })
}

/// Drop duplicates reached through several paths, keeping the first
fn dedup(symbols: Vec<ResolvedSymbol>) -> Vec<ResolvedSymbol> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert((s.id(), s.namespace.clone(), s.visible_name())))
        .collect()
}
