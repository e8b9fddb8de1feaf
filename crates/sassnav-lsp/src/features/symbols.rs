//! Workspace Symbol Provider
//!
//! Case-insensitive substring search over the declarations of every stored
//! document.

use tower_lsp::lsp_types::{SymbolInformation, SymbolKind as LspSymbolKind, SymbolTag};

use crate::resolution::{ResolvedSymbol, SymbolKind, SymbolResolver};
use crate::workspace::DocumentStore;

pub struct SymbolProvider<'a> {
    store: &'a DocumentStore,
}

impl<'a> SymbolProvider<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Declarations whose name contains `query`; an empty query returns all
    #[allow(deprecated)]
    pub fn workspace_symbols(&self, query: &str) -> Vec<SymbolInformation> {
        let query = query.to_lowercase();
        let resolver = SymbolResolver::new(self.store);

        let mut keys: Vec<_> = self.store.keys().cloned().collect();
        keys.sort();

        keys.iter()
            .flat_map(|uri| resolver.resolve_local(uri))
            .filter(|s| s.name().to_lowercase().contains(&query))
            .filter_map(|s| self.information(&s))
            .collect()
    }

    #[allow(deprecated)]
    fn information(&self, symbol: &ResolvedSymbol) -> Option<SymbolInformation> {
        let doc = self.store.document(&symbol.origin)?;
        let deprecated = symbol.doc().is_some_and(|d| d.deprecated.is_some());

        Some(SymbolInformation {
            name: symbol.name().to_string(),
            kind: Self::convert_symbol_kind(symbol.kind),
            tags: deprecated.then(|| vec![SymbolTag::DEPRECATED]),
            deprecated: None,
            location: doc.location(symbol.offset(), symbol.name().len()),
            container_name: symbol
                .origin
                .path_segments()
                .and_then(|mut s| s.next_back())
                .map(str::to_string),
        })
    }

    pub fn convert_symbol_kind(kind: SymbolKind) -> LspSymbolKind {
        match kind {
            SymbolKind::Variable => LspSymbolKind::VARIABLE,
            SymbolKind::Mixin => LspSymbolKind::METHOD,
            SymbolKind::Function => LspSymbolKind::FUNCTION,
        }
    }
}
