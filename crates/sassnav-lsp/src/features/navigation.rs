//! Go-to-definition and find-references

use std::collections::HashMap;

use tower_lsp::lsp_types::{Location, Position, Range, Url};

use super::context::{reference_at, references_in};
use crate::resolution::{find_symbol, ResolvedSymbol, SymbolResolver};
use crate::workspace::{DocumentRecord, DocumentStore};

/// Declaration location of a resolved symbol
fn declaration_location(store: &DocumentStore, symbol: &ResolvedSymbol) -> Option<Location> {
    let origin = store.document(&symbol.origin)?;
    Some(origin.location(symbol.offset(), symbol.name().len()))
}

pub struct NavigationProvider<'a> {
    store: &'a DocumentStore,
}

impl<'a> NavigationProvider<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Declaration of the symbol under the cursor, or the file a link loads
    pub fn definition(&self, uri: &Url, position: Position) -> Option<Location> {
        let doc = self.store.document(uri)?;
        let offset = doc.offset_at(position);

        let link = doc.links().find(|l| {
            let span = l.span();
            span.start <= offset && offset <= span.end
        });
        if let Some(link) = link {
            let target = link.target()?;
            return Some(Location::new(target.clone(), Range::default()));
        }

        let symbol = self.symbol_at(doc, offset)?;
        declaration_location(self.store, &symbol)
    }

    /// Every place in the store that names the same declaration as the cursor
    pub fn references(
        &self,
        uri: &Url,
        position: Position,
        include_declaration: bool,
    ) -> Vec<Location> {
        let Some(doc) = self.store.document(uri) else {
            return Vec::new();
        };
        let Some(target) = self.symbol_at(doc, doc.offset_at(position)) else {
            return Vec::new();
        };
        let target_id = target.id();
        let declaration = declaration_location(self.store, &target);
        let bare = target.name().trim_start_matches('$');
        let resolver = SymbolResolver::new(self.store);

        let mut locations = Vec::new();
        let mut keys: Vec<&Url> = self.store.keys().collect();
        keys.sort();

        for key in keys {
            let Some(doc) = self.store.document(key) else {
                continue;
            };
            // Visible sets only differ by enclosing callable
            let mut visible: HashMap<Option<usize>, Vec<ResolvedSymbol>> = HashMap::new();

            for reference in references_in(&doc.text) {
                // Prefixes only ever prepend, so the declared name is a suffix
                if !reference.name.ends_with(bare) {
                    continue;
                }
                let offset = reference.span.start;
                let scope = doc.callable_at(offset).map(|c| c.offset);
                let symbols = visible
                    .entry(scope)
                    .or_insert_with(|| resolver.resolve_visible(&doc.uri, offset));

                let resolved = find_symbol(
                    symbols,
                    reference.namespace.as_deref(),
                    &reference.name,
                    reference.kind,
                );
                if resolved.map(|s| s.id()) != Some(target_id.clone()) {
                    continue;
                }

                let location = doc.location(
                    reference.name_start,
                    reference.span.end - reference.name_start,
                );
                if !include_declaration && Some(&location) == declaration.as_ref() {
                    continue;
                }
                locations.push(location);
            }
        }

        locations
    }

    fn symbol_at(&self, doc: &DocumentRecord, offset: usize) -> Option<ResolvedSymbol> {
        let reference = reference_at(&doc.text, offset)?;
        SymbolResolver::new(self.store).lookup(
            &doc.uri,
            offset,
            reference.namespace.as_deref(),
            &reference.name,
            reference.kind,
        )
    }
}
