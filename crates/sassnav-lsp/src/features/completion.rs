//! Completion
//!
//! Offers the symbols visible at the cursor: variables after `$`, mixins
//! after `@include`, namespace members after `ns.`, and functions and
//! variables elsewhere.

use std::collections::BTreeSet;

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionItemTag, Documentation, InsertTextFormat,
    MarkupContent, MarkupKind, Position, Url,
};

use super::context::{completion_context, CompletionContext};
use crate::config::CompletionSettings;
use crate::resolution::{Declaration, ResolvedSymbol, SymbolKind, SymbolResolver};
use crate::workspace::DocumentStore;

/// Completion over a store snapshot
pub struct CompletionProvider<'a> {
    store: &'a DocumentStore,
    settings: &'a CompletionSettings,
}

impl<'a> CompletionProvider<'a> {
    pub fn new(store: &'a DocumentStore, settings: &'a CompletionSettings) -> Self {
        Self { store, settings }
    }

    pub fn complete(&self, uri: &Url, position: Position) -> Vec<CompletionItem> {
        let Some(doc) = self.store.document(uri) else {
            return Vec::new();
        };
        let offset = doc.offset_at(position);
        let context = completion_context(&doc.text, offset);
        if context == CompletionContext::None {
            return Vec::new();
        }

        let visible = SymbolResolver::new(self.store).resolve_visible(uri, offset);
        let candidates = visible
            .iter()
            .filter(|s| !s.is_private() || s.origin == doc.uri)
            .filter(|s| self.accepts(&context, s));

        let mut items: Vec<CompletionItem> = candidates.map(|s| self.item(&context, s)).collect();

        if context == CompletionContext::Value {
            let namespaces: BTreeSet<&str> = visible
                .iter()
                .filter_map(|s| s.namespace.as_deref())
                .collect();
            items.extend(namespaces.into_iter().map(|ns| CompletionItem {
                label: ns.to_string(),
                kind: Some(CompletionItemKind::MODULE),
                ..Default::default()
            }));
        }

        items
    }

    fn accepts(&self, context: &CompletionContext, symbol: &ResolvedSymbol) -> bool {
        let enabled = match symbol.kind {
            SymbolKind::Variable => self.settings.suggest_variables,
            SymbolKind::Mixin => self.settings.suggest_mixins,
            SymbolKind::Function => self.settings.suggest_functions,
        };
        if !enabled {
            return false;
        }

        let namespace = symbol.namespace.as_deref();
        match context {
            CompletionContext::Variable { namespace: ns } => {
                symbol.kind == SymbolKind::Variable && namespace == ns.as_deref()
            }
            CompletionContext::Include { namespace: ns } => {
                symbol.kind == SymbolKind::Mixin && namespace == ns.as_deref()
            }
            CompletionContext::Member { namespace: ns } => {
                symbol.kind != SymbolKind::Mixin && namespace == Some(ns.as_str())
            }
            CompletionContext::Value => symbol.kind != SymbolKind::Mixin && namespace.is_none(),
            CompletionContext::None => false,
        }
    }

    fn item(&self, context: &CompletionContext, symbol: &ResolvedSymbol) -> CompletionItem {
        let name = symbol.visible_name();
        let (kind, detail) = match &symbol.declaration {
            Declaration::Variable(v) => (CompletionItemKind::VARIABLE, v.value.clone()),
            Declaration::Callable(c) => {
                let kind = match symbol.kind {
                    SymbolKind::Mixin => CompletionItemKind::METHOD,
                    _ => CompletionItemKind::FUNCTION,
                };
                (kind, Some(c.signature()))
            }
        };

        // In `$name` and `ns.$name` contexts the `$` is already typed
        let insert = match context {
            CompletionContext::Variable { .. } => name.trim_start_matches('$').to_string(),
            _ => name.clone(),
        };
        let (insert_text, insert_text_format) = match &symbol.declaration {
            Declaration::Callable(c) if symbol.kind == SymbolKind::Function => {
                if c.parameters.is_empty() {
                    (format!("{}()", insert), InsertTextFormat::PLAIN_TEXT)
                } else {
                    (format!("{}($1)", insert), InsertTextFormat::SNIPPET)
                }
            }
            _ => (insert, InsertTextFormat::PLAIN_TEXT),
        };

        let doc = symbol.doc();
        let documentation = doc
            .filter(|d| !d.description.is_empty())
            .map(|d| {
                Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: d.description.clone(),
                })
            });
        let tags = doc
            .and_then(|d| d.deprecated.as_ref())
            .map(|_| vec![CompletionItemTag::DEPRECATED]);

        CompletionItem {
            label: name,
            kind: Some(kind),
            detail,
            documentation,
            tags,
            insert_text: Some(insert_text),
            insert_text_format: Some(insert_text_format),
            ..Default::default()
        }
    }
}
