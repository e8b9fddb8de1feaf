//! Hover
//!
//! Shows the declaration of the symbol under the cursor with its SassDoc
//! and where it comes from.

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position, Url};

use super::context::reference_at;
use crate::resolution::{Declaration, ResolvedSymbol, SymbolKind, SymbolResolver};
use crate::workspace::DocumentStore;

pub struct HoverProvider<'a> {
    store: &'a DocumentStore,
}

impl<'a> HoverProvider<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    pub fn hover(&self, uri: &Url, position: Position) -> Option<Hover> {
        let doc = self.store.document(uri)?;
        let offset = doc.offset_at(position);
        let reference = reference_at(&doc.text, offset)?;

        let symbol = SymbolResolver::new(self.store).lookup(
            uri,
            offset,
            reference.namespace.as_deref(),
            &reference.name,
            reference.kind,
        )?;

        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: render(&symbol, uri),
            }),
            range: Some(
                doc.line_index
                    .range(&doc.text, reference.span.start, reference.span.end),
            ),
        })
    }
}

fn file_name(uri: &Url) -> &str {
    uri.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or(uri.as_str())
}

/// Markdown for a resolved symbol as seen from `from`
pub fn render(symbol: &ResolvedSymbol, from: &Url) -> String {
    let declaration = match &symbol.declaration {
        Declaration::Variable(v) => {
            let mut line = format!("{}: {}", symbol.visible_name(), v.value.as_deref().unwrap_or(""));
            if v.is_default {
                line.push_str(" !default");
            }
            line
        }
        Declaration::Callable(c) => {
            let keyword = match symbol.kind {
                SymbolKind::Mixin => "@mixin",
                _ => "@function",
            };
            let signature = c.signature();
            match &symbol.prefix {
                Some(prefix) => format!("{} {}{}", keyword, prefix, signature),
                None => format!("{} {}", keyword, signature),
            }
        }
    };

    let mut sections = vec![format!("```scss\n{}\n```", declaration.trim_end())];

    if let Declaration::Variable(v) = &symbol.declaration {
        if let Some(owner) = &v.owner {
            sections.push(format!("Declared in `{}`", owner.name));
        }
    }

    if let Some(doc) = symbol.doc() {
        if let Some(message) = &doc.deprecated {
            if message.is_empty() {
                sections.push("**Deprecated**".to_string());
            } else {
                sections.push(format!("**Deprecated**: {}", message));
            }
        }
        if !doc.description.is_empty() {
            sections.push(doc.description.clone());
        }
        for param in &doc.params {
            if !param.description.is_empty() {
                sections.push(format!("`{}`: {}", param.name, param.description));
            }
        }
        if let Some(returns) = &doc.returns {
            sections.push(format!("@return {}", returns));
        }
    }

    if symbol.origin != *from {
        match &symbol.namespace {
            Some(ns) => sections.push(format!("`{}` (namespace `{}`)", file_name(&symbol.origin), ns)),
            None => sections.push(format!("`{}`", file_name(&symbol.origin))),
        }
    }

    sections.join("\n\n")
}
