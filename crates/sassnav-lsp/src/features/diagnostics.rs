//! Link diagnostics
//!
//! Reports module links that resolve to no file. Built-in `sass:` modules
//! and plain CSS imports are not module links and never reported.

use tower_lsp::lsp_types::{Diagnostic, NumberOrString};

use crate::config::DiagnosticSettings;
use crate::workspace::parser::is_module_link;
use crate::workspace::{DocumentRecord, LinkRef};

/// Code of the unresolved-link diagnostic
pub const UNRESOLVED_LINK: &str = "SASS001";

pub struct DiagnosticProvider<'a> {
    settings: &'a DiagnosticSettings,
}

impl<'a> DiagnosticProvider<'a> {
    pub fn new(settings: &'a DiagnosticSettings) -> Self {
        Self { settings }
    }

    pub fn diagnose(&self, doc: &DocumentRecord) -> Vec<Diagnostic> {
        let Some(severity) = self.settings.unresolved_links.to_diagnostic_severity() else {
            return Vec::new();
        };

        let mut links: Vec<LinkRef<'_>> = doc
            .links()
            .filter(|l| l.target().is_none())
            .filter(|l| is_module_link(l.link()))
            .collect();
        links.sort_by_key(|l| l.span().start);

        links
            .into_iter()
            .map(|link| {
                let span = link.span();
                Diagnostic {
                    range: doc.line_index.range(&doc.text, span.start, span.end),
                    severity: Some(severity),
                    code: Some(NumberOrString::String(UNRESOLVED_LINK.to_string())),
                    source: Some("sassnav".to_string()),
                    message: format!("Cannot find module '{}'", link.link()),
                    ..Default::default()
                }
            })
            .collect()
    }
}
