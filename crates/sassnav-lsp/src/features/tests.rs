//! Feature provider tests over a scanned in-memory project.

use std::path::Path;
use std::sync::Arc;

use tower_lsp::lsp_types::{HoverContents, Position, Url};

use crate::config::{CompletionSettings, DiagnosticSettings, RuleSeverity, ScannerSettings};
use crate::workspace::{DocumentStore, MemoryFileSystem, Scanner, StoreHandle};

const MAIN: &str = "@use \"theme\";\n@use \"mixins\" as mx;\n@use \"missing\";\n@use \"sass:math\";\n\n$local: 2px;\n\n.card {\n  padding: theme.$spacing;\n  @include mx.center;\n  width: theme.double($local);\n}\n";

const THEME: &str = "/// Base spacing unit\n/// @deprecated use $gap\n$spacing: 4px !default;\n$-secret: 1;\n\n/// Doubles a length\n/// @param $n - The length\n@function double($n) {\n  @return $n * 2;\n}\n";

const MIXINS: &str = "@use \"theme\";\n\n@mixin center {\n  margin: theme.$spacing auto;\n}\n";

fn url(path: &str) -> Url {
    Url::from_file_path(path).unwrap()
}

async fn scanned_project() -> (Scanner, StoreHandle) {
    let fs = MemoryFileSystem::with_files([
        ("/p/main.scss", MAIN),
        ("/p/_theme.scss", THEME),
        ("/p/_mixins.scss", MIXINS),
    ]);
    let store = DocumentStore::shared();
    let scanner = Scanner::new(Arc::new(fs), Arc::clone(&store), ScannerSettings::default());
    scanner
        .scan(&[url("/p/main.scss")], Path::new("/p"))
        .await
        .unwrap();
    (scanner, store)
}

async fn project() -> StoreHandle {
    scanned_project().await.1
}

/// Position of the first occurrence of `needle` in `text`, plus `delta` characters
fn position_of(text: &str, needle: &str, delta: u32) -> Position {
    let offset = text.find(needle).unwrap();
    let line = text[..offset].matches('\n').count() as u32;
    let column = (offset - text[..offset].rfind('\n').map_or(0, |i| i + 1)) as u32;
    Position::new(line, column + delta)
}

// ==================== COMPLETION TESTS ====================

mod completion_tests {
    use super::*;
    use crate::features::CompletionProvider;

    fn labels(items: &[tower_lsp::lsp_types::CompletionItem]) -> Vec<String> {
        let mut labels: Vec<String> = items.iter().map(|i| i.label.clone()).collect();
        labels.sort();
        labels
    }

    /// Complete at the end of an unsaved buffer inside the project
    async fn complete_at_end(text: &str, settings: &CompletionSettings) -> Vec<String> {
        let (scanner, store) = scanned_project().await;
        scanner.update(&url("/p/edit.scss"), Some(1), text).await.unwrap();

        let store = store.read().await;
        let provider = CompletionProvider::new(&store, settings);
        let last_line = text.rsplit('\n').next().unwrap_or("");
        let end = Position::new(text.matches('\n').count() as u32, last_line.len() as u32);
        labels(&provider.complete(&url("/p/edit.scss"), end))
    }

    #[tokio::test]
    async fn test_namespace_member_completion() {
        let store = project().await;
        let store = store.read().await;
        let settings = CompletionSettings::default();
        let provider = CompletionProvider::new(&store, &settings);

        let position = position_of(MAIN, "theme.$spacing", "theme.$".len() as u32);
        let items = provider.complete(&url("/p/main.scss"), position);
        // Private members of other modules are never offered
        assert_eq!(labels(&items), vec!["$spacing"]);
        assert_eq!(items[0].insert_text.as_deref(), Some("spacing"));
        assert!(items[0].tags.is_some());
    }

    #[tokio::test]
    async fn test_include_completion() {
        let store = project().await;
        let store = store.read().await;
        let settings = CompletionSettings::default();
        let provider = CompletionProvider::new(&store, &settings);

        let position = position_of(MAIN, "mx.center", "mx.".len() as u32);
        let items = provider.complete(&url("/p/main.scss"), position);
        assert_eq!(labels(&items), vec!["center"]);
    }

    #[tokio::test]
    async fn test_value_completion_offers_locals_and_namespaces() {
        let labels = complete_at_end(
            "@use \"theme\";\n$a: 1;\n.x { width: ",
            &CompletionSettings::default(),
        )
        .await;
        assert_eq!(labels, vec!["$a", "theme"]);
    }

    #[tokio::test]
    async fn test_disabled_kinds_are_not_offered() {
        let settings = CompletionSettings {
            suggest_variables: false,
            ..CompletionSettings::default()
        };
        let labels = complete_at_end(
            "@use \"theme\" as *;\n$a: 1;\n.x { width: ",
            &settings,
        )
        .await;
        assert_eq!(labels, vec!["double"]);
    }
}

// ==================== HOVER TESTS ====================

mod hover_tests {
    use super::*;
    use crate::features::HoverProvider;

    fn markdown(hover: tower_lsp::lsp_types::Hover) -> String {
        match hover.contents {
            HoverContents::Markup(content) => content.value,
            other => panic!("unexpected hover contents: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hover_namespaced_variable() {
        let store = project().await;
        let store = store.read().await;
        let provider = HoverProvider::new(&store);

        let hover = provider
            .hover(&url("/p/main.scss"), position_of(MAIN, "$spacing", 2))
            .unwrap();
        let text = markdown(hover);
        assert!(text.contains("$spacing: 4px !default"));
        assert!(text.contains("Base spacing unit"));
        assert!(text.contains("**Deprecated**: use $gap"));
        assert!(text.contains("_theme.scss"));
        assert!(text.contains("namespace `theme`"));
    }

    #[tokio::test]
    async fn test_hover_function_signature() {
        let store = project().await;
        let store = store.read().await;
        let provider = HoverProvider::new(&store);

        let hover = provider
            .hover(&url("/p/main.scss"), position_of(MAIN, "double(", 1))
            .unwrap();
        let text = markdown(hover);
        assert!(text.contains("@function double($n)"));
        assert!(text.contains("Doubles a length"));
        assert!(text.contains("`$n`: The length"));
    }

    #[tokio::test]
    async fn test_hover_outside_reference() {
        let store = project().await;
        let store = store.read().await;
        let provider = HoverProvider::new(&store);
        assert!(provider
            .hover(&url("/p/main.scss"), position_of(MAIN, "padding", 1))
            .is_none());
    }
}

// ==================== NAVIGATION TESTS ====================

mod navigation_tests {
    use super::*;
    use crate::features::NavigationProvider;

    #[tokio::test]
    async fn test_definition_of_namespaced_mixin() {
        let store = project().await;
        let store = store.read().await;
        let provider = NavigationProvider::new(&store);

        let location = provider
            .definition(&url("/p/main.scss"), position_of(MAIN, "center", 1))
            .unwrap();
        assert_eq!(location.uri, url("/p/_mixins.scss"));
        assert_eq!(location.range.start, position_of(MIXINS, "center", 0));
    }

    #[tokio::test]
    async fn test_definition_of_link_is_target_file() {
        let store = project().await;
        let store = store.read().await;
        let provider = NavigationProvider::new(&store);

        let location = provider
            .definition(&url("/p/main.scss"), position_of(MAIN, "mixins", 2))
            .unwrap();
        assert_eq!(location.uri, url("/p/_mixins.scss"));

        assert!(provider
            .definition(&url("/p/main.scss"), position_of(MAIN, "missing", 2))
            .is_none());
    }

    #[tokio::test]
    async fn test_references_across_files() {
        let store = project().await;
        let store = store.read().await;
        let provider = NavigationProvider::new(&store);

        let at_declaration = position_of(THEME, "$spacing", 1);
        let with_declaration = provider.references(&url("/p/_theme.scss"), at_declaration, true);
        let without = provider.references(&url("/p/_theme.scss"), at_declaration, false);

        assert_eq!(with_declaration.len(), 3);
        assert_eq!(without.len(), 2);
        let mut uris: Vec<String> = without.iter().map(|l| l.uri.path().to_string()).collect();
        uris.sort();
        assert_eq!(uris, vec!["/p/_mixins.scss", "/p/main.scss"]);
    }

    #[tokio::test]
    async fn test_parameter_references_stay_in_signature() {
        let store = project().await;
        let store = store.read().await;
        let provider = NavigationProvider::new(&store);

        let references = provider.references(
            &url("/p/_theme.scss"),
            position_of(THEME, "$n) {", 1),
            true,
        );
        assert_eq!(references.len(), 2);
        assert!(references.iter().all(|l| l.uri == url("/p/_theme.scss")));
    }
}

// ==================== SYMBOL & DIAGNOSTIC TESTS ====================

mod symbol_tests {
    use super::*;
    use crate::features::SymbolProvider;

    #[tokio::test]
    async fn test_workspace_symbol_search() {
        let store = project().await;
        let store = store.read().await;
        let provider = SymbolProvider::new(&store);

        let found = provider.workspace_symbols("DOUB");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "double");
        assert_eq!(found[0].container_name.as_deref(), Some("_theme.scss"));
    }

    #[tokio::test]
    async fn test_empty_query_returns_all() {
        let store = project().await;
        let store = store.read().await;
        let provider = SymbolProvider::new(&store);

        // $local, $spacing, $-secret, double, center
        assert_eq!(provider.workspace_symbols("").len(), 5);
    }
}

mod diagnostic_tests {
    use super::*;
    use crate::features::DiagnosticProvider;

    #[tokio::test]
    async fn test_unresolved_links_are_reported() {
        let store = project().await;
        let store = store.read().await;
        let settings = DiagnosticSettings::default();
        let provider = DiagnosticProvider::new(&settings);

        let main = store.get(&url("/p/main.scss")).unwrap();
        let diagnostics = provider.diagnose(&main);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("'missing'"));
        assert_eq!(diagnostics[0].range.start, position_of(MAIN, "missing", 0));
    }

    #[tokio::test]
    async fn test_ignored_rule_reports_nothing() {
        let store = project().await;
        let store = store.read().await;
        let settings = DiagnosticSettings {
            unresolved_links: RuleSeverity::Ignore,
        };
        let provider = DiagnosticProvider::new(&settings);

        let main = store.get(&url("/p/main.scss")).unwrap();
        assert!(provider.diagnose(&main).is_empty());
    }
}
