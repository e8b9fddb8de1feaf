//! Library integration tests for sassnav-lsp
//!
//! These tests drive the public API end to end: scanning a workspace on
//! disk, then resolving symbols across the module graph.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tower_lsp::lsp_types::Url;

use sassnav_lsp::{
    DiskFileSystem, DocumentStore, MemoryFileSystem, ScannerSettings, Scanner, Settings,
    StoreHandle, SymbolResolver,
};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(root, "main.scss", "@use \"base/colors\";\n@use \"~toolkit\" as tk;\n\n.a { color: colors.$brand; }\n");
    write(root, "base/_colors.scss", "$brand: #f00;\n$-internal: 1;\n");
    write(root, "node_modules/toolkit/_index.scss", "@mixin reset { margin: 0; }\n");
    write(root, "legacy/app.scss", "@import \"variables.scss\";\n\n.b { color: $primary; }\n");
    write(root, "legacy/variables.scss", "$primary: blue;\n");
    dir
}

async fn scan_disk(root: &Path) -> StoreHandle {
    let store = DocumentStore::shared();
    let scanner = Scanner::new(
        Arc::new(DiskFileSystem::new()),
        Arc::clone(&store),
        ScannerSettings::default(),
    );
    scanner.scan(&[], root).await.unwrap();
    store
}

fn file_url(root: &Path, relative: &str) -> Url {
    Url::from_file_path(root.join(relative)).unwrap()
}

#[tokio::test]
async fn test_disk_scan_follows_links_into_node_modules() {
    let dir = workspace();
    let root = dir.path().canonicalize().unwrap();
    let store = scan_disk(&root).await;
    let store = store.read().await;

    // Discovery skips node_modules, link following does not
    assert_eq!(store.len(), 5);
    let main = store.get(&file_url(&root, "main.scss")).unwrap();
    let targets: Vec<&Url> = main.link_targets().collect();
    assert!(targets.contains(&&file_url(&root, "base/_colors.scss")));
    assert!(targets.contains(&&file_url(&root, "node_modules/toolkit/_index.scss")));
}

#[tokio::test]
async fn test_use_namespace_resolution_on_disk() {
    let dir = workspace();
    let root = dir.path().canonicalize().unwrap();
    let store = scan_disk(&root).await;
    let store = store.read().await;
    let resolver = SymbolResolver::new(&store);

    let main = file_url(&root, "main.scss");
    let names: Vec<String> = resolver
        .resolve_visible(&main, 0)
        .iter()
        .map(|s| s.qualified_name())
        .collect();

    assert!(names.contains(&"colors.$brand".to_string()));
    assert!(names.contains(&"tk.reset".to_string()));
    assert!(!names.iter().any(|n| n.contains("internal")));
}

#[tokio::test]
async fn test_legacy_import_merges_unqualified() {
    let dir = workspace();
    let root = dir.path().canonicalize().unwrap();
    let store = scan_disk(&root).await;
    let store = store.read().await;

    let app = file_url(&root, "legacy/app.scss");
    let end = store.get(&app).unwrap().text.len();
    let primary = SymbolResolver::new(&store)
        .resolve_visible(&app, end)
        .into_iter()
        .find(|s| s.name() == "$primary")
        .unwrap();

    assert_eq!(primary.namespace, None);
    assert_eq!(primary.origin, file_url(&root, "legacy/variables.scss"));
}

#[tokio::test]
async fn test_reupdate_drops_removed_variable() {
    let fs = MemoryFileSystem::with_files([("/p/a.scss", "$one: 1;\n$two: 2;\n")]);
    let store = DocumentStore::shared();
    let scanner = Scanner::new(Arc::new(fs), Arc::clone(&store), ScannerSettings::default());
    let uri = Url::from_file_path("/p/a.scss").unwrap();

    scanner.scan(&[uri.clone()], Path::new("/p")).await.unwrap();
    scanner.update(&uri, Some(1), "$one: 1;\n").await.unwrap();

    let store = store.read().await;
    let names: Vec<String> = SymbolResolver::new(&store)
        .resolve_local(&uri)
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["$one"]);
}

#[test]
fn test_settings_file_in_workspace_root() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "sassnav.toml",
        "[scanner]\nscan_imported_files = false\n\n[diagnostics]\nunresolved_links = \"error\"\n",
    );

    let settings = Settings::load(dir.path()).unwrap();
    assert!(!settings.scanner.scan_imported_files);
    assert!(settings.completion.suggest_mixins);
}

#[test]
fn test_malformed_settings_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "sassnav.toml", "[scanner\n");

    assert!(matches!(
        Settings::load(dir.path()),
        Err(sassnav_lsp::Error::Config(_))
    ));
}
