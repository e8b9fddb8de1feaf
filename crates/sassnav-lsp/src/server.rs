//! Language server backend
//!
//! Wires the [`Scanner`] and the feature providers to `tower-lsp`. Every
//! request reads a snapshot of the shared [`DocumentStore`]; notifications
//! go through the scanner so the store only ever holds whole records.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionOptions, CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams, DidChangeWatchedFilesRegistrationOptions,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    FileChangeType, FileSystemWatcher, GlobPattern, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverParams, HoverProviderCapability, InitializeParams,
    InitializeResult, InitializedParams, Location, MessageType, OneOf, ReferenceParams,
    Registration, ServerCapabilities, ServerInfo, SymbolInformation,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url, WorkDoneProgressOptions,
    WorkspaceSymbolParams,
};
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::features::{
    CompletionProvider, DiagnosticProvider, HoverProvider, NavigationProvider, SymbolProvider,
};
use crate::workspace::scanner::is_supported_path;
use crate::workspace::{uri, DiskFileSystem, DocumentStore, FileSystem, Scanner, StoreHandle};

/// LSP Backend state
struct Backend {
    /// LSP client for sending notifications
    client: Client,
    fs: Arc<dyn FileSystem>,
    /// Module graph shared with the scanner
    store: StoreHandle,
    /// Rebuilt once the settings are known in `initialize`
    scanner: Arc<RwLock<Scanner>>,
    settings: Arc<RwLock<Settings>>,
    workspace_root: Arc<RwLock<Option<PathBuf>>>,
    /// Editor version of every open document, keyed by canonical URI
    open_documents: Arc<RwLock<HashMap<Url, i32>>>,
}

impl Backend {
    fn new(client: Client) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(DiskFileSystem::new());
        let store = DocumentStore::shared();
        let settings = Settings::default();
        let scanner = Scanner::new(Arc::clone(&fs), Arc::clone(&store), settings.scanner.clone());

        Self {
            client,
            fs,
            store,
            scanner: Arc::new(RwLock::new(scanner)),
            settings: Arc::new(RwLock::new(settings)),
            workspace_root: Arc::new(RwLock::new(None)),
            open_documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn scanner(&self) -> Scanner {
        self.scanner.read().await.clone()
    }

    #[allow(deprecated)]
    fn root_from_params(params: &InitializeParams) -> Option<PathBuf> {
        let root_uri = params.root_uri.clone().or_else(|| {
            params
                .workspace_folders
                .as_ref()
                .and_then(|folders| folders.first())
                .map(|folder| folder.uri.clone())
        })?;
        uri::to_file_path(&root_uri).ok()
    }

    /// Re-parse an editor buffer and publish its diagnostics
    async fn update_document(&self, uri: &Url, version: i32, text: &str) {
        self.open_documents
            .write()
            .await
            .insert(uri::canonical(uri), version);

        if let Err(e) = self.scanner().await.update(uri, Some(version), text).await {
            debug!("Not tracking {}: {}", uri, e);
            return;
        }
        self.publish_diagnostics(uri).await;
    }

    /// Publish diagnostics for an open document.
    ///
    /// Skipped when the stored record is not the version the editor last sent.
    async fn publish_diagnostics(&self, uri: &Url) {
        let Some(expected) = self
            .open_documents
            .read()
            .await
            .get(&uri::canonical(uri))
            .copied()
        else {
            return;
        };

        let Some(record) = self.store.read().await.get(uri) else {
            return;
        };
        if record.version != Some(expected) {
            debug!(
                "Discarding diagnostics for {} (record {:?}, editor {})",
                uri, record.version, expected
            );
            return;
        }

        let diagnostics = {
            let settings = self.settings.read().await;
            DiagnosticProvider::new(&settings.diagnostics).diagnose(&record)
        };
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, Some(expected))
            .await;
    }

    /// Re-resolve documents affected by a file appearing or disappearing
    async fn refresh_dependents(&self, changed: &Url) {
        let refreshed = self.scanner().await.refresh_dependents(changed).await;
        for uri in refreshed {
            self.publish_diagnostics(&uri).await;
        }
    }

    /// Read a file from disk into the store unless an editor owns it
    async fn reload_from_disk(&self, uri: &Url) {
        if self
            .open_documents
            .read()
            .await
            .contains_key(&uri::canonical(uri))
        {
            return;
        }

        let root = self.workspace_root.read().await.clone().unwrap_or_default();
        let scanner = self.scanner().await;
        scanner.remove(uri).await;
        if let Err(e) = scanner.scan(std::slice::from_ref(uri), &root).await {
            debug!("Not reloading {}: {}", uri, e);
        }
    }

    async fn register_file_watcher(&self) {
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String("**/*.{scss,sass,vue,svelte,astro}".to_string()),
                kind: None,
            }],
        };
        let registration = Registration {
            id: "sassnav-watched-files".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: serde_json::to_value(options).ok(),
        };
        if let Err(e) = self.client.register_capability(vec![registration]).await {
            debug!("Client declined file watching: {}", e);
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("sassnav LSP server initializing");

        let root = Self::root_from_params(&params);
        let settings = match Settings::from_initialization_options(
            params.initialization_options.as_ref(),
        ) {
            Some(settings) => settings,
            None => match root.as_deref().map(Settings::load) {
                Some(Ok(settings)) => settings,
                Some(Err(e)) => {
                    warn!("Using default settings: {}", e);
                    Settings::default()
                }
                None => Settings::default(),
            },
        };

        *self.scanner.write().await = Scanner::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.store),
            settings.scanner.clone(),
        );
        *self.settings.write().await = settings;
        *self.workspace_root.write().await = root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![
                        "$".to_string(), // Variables
                        ".".to_string(), // Namespace members
                        "@".to_string(), // @include
                    ]),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "sassnav-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("sassnav LSP server initialized");
        self.register_file_watcher().await;

        let Some(root) = self.workspace_root.read().await.clone() else {
            self.client
                .log_message(MessageType::INFO, "sassnav ready (no workspace folder)")
                .await;
            return;
        };

        match self.scanner().await.scan(&[], &root).await {
            Ok(report) => {
                self.client
                    .log_message(
                        MessageType::INFO,
                        format!("sassnav indexed {} stylesheets", report.parsed.len()),
                    )
                    .await;
            }
            Err(e) => warn!("Workspace scan failed: {}", e),
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("sassnav LSP server shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        debug!("Document opened: {}", params.text_document.uri);
        let doc = params.text_document;
        self.update_document(&doc.uri, doc.version, &doc.text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        debug!("Document changed: {}", params.text_document.uri);
        // FULL sync: the last change carries the whole text
        if let Some(change) = params.content_changes.into_iter().last() {
            let doc = params.text_document;
            self.update_document(&doc.uri, doc.version, &change.text).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        debug!("Document saved: {}", params.text_document.uri);
        let uri = params.text_document.uri;
        if let Some(text) = params.text {
            let version = self
                .open_documents
                .read()
                .await
                .get(&uri::canonical(&uri))
                .copied();
            if let Some(version) = version {
                self.update_document(&uri, version, &text).await;
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        debug!("Document closed: {}", uri);
        self.open_documents
            .write()
            .await
            .remove(&uri::canonical(&uri));

        // The file on disk replaces the editor buffer, if there is one
        self.reload_from_disk(&uri).await;
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for change in params.changes {
            let supported = uri::to_file_path(&change.uri)
                .map(|p| is_supported_path(&p))
                .unwrap_or(false);
            if !supported {
                continue;
            }
            debug!("Watched file {:?}: {}", change.typ, change.uri);

            match change.typ {
                FileChangeType::DELETED => {
                    if !self
                        .open_documents
                        .read()
                        .await
                        .contains_key(&uri::canonical(&change.uri))
                    {
                        self.scanner().await.remove(&change.uri).await;
                    }
                }
                _ => self.reload_from_disk(&change.uri).await,
            }
            self.refresh_dependents(&uri::canonical(&change.uri)).await;
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        debug!("Hover request: {}", position.text_document.uri);

        let store = self.store.read().await;
        Ok(HoverProvider::new(&store).hover(&position.text_document.uri, position.position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        debug!("Completion request: {}", position.text_document.uri);

        let store = self.store.read().await;
        let settings = self.settings.read().await;
        let items = CompletionProvider::new(&store, &settings.completion)
            .complete(&position.text_document.uri, position.position);

        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        debug!("Definition request: {}", position.text_document.uri);

        let store = self.store.read().await;
        Ok(NavigationProvider::new(&store)
            .definition(&position.text_document.uri, position.position)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let position = params.text_document_position;
        debug!("References request: {}", position.text_document.uri);

        let store = self.store.read().await;
        let locations = NavigationProvider::new(&store).references(
            &position.text_document.uri,
            position.position,
            params.context.include_declaration,
        );

        debug!("Found {} references", locations.len());
        if locations.is_empty() {
            Ok(None)
        } else {
            Ok(Some(locations))
        }
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        debug!("Workspace symbol request: query='{}'", params.query);

        let store = self.store.read().await;
        let result = SymbolProvider::new(&store).workspace_symbols(&params.query);

        debug!("Found {} workspace symbols", result.len());
        if result.is_empty() {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }
}

/// Serve the language server over stdin/stdout until the client exits
pub async fn run_server() {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting sassnav-lsp v{}", env!("CARGO_PKG_VERSION"));

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::WorkspaceFolder;

    #[test]
    #[allow(deprecated)]
    fn test_root_prefers_root_uri() {
        let params = InitializeParams {
            root_uri: Some(Url::from_file_path("/work/site").unwrap()),
            workspace_folders: Some(vec![WorkspaceFolder {
                uri: Url::from_file_path("/work/other").unwrap(),
                name: "other".to_string(),
            }]),
            ..Default::default()
        };
        assert_eq!(
            Backend::root_from_params(&params),
            Some(PathBuf::from("/work/site"))
        );
    }

    #[test]
    fn test_root_falls_back_to_first_folder() {
        let params = InitializeParams {
            workspace_folders: Some(vec![WorkspaceFolder {
                uri: Url::from_file_path("/work/other").unwrap(),
                name: "other".to_string(),
            }]),
            ..Default::default()
        };
        assert_eq!(
            Backend::root_from_params(&params),
            Some(PathBuf::from("/work/other"))
        );
        assert_eq!(Backend::root_from_params(&InitializeParams::default()), None);
    }
}
