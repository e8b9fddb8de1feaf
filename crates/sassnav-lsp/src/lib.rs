//! sassnav Language Server Protocol implementation
//!
//! This library builds the module graph of an SCSS/Sass workspace and
//! answers symbol queries over it:
//! - Module graph of `@use`, `@forward` and `@import` links
//! - Path resolution for partials, index files and `node_modules`
//! - Symbol visibility with namespaces, prefixes and hide/show filters
//! - Completion, hover, go-to-definition and find-references
//! - Workspace symbols and unresolved-link diagnostics
//!
//! # Library Usage
//!
//! ```ignore
//! use sassnav_lsp::{DocumentStore, Scanner, ScannerSettings, SymbolResolver};
//!
//! let store = DocumentStore::shared();
//! let scanner = Scanner::new(fs, store.clone(), ScannerSettings::default());
//! scanner.scan(&[], workspace_root).await?;
//!
//! let store = store.read().await;
//! let visible = SymbolResolver::new(&store).resolve_visible(&uri, offset);
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Start the language server (typically called by an editor)
//! sassnav-lsp
//!
//! # With debug logging
//! RUST_LOG=debug sassnav-lsp
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod resolution;
pub mod server;
pub mod workspace;

// Re-export main entry point
pub use server::run_server;

// Re-export commonly used types
pub use config::{CompletionSettings, DiagnosticSettings, ScannerSettings, Settings};
pub use error::{Error, Result};
pub use resolution::{ResolvedSymbol, SymbolKind, SymbolResolver};
pub use workspace::{
    DiskFileSystem, DocumentRecord, DocumentStore, FileSystem, MemoryFileSystem, PathResolver,
    ScanReport, Scanner, StoreHandle,
};
