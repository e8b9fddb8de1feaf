//! Symbol Resolution
//!
//! Answers "which symbols are visible here" by walking the module graph
//! held in the [`DocumentStore`](crate::workspace::DocumentStore):
//!
//! - `resolve_local`: declarations of the document itself
//! - `resolve_visible`: what code at an offset can reference
//! - `resolve_exports`: what the document offers to `@use`
//!
//! `@use` exposes a module's exports under its namespace (or unqualified for
//! `as *`), `@forward` re-exports with prefix and hide/show applied per hop,
//! and legacy `@import` merges everything flat.

pub mod engine;


pub use engine::{
    find_symbol, prefixed, Declaration, ResolvedSymbol, SymbolId, SymbolKind, SymbolResolver,
};
