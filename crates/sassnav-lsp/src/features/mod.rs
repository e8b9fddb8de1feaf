//! Feature Providers
//!
//! Protocol-facing queries answered from a store snapshot:
//!
//! - `completion`: variables, mixins, functions and namespaces
//! - `hover`: declaration, SassDoc and origin
//! - `navigation`: go-to-definition and find-references
//! - `symbols`: workspace symbol search
//! - `diagnostics`: unresolved module links
//!
//! `context` holds the cursor lexer shared by all of them.

pub mod completion;
pub mod context;
pub mod diagnostics;
pub mod hover;
pub mod navigation;
pub mod symbols;

#[cfg(test)]
mod tests;

pub use completion::CompletionProvider;
pub use context::{completion_context, reference_at, CompletionContext, SymbolReference};
pub use diagnostics::DiagnosticProvider;
pub use hover::HoverProvider;
pub use navigation::NavigationProvider;
pub use symbols::SymbolProvider;
