//! Workspace Module Graph
//!
//! Tracks every known stylesheet, the symbols it declares and the modules
//! it links to.
//!
//! # Components
//!
//! - `store`: canonical URI -> parsed document record
//! - `parser`: extracts declarations and `@use` / `@forward` / `@import` links
//! - `resolver`: maps a link to the file it loads (partials, index files)
//! - `scanner`: builds the transitive closure of linked documents
//! - `fs`: file system capability (disk and in-memory)
//! - `embedded`: style regions of component files

pub mod document;
pub mod embedded;
pub mod fs;
pub mod line_index;
pub mod parser;
pub mod resolver;
pub mod sassdoc;
pub mod scanner;
pub mod store;
pub mod uri;


pub use document::{
    CallableKind, CallableRef, CallableSymbol, DocumentRecord, ForwardLink, FunctionSymbol,
    ImportLink, LinkRef, MixinSymbol, Namespace, UseLink, VariableSymbol,
};
pub use fs::{DiskFileSystem, FileStat, FileSystem, MemoryFileSystem};
pub use parser::{parse, Dialect, ParsedDocument};
pub use resolver::PathResolver;
pub use scanner::{ScanReport, Scanner};
pub use store::{DocumentStore, StoreHandle};
