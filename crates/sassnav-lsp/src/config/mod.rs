//! Configuration
//!
//! Settings are loaded from `sassnav.toml` in the workspace root, or taken
//! from the client's `initializationOptions` when it sends them:
//!
//! ```toml
//! [scanner]
//! scan_imported_files = true
//! exclude = ["**/node_modules/**", "legacy/**"]
//! max_concurrency = 8
//!
//! [completion]
//! suggest_functions = false
//!
//! [diagnostics]
//! unresolved_links = "error"
//! ```

mod settings;


pub use settings::{
    CompletionSettings, DiagnosticSettings, RuleSeverity, ScannerSettings, Settings,
    CONFIG_FILE_NAME,
};
