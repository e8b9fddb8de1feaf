//! Configuration Settings
//!
//! Defines the configuration structures read from `sassnav.toml` and from
//! the client's `initializationOptions`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::DiagnosticSeverity;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Name of the configuration file looked up in the workspace root
pub const CONFIG_FILE_NAME: &str = "sassnav.toml";

/// Rule severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Reported as an error
    Error,
    /// Reported as a warning (default)
    #[default]
    Warning,
    /// Informational only
    Info,
    /// Rule is disabled
    Ignore,
}

impl RuleSeverity {
    /// Convert to an LSP severity, returns None if Ignore
    pub fn to_diagnostic_severity(self) -> Option<DiagnosticSeverity> {
        match self {
            RuleSeverity::Error => Some(DiagnosticSeverity::ERROR),
            RuleSeverity::Warning => Some(DiagnosticSeverity::WARNING),
            RuleSeverity::Info => Some(DiagnosticSeverity::INFORMATION),
            RuleSeverity::Ignore => None,
        }
    }
}

/// Top-level settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Workspace discovery settings
    pub scanner: ScannerSettings,
    /// Completion settings
    pub completion: CompletionSettings,
    /// Diagnostic settings
    pub diagnostics: DiagnosticSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load `sassnav.toml` from the workspace root.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let path = workspace_root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, workspace_root.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Self::from_toml_str(&contents)?)
    }

    /// Settings sent by the client as `initializationOptions`.
    ///
    /// Returns None when the options are absent or do not describe settings.
    pub fn from_initialization_options(options: Option<&serde_json::Value>) -> Option<Self> {
        let value = options?;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value.clone()) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("Ignoring malformed initializationOptions: {}", e);
                None
            }
        }
    }
}

/// Workspace discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Follow `@use`, `@forward` and `@import` targets outside the seed set
    pub scan_imported_files: bool,
    /// Globs (relative to the workspace root) of files seeded at startup
    pub include: Vec<String>,
    /// Globs excluded from the startup seed set
    pub exclude: Vec<String>,
    /// Upper bound on files parsed concurrently
    pub max_concurrency: usize,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            scan_imported_files: true,
            include: vec![
                "**/*.scss".to_string(),
                "**/*.sass".to_string(),
                "**/*.vue".to_string(),
                "**/*.svelte".to_string(),
                "**/*.astro".to_string(),
            ],
            exclude: vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()],
            max_concurrency: 8,
        }
    }
}

/// Completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Offer variables
    pub suggest_variables: bool,
    /// Offer mixins after `@include`
    pub suggest_mixins: bool,
    /// Offer functions
    pub suggest_functions: bool,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            suggest_variables: true,
            suggest_mixins: true,
            suggest_functions: true,
        }
    }
}

/// Diagnostic configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiagnosticSettings {
    /// Severity for module links that resolve to no file
    pub unresolved_links: RuleSeverity,
}
