//! Error types for the module graph.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for workspace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the scanner and configuration loading.
///
/// Routine probing never produces these: a missing file is a negative
/// answer from the file system, not an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A URI could not be mapped to a local file path
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// The file exists but is not a stylesheet or a supported host file
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),

    /// The file passed to `scan` does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// `sassnav.toml` could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
