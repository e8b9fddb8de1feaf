//! URI canonicalization
//!
//! Store keys are `file://` URLs with lexically normalized paths, so that
//! `a/../b.scss` and `b.scss` land on one record. On platforms with
//! case-insensitive file systems the path is also case-folded.

use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::Url;

use crate::error::{Error, Result};

/// Lexically normalize `.` and `..` segments without touching the disk
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root
                let at_root = matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if !at_root {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Map a URI to a local path
pub fn to_file_path(uri: &Url) -> Result<PathBuf> {
    if uri.scheme() != "file" {
        return Err(Error::InvalidUri(uri.to_string()));
    }
    uri.to_file_path()
        .map_err(|_| Error::InvalidUri(uri.to_string()))
}

/// Build the canonical URI for a local path
pub fn from_file_path(path: &Path) -> Result<Url> {
    let normalized = fold_case(normalize_path(path));
    Url::from_file_path(&normalized)
        .map_err(|_| Error::InvalidUri(normalized.display().to_string()))
}

/// Canonical form of a URI, used for every Store key.
///
/// Non-file URIs (untitled buffers) are returned unchanged.
pub fn canonical(uri: &Url) -> Url {
    match to_file_path(uri) {
        Ok(path) => from_file_path(&path).unwrap_or_else(|_| uri.clone()),
        Err(_) => uri.clone(),
    }
}

#[cfg(any(windows, target_os = "macos"))]
fn fold_case(path: PathBuf) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

#[cfg(not(any(windows, target_os = "macos")))]
fn fold_case(path: PathBuf) -> PathBuf {
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_parent_segments() {
        let path = normalize_path(Path::new("/project/styles/../base/./_vars.scss"));
        assert_eq!(path, PathBuf::from("/project/base/_vars.scss"));
    }

    #[test]
    fn test_normalize_does_not_escape_root() {
        let path = normalize_path(Path::new("/../../a.scss"));
        assert_eq!(path, PathBuf::from("/a.scss"));
    }

    #[cfg(unix)]
    #[test]
    fn test_canonical_collapses_equivalent_uris() {
        let a = Url::parse("file:///project/src/../main.scss").unwrap();
        let b = Url::parse("file:///project/main.scss").unwrap();
        assert_eq!(canonical(&a), canonical(&b));
    }

    #[test]
    fn test_non_file_uri_is_kept() {
        let uri = Url::parse("untitled:Untitled-1").unwrap();
        assert_eq!(canonical(&uri), uri);
        assert!(to_file_path(&uri).is_err());
    }
}
