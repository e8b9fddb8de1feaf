//! File system capability
//!
//! The scanner and the path resolver only talk to the disk through
//! [`FileSystem`]. Absence is always reported as a negative answer
//! (`false` / `None`), never as an error, because probing for candidates
//! that do not exist is the common case.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use async_trait::async_trait;
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use tracing::{debug, warn};

/// Metadata answer for an existing path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub is_dir: bool,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

/// Asynchronous file system access used by the module graph
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Whether a file or directory exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Metadata for `path`, or None if it does not exist
    async fn stat(&self, path: &Path) -> Option<FileStat>;

    /// Read a UTF-8 file
    async fn read_file(&self, path: &Path) -> std::io::Result<String>;

    /// All files under `root` matching one of `include` and none of `exclude`
    async fn find_files(&self, root: &Path, include: &[String], exclude: &[String]) -> Vec<PathBuf>;
}

/// Build glob overrides: include globs whitelist, exclude globs ignore.
///
/// A `dir/**` exclude also ignores `dir` itself so the walker prunes it.
fn build_overrides(root: &Path, include: &[String], exclude: &[String]) -> Option<Override> {
    let mut builder = OverrideBuilder::new(root);

    for glob in include {
        if let Err(e) = builder.add(glob) {
            warn!("Ignoring invalid include glob '{}': {}", glob, e);
        }
    }
    for glob in exclude {
        let mut patterns = vec![format!("!{}", glob)];
        if let Some(dir) = glob.strip_suffix("/**") {
            patterns.push(format!("!{}", dir));
        }
        for pattern in patterns {
            if let Err(e) = builder.add(&pattern) {
                warn!("Ignoring invalid exclude glob '{}': {}", glob, e);
            }
        }
    }

    match builder.build() {
        Ok(overrides) => Some(overrides),
        Err(e) => {
            warn!("Failed to build file globs: {}", e);
            None
        }
    }
}

/// The real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFileSystem;

impl DiskFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for DiskFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn stat(&self, path: &Path) -> Option<FileStat> {
        let metadata = tokio::fs::metadata(path).await.ok()?;
        Some(FileStat {
            is_file: metadata.is_file(),
            is_dir: metadata.is_dir(),
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    async fn read_file(&self, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn find_files(&self, root: &Path, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
        let Some(overrides) = build_overrides(root, include, exclude) else {
            return Vec::new();
        };
        let root = root.to_path_buf();

        let walk = tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            for entry in WalkBuilder::new(&root).overrides(overrides).build() {
                match entry {
                    Ok(entry) if entry.file_type().is_some_and(|t| t.is_file()) => {
                        files.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => debug!("Skipping unreadable entry: {}", e),
                }
            }
            files
        });

        match walk.await {
            Ok(files) => files,
            Err(e) => {
                warn!("File discovery task failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// In-memory file system for tests and embedders that own their buffers
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(path, contents)` pairs
    pub fn with_files<I, P, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: Into<String>,
    {
        let fs = Self::new();
        for (path, contents) in files {
            fs.insert(path, contents);
        }
        fs
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), contents.into());
        }
    }

    pub fn remove(&self, path: &Path) {
        if let Ok(mut files) = self.files.write() {
            files.remove(path);
        }
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| files.keys().any(|f| f != path && f.starts_with(path)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    async fn stat(&self, path: &Path) -> Option<FileStat> {
        if let Ok(files) = self.files.read() {
            if let Some(contents) = files.get(path) {
                return Some(FileStat {
                    is_file: true,
                    is_dir: false,
                    len: contents.len() as u64,
                    modified: None,
                });
            }
        }
        self.is_dir(path).then_some(FileStat {
            is_file: false,
            is_dir: true,
            len: 0,
            modified: None,
        })
    }

    async fn read_file(&self, path: &Path) -> std::io::Result<String> {
        self.files
            .read()
            .ok()
            .and_then(|files| files.get(path).cloned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            })
    }

    async fn find_files(&self, root: &Path, include: &[String], exclude: &[String]) -> Vec<PathBuf> {
        let Some(overrides) = build_overrides(root, include, exclude) else {
            return Vec::new();
        };
        let Ok(files) = self.files.read() else {
            return Vec::new();
        };

        let mut found: Vec<PathBuf> = files
            .keys()
            .filter(|path| path.starts_with(root))
            .filter(|path| !overrides.matched(path, false).is_ignore())
            .cloned()
            .collect();
        found.sort();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(globs: &[&str]) -> Vec<String> {
        globs.iter().map(|g| g.to_string()).collect()
    }

    #[tokio::test]
    async fn test_memory_exists_and_read() {
        let fs = MemoryFileSystem::with_files([("/p/a.scss", "$a: 1;")]);

        assert!(fs.exists(Path::new("/p/a.scss")).await);
        assert!(fs.exists(Path::new("/p")).await);
        assert!(!fs.exists(Path::new("/p/b.scss")).await);
        assert_eq!(fs.read_file(Path::new("/p/a.scss")).await.unwrap(), "$a: 1;");
        assert!(fs.read_file(Path::new("/p/b.scss")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_stat_distinguishes_dirs() {
        let fs = MemoryFileSystem::with_files([("/p/lib/_index.scss", "")]);

        let dir = fs.stat(Path::new("/p/lib")).await.unwrap();
        assert!(dir.is_dir);
        let file = fs.stat(Path::new("/p/lib/_index.scss")).await.unwrap();
        assert!(file.is_file);
        assert!(fs.stat(Path::new("/p/missing")).await.is_none());
    }

    #[tokio::test]
    async fn test_memory_find_files_applies_globs() {
        let fs = MemoryFileSystem::with_files([
            ("/p/a.scss", ""),
            ("/p/b.sass", ""),
            ("/p/readme.md", ""),
            ("/p/node_modules/lib/_x.scss", ""),
        ]);

        let found = fs
            .find_files(
                Path::new("/p"),
                &patterns(&["**/*.scss", "**/*.sass"]),
                &patterns(&["**/node_modules/**"]),
            )
            .await;

        assert_eq!(found, vec![PathBuf::from("/p/a.scss"), PathBuf::from("/p/b.sass")]);
    }

    #[tokio::test]
    async fn test_disk_find_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("styles")).unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("styles/main.scss"), "").unwrap();
        std::fs::write(dir.path().join("styles/notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/_x.scss"), "").unwrap();

        let fs = DiskFileSystem::new();
        let found = fs
            .find_files(
                dir.path(),
                &patterns(&["**/*.scss"]),
                &patterns(&["**/node_modules/**"]),
            )
            .await;

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("styles/main.scss"));
        assert!(fs.exists(&found[0]).await);
        assert!(fs.stat(&found[0]).await.unwrap().is_file);
    }
}
