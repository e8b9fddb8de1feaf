//! Module path resolution
//!
//! Maps the textual reference of a `@use` / `@forward` / `@import` to the
//! file it loads, relative to the referencing document. Candidates are
//! probed in a fixed priority order and the first one that exists wins:
//!
//! 1. `name.scss`, `name.sass`
//! 2. `_name.scss`, `_name.sass`
//! 3. `name/_index.scss`, `name/index.scss`, `name/_index.sass`, `name/index.sass`
//!
//! Resolution never substitutes one dialect's extension for the other:
//! `variables.scss` does not resolve to `variables.sass`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tower_lsp::lsp_types::Url;
use tracing::debug;

use super::fs::FileSystem;
use super::parser::{is_module_link, Dialect};
use super::uri;

const EXTENSIONS: [&str; 2] = ["scss", "sass"];

/// Resolves module references against the file system
#[derive(Clone)]
pub struct PathResolver {
    fs: Arc<dyn FileSystem>,
}

impl PathResolver {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Resolve `link` as written in the document at `from`.
    ///
    /// Returns None for built-in modules, plain CSS imports, and references
    /// with no existing candidate.
    pub async fn resolve(&self, from: &Url, link: &str) -> Option<Url> {
        let link = link.trim().trim_matches(|c| c == '"' || c == '\'');
        if link.is_empty() || !is_module_link(link) {
            return None;
        }

        let from_path = uri::to_file_path(from).ok()?;
        let from_dir = from_path.parent()?;

        let found = if let Some(package) = link.strip_prefix('~') {
            match self.resolve_in_node_modules(from_dir, package).await {
                Some(found) => Some(found),
                None => self.probe(&from_dir.join(package)).await,
            }
        } else {
            match self.probe(&from_dir.join(link)).await {
                Some(found) => Some(found),
                // Bare package references (`bootstrap/scss/functions`)
                None if !link.starts_with('.') && !link.starts_with('/') => {
                    self.resolve_in_node_modules(from_dir, link).await
                }
                None => None,
            }
        };

        match found {
            Some(path) => uri::from_file_path(&path).ok(),
            None => {
                debug!("Unresolved module link '{}' from {}", link, from);
                None
            }
        }
    }

    /// Look for `package` under `node_modules` of each ancestor directory
    async fn resolve_in_node_modules(&self, from_dir: &Path, package: &str) -> Option<PathBuf> {
        for dir in from_dir.ancestors() {
            let modules = dir.join("node_modules");
            if !self.fs.exists(&modules).await {
                continue;
            }
            if let Some(found) = self.probe(&modules.join(package)).await {
                return Some(found);
            }
        }
        None
    }

    async fn probe(&self, base: &Path) -> Option<PathBuf> {
        let base = uri::normalize_path(base);
        for candidate in candidates(&base) {
            if self.fs.exists(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}

fn partial(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with('_') {
        return None;
    }
    Some(path.with_file_name(format!("_{}", name)))
}

fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Candidate files for a normalized base path, in priority order
pub fn candidates(base: &Path) -> Vec<PathBuf> {
    if Dialect::from_path(base).is_some() {
        let mut explicit = vec![base.to_path_buf()];
        explicit.extend(partial(base));
        return explicit;
    }

    let mut candidates: Vec<PathBuf> = EXTENSIONS
        .iter()
        .map(|ext| with_extension(base, ext))
        .collect();

    if let Some(partial) = partial(base) {
        candidates.extend(EXTENSIONS.iter().map(|ext| with_extension(&partial, ext)));
    }

    for ext in EXTENSIONS {
        candidates.push(base.join(format!("_index.{}", ext)));
        candidates.push(base.join(format!("index.{}", ext)));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::fs::MemoryFileSystem;

    fn resolver(files: &[&str]) -> PathResolver {
        let fs = MemoryFileSystem::with_files(files.iter().map(|f| (*f, "")));
        PathResolver::new(Arc::new(fs))
    }

    fn from() -> Url {
        Url::parse("file:///project/styles/main.scss").unwrap()
    }

    async fn resolved_path(resolver: &PathResolver, link: &str) -> Option<String> {
        resolver
            .resolve(&from(), link)
            .await
            .map(|u| u.path().to_string())
    }

    #[test]
    fn test_candidate_order() {
        let found: Vec<String> = candidates(Path::new("/p/vars"))
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(
            found,
            vec![
                "/p/vars.scss",
                "/p/vars.sass",
                "/p/_vars.scss",
                "/p/_vars.sass",
                "/p/vars/_index.scss",
                "/p/vars/index.scss",
                "/p/vars/_index.sass",
                "/p/vars/index.sass",
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_only() {
        let resolver = resolver(&["/project/styles/_variables.scss"]);
        assert_eq!(
            resolved_path(&resolver, "variables").await.as_deref(),
            Some("/project/styles/_variables.scss")
        );
    }

    #[tokio::test]
    async fn test_no_dialect_substitution() {
        let resolver = resolver(&["/project/styles/variables.sass"]);
        assert_eq!(resolved_path(&resolver, "variables.scss").await, None);
        assert_eq!(
            resolved_path(&resolver, "variables").await.as_deref(),
            Some("/project/styles/variables.sass")
        );
    }

    #[tokio::test]
    async fn test_non_partial_beats_partial_and_scss_beats_sass() {
        let resolver = resolver(&[
            "/project/styles/a.sass",
            "/project/styles/a.scss",
            "/project/styles/_a.scss",
        ]);
        assert_eq!(
            resolved_path(&resolver, "a").await.as_deref(),
            Some("/project/styles/a.scss")
        );
    }

    #[tokio::test]
    async fn test_index_files_and_relative_depth() {
        let resolver = resolver(&[
            "/project/theme/_index.scss",
            "/project/styles/components/buttons/index.sass",
        ]);
        assert_eq!(
            resolved_path(&resolver, "\"../theme\"").await.as_deref(),
            Some("/project/theme/_index.scss")
        );
        assert_eq!(
            resolved_path(&resolver, "./components/../components/buttons")
                .await
                .as_deref(),
            Some("/project/styles/components/buttons/index.sass")
        );
    }

    #[tokio::test]
    async fn test_node_modules_lookup() {
        let resolver = resolver(&["/project/node_modules/bootstrap/scss/_functions.scss"]);
        assert_eq!(
            resolved_path(&resolver, "~bootstrap/scss/functions").await.as_deref(),
            Some("/project/node_modules/bootstrap/scss/_functions.scss")
        );
        assert_eq!(
            resolved_path(&resolver, "bootstrap/scss/functions").await.as_deref(),
            Some("/project/node_modules/bootstrap/scss/_functions.scss")
        );
    }

    #[tokio::test]
    async fn test_builtins_and_css_never_resolve() {
        let resolver = resolver(&["/project/styles/math.scss", "/project/styles/reset.css"]);
        assert_eq!(resolved_path(&resolver, "sass:math").await, None);
        assert_eq!(resolved_path(&resolver, "reset.css").await, None);
        assert_eq!(resolved_path(&resolver, "missing").await, None);
    }
}
