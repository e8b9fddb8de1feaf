//! Workspace scanner
//!
//! Builds the module graph: seeds are parsed, their links resolved, and
//! every resolved target not yet known is queued in turn until the
//! transitive closure is in the store. Parsing runs on a bounded pool of
//! tokio tasks; the coordinating loop is the only writer to the store and
//! owns the queue, so a file reached from two documents is parsed once.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tower_lsp::lsp_types::Url;
use tracing::{debug, info, warn};

use super::document::DocumentRecord;
use super::embedded;
use super::fs::FileSystem;
use super::parser::{self, Dialect};
use super::resolver::PathResolver;
use super::store::StoreHandle;
use super::uri;
use crate::config::ScannerSettings;
use crate::error::{Error, Result};

/// How a file's text becomes stylesheet text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Stylesheet(Dialect),
    /// Component file with embedded `<style>` regions
    Host,
}

fn source_kind(path: &Path) -> Option<SourceKind> {
    if let Some(dialect) = Dialect::from_path(path) {
        return Some(SourceKind::Stylesheet(dialect));
    }
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| embedded::is_host_extension(e))
        .map(|_| SourceKind::Host)
}

/// Whether a path has an extension the scanner accepts
pub fn is_supported_path(path: &Path) -> bool {
    source_kind(path).is_some()
}

/// Outcome of a [`Scanner::scan`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Documents parsed and stored, in completion order
    pub parsed: Vec<Url>,
    /// Discovered targets that were skipped (missing, unsupported, unreadable)
    pub skipped: Vec<Url>,
    /// Links left without a target across the parsed documents
    pub unresolved_links: usize,
}

/// Open-document records win over disk reads, newer versions over older ones
fn should_replace(existing: Option<i32>, incoming: Option<i32>) -> bool {
    match (existing, incoming) {
        (Some(old), Some(new)) => new >= old,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

/// Parse text into a record and resolve its links relative to `uri`
async fn build_record(
    resolver: &PathResolver,
    uri: Url,
    version: Option<i32>,
    text: String,
    kind: SourceKind,
) -> DocumentRecord {
    let (text, dialect) = match kind {
        SourceKind::Stylesheet(dialect) => (text, dialect),
        SourceKind::Host => match embedded::extract(&text) {
            Some(embedded) => (embedded.content, embedded.dialect),
            None => (
                text.bytes()
                    .map(|b| if b == b'\n' { '\n' } else { ' ' })
                    .collect(),
                Dialect::Scss,
            ),
        },
    };

    let mut parsed = parser::parse(&text, dialect);
    for link in &mut parsed.uses {
        link.target = resolver.resolve(&uri, &link.link).await;
    }
    for link in &mut parsed.forwards {
        link.target = resolver.resolve(&uri, &link.link).await;
    }
    for link in &mut parsed.imports {
        link.target = resolver.resolve(&uri, &link.link).await;
    }

    parsed.into_record(uri, version, text, dialect)
}

/// Read and parse one file from the file system
async fn load(fs: Arc<dyn FileSystem>, resolver: PathResolver, uri: Url) -> Result<DocumentRecord> {
    let path = uri::to_file_path(&uri)?;
    let kind = source_kind(&path).ok_or_else(|| Error::UnsupportedFile(uri.to_string()))?;

    match fs.stat(&path).await {
        Some(stat) if stat.is_file => {}
        Some(_) => return Err(Error::UnsupportedFile(uri.to_string())),
        None => return Err(Error::FileNotFound(uri.to_string())),
    }

    let text = fs
        .read_file(&path)
        .await
        .map_err(|e| Error::io(&path, e))?;

    Ok(build_record(&resolver, uri, None, text, kind).await)
}

/// Discovers, parses and links stylesheets into the document store
#[derive(Clone)]
pub struct Scanner {
    fs: Arc<dyn FileSystem>,
    resolver: PathResolver,
    store: StoreHandle,
    settings: ScannerSettings,
}

impl Scanner {
    pub fn new(fs: Arc<dyn FileSystem>, store: StoreHandle, settings: ScannerSettings) -> Self {
        Self {
            resolver: PathResolver::new(Arc::clone(&fs)),
            fs,
            store,
            settings,
        }
    }

    /// Stylesheet and host files under `root`, filtered by the configured globs
    pub async fn discover(&self, root: &Path) -> Vec<Url> {
        self.fs
            .find_files(root, &self.settings.include, &self.settings.exclude)
            .await
            .into_iter()
            .filter(|p| is_supported_path(p))
            .filter_map(|p| uri::from_file_path(&p).ok())
            .collect()
    }

    /// Parse `seeds` and everything they transitively link to.
    ///
    /// With no seeds, every file discovered under `workspace_root` is a seed.
    /// Resolves once the closure is stored. Missing and unsupported files,
    /// seeds included, are skipped and listed in the report. Other failures
    /// on discovered files are logged and skipped; the first such failure on
    /// a seed is returned after the traversal has finished for the others.
    pub async fn scan(&self, seeds: &[Url], workspace_root: &Path) -> Result<ScanReport> {
        let started = Instant::now();
        let seeds = if seeds.is_empty() {
            self.discover(workspace_root).await
        } else {
            seeds.iter().map(uri::canonical).collect()
        };

        let seed_count = seeds.len();
        let (report, seed_error) = self.traverse(seeds, true).await;

        info!(
            "Scanned {} documents from {} seeds in {:?} ({} skipped, {} unresolved links)",
            report.parsed.len(),
            seed_count,
            started.elapsed(),
            report.skipped.len(),
            report.unresolved_links
        );

        match seed_error {
            Some(error) => Err(error),
            None => Ok(report),
        }
    }

    /// Re-parse one document from editor text and replace its record.
    ///
    /// Link targets that are not in the store yet are scanned when
    /// import-following is enabled. An update older than the stored
    /// version is ignored.
    pub async fn update(&self, uri: &Url, version: Option<i32>, text: &str) -> Result<()> {
        let uri = uri::canonical(uri);
        let kind = source_kind(Path::new(uri.path()))
            .ok_or_else(|| Error::UnsupportedFile(uri.to_string()))?;

        let record = build_record(&self.resolver, uri.clone(), version, text.to_string(), kind).await;

        let discovered: Vec<Url> = {
            let mut store = self.store.write().await;
            let existing = store.get(&uri).and_then(|r| r.version);
            if store.contains(&uri) && !should_replace(existing, version) {
                debug!(
                    "Ignoring stale update of {} (version {:?} < {:?})",
                    uri, version, existing
                );
                return Ok(());
            }

            let mut targets: Vec<Url> = record
                .link_targets()
                .filter(|t| !store.contains(t))
                .cloned()
                .collect();
            targets.sort();
            targets.dedup();

            store.set(record);
            targets
        };

        if self.settings.scan_imported_files && !discovered.is_empty() {
            debug!("{} introduced {} new link targets", uri, discovered.len());
            self.traverse(discovered, false).await;
        }

        Ok(())
    }

    /// Re-resolve links of stored documents after `changed` appeared on or
    /// disappeared from disk.
    ///
    /// Affects documents linking to `changed` and documents with an
    /// unresolved module link. Records are rebuilt from their stored
    /// stylesheet text, so host files are not extracted a second time.
    /// Returns the URIs whose records were replaced.
    pub async fn refresh_dependents(&self, changed: &Url) -> Vec<Url> {
        let changed = uri::canonical(changed);
        let affected: Vec<Arc<DocumentRecord>> = {
            let store = self.store.read().await;
            store
                .iter()
                .filter(|(_, record)| {
                    record.links().any(|l| match l.target() {
                        Some(target) => *target == changed,
                        None => parser::is_module_link(l.link()),
                    })
                })
                .map(|(_, record)| Arc::clone(record))
                .collect()
        };

        let mut refreshed = Vec::new();
        let mut discovered = Vec::new();
        for old in affected {
            let kind = SourceKind::Stylesheet(old.dialect);
            let record =
                build_record(&self.resolver, old.uri.clone(), old.version, old.text.clone(), kind)
                    .await;

            let mut store = self.store.write().await;
            // An update landed while the links were resolved
            if !store.get(&old.uri).is_some_and(|current| Arc::ptr_eq(&current, &old)) {
                continue;
            }
            discovered.extend(record.link_targets().filter(|t| !store.contains(t)).cloned());
            store.set(record);
            refreshed.push(old.uri.clone());
        }

        if self.settings.scan_imported_files && !discovered.is_empty() {
            discovered.sort();
            discovered.dedup();
            self.traverse(discovered, false).await;
        }

        debug!("Refreshed {} documents after change to {}", refreshed.len(), changed);
        refreshed
    }

    /// Forget a document
    pub async fn remove(&self, uri: &Url) -> Option<Arc<DocumentRecord>> {
        let removed = self.store.write().await.delete(uri);
        if removed.is_some() {
            debug!("Removed {}", uri);
        }
        removed
    }

    /// Work-queue traversal. `roots_are_seeds` decides whether failures on
    /// the initial entries are reported or only logged.
    async fn traverse(
        &self,
        roots: Vec<Url>,
        roots_are_seeds: bool,
    ) -> (ScanReport, Option<Error>) {
        let limit = self.settings.max_concurrency.max(1);
        let mut report = ScanReport::default();
        let mut seed_error = None;

        let mut seen: HashSet<Url> = HashSet::new();
        let mut queue: VecDeque<(Url, bool)> = VecDeque::new();
        for root in roots {
            if seen.insert(root.clone()) {
                queue.push_back((root, roots_are_seeds));
            }
        }

        let mut tasks: JoinSet<(Url, bool, Result<DocumentRecord>)> = JoinSet::new();

        loop {
            while tasks.len() < limit {
                let Some((uri, is_seed)) = queue.pop_front() else {
                    break;
                };
                let fs = Arc::clone(&self.fs);
                let resolver = self.resolver.clone();
                tasks.spawn(async move {
                    let result = load(fs, resolver, uri.clone()).await;
                    (uri, is_seed, result)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            let (uri, is_seed, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!("Scan task failed: {}", e);
                    continue;
                }
            };

            let record = match result {
                Ok(record) => record,
                Err(e @ (Error::FileNotFound(_) | Error::UnsupportedFile(_))) => {
                    debug!("Skipping {}: {}", uri, e);
                    report.skipped.push(uri);
                    continue;
                }
                Err(e) if is_seed => {
                    warn!("Failed to scan {}: {}", uri, e);
                    if seed_error.is_none() {
                        seed_error = Some(e);
                    }
                    continue;
                }
                Err(e) => {
                    warn!("Skipping {}: {}", uri, e);
                    report.skipped.push(uri);
                    continue;
                }
            };

            report.unresolved_links += record.links().filter(|l| l.target().is_none()).count();
            let targets: Vec<Url> = record.link_targets().cloned().collect();

            let mut store = self.store.write().await;
            let existing = store.get(&uri).map(|r| r.version);
            match existing {
                Some(version) if !should_replace(version, None) => {
                    debug!("Keeping open document {} over disk contents", uri);
                }
                _ => {
                    store.set(record);
                }
            }
            report.parsed.push(uri);

            if !self.settings.scan_imported_files {
                continue;
            }
            for target in targets {
                if !store.contains(&target) && seen.insert(target.clone()) {
                    queue.push_back((target, false));
                }
            }
        }

        (report, seed_error)
    }
}
