//! Substring search over the voice names of a directory of bulk dumps

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use serde::Serialize;

use crate::bank::{BulkDumpFile, InstrumentVariant, PatchRecord};
use crate::error::{FileAccessError, SearchError};
use crate::scan::{DirectoryScanner, Scanner};

/// A validated, non-blank search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    term: String,
    needle: String,
}

impl Query {
    /// Rejects empty and whitespace-only input. Surrounding whitespace is
    /// trimmed before matching.
    pub fn new(query: &str) -> Result<Self, SearchError> {
        let term = query.trim();
        if term.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self {
            term: term.to_string(),
            needle: term.to_lowercase(),
        })
    }

    /// The trimmed search term as entered.
    pub fn as_str(&self) -> &str {
        &self.term
    }

    /// Case-insensitive substring match.
    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.needle)
    }
}

/// A voice whose name matched a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Path of the bulk dump, absolute when searched through [`SearchIndex`]
    #[serde(skip)]
    pub path: PathBuf,
    /// Path relative to the scan root
    #[serde(rename = "file")]
    pub relative_path: PathBuf,
    /// Voice number, starting at 1
    #[serde(rename = "patch_number")]
    pub number: usize,
    /// Decoded voice name
    #[serde(rename = "patch_name")]
    pub name: String,
    /// Variant of the bulk dump holding the voice
    #[serde(rename = "instrument")]
    pub variant: InstrumentVariant,
}

impl SearchHit {
    fn new(file: &BulkDumpFile, root: &Path, patch: PatchRecord) -> Self {
        let relative_path = file
            .path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| file.path.clone());

        Self {
            path: file.path.clone(),
            relative_path,
            number: patch.number,
            name: patch.name,
            variant: file.variant,
        }
    }
}

/// Puts hits in result order: name ignoring case, then path by bytes, then
/// voice number. Each key is computed once per hit.
pub fn sort_hits(hits: &mut [SearchHit]) {
    hits.sort_by_cached_key(|hit| {
        (
            hit.name.to_lowercase(),
            OsString::from(hit.path.as_os_str()),
            hit.number,
        )
    });
}

/// Limits and parallelism of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Number of worker threads reading files
    pub workers: usize,
    /// Stop after dispatching this many files
    pub max_files: Option<usize>,
    /// Start no new file after this much time has passed
    pub timeout: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_files: None,
            timeout: None,
        }
    }
}

/// Matches of one search, plus how much of the collection was covered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Matches in result order
    pub hits: Vec<SearchHit>,
    /// Set when the file cap, the timeout or a failed worker left files
    /// unsearched
    pub truncated: bool,
    /// Files that were read, including unknown variants
    pub files_searched: usize,
    /// Files that could not be read
    pub files_failed: usize,
}

#[derive(Default)]
struct WorkerResult {
    hits: Vec<SearchHit>,
    searched: usize,
    failed: usize,
    skipped: usize,
}

/// Searches the given files on a bounded pool of worker threads.
///
/// Each worker collects its own hits; they are merged and sorted once all
/// workers are done. A file that cannot be read is logged and counted in
/// `files_failed`, it never aborts the search.
pub fn search_files(
    files: &[BulkDumpFile],
    root: &Path,
    query: &Query,
    options: &SearchOptions,
) -> SearchOutcome {
    search_files_with(files, root, query, options, BulkDumpFile::read_patches)
}

fn search_files_with<R>(
    files: &[BulkDumpFile],
    root: &Path,
    query: &Query,
    options: &SearchOptions,
    read: R,
) -> SearchOutcome
where
    R: Fn(&BulkDumpFile) -> Result<Vec<PatchRecord>, FileAccessError> + Sync,
{
    let read = &read;
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let expired = move || deadline.map(|d| Instant::now() >= d).unwrap_or(false);

    let limit = options
        .max_files
        .map(|max| max.min(files.len()))
        .unwrap_or(files.len());
    let mut truncated = limit < files.len();
    let workers = options.workers.clamp(1, limit.max(1));

    log::debug!(
        "searching {} of {} files for '{}' on {} workers",
        limit,
        files.len(),
        query.as_str(),
        workers
    );

    let (job_tx, job_rx) = bounded::<&BulkDumpFile>(workers * 2);

    let results: Vec<Option<WorkerResult>> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let job_rx = job_rx.clone();
                s.spawn(move || {
                    let mut local = WorkerResult::default();
                    for file in job_rx {
                        if expired() {
                            local.skipped += 1;
                            continue;
                        }
                        match read(file) {
                            Ok(patches) => {
                                local.searched += 1;
                                local.hits.extend(
                                    patches
                                        .into_iter()
                                        .filter(|p| query.matches(&p.name))
                                        .map(|p| SearchHit::new(file, root, p)),
                                );
                            }
                            Err(e) => {
                                log::warn!("{}", e);
                                local.failed += 1;
                            }
                        }
                    }
                    local
                })
            })
            .collect();
        drop(job_rx);

        for file in &files[..limit] {
            if expired() {
                truncated = true;
                break;
            }
            if job_tx.send(file).is_err() {
                break;
            }
        }
        drop(job_tx);

        handles.into_iter().map(|h| h.join().ok()).collect()
    });

    let mut outcome = SearchOutcome {
        truncated,
        ..SearchOutcome::default()
    };
    for result in results {
        let Some(result) = result else {
            log::error!("search worker panicked, its results are lost");
            outcome.truncated = true;
            continue;
        };
        outcome.hits.extend(result.hits);
        outcome.files_searched += result.searched;
        outcome.files_failed += result.failed;
        outcome.truncated |= result.skipped > 0;
    }
    sort_hits(&mut outcome.hits);

    if outcome.truncated {
        log::warn!(
            "search truncated after {} of {} files",
            outcome.files_searched + outcome.files_failed,
            files.len()
        );
    }

    outcome
}

/// Scans a directory and searches every bulk dump found in it.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex<S: Scanner = DirectoryScanner> {
    scanner: S,
    options: SearchOptions,
}

impl SearchIndex<DirectoryScanner> {
    /// Index over the filesystem with default options.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Scanner> SearchIndex<S> {
    /// Index over the files `scanner` discovers.
    pub fn with_scanner(scanner: S) -> Self {
        Self {
            scanner,
            options: SearchOptions::default(),
        }
    }

    /// Replaces the search options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Current search options.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Validates `query`, then scans `root` and searches every file found.
    ///
    /// A blank query is rejected before the scanner is consulted. `root` is
    /// made absolute when it can be resolved, so hit paths are absolute.
    pub fn search(&self, root: &Path, query: &str) -> Result<SearchOutcome, SearchError> {
        let query = Query::new(query)?;
        let root = absolute_root(root);
        let files = self.scanner.scan(&root);
        Ok(search_files(&files, &root, &query, &self.options))
    }
}

fn absolute_root(root: &Path) -> PathBuf {
    match root.canonicalize() {
        Ok(root) => root,
        Err(e) => {
            log::debug!("cannot resolve {}: {}, using it as given", root.display(), e);
            root.to_path_buf()
        }
    }
}
